//! tabset DOM - Document Object Model
//!
//! Arena-based, headless DOM tree. Nodes are addressed by [`NodeId`] and
//! never freed; detached nodes simply stop being reachable from the root.

mod classlist;
mod node;
mod operations;
mod style;
mod tree;

pub use classlist::DOMTokenList;
pub use node::{Attribute, ElementData, Node, NodeData};
pub use operations::{DomError, DomResult};
pub use style::StyleDeclaration;
pub use tree::{Children, Descendants, DomTree};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root (document) node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check if this ID points at a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub(crate) fn option(self) -> Option<NodeId> {
        self.is_valid().then_some(self)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
