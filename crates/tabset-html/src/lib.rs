//! tabset HTML
//!
//! Loads markup into a [`DomTree`] with html5ever and writes it back out.

mod loader;
mod serializer;

pub use loader::HtmlLoader;
pub use serializer::{HtmlSerializer, get_inner_html, get_outer_html};
pub use tabset_dom::{DomError, DomTree, NodeId};

/// Markup loading errors
#[derive(Debug, thiserror::Error)]
pub enum HtmlError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("DOM error: {0}")]
    Dom(#[from] DomError),
}

/// Parse an HTML string into a tree
pub fn parse(html: &str) -> Result<DomTree, HtmlError> {
    HtmlLoader::new().parse(html)
}
