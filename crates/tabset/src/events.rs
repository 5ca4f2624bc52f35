//! Notifications
//!
//! Observable side effects for host-page integration. Instances queue them;
//! the [`Manager`](crate::Manager) collects them after every call.

use tabset_dom::NodeId;

use crate::InstanceId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Enabled {
        instance: InstanceId,
    },
    Disabled {
        instance: InstanceId,
    },
    Destroyed {
        instance: InstanceId,
        container: NodeId,
    },
    /// A panel finished showing (tabs) or expanding (accordion)
    PanelExpanded {
        instance: InstanceId,
        id: String,
        trigger: NodeId,
        panel: NodeId,
    },
    /// An accordion panel finished collapsing
    PanelCollapsed {
        instance: InstanceId,
        id: String,
        trigger: NodeId,
        panel: NodeId,
    },
    /// A tab switch settled and its trigger is now the active one
    TabChanged {
        instance: InstanceId,
        id: String,
        trigger: NodeId,
        panel: NodeId,
    },
}

impl Event {
    pub fn instance(&self) -> InstanceId {
        match self {
            Self::Enabled { instance }
            | Self::Disabled { instance }
            | Self::Destroyed { instance, .. }
            | Self::PanelExpanded { instance, .. }
            | Self::PanelCollapsed { instance, .. }
            | Self::TabChanged { instance, .. } => *instance,
        }
    }

    /// DOM-style event name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Enabled { .. } => "tabs:enabled",
            Self::Disabled { .. } => "tabs:disabled",
            Self::Destroyed { .. } => "tabs:destroyed",
            Self::PanelExpanded { .. } => "tabs:panel-expanded",
            Self::PanelCollapsed { .. } => "tabs:panel-collapsed",
            Self::TabChanged { .. } => "tabs:change",
        }
    }

    /// Identifier of the affected pair, if any
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::PanelExpanded { id, .. }
            | Self::PanelCollapsed { id, .. }
            | Self::TabChanged { id, .. } => Some(id),
            _ => None,
        }
    }
}
