//! Error types

use tabset_dom::NodeId;

use crate::InstanceId;

/// Setup and lookup errors. Runtime conditions (missing targets, stale
/// completions, redundant activations) are not errors and never surface here.
#[derive(Debug, thiserror::Error)]
pub enum TabsError {
    #[error("duplicate {kind} identifier `{id}`")]
    DuplicateId { kind: &'static str, id: String },

    #[error("invalid value `{value}` for `{name}`")]
    InvalidOption { name: String, value: String },

    #[error("invalid options JSON: {0}")]
    InvalidOptionsJson(#[from] serde_json::Error),

    #[error("{0} is not a tabs container")]
    NotAContainer(NodeId),

    #[error("container {0} is already mounted")]
    AlreadyMounted(NodeId),

    #[error("unknown instance {0}")]
    UnknownInstance(InstanceId),
}

impl TabsError {
    pub(crate) fn invalid(name: &str, value: &str) -> Self {
        Self::InvalidOption {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

/// A playable refused to start. Expected under restrictive autoplay
/// policies; callers swallow it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaybackError {
    #[error("playback not allowed: {0}")]
    NotAllowed(String),

    #[error("playback aborted")]
    Aborted,
}
