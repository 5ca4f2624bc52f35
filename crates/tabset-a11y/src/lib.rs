//! tabset Accessibility
//!
//! ARIA bookkeeping for tab and accordion widgets.
//!
//! Features:
//! - ARIA roles and states for tabs, tab panels and accordion headers
//! - Attribute sets the widget writes, and the list it must clean up
//! - Roving-tabindex keyboard navigation

pub mod aria;
pub mod focus;

pub use aria::{AriaAttributes, AriaRole, AriaState, WIDGET_ATTRIBUTES};
pub use focus::{Key, KeyAction, RovingTabIndex, TabIndex};

/// Accessibility error
#[derive(Debug, thiserror::Error)]
pub enum A11yError {
    #[error("Invalid ARIA role: {0}")]
    InvalidRole(String),

    #[error("Unknown key: {0}")]
    UnknownKey(String),
}
