//! tabset - Tabs and accordions
//!
//! Turns a marked-up container into a tab switcher or a collapsible
//! accordion. The [`Manager`] owns a [`Host`] and every mounted
//! [`Instance`]; hosts deliver user input and scheduled [`Wake`]s back to
//! it. [`sim::SimHost`] is a deterministic headless host.

mod aria;
mod autoplay;
mod effects;
mod error;
mod instance;
mod manager;
mod mode;
mod registry;
mod token;
mod transition;

pub mod config;
pub mod events;
pub mod host;
pub mod markers;
pub mod sim;

pub use config::{Breakpoint, Options, PartialOptions, ResponsiveAction, TriggerMode};
pub use error::{PlaybackError, TabsError};
pub use events::Event;
pub use host::{Carousel, Dom, Environment, Host, Media, Scheduler, Wake};
pub use instance::{Input, Instance, InstanceId, State};
pub use manager::Manager;
pub use registry::{Entry, Registry, Target};
pub use tabset_a11y::Key;
pub use tabset_dom::NodeId;
pub use token::{Token, TokenCounter};
pub use transition::Strategy;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
