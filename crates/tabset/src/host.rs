//! Host capabilities
//!
//! The widget never touches a document directly. Everything it needs from
//! the embedding environment is split into four small traits, composed into
//! [`Host`]:
//!
//! - [`Dom`]: read/write attributes, classes and inline style, walk and
//!   restructure the tree, measure heights.
//! - [`Scheduler`]: next-frame callbacks, timers, transition-end listeners
//!   and input bindings. Callbacks are not closures: the host hands a
//!   [`Wake`] back to [`Manager::dispatch`](crate::Manager::dispatch).
//! - [`Media`]: embedded videos and carousels.
//! - [`Environment`]: media queries and motion preferences.
//!
//! [`crate::sim::SimHost`] implements all of them over a headless tree.

use tabset_dom::NodeId;

use crate::{InstanceId, PlaybackError};

/// Handle of a pending timeout or interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Handle of a transition-end listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// Identifies one in-flight transition job of an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub u64);

/// Why a job was resumed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cause {
    /// The deferred rendering frame arrived
    Frame,
    /// The fallback timer fired
    Timeout,
    /// The watched property finished its CSS transition
    TransitionEnd,
}

/// Message the host delivers back when a scheduled callback fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wake {
    pub instance: InstanceId,
    pub kind: WakeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeKind {
    Job { job: JobId, cause: Cause },
    AutoplayTick,
}

impl Wake {
    pub fn job(instance: InstanceId, job: JobId, cause: Cause) -> Self {
        Self {
            instance,
            kind: WakeKind::Job { job, cause },
        }
    }

    pub fn autoplay(instance: InstanceId) -> Self {
        Self {
            instance,
            kind: WakeKind::AutoplayTick,
        }
    }
}

/// Input events a trigger listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    Click,
    Hover,
    Key,
}

/// Document access
pub trait Dom {
    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);
    fn remove_attribute(&mut self, node: NodeId, name: &str);

    fn has_class(&self, node: NodeId, class: &str) -> bool;
    fn add_class(&mut self, node: NodeId, class: &str);
    fn remove_class(&mut self, node: NodeId, class: &str);

    fn style(&self, node: NodeId, prop: &str) -> Option<String>;
    fn set_style(&mut self, node: NodeId, prop: &str, value: &str);
    fn remove_style(&mut self, node: NodeId, prop: &str);

    fn tag_name(&self, node: NodeId) -> Option<String>;
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    /// Next sibling node of any kind
    fn next_sibling(&self, node: NodeId) -> Option<NodeId>;
    fn next_element_sibling(&self, node: NodeId) -> Option<NodeId>;
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool;
    /// Descendants of `root` carrying attribute `name`, in document order
    fn query_attribute(&self, root: NodeId, name: &str) -> Vec<NodeId>;
    /// Descendants of `root` with tag `tag`, in document order
    fn query_tag(&self, root: NodeId, tag: &str) -> Vec<NodeId>;

    fn create_element(&mut self, tag: &str) -> NodeId;
    /// Move `node` under `parent`, before `reference` or at the end
    fn insert_before(&mut self, parent: NodeId, node: NodeId, reference: Option<NodeId>);
    /// Move `node` right after `reference`
    fn insert_after(&mut self, reference: NodeId, node: NodeId);
    /// Detach `node` from the document
    fn remove(&mut self, node: NodeId);

    /// Rendered height (`offsetHeight`); zero when not rendered
    fn offset_height(&self, node: NodeId) -> f32;
    /// Natural content height (`scrollHeight`), ignoring an inline height
    fn scroll_height(&self, node: NodeId) -> f32;
    /// No `display: none` on the node or any ancestor
    fn is_rendered(&self, node: NodeId) -> bool;

    fn focus(&mut self, node: NodeId);
}

/// Deferred work
pub trait Scheduler {
    /// Deliver `wake` on the next rendering frame
    fn request_frame(&mut self, wake: Wake);
    fn set_timeout(&mut self, delay_ms: u64, wake: Wake) -> TimerId;
    fn set_interval(&mut self, period_ms: u64, wake: Wake) -> TimerId;
    fn clear_timer(&mut self, id: TimerId);

    /// Deliver `wake` when `property` on exactly `node` ends a transition
    fn on_transition_end(&mut self, node: NodeId, property: &str, wake: Wake) -> ListenerId;
    fn remove_listener(&mut self, id: ListenerId);

    fn bind_input(&mut self, node: NodeId, kind: InputKind);
    fn unbind_inputs(&mut self, node: NodeId);
}

/// Embedded carousel, attached by a third-party slider library
pub trait Carousel {
    /// Re-measure after the host element changed size or visibility
    fn update(&mut self);
    fn slide_count(&self) -> usize;
    fn slides_per_view(&self) -> usize;
    fn active_index(&self) -> usize;
    fn slide_to(&mut self, index: usize);
    fn set_loop(&mut self, enabled: bool);
    /// Was the carousel configured to autoplay?
    fn has_autoplay(&self) -> bool;
    fn start_autoplay(&mut self) -> Result<(), PlaybackError>;
    fn stop_autoplay(&mut self);
}

/// Playables embedded in panels
pub trait Media {
    fn play(&mut self, video: NodeId) -> Result<(), PlaybackError>;
    fn pause(&mut self, video: NodeId);
    fn carousel(&mut self, slider: NodeId) -> Option<&mut dyn Carousel>;
}

/// Viewport and user preferences
pub trait Environment {
    fn matches_media(&self, query: &str) -> bool;

    fn prefers_reduced_motion(&self) -> bool {
        self.matches_media("(prefers-reduced-motion: reduce)")
    }
}

/// Everything the widget needs from its embedding
pub trait Host: Dom + Scheduler + Media + Environment {}

impl<T: Dom + Scheduler + Media + Environment> Host for T {}
