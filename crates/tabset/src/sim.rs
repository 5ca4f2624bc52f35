//! Simulated host
//!
//! A deterministic [`Host`] over a headless [`DomTree`]. Time is virtual:
//! nothing happens until the embedder advances the clock, and every wake is
//! delivered in due order, one at a time.
//!
//! - Frames fire on the next 16 ms boundary after the request.
//! - Timers fire at their due time; intervals re-arm.
//! - Changing an animatable property (`opacity`, `height`, ...) of a rendered
//!   element that declares a transition schedules a transition end after that
//!   element's duration. Hiding the element drops the pending end.
//! - Heights come from pinned intrinsic heights, inline px heights, or 20 px
//!   per line of text.

use std::collections::{BTreeMap, HashMap, HashSet};

use tabset_dom::{DomTree, NodeData, NodeId};

use crate::PlaybackError;
use crate::host::{Carousel, Dom, Environment, InputKind, ListenerId, Media, Scheduler, TimerId, Wake};
use crate::manager::Manager;

/// Frame period in ms
pub const FRAME_MS: u64 = 16;
/// Height of one non-blank text node
pub const LINE_HEIGHT: f32 = 20.0;

const ANIMATABLE: &[&str] = &["opacity", "height", "max-height", "width", "transform"];

/// Wake-ups delivered before `run_until_idle` gives up
const IDLE_LIMIT: usize = 10_000;

#[derive(Debug, Clone)]
struct Timer {
    due: u64,
    period: Option<u64>,
    wake: Wake,
}

#[derive(Debug, Clone)]
struct Listener {
    node: NodeId,
    property: String,
    wake: Wake,
}

#[derive(Debug, Clone)]
struct PendingEnd {
    due: u64,
    node: NodeId,
    property: String,
}

/// Carousel double with configurable geometry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimCarousel {
    pub slides: usize,
    pub per_view: usize,
    pub active: usize,
    pub looping: bool,
    pub autoplay: bool,
    pub playing: bool,
    pub updates: usize,
    /// Reject `start_autoplay`
    pub blocked: bool,
}

impl SimCarousel {
    pub fn new(slides: usize, per_view: usize) -> Self {
        Self {
            slides,
            per_view,
            active: 0,
            looping: false,
            autoplay: false,
            playing: false,
            updates: 0,
            blocked: false,
        }
    }

    pub fn with_autoplay(mut self) -> Self {
        self.autoplay = true;
        self
    }
}

impl Carousel for SimCarousel {
    fn update(&mut self) {
        self.updates += 1;
    }

    fn slide_count(&self) -> usize {
        self.slides
    }

    fn slides_per_view(&self) -> usize {
        self.per_view
    }

    fn active_index(&self) -> usize {
        self.active
    }

    fn slide_to(&mut self, index: usize) {
        self.active = index;
    }

    fn set_loop(&mut self, enabled: bool) {
        self.looping = enabled;
    }

    fn has_autoplay(&self) -> bool {
        self.autoplay
    }

    fn start_autoplay(&mut self) -> Result<(), PlaybackError> {
        if self.blocked {
            return Err(PlaybackError::Aborted);
        }
        self.playing = true;
        Ok(())
    }

    fn stop_autoplay(&mut self) {
        self.playing = false;
    }
}

/// Headless host with a virtual clock
#[derive(Debug)]
pub struct SimHost {
    tree: DomTree,
    now: u64,
    next_id: u64,

    frames: Vec<(u64, Wake)>,
    timers: BTreeMap<TimerId, Timer>,
    listeners: BTreeMap<ListenerId, Listener>,
    pending_ends: Vec<PendingEnd>,
    transition_overrides: HashMap<NodeId, u64>,

    viewport_width: u32,
    reduced_motion: bool,

    playing: HashSet<NodeId>,
    autoplay_blocked: bool,
    carousels: HashMap<NodeId, SimCarousel>,

    bindings: HashMap<NodeId, HashSet<InputKind>>,
    focused: Option<NodeId>,
}

impl Default for SimHost {
    fn default() -> Self {
        Self::new(DomTree::new())
    }
}

impl SimHost {
    pub fn new(tree: DomTree) -> Self {
        Self {
            tree,
            now: 0,
            next_id: 0,
            frames: Vec::new(),
            timers: BTreeMap::new(),
            listeners: BTreeMap::new(),
            pending_ends: Vec::new(),
            transition_overrides: HashMap::new(),
            viewport_width: 1024,
            reduced_motion: false,
            playing: HashSet::new(),
            autoplay_blocked: false,
            carousels: HashMap::new(),
            bindings: HashMap::new(),
            focused: None,
        }
    }

    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    pub fn into_tree(self) -> DomTree {
        self.tree
    }

    /// Virtual time in ms
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn viewport_width(&self) -> u32 {
        self.viewport_width
    }

    pub fn set_viewport_width(&mut self, px: u32) {
        self.viewport_width = px;
    }

    pub fn set_reduced_motion(&mut self, on: bool) {
        self.reduced_motion = on;
    }

    /// Give `node` a transition duration for every animatable property,
    /// regardless of its inline `transition`
    pub fn set_transition(&mut self, node: NodeId, ms: u64) {
        self.transition_overrides.insert(node, ms);
    }

    /// Make every `play()` reject, like a strict autoplay policy
    pub fn block_autoplay(&mut self, blocked: bool) {
        self.autoplay_blocked = blocked;
    }

    pub fn is_playing(&self, video: NodeId) -> bool {
        self.playing.contains(&video)
    }

    pub fn attach_carousel(&mut self, slider: NodeId, carousel: SimCarousel) {
        self.carousels.insert(slider, carousel);
    }

    pub fn carousel_state(&self, slider: NodeId) -> Option<&SimCarousel> {
        self.carousels.get(&slider)
    }

    pub fn is_bound(&self, node: NodeId, kind: InputKind) -> bool {
        self.bindings.get(&node).is_some_and(|kinds| kinds.contains(&kind))
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// Live timers, intervals included
    pub fn timer_count(&self) -> usize {
        self.timers.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn next_handle(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    // ===== Clock =====

    /// Earliest due time of anything scheduled. Intervals are skipped when
    /// `settling_only` is set.
    fn next_due(&self, settling_only: bool) -> Option<u64> {
        let frames = self.frames.iter().map(|(due, _)| *due);
        let ends = self.pending_ends.iter().map(|p| p.due);
        let timers = self
            .timers
            .values()
            .filter(|t| !settling_only || t.period.is_none())
            .map(|t| t.due);
        frames.chain(ends).chain(timers).min()
    }

    /// Pop the earliest item due at or before `until` and return the wakes
    /// it produces. Frames go first, then transition ends, then timers.
    fn pop_due(&mut self, until: u64) -> Option<Vec<Wake>> {
        let due = self.next_due(false).filter(|&due| due <= until)?;
        self.now = self.now.max(due);

        if let Some(pos) = self.frames.iter().position(|(d, _)| *d == due) {
            let (_, wake) = self.frames.remove(pos);
            return Some(vec![wake]);
        }

        if let Some(pos) = self.pending_ends.iter().position(|p| p.due == due) {
            let end = self.pending_ends.remove(pos);
            if !self.is_rendered(end.node) {
                return Some(Vec::new());
            }
            let wakes = self
                .listeners
                .values()
                .filter(|l| l.node == end.node && l.property == end.property)
                .map(|l| l.wake)
                .collect();
            return Some(wakes);
        }

        let id = self
            .timers
            .iter()
            .find(|(_, t)| t.due == due)
            .map(|(id, _)| *id)?;
        let wake = match self.timers.get_mut(&id) {
            Some(timer) => match timer.period {
                Some(period) => {
                    timer.due += period.max(1);
                    timer.wake
                }
                None => {
                    let wake = timer.wake;
                    self.timers.remove(&id);
                    wake
                }
            },
            None => return Some(Vec::new()),
        };
        Some(vec![wake])
    }

    // ===== Transitions =====

    /// Declared duration of `property` on `node`, 0 when not transitioned
    fn transition_ms(&self, node: NodeId, property: &str) -> u64 {
        if let Some(&ms) = self.transition_overrides.get(&node) {
            return ms;
        }
        let Some(value) = self.tree.style(node, "transition") else {
            return 0;
        };
        value.split(',')
            .filter_map(|part| {
                let mut words = part.split_whitespace();
                let name = words.next()?;
                if name != property && name != "all" {
                    return None;
                }
                words.find_map(parse_duration)
            })
            .max()
            .unwrap_or(0)
    }

    fn note_change(&mut self, node: NodeId, property: &str, old: Option<&str>, new: Option<&str>) {
        if !ANIMATABLE.contains(&property) {
            return;
        }
        let (old, new) = match property {
            "opacity" => (old.unwrap_or("1"), new.unwrap_or("1")),
            // `auto` heights do not transition
            _ => match (old, new) {
                (Some(old), Some(new)) => (old, new),
                _ => return,
            },
        };
        if old == new || !self.is_rendered(node) {
            return;
        }
        let ms = self.transition_ms(node, property);
        if ms == 0 {
            return;
        }
        self.pending_ends.retain(|p| !(p.node == node && p.property == property));
        self.pending_ends.push(PendingEnd {
            due: self.now + ms,
            node,
            property: property.to_string(),
        });
    }

    // ===== Layout =====

    fn content_height(&self, node: NodeId) -> f32 {
        if let Some(h) = self.tree.element(node).and_then(|e| e.intrinsic_height) {
            return h;
        }
        self.tree
            .children(node)
            .map(|child| match self.tree.data(child) {
                Some(NodeData::Text(text)) if !text.trim().is_empty() => LINE_HEIGHT,
                Some(NodeData::Element(_)) => self.offset_height(child),
                _ => 0.0,
            })
            .sum()
    }
}

/// `300ms`, `0.25s`
fn parse_duration(word: &str) -> Option<u64> {
    if let Some(ms) = word.strip_suffix("ms") {
        return ms.parse::<f64>().ok().map(|v| v.max(0.0) as u64);
    }
    word.strip_suffix('s')
        .and_then(|s| s.parse::<f64>().ok())
        .map(|v| (v.max(0.0) * 1000.0) as u64)
}

fn parse_px(value: &str) -> Option<f32> {
    value.trim().strip_suffix("px")?.trim().parse().ok()
}

impl Dom for SimHost {
    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.tree.get_attribute(node, name).map(str::to_string)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Err(err) = self.tree.set_attribute(node, name, value) {
            tracing::debug!("set_attribute({}) ignored: {}", name, err);
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        self.tree.remove_attribute(node, name);
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.tree.has_class(node, class)
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        self.tree.add_class(node, class);
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        self.tree.remove_class(node, class);
    }

    fn style(&self, node: NodeId, prop: &str) -> Option<String> {
        self.tree.style(node, prop).map(str::to_string)
    }

    fn set_style(&mut self, node: NodeId, prop: &str, value: &str) {
        let old = self.tree.style(node, prop).map(str::to_string);
        if let Err(err) = self.tree.set_style(node, prop, value) {
            tracing::debug!("set_style({}) ignored: {}", prop, err);
            return;
        }
        self.note_change(node, prop, old.as_deref(), Some(value));
    }

    fn remove_style(&mut self, node: NodeId, prop: &str) {
        let old = self.tree.remove_style(node, prop);
        self.note_change(node, prop, old.as_deref(), None);
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        self.tree.tag_name(node).map(str::to_string)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree.parent(node)
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.tree.next_sibling(node)
    }

    fn next_element_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.tree.next_element_sibling(node)
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.tree.contains(ancestor, node)
    }

    fn query_attribute(&self, root: NodeId, name: &str) -> Vec<NodeId> {
        self.tree.find_by_attribute(root, name)
    }

    fn query_tag(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        self.tree.find_by_tag(root, tag)
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.tree.create_element(tag)
    }

    fn insert_before(&mut self, parent: NodeId, node: NodeId, reference: Option<NodeId>) {
        if let Err(err) = self.tree.insert_before(parent, node, reference) {
            tracing::debug!("insert_before ignored: {}", err);
        }
    }

    fn insert_after(&mut self, reference: NodeId, node: NodeId) {
        if let Err(err) = self.tree.insert_after(reference, node) {
            tracing::debug!("insert_after ignored: {}", err);
        }
    }

    fn remove(&mut self, node: NodeId) {
        self.tree.detach(node);
    }

    fn offset_height(&self, node: NodeId) -> f32 {
        if !self.is_rendered(node) {
            return 0.0;
        }
        self.tree
            .style(node, "height")
            .and_then(parse_px)
            .unwrap_or_else(|| self.content_height(node))
    }

    fn scroll_height(&self, node: NodeId) -> f32 {
        if !self.is_rendered(node) {
            return 0.0;
        }
        self.content_height(node)
    }

    fn is_rendered(&self, node: NodeId) -> bool {
        if !self.tree.is_attached(node) {
            return false;
        }
        let mut cur = Some(node);
        while let Some(n) = cur {
            if self.tree.style(n, "display") == Some("none") {
                return false;
            }
            cur = self.tree.parent(n);
        }
        true
    }

    fn focus(&mut self, node: NodeId) {
        self.focused = Some(node);
    }
}

impl Scheduler for SimHost {
    fn request_frame(&mut self, wake: Wake) {
        let due = (self.now / FRAME_MS + 1) * FRAME_MS;
        self.frames.push((due, wake));
    }

    fn set_timeout(&mut self, delay_ms: u64, wake: Wake) -> TimerId {
        let id = TimerId(self.next_handle());
        let due = self.now + delay_ms;
        self.timers.insert(id, Timer { due, period: None, wake });
        id
    }

    fn set_interval(&mut self, period_ms: u64, wake: Wake) -> TimerId {
        let id = TimerId(self.next_handle());
        let period = period_ms.max(1);
        self.timers.insert(
            id,
            Timer {
                due: self.now + period,
                period: Some(period),
                wake,
            },
        );
        id
    }

    fn clear_timer(&mut self, id: TimerId) {
        self.timers.remove(&id);
    }

    fn on_transition_end(&mut self, node: NodeId, property: &str, wake: Wake) -> ListenerId {
        let id = ListenerId(self.next_handle());
        self.listeners.insert(
            id,
            Listener {
                node,
                property: property.to_string(),
                wake,
            },
        );
        id
    }

    fn remove_listener(&mut self, id: ListenerId) {
        self.listeners.remove(&id);
    }

    fn bind_input(&mut self, node: NodeId, kind: InputKind) {
        self.bindings.entry(node).or_default().insert(kind);
    }

    fn unbind_inputs(&mut self, node: NodeId) {
        self.bindings.remove(&node);
    }
}

impl Media for SimHost {
    fn play(&mut self, video: NodeId) -> Result<(), PlaybackError> {
        if self.autoplay_blocked {
            return Err(PlaybackError::NotAllowed("autoplay policy".into()));
        }
        self.playing.insert(video);
        Ok(())
    }

    fn pause(&mut self, video: NodeId) {
        self.playing.remove(&video);
    }

    fn carousel(&mut self, slider: NodeId) -> Option<&mut dyn Carousel> {
        self.carousels.get_mut(&slider).map(|c| c as &mut dyn Carousel)
    }
}

impl Environment for SimHost {
    /// Understands `(max-width: Npx)`, `(min-width: Npx)` and
    /// `(prefers-reduced-motion: reduce)`, joined with `and`
    fn matches_media(&self, query: &str) -> bool {
        query.split(" and ").all(|feature| {
            let feature = feature.trim().trim_start_matches('(').trim_end_matches(')');
            let Some((name, value)) = feature.split_once(':') else {
                return false;
            };
            let value = value.trim();
            match name.trim() {
                "max-width" => parse_px(value).is_some_and(|px| self.viewport_width as f32 <= px),
                "min-width" => parse_px(value).is_some_and(|px| self.viewport_width as f32 >= px),
                "prefers-reduced-motion" => (value == "reduce") == self.reduced_motion,
                _ => false,
            }
        })
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }
}

impl Manager<SimHost> {
    /// Move the virtual clock forward, delivering everything that falls due
    pub fn advance(&mut self, ms: u64) {
        let until = self.host().now + ms;
        while let Some(wakes) = self.host_mut().pop_due(until) {
            for wake in wakes {
                self.dispatch(wake);
            }
        }
        self.host_mut().now = until;
    }

    /// Advance until no frame, timeout or transition end is pending.
    /// Intervals keep running but do not hold the loop open.
    pub fn run_until_idle(&mut self) {
        for _ in 0..IDLE_LIMIT {
            let Some(due) = self.host().next_due(true) else {
                return;
            };
            let now = self.host().now;
            self.advance(due.saturating_sub(now));
        }
        tracing::warn!("simulation still busy after {} steps", IDLE_LIMIT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InstanceId;

    fn wake() -> Wake {
        Wake::autoplay(InstanceId(1))
    }

    fn host_with_panel() -> (SimHost, NodeId) {
        let mut host = SimHost::default();
        let panel = host.tree_mut().create_element("div");
        let root = host.tree().root();
        host.tree_mut().append_child(root, panel).unwrap();
        (host, panel)
    }

    #[test]
    fn test_frames_land_on_boundaries() {
        let mut host = SimHost::default();
        host.now = 5;
        host.request_frame(wake());
        assert_eq!(host.next_due(false), Some(16));
        host.now = 16;
        host.request_frame(wake());
        assert_eq!(host.frames.last().map(|(d, _)| *d), Some(32));
    }

    #[test]
    fn test_timers_fire_in_order() {
        let mut host = SimHost::default();
        let late = host.set_timeout(50, wake());
        host.set_timeout(10, wake());
        host.clear_timer(late);

        assert_eq!(host.pop_due(100).map(|w| w.len()), Some(1));
        assert_eq!(host.now(), 10);
        assert!(host.pop_due(100).is_none());
    }

    #[test]
    fn test_interval_rearms() {
        let mut host = SimHost::default();
        host.set_interval(100, wake());
        assert!(host.pop_due(250).is_some());
        assert!(host.pop_due(250).is_some());
        assert!(host.pop_due(250).is_none());
        assert_eq!(host.next_due(false), Some(300));
        assert_eq!(host.next_due(true), None);
    }

    #[test]
    fn test_transition_end_needs_duration() {
        let (mut host, panel) = host_with_panel();
        host.set_style(panel, "opacity", "0");
        assert!(host.pending_ends.is_empty());

        host.set_style(panel, "transition", "opacity 250ms, height 0.5s");
        host.set_style(panel, "opacity", "1");
        assert_eq!(host.pending_ends.len(), 1);
        assert_eq!(host.pending_ends[0].due, 250);
        assert_eq!(host.transition_ms(panel, "height"), 500);
        assert_eq!(host.transition_ms(panel, "width"), 0);
    }

    #[test]
    fn test_transition_end_dropped_when_hidden() {
        let (mut host, panel) = host_with_panel();
        host.set_transition(panel, 100);
        let listener = host.on_transition_end(panel, "opacity", wake());
        host.set_style(panel, "opacity", "0");
        host.set_style(panel, "display", "none");

        assert_eq!(host.pop_due(1000), Some(Vec::new()));
        host.remove_listener(listener);
        assert_eq!(host.listener_count(), 0);
    }

    #[test]
    fn test_auto_height_does_not_transition() {
        let (mut host, panel) = host_with_panel();
        host.set_transition(panel, 100);
        host.set_style(panel, "height", "40px");
        assert!(host.pending_ends.is_empty());
        host.set_style(panel, "height", "0px");
        assert_eq!(host.pending_ends.len(), 1);
    }

    #[test]
    fn test_heights() {
        let (mut host, panel) = host_with_panel();
        let text = host.tree_mut().create_text("hello");
        host.tree_mut().append_child(panel, text).unwrap();
        let child = host.tree_mut().create_element("p");
        host.tree_mut().append_child(panel, child).unwrap();
        host.tree_mut().set_intrinsic_height(child, 55.0).unwrap();

        assert_eq!(host.scroll_height(panel), 75.0);
        host.set_style(panel, "height", "10px");
        assert_eq!(host.offset_height(panel), 10.0);
        assert_eq!(host.scroll_height(panel), 75.0);
        host.set_style(panel, "display", "none");
        assert_eq!(host.offset_height(panel), 0.0);
        assert!(!host.is_rendered(child));
    }

    #[test]
    fn test_media_queries() {
        let mut host = SimHost::default();
        host.set_viewport_width(600);
        assert!(host.matches_media("(max-width: 767px)"));
        assert!(!host.matches_media("(min-width: 769px)"));
        assert!(!host.matches_media("(orientation: portrait)"));
        assert!(!host.prefers_reduced_motion());
        host.set_reduced_motion(true);
        assert!(host.matches_media("(prefers-reduced-motion: reduce)"));
    }

    #[test]
    fn test_playback_policy() {
        let (mut host, video) = host_with_panel();
        host.play(video).unwrap();
        assert!(host.is_playing(video));
        host.pause(video);
        host.block_autoplay(true);
        assert!(matches!(host.play(video), Err(PlaybackError::NotAllowed(_))));
        assert!(!host.is_playing(video));
    }
}
