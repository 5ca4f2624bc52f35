//! Visibility state machine
//!
//! One [`Instance`] per container: which panel is shown (tabs) or which
//! panels are expanded (accordion), which trigger is active, and what is in
//! flight. Transitions themselves live in [`crate::transition`], mode
//! switching in [`crate::mode`].

use std::fmt;

use tabset_a11y::{AriaAttributes, AriaRole, Key, KeyAction, RovingTabIndex};
use tabset_dom::NodeId;

use crate::TabsError;
use crate::aria::AriaLedger;
use crate::config::{Options, PartialOptions, ResponsiveAction, TriggerMode};
use crate::effects;
use crate::events::Event;
use crate::host::{Host, InputKind, TimerId, WakeKind};
use crate::markers;
use crate::mode::Relocation;
use crate::registry::{Entry, Registry, Target, owning_container};
use crate::token::{Token, TokenCounter};
use crate::transition::Jobs;

/// Handle of a mounted instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub(crate) u64);

impl InstanceId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tabs#{}", self.0)
    }
}

/// Coarse instance state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Disabled,
    TabsIdle,
    TabsTransitioning,
    AccordionIdle,
}

/// User input delivered to a trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Click,
    Hover,
    Key(Key),
}

/// DOM ids used for `aria-controls` / `aria-labelledby`
#[derive(Debug, Clone, Default)]
pub(crate) struct DomIds {
    pub trigger: String,
    pub panel: String,
}

#[derive(Debug)]
pub struct Instance {
    pub(crate) id: InstanceId,
    pub(crate) container: NodeId,
    pub(crate) options: Options,
    pub(crate) registry: Registry,

    pub(crate) enabled: bool,
    pub(crate) accordion: bool,
    pub(crate) bound: bool,

    /// Trigger marked active; set when a transition settles
    pub(crate) active: Option<usize>,
    /// Latest requested tab; set at request time
    pub(crate) shown: Option<usize>,
    /// Accordion expansion, updated at request time
    pub(crate) expanded: Vec<bool>,

    pub(crate) tokens: TokenCounter,
    /// Token of the latest expand/collapse request per accordion panel
    pub(crate) panel_tokens: Vec<Token>,
    pub(crate) jobs: Jobs,
    pub(crate) autoplay: Option<TimerId>,

    pub(crate) relocations: Vec<Relocation>,
    pub(crate) aria: AriaLedger,
    pub(crate) dom_ids: Vec<DomIds>,
    pub(crate) tab_list: Option<NodeId>,

    pub(crate) events: Vec<Event>,
}

impl Instance {
    /// Resolve options and scan the registry. Nothing is rendered yet.
    pub(crate) fn mount<H: Host + ?Sized>(host: &mut H, id: InstanceId, container: NodeId) -> Result<Self, TabsError> {
        if host.attribute(container, markers::CONTAINER).is_none() {
            return Err(TabsError::NotAContainer(container));
        }
        let options = Options::from_attributes(|name| host.attribute(container, name))?;
        let registry = Registry::scan(host, container)?;
        let len = registry.len();

        tracing::info!("Mounted {} on {} with {} panels", id, container, len);

        Ok(Self {
            id,
            container,
            options,
            registry,
            enabled: false,
            accordion: false,
            bound: false,
            active: None,
            shown: None,
            expanded: vec![false; len],
            tokens: TokenCounter::new(),
            panel_tokens: vec![Token::default(); len],
            jobs: Jobs::default(),
            autoplay: None,
            relocations: Vec::new(),
            aria: AriaLedger::default(),
            dom_ids: Vec::new(),
            tab_list: None,
            events: Vec::new(),
        })
    }

    // ===== Accessors =====

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_accordion(&self) -> bool {
        self.accordion
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }

    pub fn is_autoplaying(&self) -> bool {
        self.autoplay.is_some()
    }

    pub fn state(&self) -> State {
        if !self.enabled {
            State::Disabled
        } else if self.accordion {
            State::AccordionIdle
        } else if self.jobs.is_empty() {
            State::TabsIdle
        } else {
            State::TabsTransitioning
        }
    }

    /// Identifier of the active trigger
    pub fn active_id(&self) -> Option<&str> {
        self.active.and_then(|i| self.entry(i)).map(|e| e.id.as_str())
    }

    /// Identifier of the latest requested tab
    pub fn shown_id(&self) -> Option<&str> {
        self.shown.and_then(|i| self.entry(i)).map(|e| e.id.as_str())
    }

    /// Identifiers of the expanded accordion panels, in document order
    pub fn expanded_ids(&self) -> Vec<&str> {
        self.registry
            .iter()
            .zip(&self.expanded)
            .filter(|(_, open)| **open)
            .map(|(e, _)| e.id.as_str())
            .collect()
    }

    pub fn current_token(&self) -> Token {
        self.tokens.current()
    }

    /// Number of transition jobs in flight
    pub fn in_flight(&self) -> usize {
        self.jobs.len()
    }

    pub(crate) fn entry(&self, index: usize) -> Option<&Entry> {
        self.registry.get(index)
    }

    pub(crate) fn panel(&self, index: usize) -> Option<NodeId> {
        self.entry(index).map(|e| e.panel)
    }

    pub(crate) fn trigger(&self, index: usize) -> Option<NodeId> {
        self.entry(index).map(|e| e.trigger)
    }

    pub(crate) fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    // ===== Lifecycle =====

    /// First bring-up after mount. Instances gated on a breakpoint wait for
    /// it to match.
    pub(crate) fn start<H: Host + ?Sized>(&mut self, host: &mut H) {
        if self.options.breakpoint.is_some() && self.options.responsive == ResponsiveAction::Enable {
            self.evaluate_responsive(host);
        } else {
            self.enable(host);
        }
    }

    /// Bring the instance live. No-op when already enabled or empty.
    pub fn enable<H: Host + ?Sized>(&mut self, host: &mut H) {
        if self.enabled || self.registry.is_empty() {
            return;
        }
        self.setup(host, None);
        self.events.push(Event::Enabled { instance: self.id });
        tracing::info!("Enabled {}", self.id);
    }

    /// Return the container to plain content
    pub fn disable<H: Host + ?Sized>(&mut self, host: &mut H) {
        if !self.enabled {
            return;
        }
        self.teardown(host);
        self.events.push(Event::Disabled { instance: self.id });
        tracing::info!("Disabled {}", self.id);
    }

    /// Disable and announce the release. The manager drops the instance.
    pub fn destroy<H: Host + ?Sized>(&mut self, host: &mut H) {
        self.disable(host);
        self.events.push(Event::Destroyed {
            instance: self.id,
            container: self.container,
        });
        tracing::info!("Destroyed {}", self.id);
    }

    /// Rescan markup and re-enable, keeping the active identifier when it
    /// still exists
    pub fn refresh<H: Host + ?Sized>(&mut self, host: &mut H) -> Result<(), TabsError> {
        let was_enabled = self.enabled;
        let was_accordion = self.accordion;
        let keep = self
            .shown
            .or(self.active)
            .and_then(|i| self.entry(i))
            .map(|e| e.id.clone());

        if was_enabled {
            self.teardown(host);
        }

        self.registry = Registry::scan(host, self.container)?;
        let len = self.registry.len();
        self.expanded = vec![false; len];
        self.panel_tokens = vec![Token::default(); len];

        if was_enabled && !self.registry.is_empty() {
            let preferred = keep.and_then(|id| self.registry.index_of(&id));
            self.setup(host, preferred);
            if was_accordion && !self.accordion {
                self.set_accordion(host, true);
            }
        } else if was_enabled {
            // Nothing left to manage
            self.events.push(Event::Disabled { instance: self.id });
        }
        tracing::debug!("Refreshed {} ({} panels)", self.id, len);
        Ok(())
    }

    fn setup<H: Host + ?Sized>(&mut self, host: &mut H, preferred: Option<usize>) {
        self.enabled = true;
        host.add_class(self.container, markers::READY_CLASS);
        self.assign_dom_ids(host);
        self.tab_list = self.find_tab_list(host);
        self.bind(host);

        let initial = preferred.unwrap_or_else(|| self.initial_index(host));
        if self.responsive_accordion(host) {
            self.enter_accordion(host, initial);
        } else {
            self.apply_tab_list_role(host, AriaAttributes::tab_list());
            self.render_tabs_instant(host, initial);
            self.start_autoplay(host);
        }
    }

    fn teardown<H: Host + ?Sized>(&mut self, host: &mut H) {
        self.tokens.mint();
        self.finish_all_jobs(host);
        self.stop_autoplay(host);

        if self.accordion {
            self.restore_origins(host);
            self.accordion = false;
            host.remove_class(self.container, markers::ACCORDION_CLASS);
        }
        self.unbind(host);

        for entry in self.registry.iter() {
            for prop in markers::WIDGET_STYLES {
                host.remove_style(entry.panel, prop);
            }
            host.remove_class(entry.panel, markers::VISIBLE_CLASS);
            host.remove_class(entry.panel, markers::OPEN_CLASS);
            host.remove_class(entry.trigger, markers::ACTIVE_CLASS);
        }
        host.remove_class(self.container, markers::READY_CLASS);
        self.aria.restore(host);

        self.enabled = false;
        self.active = None;
        self.shown = None;
        self.expanded.iter_mut().for_each(|e| *e = false);
        self.dom_ids.clear();
        self.tab_list = None;
    }

    /// `defaultTab` (trigger identifier, then panel DOM id), then a trigger
    /// pre-marked active or open in markup, then the first
    pub(crate) fn initial_index<H: Host + ?Sized>(&self, host: &H) -> usize {
        if let Some(default) = self.options.default_tab.as_deref() {
            let by_panel = || {
                self.registry
                    .iter()
                    .position(|e| host.attribute(e.panel, "id").as_deref() == Some(default))
            };
            if let Some(i) = self.registry.index_of(default).or_else(by_panel) {
                return i;
            }
        }
        self.registry
            .iter()
            .position(|e| {
                host.has_class(e.trigger, markers::ACTIVE_CLASS)
                    || host.has_class(e.trigger, markers::OPEN_CLASS)
                    || host.attribute(e.trigger, "aria-selected").as_deref() == Some("true")
                    || host.attribute(e.trigger, "aria-expanded").as_deref() == Some("true")
            })
            .unwrap_or(0)
    }

    fn assign_dom_ids<H: Host + ?Sized>(&mut self, host: &mut H) {
        let instance = self.id.value();
        let mut ids = Vec::with_capacity(self.registry.len());
        for entry in self.registry.iter() {
            let key = entry.id.clone();
            let trigger = self
                .aria
                .ensure_id(host, entry.trigger, || format!("tabs-{instance}-{key}-trigger"));
            let panel = self
                .aria
                .ensure_id(host, entry.panel, || format!("tabs-{instance}-{key}-panel"));
            ids.push(DomIds { trigger, panel });
        }
        self.dom_ids = ids;
    }

    /// The marked list element, else the parent shared by the triggers
    fn find_tab_list<H: Host + ?Sized>(&self, host: &H) -> Option<NodeId> {
        let marked = host
            .query_attribute(self.container, markers::LIST)
            .into_iter()
            .find(|&n| owning_container(host, n) == Some(self.container));
        if marked.is_some() {
            return marked;
        }
        let first = self.trigger(0)?;
        let parent = host.parent(first)?;
        let shared = self.registry.iter().all(|e| host.parent(e.trigger) == Some(parent));
        (shared && parent != self.container).then_some(parent)
    }

    pub(crate) fn apply_tab_list_role<H: Host + ?Sized>(&mut self, host: &mut H, attrs: AriaAttributes) {
        if let Some(list) = self.tab_list {
            self.aria.apply(host, list, &attrs);
        }
    }

    pub(crate) fn presentation() -> AriaAttributes {
        AriaAttributes {
            role: Some(AriaRole::Presentation),
            ..AriaAttributes::default()
        }
    }

    fn bind<H: Host + ?Sized>(&mut self, host: &mut H) {
        for entry in self.registry.iter() {
            host.bind_input(entry.trigger, InputKind::Click);
            host.bind_input(entry.trigger, InputKind::Key);
            if self.options.mode == TriggerMode::Hover {
                host.bind_input(entry.trigger, InputKind::Hover);
            }
        }
        self.bound = true;
    }

    fn unbind<H: Host + ?Sized>(&mut self, host: &mut H) {
        for entry in self.registry.iter() {
            host.unbind_inputs(entry.trigger);
        }
        self.bound = false;
    }

    fn responsive_accordion<H: Host + ?Sized>(&self, host: &H) -> bool {
        match &self.options.breakpoint {
            Some(bp) if self.options.responsive == ResponsiveAction::Accordion => {
                host.matches_media(&bp.media_query())
            }
            _ => false,
        }
    }

    // ===== Requests =====

    /// Show a panel by identifier or index. Unknown targets are ignored.
    pub fn show<H: Host + ?Sized>(&mut self, host: &mut H, target: &Target) {
        let Some(index) = self.registry.resolve(target) else {
            tracing::debug!("{}: no panel for {:?}", self.id, target);
            return;
        };
        if self.accordion {
            if !self.expanded[index] {
                self.toggle(host, index);
            }
        } else {
            self.activate(host, index);
        }
    }

    pub fn next<H: Host + ?Sized>(&mut self, host: &mut H) {
        self.step(host, 1);
    }

    pub fn prev<H: Host + ?Sized>(&mut self, host: &mut H) {
        let len = self.registry.len();
        self.step(host, len.saturating_sub(1));
    }

    fn step<H: Host + ?Sized>(&mut self, host: &mut H, offset: usize) {
        let len = self.registry.len();
        if len == 0 {
            return;
        }
        let current = if self.accordion { self.active } else { self.shown };
        let target = current.map_or(0, |i| (i + offset) % len);
        self.show(host, &Target::Index(target));
    }

    /// Tabs: make `index` the only visible panel
    pub(crate) fn activate<H: Host + ?Sized>(&mut self, host: &mut H, index: usize) {
        if !self.enabled || self.accordion || index >= self.registry.len() {
            return;
        }
        if self.shown == Some(index) {
            return;
        }
        let token = self.tokens.mint();
        self.shown = Some(index);
        tracing::debug!("{}: activate {} ({})", self.id, index, token);
        self.switch_tabs(host, index, token);
    }

    /// Accordion: expand or collapse `index`
    pub(crate) fn toggle<H: Host + ?Sized>(&mut self, host: &mut H, index: usize) {
        if !self.enabled || !self.accordion || index >= self.registry.len() {
            return;
        }
        let token = self.tokens.mint();
        if self.expanded[index] {
            self.collapse(host, index, token);
            return;
        }
        if !self.options.accordion_multiple {
            for other in 0..self.registry.len() {
                if other != index && self.expanded[other] {
                    self.collapse(host, other, token);
                }
            }
        }
        self.expand(host, index, token);
    }

    /// Route an input on `node` (a trigger or one of its descendants).
    /// Returns whether the input was consumed.
    pub fn handle_input<H: Host + ?Sized>(&mut self, host: &mut H, node: NodeId, input: Input) -> bool {
        if !self.enabled || !self.bound {
            return false;
        }
        let Some(index) = self.trigger_for(host, node) else {
            return false;
        };

        match input {
            Input::Click => self.press(host, index),
            Input::Hover => {
                if self.accordion || self.options.mode != TriggerMode::Hover {
                    return false;
                }
                self.activate(host, index);
            }
            Input::Key(key) => match RovingTabIndex::new(self.registry.len()).resolve(key, index) {
                Some(KeyAction::Move(target)) => {
                    if let Some(trigger) = self.trigger(target) {
                        host.focus(trigger);
                    }
                    if !self.accordion {
                        self.activate(host, target);
                    }
                }
                Some(KeyAction::Activate) => self.press(host, index),
                None => return false,
            },
        }
        self.restart_autoplay(host);
        true
    }

    fn press<H: Host + ?Sized>(&mut self, host: &mut H, index: usize) {
        if self.accordion {
            self.toggle(host, index);
        } else {
            self.activate(host, index);
        }
    }

    fn trigger_for<H: Host + ?Sized>(&self, host: &H, node: NodeId) -> Option<usize> {
        let mut cur = Some(node);
        while let Some(n) = cur {
            if let Some(i) = self.registry.index_of_trigger(n) {
                return Some(i);
            }
            if n == self.container {
                return None;
            }
            cur = host.parent(n);
        }
        None
    }

    /// Merge an options patch and react to what changed
    pub fn set_options<H: Host + ?Sized>(&mut self, host: &mut H, patch: PartialOptions) {
        let before = self.options.clone();
        self.options.merge(patch);
        let regated = self.options.breakpoint != before.breakpoint || self.options.responsive != before.responsive;

        if !self.enabled {
            // A gated instance may come up under the new breakpoint
            if regated {
                self.evaluate_responsive(host);
            }
            return;
        }
        if self.options.mode != before.mode {
            self.unbind(host);
            self.bind(host);
        }
        if self.options.autoplay_delay != before.autoplay_delay {
            self.start_autoplay(host);
        }
        if self.accordion && before.accordion_multiple && !self.options.accordion_multiple {
            self.collapse_extras(host);
        }
        if regated {
            self.evaluate_responsive(host);
        }
    }

    /// Leaving multi-expand: keep only the active (or first) expanded panel
    fn collapse_extras<H: Host + ?Sized>(&mut self, host: &mut H) {
        let keep = self
            .active
            .filter(|&i| self.expanded[i])
            .or_else(|| self.expanded.iter().position(|&e| e));
        let Some(keep) = keep else {
            return;
        };
        let token = self.tokens.mint();
        for i in 0..self.registry.len() {
            if i != keep && self.expanded[i] {
                self.collapse(host, i, token);
            }
        }
    }

    pub(crate) fn on_wake<H: Host + ?Sized>(&mut self, host: &mut H, kind: WakeKind) {
        match kind {
            WakeKind::AutoplayTick => self.autoplay_tick(host),
            WakeKind::Job { job, cause } => self.resume_job(host, job, cause),
        }
    }

    // ===== Instant rendering =====

    /// Show `index`, hide everything else, no animation, no notification
    pub(crate) fn render_tabs_instant<H: Host + ?Sized>(&mut self, host: &mut H, index: usize) {
        self.tokens.mint();
        self.finish_all_jobs(host);
        for i in 0..self.registry.len() {
            if i == index {
                self.show_now(host, i);
            } else {
                self.hide_now(host, i);
            }
            self.sync_panel_aria(host, i, i == index);
        }
        self.shown = Some(index);
        self.active = Some(index);
        self.sync_tab_triggers(host);
        if let Some(panel) = self.panel(index) {
            effects::panel_shown(host, panel);
        }
    }

    pub(crate) fn show_now<H: Host + ?Sized>(&self, host: &mut H, index: usize) {
        let Some(panel) = self.panel(index) else {
            return;
        };
        host.remove_style(panel, "display");
        host.remove_style(panel, "opacity");
        host.add_class(panel, markers::VISIBLE_CLASS);
    }

    pub(crate) fn hide_now<H: Host + ?Sized>(&self, host: &mut H, index: usize) {
        let Some(panel) = self.panel(index) else {
            return;
        };
        host.set_style(panel, "display", "none");
        host.remove_style(panel, "opacity");
        host.remove_class(panel, markers::VISIBLE_CLASS);
        effects::panel_hidden(host, panel);
    }

    // ===== ARIA =====

    /// Trigger classes and `aria-selected` follow `active`
    pub(crate) fn sync_tab_triggers<H: Host + ?Sized>(&mut self, host: &mut H) {
        for i in 0..self.registry.len() {
            let Some(trigger) = self.trigger(i) else {
                continue;
            };
            let selected = self.active == Some(i);
            if selected {
                host.add_class(trigger, markers::ACTIVE_CLASS);
            } else {
                host.remove_class(trigger, markers::ACTIVE_CLASS);
            }
            let panel_id = self.dom_ids.get(i).map(|d| d.panel.clone());
            self.aria
                .apply(host, trigger, &AriaAttributes::tab(selected, panel_id.as_deref()));
        }
    }

    pub(crate) fn sync_header<H: Host + ?Sized>(&mut self, host: &mut H, index: usize) {
        let Some(trigger) = self.trigger(index) else {
            return;
        };
        let panel_id = self.dom_ids.get(index).map(|d| d.panel.clone());
        let attrs = AriaAttributes::accordion_header(self.expanded[index], panel_id.as_deref());
        self.aria.apply(host, trigger, &attrs);
    }

    pub(crate) fn sync_panel_aria<H: Host + ?Sized>(&mut self, host: &mut H, index: usize, visible: bool) {
        let Some(panel) = self.panel(index) else {
            return;
        };
        let trigger_id = self.dom_ids.get(index).map(|d| d.trigger.clone());
        let attrs = if self.accordion {
            AriaAttributes::accordion_panel(visible, trigger_id.as_deref())
        } else {
            AriaAttributes::tab_panel(visible, trigger_id.as_deref())
        };
        self.aria.apply(host, panel, &attrs);
    }

    // ===== Notifications =====

    pub(crate) fn emit_expanded(&mut self, index: usize) {
        if let Some(e) = self.entry(index).cloned() {
            self.events.push(Event::PanelExpanded {
                instance: self.id,
                id: e.id,
                trigger: e.trigger,
                panel: e.panel,
            });
        }
    }

    pub(crate) fn emit_collapsed(&mut self, index: usize) {
        if let Some(e) = self.entry(index).cloned() {
            self.events.push(Event::PanelCollapsed {
                instance: self.id,
                id: e.id,
                trigger: e.trigger,
                panel: e.panel,
            });
        }
    }

    pub(crate) fn emit_changed(&mut self, index: usize) {
        if let Some(e) = self.entry(index).cloned() {
            self.events.push(Event::TabChanged {
                instance: self.id,
                id: e.id,
                trigger: e.trigger,
                panel: e.panel,
            });
        }
    }
}
