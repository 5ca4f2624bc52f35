//! Transition engine
//!
//! Every animated show/hide is a [`Job`] with explicit phases:
//!
//! ```text
//! Prepare ──frame──▶ Commit ──▶ AwaitSettle ──transition-end | timeout──▶ Finalize
//! ```
//!
//! Jobs are resumed by [`Wake`] messages. Settling runs exactly once: the
//! first completion source wins and the other is cancelled. Finalization
//! (active marking, notifications, side effects) only happens when the job's
//! token is still current; a superseded job still cleans up its styling.

use std::collections::BTreeMap;

use tabset_dom::NodeId;

use crate::config::TriggerMode;
use crate::effects;
use crate::host::{Cause, Dom, Host, JobId, ListenerId, TimerId, Wake};
use crate::instance::Instance;
use crate::markers;
use crate::registry::owning_container;
use crate::token::Token;

/// Stacking styles applied to both crossfade panels
const OVERLAY: &[(&str, &str)] = &[
    ("position", "absolute"),
    ("top", "0"),
    ("left", "0"),
    ("width", "100%"),
    ("pointer-events", "none"),
];

/// How a tab switch is animated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Instant,
    Sequential,
    Crossfade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Prepare,
    Commit,
    AwaitSettle,
    Finalize,
}

#[derive(Debug, Clone)]
pub(crate) enum JobKind {
    /// Fade a tab panel out, then optionally fade `then` in
    FadeOut { then: Option<usize> },
    FadeIn,
    /// `panel` is the outgoing side
    Crossfade {
        incoming: usize,
        wrapper: NodeId,
        position: Option<String>,
        height: Option<String>,
    },
    Expand,
    Collapse,
}

#[derive(Debug)]
pub(crate) struct Job {
    pub id: JobId,
    pub panel: usize,
    pub token: Token,
    pub kind: JobKind,
    pub phase: Phase,
    pub timer: Option<TimerId>,
    pub listener: Option<ListenerId>,
    pub finished: bool,
}

impl Job {
    fn new(id: JobId, panel: usize, token: Token, kind: JobKind) -> Self {
        Self {
            id,
            panel,
            token,
            kind,
            phase: Phase::Prepare,
            timer: None,
            listener: None,
            finished: false,
        }
    }

    /// Panels this job owns
    fn claims(&self, panel: usize) -> bool {
        match self.kind {
            JobKind::Crossfade { incoming, .. } => self.panel == panel || incoming == panel,
            JobKind::FadeOut { then: Some(next) } => self.panel == panel || next == panel,
            _ => self.panel == panel,
        }
    }
}

/// In-flight jobs of one instance
#[derive(Debug, Default)]
pub(crate) struct Jobs {
    next: u64,
    live: BTreeMap<JobId, Job>,
}

impl Jobs {
    fn next_id(&mut self) -> JobId {
        self.next += 1;
        JobId(self.next)
    }

    fn insert(&mut self, job: Job) {
        self.live.insert(job.id, job);
    }

    fn take(&mut self, id: JobId) -> Option<Job> {
        self.live.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    fn ids(&self) -> Vec<JobId> {
        self.live.keys().copied().collect()
    }

    fn claimants(&self, panel: usize) -> Vec<JobId> {
        self.live.values().filter(|j| j.claims(panel)).map(|j| j.id).collect()
    }
}

fn px(value: f32) -> String {
    format!("{value}px")
}

/// Whether the widget left `node` displayed. Hidden ancestors do not count.
pub(crate) fn displayed<D: Dom + ?Sized>(dom: &D, node: NodeId) -> bool {
    dom.style(node, "display").is_none_or(|v| v.trim() != "none")
}

impl Instance {
    pub(crate) fn strategy<H: Host + ?Sized>(&self, host: &H, outgoing: usize) -> Strategy {
        if host.prefers_reduced_motion() {
            Strategy::Instant
        } else if self.options.mode == TriggerMode::Hover && !self.options.crossfade {
            // Sweeping the pointer across triggers must not flicker
            Strategy::Instant
        } else if self.options.crossfade && outgoing > 0 {
            Strategy::Crossfade
        } else {
            Strategy::Sequential
        }
    }

    // ===== Tabs =====

    /// Hide whatever the widget has displayed and bring in `to`
    pub(crate) fn switch_tabs<H: Host + ?Sized>(&mut self, host: &mut H, to: usize, token: Token) {
        // A tab request claims every panel
        self.finish_all_jobs(host);

        let Some(incoming) = self.panel(to) else {
            return;
        };
        let outgoing: Vec<usize> = (0..self.registry.len())
            .filter(|&i| i != to && self.panel(i).is_some_and(|p| displayed(host, p)))
            .collect();

        if outgoing.is_empty() && displayed(host, incoming) {
            // Already on screen, only the bookkeeping is behind
            self.show_now(host, to);
            self.sync_panel_aria(host, to, true);
            self.settle_tab(host, to, token);
            return;
        }

        match self.strategy(host, outgoing.len()) {
            Strategy::Instant => {
                for &i in &outgoing {
                    self.hide_now(host, i);
                    self.sync_panel_aria(host, i, false);
                }
                self.show_now(host, to);
                self.sync_panel_aria(host, to, true);
                self.settle_tab(host, to, token);
            }
            Strategy::Crossfade => {
                for &i in &outgoing[1..] {
                    self.hide_now(host, i);
                    self.sync_panel_aria(host, i, false);
                }
                self.start_crossfade(host, outgoing[0], to, token);
            }
            Strategy::Sequential => match outgoing.split_first() {
                None => self.start_fade_in(host, to, token),
                Some((&first, rest)) => {
                    for &i in rest {
                        self.hide_now(host, i);
                        self.sync_panel_aria(host, i, false);
                    }
                    self.start_fade_out(host, first, Some(to), token);
                }
            },
        }
    }

    fn start_fade_out<H: Host + ?Sized>(&mut self, host: &mut H, index: usize, then: Option<usize>, token: Token) {
        let Some(node) = self.panel(index) else {
            return;
        };
        host.remove_class(node, markers::VISIBLE_CLASS);
        host.set_style(node, "opacity", "0");
        self.sync_panel_aria(host, index, false);
        effects::panel_hidden(host, node);

        let id = self.jobs.next_id();
        let mut job = Job::new(id, index, token, JobKind::FadeOut { then });
        self.await_settle(host, &mut job, node, "opacity", self.options.transition_duration);
        tracing::debug!("{}: fade out {} ({})", self.id, index, token);
        self.jobs.insert(job);
    }

    fn start_fade_in<H: Host + ?Sized>(&mut self, host: &mut H, index: usize, token: Token) {
        let Some(node) = self.panel(index) else {
            return;
        };
        host.remove_style(node, "display");
        host.set_style(node, "opacity", "0");
        self.sync_panel_aria(host, index, true);

        let id = self.jobs.next_id();
        let mut job = Job::new(id, index, token, JobKind::FadeIn);
        job.phase = Phase::Commit;
        host.request_frame(Wake::job(self.id, id, Cause::Frame));
        tracing::debug!("{}: fade in {} ({})", self.id, index, token);
        self.jobs.insert(job);
    }

    fn start_crossfade<H: Host + ?Sized>(&mut self, host: &mut H, from: usize, to: usize, token: Token) {
        let (Some(outgoing), Some(incoming)) = (self.panel(from), self.panel(to)) else {
            return;
        };
        let wrapper = self.wrapper_for(host, incoming);
        let position = host.style(wrapper, "position");
        let height = host.style(wrapper, "height");

        host.remove_style(incoming, "display");
        host.set_style(incoming, "opacity", "0");
        let tallest = host.offset_height(outgoing).max(host.offset_height(incoming));

        if position.is_none() {
            host.set_style(wrapper, "position", "relative");
        }
        host.set_style(wrapper, "height", &px(tallest));
        for node in [outgoing, incoming] {
            for (prop, value) in OVERLAY {
                host.set_style(node, prop, value);
            }
        }
        self.sync_panel_aria(host, to, true);

        let id = self.jobs.next_id();
        let kind = JobKind::Crossfade {
            incoming: to,
            wrapper,
            position,
            height,
        };
        let mut job = Job::new(id, from, token, kind);
        job.phase = Phase::Commit;
        host.request_frame(Wake::job(self.id, id, Cause::Frame));
        tracing::debug!("{}: crossfade {} -> {} ({})", self.id, from, to, token);
        self.jobs.insert(job);
    }

    /// The marked wrapper, else the incoming panel's parent
    fn wrapper_for<H: Host + ?Sized>(&self, host: &H, panel: NodeId) -> NodeId {
        host.query_attribute(self.container, markers::WRAPPER)
            .into_iter()
            .find(|&n| owning_container(host, n) == Some(self.container))
            .or_else(|| host.parent(panel))
            .unwrap_or(self.container)
    }

    /// A tab switch completed: mark active, notify, run side effects
    fn settle_tab<H: Host + ?Sized>(&mut self, host: &mut H, index: usize, token: Token) {
        if !self.tokens.is_current(token) {
            tracing::debug!("{}: stale tab completion {} suppressed", self.id, token);
            return;
        }
        self.active = Some(index);
        self.sync_tab_triggers(host);
        self.emit_expanded(index);
        self.emit_changed(index);
        if let Some(panel) = self.panel(index) {
            effects::panel_shown(host, panel);
        }
    }

    // ===== Accordion =====

    pub(crate) fn expand<H: Host + ?Sized>(&mut self, host: &mut H, index: usize, token: Token) {
        let Some(node) = self.panel(index) else {
            return;
        };
        self.expanded[index] = true;
        self.panel_tokens[index] = token;
        self.finish_claims(host, index);
        self.sync_header(host, index);
        self.sync_panel_aria(host, index, true);

        if host.prefers_reduced_motion() {
            host.remove_style(node, "display");
            host.add_class(node, markers::OPEN_CLASS);
            self.settle_expand(host, index, token);
            return;
        }

        let open = displayed(host, node);
        let start = if open { host.offset_height(node) } else { 0.0 };
        host.set_style(node, "overflow", "hidden");
        host.set_style(node, "height", &px(start));
        if !open {
            host.set_style(node, "opacity", "0");
        }
        host.remove_style(node, "display");
        host.add_class(node, markers::OPEN_CLASS);

        let id = self.jobs.next_id();
        let mut job = Job::new(id, index, token, JobKind::Expand);
        job.phase = Phase::Commit;
        host.request_frame(Wake::job(self.id, id, Cause::Frame));
        tracing::debug!("{}: expand {} ({})", self.id, index, token);
        self.jobs.insert(job);
    }

    pub(crate) fn collapse<H: Host + ?Sized>(&mut self, host: &mut H, index: usize, token: Token) {
        let (Some(node), Some(trigger)) = (self.panel(index), self.trigger(index)) else {
            return;
        };
        self.expanded[index] = false;
        self.panel_tokens[index] = token;
        if self.active == Some(index) {
            self.active = None;
        }
        self.finish_claims(host, index);
        host.remove_class(trigger, markers::ACTIVE_CLASS);
        self.sync_header(host, index);
        self.sync_panel_aria(host, index, false);
        effects::panel_hidden(host, node);

        if host.prefers_reduced_motion() || !displayed(host, node) {
            host.set_style(node, "display", "none");
            host.remove_class(node, markers::OPEN_CLASS);
            self.settle_collapse(index, token);
            return;
        }

        let start = host.offset_height(node);
        host.set_style(node, "overflow", "hidden");
        host.set_style(node, "height", &px(start));

        let id = self.jobs.next_id();
        let mut job = Job::new(id, index, token, JobKind::Collapse);
        job.phase = Phase::Commit;
        host.request_frame(Wake::job(self.id, id, Cause::Frame));
        tracing::debug!("{}: collapse {} ({})", self.id, index, token);
        self.jobs.insert(job);
    }

    fn settle_expand<H: Host + ?Sized>(&mut self, host: &mut H, index: usize, token: Token) {
        if self.panel_tokens.get(index) != Some(&token) {
            tracing::debug!("{}: stale expand {} suppressed", self.id, token);
            return;
        }
        let (Some(trigger), Some(panel)) = (self.trigger(index), self.panel(index)) else {
            return;
        };
        self.active = Some(index);
        host.add_class(trigger, markers::ACTIVE_CLASS);
        self.emit_expanded(index);
        effects::panel_shown(host, panel);
    }

    fn settle_collapse(&mut self, index: usize, token: Token) {
        if self.panel_tokens.get(index) != Some(&token) {
            tracing::debug!("{}: stale collapse {} suppressed", self.id, token);
            return;
        }
        self.emit_collapsed(index);
    }

    // ===== Job plumbing =====

    /// Arm both completion sources for `property` on `node`
    fn await_settle<H: Host + ?Sized>(&self, host: &mut H, job: &mut Job, node: NodeId, property: &str, fallback_ms: u64) {
        job.listener = Some(host.on_transition_end(node, property, Wake::job(self.id, job.id, Cause::TransitionEnd)));
        job.timer = Some(host.set_timeout(fallback_ms, Wake::job(self.id, job.id, Cause::Timeout)));
        job.phase = Phase::AwaitSettle;
    }

    /// Cancel whichever completion sources are still armed
    fn release<H: Host + ?Sized>(host: &mut H, job: &mut Job) {
        if let Some(timer) = job.timer.take() {
            host.clear_timer(timer);
        }
        if let Some(listener) = job.listener.take() {
            host.remove_listener(listener);
        }
    }

    pub(crate) fn resume_job<H: Host + ?Sized>(&mut self, host: &mut H, id: JobId, cause: Cause) {
        // Finished or fast-finished jobs are gone; late wakes land here
        let Some(mut job) = self.jobs.take(id) else {
            return;
        };

        match (job.phase, cause) {
            (Phase::Commit, Cause::Frame) => {
                if self.commit(host, &mut job) {
                    self.jobs.insert(job);
                }
            }
            (Phase::AwaitSettle, Cause::Timeout | Cause::TransitionEnd) => {
                tracing::debug!("{}: job {:?} settled by {:?}", self.id, job.id, cause);
                self.settle(host, job);
            }
            _ => self.jobs.insert(job),
        }
    }

    /// The deferred frame arrived. Returns whether the job continues.
    fn commit<H: Host + ?Sized>(&mut self, host: &mut H, job: &mut Job) -> bool {
        let Some(node) = self.panel(job.panel) else {
            return false;
        };
        match job.kind {
            JobKind::FadeIn => {
                host.remove_style(node, "opacity");
                host.add_class(node, markers::VISIBLE_CLASS);
                job.finished = true;
                job.phase = Phase::Finalize;
                self.settle_tab(host, job.panel, job.token);
                false
            }
            JobKind::Crossfade { incoming, .. } => {
                if let Some(incoming) = self.panel(incoming) {
                    host.remove_style(incoming, "opacity");
                    host.add_class(incoming, markers::VISIBLE_CLASS);
                }
                host.remove_class(node, markers::VISIBLE_CLASS);
                host.set_style(node, "opacity", "0");
                self.sync_panel_aria(host, job.panel, false);
                effects::panel_hidden(host, node);
                self.await_settle(host, job, node, "opacity", self.options.transition_duration);
                true
            }
            JobKind::Expand => {
                let target = host.scroll_height(node);
                host.set_style(node, "height", &px(target));
                host.set_style(node, "opacity", "1");
                self.await_settle(host, job, node, "height", self.options.accordion_duration);
                true
            }
            JobKind::Collapse => {
                host.set_style(node, "height", "0px");
                host.set_style(node, "opacity", "0");
                self.await_settle(host, job, node, "height", self.options.accordion_duration);
                true
            }
            JobKind::FadeOut { .. } => true,
        }
    }

    /// Exactly-once completion
    fn settle<H: Host + ?Sized>(&mut self, host: &mut H, mut job: Job) {
        if job.finished {
            return;
        }
        job.finished = true;
        job.phase = Phase::Finalize;
        Self::release(host, &mut job);
        self.finish_visuals(host, &job);

        let current = match job.kind {
            JobKind::Expand | JobKind::Collapse => self.panel_tokens.get(job.panel) == Some(&job.token),
            _ => self.tokens.is_current(job.token),
        };
        if !current {
            tracing::debug!("{}: stale completion {} suppressed", self.id, job.token);
            return;
        }

        match job.kind {
            JobKind::FadeOut { then: Some(next) } => self.start_fade_in(host, next, job.token),
            JobKind::FadeOut { then: None } => {}
            JobKind::Crossfade { incoming, .. } => self.settle_tab(host, incoming, job.token),
            JobKind::Expand => self.settle_expand(host, job.panel, job.token),
            JobKind::Collapse => self.settle_collapse(job.panel, job.token),
            JobKind::FadeIn => {}
        }
    }

    /// End styling of a job, whether it settled or was cut short
    fn finish_visuals<H: Host + ?Sized>(&mut self, host: &mut H, job: &Job) {
        let Some(node) = self.panel(job.panel) else {
            return;
        };
        match &job.kind {
            JobKind::FadeOut { .. } => {
                host.set_style(node, "display", "none");
                host.remove_style(node, "opacity");
            }
            JobKind::FadeIn => {
                host.remove_style(node, "opacity");
                host.add_class(node, markers::VISIBLE_CLASS);
            }
            JobKind::Crossfade {
                incoming,
                wrapper,
                position,
                height,
            } => {
                if let Some(incoming) = self.panel(*incoming) {
                    host.remove_style(incoming, "opacity");
                    host.add_class(incoming, markers::VISIBLE_CLASS);
                    for (prop, _) in OVERLAY {
                        host.remove_style(incoming, prop);
                    }
                }
                if job.phase != Phase::AwaitSettle && job.phase != Phase::Finalize {
                    effects::panel_hidden(host, node);
                }
                host.set_style(node, "display", "none");
                host.remove_style(node, "opacity");
                host.remove_class(node, markers::VISIBLE_CLASS);
                for (prop, _) in OVERLAY {
                    host.remove_style(node, prop);
                }
                restore_style(host, *wrapper, "position", position.as_deref());
                restore_style(host, *wrapper, "height", height.as_deref());
                self.sync_panel_aria(host, job.panel, false);
            }
            JobKind::Expand => {
                host.remove_style(node, "height");
                host.remove_style(node, "overflow");
                host.remove_style(node, "opacity");
                host.add_class(node, markers::OPEN_CLASS);
            }
            JobKind::Collapse => {
                host.set_style(node, "display", "none");
                host.remove_style(node, "height");
                host.remove_style(node, "overflow");
                host.remove_style(node, "opacity");
                host.remove_class(node, markers::OPEN_CLASS);
            }
        }
    }

    /// Jump a job to its end state without finalizing
    fn fast_finish<H: Host + ?Sized>(&mut self, host: &mut H, id: JobId) {
        let Some(mut job) = self.jobs.take(id) else {
            return;
        };
        if job.finished {
            return;
        }
        job.finished = true;
        Self::release(host, &mut job);
        self.finish_visuals(host, &job);
        tracing::debug!("{}: fast-finished job {:?} ({})", self.id, job.id, job.token);
    }

    pub(crate) fn finish_all_jobs<H: Host + ?Sized>(&mut self, host: &mut H) {
        for id in self.jobs.ids() {
            self.fast_finish(host, id);
        }
    }

    fn finish_claims<H: Host + ?Sized>(&mut self, host: &mut H, panel: usize) {
        for id in self.jobs.claimants(panel) {
            self.fast_finish(host, id);
        }
    }
}

fn restore_style<H: Host + ?Sized>(host: &mut H, node: NodeId, prop: &str, value: Option<&str>) {
    match value {
        Some(v) => host.set_style(node, prop, v),
        None => host.remove_style(node, prop),
    }
}
