//! Mode controller
//!
//! Switches an instance between tabs and accordion. Entering accordion mode
//! moves each panel into a slot next to its trigger; leaving it puts every
//! panel back exactly where it came from.

use std::collections::HashSet;

use tabset_a11y::AriaAttributes;
use tabset_dom::NodeId;

use crate::config::ResponsiveAction;
use crate::effects;
use crate::host::{Dom, Host};
use crate::instance::Instance;
use crate::markers;
use crate::registry::owning_container;

/// Where a relocated panel came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Relocation {
    pub panel: usize,
    pub node: NodeId,
    pub origin_parent: NodeId,
    pub origin_next: Option<NodeId>,
    pub slot: NodeId,
    pub auto: bool,
}

impl Instance {
    /// Switch to accordion (`true`) or tabs (`false`). Only while enabled.
    pub fn set_accordion<H: Host + ?Sized>(&mut self, host: &mut H, on: bool) {
        if !self.enabled || on == self.accordion {
            return;
        }
        if on {
            let initial = self
                .shown
                .or(self.active)
                .unwrap_or_else(|| self.initial_index(host));
            self.enter_accordion(host, initial);
        } else {
            self.leave_accordion(host);
        }
    }

    pub(crate) fn enter_accordion<H: Host + ?Sized>(&mut self, host: &mut H, initial: usize) {
        let token = self.tokens.mint();
        self.finish_all_jobs(host);
        self.stop_autoplay(host);

        self.accordion = true;
        host.add_class(self.container, markers::ACCORDION_CLASS);
        self.relocate_panels(host);
        self.apply_tab_list_role(host, Instance::presentation());

        for i in 0..self.registry.len() {
            let open = i == initial;
            self.expanded[i] = open;
            self.panel_tokens[i] = token;
            let (Some(trigger), Some(panel)) = (self.trigger(i), self.panel(i)) else {
                continue;
            };
            host.remove_style(panel, "opacity");
            host.remove_class(panel, markers::VISIBLE_CLASS);
            self.aria.remove(host, trigger, "aria-selected");
            self.aria.remove(host, panel, "tabindex");
            if open {
                host.remove_style(panel, "display");
                host.add_class(panel, markers::OPEN_CLASS);
                host.add_class(trigger, markers::ACTIVE_CLASS);
            } else {
                host.set_style(panel, "display", "none");
                host.remove_class(panel, markers::OPEN_CLASS);
                host.remove_class(trigger, markers::ACTIVE_CLASS);
                effects::panel_hidden(host, panel);
            }
            self.sync_header(host, i);
            self.sync_panel_aria(host, i, open);
        }
        self.active = Some(initial);
        self.shown = None;
        if let Some(panel) = self.panel(initial) {
            effects::panel_shown(host, panel);
        }
        tracing::info!("{} switched to accordion", self.id);
    }

    fn leave_accordion<H: Host + ?Sized>(&mut self, host: &mut H) {
        let pick = self
            .expanded
            .iter()
            .position(|&e| e)
            .or(self.active)
            .unwrap_or_else(|| self.initial_index(host));

        self.tokens.mint();
        self.finish_all_jobs(host);
        self.restore_origins(host);
        self.accordion = false;
        host.remove_class(self.container, markers::ACCORDION_CLASS);

        for i in 0..self.registry.len() {
            if let Some(panel) = self.panel(i) {
                host.remove_style(panel, "height");
                host.remove_style(panel, "overflow");
                host.remove_class(panel, markers::OPEN_CLASS);
            }
            if let Some(trigger) = self.trigger(i) {
                self.aria.remove(host, trigger, "aria-expanded");
            }
        }
        self.expanded.iter_mut().for_each(|e| *e = false);
        self.apply_tab_list_role(host, AriaAttributes::tab_list());
        self.render_tabs_instant(host, pick);
        self.start_autoplay(host);
        tracing::info!("{} switched to tabs", self.id);
    }

    /// Move panels not yet in a slot into one. Panels that were moved out
    /// of their slot go back in.
    pub fn sync_accordion_slots<H: Host + ?Sized>(&mut self, host: &mut H) {
        if !self.accordion {
            return;
        }
        for r in &self.relocations {
            if host.parent(r.node) != Some(r.slot) && host.contains(self.container, r.slot) {
                tracing::debug!("{}: panel {} back into its slot", self.id, r.panel);
                host.insert_before(r.slot, r.node, None);
            }
        }
        let before = self.relocations.len();
        self.relocate_panels(host);
        for r in self.relocations[before..].to_vec() {
            let open = self.expanded.get(r.panel).copied().unwrap_or(false);
            if !open {
                host.set_style(r.node, "display", "none");
            }
            self.sync_header(host, r.panel);
            self.sync_panel_aria(host, r.panel, open);
        }
    }

    fn relocate_panels<H: Host + ?Sized>(&mut self, host: &mut H) {
        let pending: Vec<usize> = (0..self.registry.len())
            .filter(|&i| !self.relocations.iter().any(|r| r.panel == i))
            .collect();
        if pending.is_empty() {
            return;
        }

        for (index, slot, auto) in self.resolve_slots(host, &pending) {
            let Some(node) = self.panel(index) else {
                continue;
            };
            let Some(origin_parent) = host.parent(node) else {
                continue;
            };
            let origin_next = host.next_sibling(node);
            host.insert_before(slot, node, None);
            self.relocations.push(Relocation {
                panel: index,
                node,
                origin_parent,
                origin_next,
                slot,
                auto,
            });
        }
        tracing::debug!("{}: {} panels in slots", self.id, self.relocations.len());
    }

    /// Pick a slot for every pending panel.
    ///
    /// Tagged slots and slots right after the trigger's list item are
    /// handed out first, so a loose slot never steals another panel's
    /// neighbor. Leftovers take any untagged slot or get a synthesized one.
    fn resolve_slots<H: Host + ?Sized>(&self, host: &mut H, pending: &[usize]) -> Vec<(usize, NodeId, bool)> {
        let slots: Vec<NodeId> = host
            .query_attribute(self.container, markers::SLOT)
            .into_iter()
            .filter(|&s| owning_container(host, s) == Some(self.container))
            .filter(|&s| !self.registry.iter().any(|e| host.contains(e.panel, s)))
            .collect();

        let mut used: HashSet<NodeId> = self.relocations.iter().map(|r| r.slot).collect();
        let mut chosen: Vec<Option<(NodeId, bool)>> = vec![None; pending.len()];

        // Tagged with the panel identifier
        for (k, &i) in pending.iter().enumerate() {
            let Some(entry) = self.entry(i) else {
                continue;
            };
            if let Some(&slot) = slots
                .iter()
                .find(|&&s| !used.contains(&s) && slot_tag(host, s) == entry.id)
            {
                used.insert(slot);
                chosen[k] = Some((slot, false));
            }
        }

        // Untagged, right after the trigger's list item
        for (k, &i) in pending.iter().enumerate() {
            if chosen[k].is_some() {
                continue;
            }
            let Some(trigger) = self.trigger(i) else {
                continue;
            };
            let anchor = self.list_item_of(host, trigger).unwrap_or(trigger);
            let adjacent = host
                .next_element_sibling(anchor)
                .filter(|s| slots.contains(s) && !used.contains(s) && slot_tag(host, *s).is_empty());
            if let Some(slot) = adjacent {
                used.insert(slot);
                chosen[k] = Some((slot, false));
            }
        }

        let mut out = Vec::with_capacity(pending.len());
        for (k, &i) in pending.iter().enumerate() {
            let picked = match chosen[k] {
                Some(picked) => Some(picked),
                None => slots
                    .iter()
                    .find(|&&s| !used.contains(&s) && slot_tag(host, s).is_empty())
                    .map(|&s| (s, false)),
            };
            let (slot, auto) = match picked {
                Some(picked) => picked,
                None => {
                    let (Some(entry), Some(trigger)) = (self.entry(i), self.trigger(i)) else {
                        continue;
                    };
                    let slot = host.create_element("div");
                    host.set_attribute(slot, markers::SLOT, &entry.id);
                    host.set_attribute(slot, markers::SLOT_AUTO, "");
                    host.insert_after(trigger, slot);
                    (slot, true)
                }
            };
            used.insert(slot);
            out.push((i, slot, auto));
        }
        out
    }

    /// Closest `<li>` around the trigger, inside this container
    fn list_item_of<H: Host + ?Sized>(&self, host: &H, trigger: NodeId) -> Option<NodeId> {
        let mut cur = Some(trigger);
        while let Some(n) = cur {
            if n == self.container {
                return None;
            }
            if host.tag_name(n).is_some_and(|t| t.eq_ignore_ascii_case("li")) {
                return Some(n);
            }
            cur = host.parent(n);
        }
        None
    }

    /// Put relocated panels back, newest first, and drop synthesized slots
    pub(crate) fn restore_origins<H: Host + ?Sized>(&mut self, host: &mut H) {
        let mut auto_slots = Vec::new();
        for r in self.relocations.drain(..).rev() {
            let next = r.origin_next.filter(|&n| host.parent(n) == Some(r.origin_parent));
            host.insert_before(r.origin_parent, r.node, next);
            if r.auto {
                auto_slots.push(r.slot);
            }
        }
        for slot in auto_slots {
            host.remove(slot);
        }
    }

    /// Apply the breakpoint to mode or enablement
    pub fn evaluate_responsive<H: Host + ?Sized>(&mut self, host: &mut H) {
        let Some(breakpoint) = &self.options.breakpoint else {
            return;
        };
        let matches = host.matches_media(&breakpoint.media_query());
        match self.options.responsive {
            ResponsiveAction::Accordion => self.set_accordion(host, matches),
            ResponsiveAction::Enable => {
                if matches {
                    self.enable(host);
                } else {
                    self.disable(host);
                }
            }
        }
    }
}

/// Panel identifier a slot is reserved for; empty when untagged
fn slot_tag<D: Dom + ?Sized>(dom: &D, slot: NodeId) -> String {
    dom.attribute(slot, markers::SLOT).unwrap_or_default().trim().to_string()
}
