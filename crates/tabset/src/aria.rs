//! ARIA bookkeeping
//!
//! Writes role/state attributes and remembers what the markup held before,
//! so disabling the widget hands back the author's markup untouched.

use std::collections::HashMap;

use tabset_a11y::AriaAttributes;
use tabset_dom::NodeId;

use crate::host::Dom;

#[derive(Debug, Default)]
pub(crate) struct AriaLedger {
    /// First-seen value of every attribute the widget overwrote
    originals: HashMap<(NodeId, &'static str), Option<String>>,
    /// Elements that received a generated `id`
    generated_ids: Vec<NodeId>,
}

impl AriaLedger {
    pub fn apply<D: Dom + ?Sized>(&mut self, dom: &mut D, node: NodeId, attrs: &AriaAttributes) {
        for (name, value) in attrs.to_attributes() {
            self.originals
                .entry((node, name))
                .or_insert_with(|| dom.attribute(node, name));
            dom.set_attribute(node, name, &value);
        }
    }

    /// Drop an attribute the other mode wrote
    pub fn remove<D: Dom + ?Sized>(&mut self, dom: &mut D, node: NodeId, name: &'static str) {
        self.originals
            .entry((node, name))
            .or_insert_with(|| dom.attribute(node, name));
        dom.remove_attribute(node, name);
    }

    /// The element's DOM id, generating one when the markup has none
    pub fn ensure_id<D: Dom + ?Sized>(&mut self, dom: &mut D, node: NodeId, generated: impl FnOnce() -> String) -> String {
        if let Some(id) = dom.attribute(node, "id").filter(|id| !id.trim().is_empty()) {
            return id;
        }
        let id = generated();
        dom.set_attribute(node, "id", &id);
        self.generated_ids.push(node);
        id
    }

    /// Put every touched attribute back the way the markup had it
    pub fn restore<D: Dom + ?Sized>(&mut self, dom: &mut D) {
        for ((node, name), original) in self.originals.drain() {
            match original {
                Some(value) => dom.set_attribute(node, name, &value),
                None => dom.remove_attribute(node, name),
            }
        }
        for node in self.generated_ids.drain(..) {
            dom.remove_attribute(node, "id");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimHost;

    #[test]
    fn test_restore_puts_markup_back() {
        let mut host = SimHost::default();
        let root = host.tree().root();
        let tab = host.tree_mut().create_element("button");
        host.tree_mut().append_child(root, tab).unwrap();
        host.tree_mut().set_attribute(tab, "role", "link").unwrap();
        host.tree_mut().set_attribute(tab, "aria-expanded", "false").unwrap();

        let mut ledger = AriaLedger::default();
        let id = ledger.ensure_id(&mut host, tab, || "gen-1".to_string());
        assert_eq!(id, "gen-1");
        ledger.apply(&mut host, tab, &AriaAttributes::tab(true, Some("panel")));
        ledger.apply(&mut host, tab, &AriaAttributes::tab(false, Some("panel")));
        ledger.remove(&mut host, tab, "aria-expanded");

        assert_eq!(host.tree().get_attribute(tab, "role"), Some("tab"));
        assert_eq!(host.tree().get_attribute(tab, "aria-selected"), Some("false"));
        assert!(!host.tree().has_attribute(tab, "aria-expanded"));

        ledger.restore(&mut host);
        assert_eq!(host.tree().get_attribute(tab, "role"), Some("link"));
        assert_eq!(host.tree().get_attribute(tab, "aria-expanded"), Some("false"));
        assert!(!host.tree().has_attribute(tab, "aria-selected"));
        assert!(!host.tree().has_attribute(tab, "tabindex"));
        assert!(!host.tree().has_attribute(tab, "id"));
    }

    #[test]
    fn test_existing_id_is_kept() {
        let mut host = SimHost::default();
        let node = host.tree_mut().create_element("div");
        host.tree_mut().set_attribute(node, "id", "mine").unwrap();

        let mut ledger = AriaLedger::default();
        assert_eq!(ledger.ensure_id(&mut host, node, || "other".into()), "mine");
        ledger.restore(&mut host);
        assert_eq!(host.tree().get_attribute(node, "id"), Some("mine"));
    }
}
