//! Trigger/Panel registry
//!
//! Scans a container for trigger and panel markers, assigns missing
//! identifiers in document order and pairs triggers with panels by
//! identifier. Elements belonging to a nested container are skipped.

use std::collections::HashSet;

use tabset_dom::NodeId;

use crate::TabsError;
use crate::host::Dom;
use crate::markers;

/// One trigger/panel pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: String,
    pub trigger: NodeId,
    pub panel: NodeId,
}

/// Lookup target for `show`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Id(String),
    Index(usize),
}

impl From<&str> for Target {
    fn from(id: &str) -> Self {
        Self::Id(id.to_string())
    }
}

impl From<String> for Target {
    fn from(id: String) -> Self {
        Self::Id(id)
    }
}

impl From<usize> for Target {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl std::str::FromStr for Target {
    type Err = std::convert::Infallible;

    /// Numbers are indices, anything else an identifier
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().parse::<usize>() {
            Ok(index) => Self::Index(index),
            Err(_) => Self::Id(s.trim().to_string()),
        })
    }
}

/// Ordered trigger/panel pairs of one instance
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: Vec<Entry>,
}

impl Registry {
    /// Scan `container`. Identifiers left blank are assigned and written
    /// back to the marker attribute so a rescan yields the same pairing.
    pub fn scan<D: Dom + ?Sized>(dom: &mut D, container: NodeId) -> Result<Self, TabsError> {
        let triggers = owned_markers(dom, container, markers::TRIGGER);
        let panels = owned_markers(dom, container, markers::PANEL);

        let trigger_ids = assign_ids(dom, &triggers, markers::TRIGGER, "trigger", &[])?;
        let panel_ids = assign_ids(dom, &panels, markers::PANEL, "panel", &trigger_ids)?;

        let mut entries = Vec::with_capacity(triggers.len());
        for (trigger, id) in triggers.iter().zip(&trigger_ids) {
            match panel_ids.iter().position(|p| p == id) {
                Some(pos) => entries.push(Entry {
                    id: id.clone(),
                    trigger: *trigger,
                    panel: panels[pos],
                }),
                None => tracing::debug!("trigger `{}` has no panel, skipped", id),
            }
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    pub fn index_of_trigger(&self, node: NodeId) -> Option<usize> {
        self.entries.iter().position(|e| e.trigger == node)
    }

    pub fn index_of_panel(&self, node: NodeId) -> Option<usize> {
        self.entries.iter().position(|e| e.panel == node)
    }

    /// Resolve an identifier or index
    pub fn resolve(&self, target: &Target) -> Option<usize> {
        match target {
            Target::Id(id) => self.index_of(id),
            Target::Index(i) => (*i < self.entries.len()).then_some(*i),
        }
    }
}

/// Marker elements whose closest container is `container`
fn owned_markers<D: Dom + ?Sized>(dom: &D, container: NodeId, marker: &str) -> Vec<NodeId> {
    dom.query_attribute(container, marker)
        .into_iter()
        .filter(|&node| owning_container(dom, node) == Some(container))
        .collect()
}

/// Closest ancestor (exclusive) carrying the container marker
pub(crate) fn owning_container<D: Dom + ?Sized>(dom: &D, node: NodeId) -> Option<NodeId> {
    let mut cur = dom.parent(node);
    while let Some(n) = cur {
        if dom.attribute(n, markers::CONTAINER).is_some() {
            return Some(n);
        }
        cur = dom.parent(n);
    }
    None
}

/// Read or assign identifiers. A blank panel identifier borrows the trigger
/// identifier at the same position; otherwise blanks become `tab-N`.
fn assign_ids<D: Dom + ?Sized>(
    dom: &mut D,
    nodes: &[NodeId],
    marker: &str,
    kind: &'static str,
    positional: &[String],
) -> Result<Vec<String>, TabsError> {
    let explicit: Vec<Option<String>> = nodes
        .iter()
        .map(|&n| {
            dom.attribute(n, marker)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        })
        .collect();

    let mut taken: HashSet<String> = HashSet::new();
    for id in explicit.iter().flatten() {
        if !taken.insert(id.clone()) {
            return Err(TabsError::DuplicateId { kind, id: id.clone() });
        }
    }

    let mut ids = Vec::with_capacity(nodes.len());
    let mut counter = 0usize;
    for (pos, (node, id)) in nodes.iter().zip(explicit).enumerate() {
        let id = match id {
            Some(id) => id,
            None => {
                let id = match positional.get(pos) {
                    Some(borrowed) if !taken.contains(borrowed) => borrowed.clone(),
                    _ => loop {
                        counter += 1;
                        let candidate = format!("tab-{counter}");
                        if !taken.contains(&candidate) {
                            break candidate;
                        }
                    },
                };
                taken.insert(id.clone());
                dom.set_attribute(*node, marker, &id);
                id
            }
        };
        ids.push(id);
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimHost;
    use tabset_dom::DomTree;

    fn el(tree: &mut DomTree, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let node = tree.create_element(tag);
        for (name, value) in attrs {
            tree.set_attribute(node, name, value).unwrap();
        }
        tree.append_child(parent, node).unwrap();
        node
    }

    #[test]
    fn test_pairs_by_identifier() {
        let mut host = SimHost::default();
        let tree = host.tree_mut();
        let root = tree.root();
        let container = el(tree, root, "div", &[("data-tabs", "")]);
        let t_a = el(tree, container, "button", &[("data-tabs-trigger", "a")]);
        let t_b = el(tree, container, "button", &[("data-tabs-trigger", "b")]);
        let p_b = el(tree, container, "div", &[("data-tabs-panel", "b")]);
        let p_a = el(tree, container, "div", &[("data-tabs-panel", "a")]);

        let registry = Registry::scan(&mut host, container).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(0).map(|e| (e.trigger, e.panel)), Some((t_a, p_a)));
        assert_eq!(registry.get(1).map(|e| (e.trigger, e.panel)), Some((t_b, p_b)));
        assert_eq!(registry.resolve(&Target::from("b")), Some(1));
        assert_eq!(registry.resolve(&Target::from(5)), None);
        assert_eq!(registry.index_of_panel(p_a), Some(0));
    }

    #[test]
    fn test_blank_ids_are_assigned_and_written_back() {
        let mut host = SimHost::default();
        let tree = host.tree_mut();
        let root = tree.root();
        let container = el(tree, root, "div", &[("data-tabs", "")]);
        let t1 = el(tree, container, "button", &[("data-tabs-trigger", "")]);
        el(tree, container, "button", &[("data-tabs-trigger", "tab-1")]);
        el(tree, container, "div", &[("data-tabs-panel", "")]);
        let p2 = el(tree, container, "div", &[("data-tabs-panel", "")]);

        let registry = Registry::scan(&mut host, container).unwrap();
        let ids: Vec<&str> = registry.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["tab-2", "tab-1"]);
        assert_eq!(host.tree().get_attribute(t1, "data-tabs-trigger"), Some("tab-2"));
        assert_eq!(host.tree().get_attribute(p2, "data-tabs-panel"), Some("tab-1"));

        // A rescan sees the written identifiers
        let again = Registry::scan(&mut host, container).unwrap();
        assert_eq!(again.iter().map(|e| e.id.clone()).collect::<Vec<_>>(), vec!["tab-2", "tab-1"]);
    }

    #[test]
    fn test_duplicate_ids_fail() {
        let mut host = SimHost::default();
        let tree = host.tree_mut();
        let root = tree.root();
        let container = el(tree, root, "div", &[("data-tabs", "")]);
        el(tree, container, "button", &[("data-tabs-trigger", "x")]);
        el(tree, container, "button", &[("data-tabs-trigger", " x ")]);

        let err = Registry::scan(&mut host, container).unwrap_err();
        assert!(matches!(err, TabsError::DuplicateId { kind: "trigger", .. }));
    }

    #[test]
    fn test_nested_containers_are_skipped() {
        let mut host = SimHost::default();
        let tree = host.tree_mut();
        let root = tree.root();
        let outer = el(tree, root, "div", &[("data-tabs", "")]);
        el(tree, outer, "button", &[("data-tabs-trigger", "a")]);
        let panel = el(tree, outer, "div", &[("data-tabs-panel", "a")]);
        let inner = el(tree, panel, "div", &[("data-tabs", "")]);
        el(tree, inner, "button", &[("data-tabs-trigger", "a")]);
        el(tree, inner, "div", &[("data-tabs-panel", "a")]);

        assert_eq!(Registry::scan(&mut host, outer).unwrap().len(), 1);
        assert_eq!(Registry::scan(&mut host, inner).unwrap().len(), 1);
        assert_eq!(owning_container(&host, panel), Some(outer));
    }

    #[test]
    fn test_unpaired_trigger_is_ignored() {
        let mut host = SimHost::default();
        let tree = host.tree_mut();
        let root = tree.root();
        let container = el(tree, root, "div", &[("data-tabs", "")]);
        el(tree, container, "button", &[("data-tabs-trigger", "a")]);
        el(tree, container, "button", &[("data-tabs-trigger", "lonely")]);
        el(tree, container, "div", &[("data-tabs-panel", "a")]);

        let registry = Registry::scan(&mut host, container).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.index_of("lonely"), None);
    }

    #[test]
    fn test_target_from_str() {
        assert_eq!("2".parse::<Target>(), Ok(Target::Index(2)));
        assert_eq!(" faq ".parse::<Target>(), Ok(Target::Id("faq".into())));
    }
}
