//! DOM Tree (arena-based allocation)

use crate::{DomError, DomResult, ElementData, Node, NodeData, NodeId};

/// Arena-based DOM tree. Index 0 is always the document node.
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
        }
    }

    /// Document node
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Number of nodes ever allocated (detached nodes included)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Only the document node exists
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(Node::element(tag))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(Node::text(text))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.alloc(Node::comment(text))
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent.option())
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.first_child.option())
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling.option())
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling.option())
    }

    /// Next sibling that is an element
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut cur = self.next_sibling(id);
        while let Some(n) = cur {
            if self.is_element(n) {
                return Some(n);
            }
            cur = self.next_sibling(n);
        }
        None
    }

    /// Iterate over direct children
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.first_child(id),
        }
    }

    /// Iterate over descendants in document order (excluding `id`)
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            root: id,
            next: self.first_child(id),
        }
    }

    /// Is `node` equal to or inside `ancestor`?
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(n) = cur {
            if n == ancestor {
                return true;
            }
            cur = self.parent(n);
        }
        false
    }

    /// Reachable from the document node?
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.contains(NodeId::ROOT, id)
    }

    /// Closest inclusive ancestor matching `pred`
    pub fn closest(&self, id: NodeId, mut pred: impl FnMut(&DomTree, NodeId) -> bool) -> Option<NodeId> {
        let mut cur = Some(id);
        while let Some(n) = cur {
            if pred(self, n) {
                return Some(n);
            }
            cur = self.parent(n);
        }
        None
    }

    /// Append `child` as the last child of `parent`, detaching it first
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` into `parent` before `reference` (or at the end)
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) -> DomResult<()> {
        self.get(parent).ok_or(DomError::NotFound(parent))?;
        self.get(child).ok_or(DomError::NotFound(child))?;
        if self.contains(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        if let Some(r) = reference {
            if self.parent(r) != Some(parent) {
                return Err(DomError::NotAChild { parent, child: r });
            }
            if r == child {
                return Ok(());
            }
        }

        self.detach(child);

        let prev = match reference {
            Some(r) => self.nodes[r.index()].prev_sibling,
            None => self.nodes[parent.index()].last_child,
        };
        let next = reference.unwrap_or(NodeId::NONE);

        {
            let node = &mut self.nodes[child.index()];
            node.parent = parent;
            node.prev_sibling = prev;
            node.next_sibling = next;
        }
        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = child;
        } else {
            self.nodes[parent.index()].last_child = child;
        }
        Ok(())
    }

    /// Insert `child` right after `reference` under the same parent
    pub fn insert_after(&mut self, reference: NodeId, child: NodeId) -> DomResult<()> {
        let parent = self.parent(reference).ok_or(DomError::NotFound(reference))?;
        let next = self.next_sibling(reference);
        self.insert_before(parent, child, next)
    }

    /// Unlink a node from its parent. The node stays in the arena.
    pub fn detach(&mut self, id: NodeId) {
        let Some(node) = self.get(id) else {
            return;
        };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);
        if !parent.is_valid() {
            return;
        }
        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }
        let node = &mut self.nodes[id.index()];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
    }

    // ------------------------------------------------------------------
    // Elements
    // ------------------------------------------------------------------

    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_element)
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(Node::as_element_mut)
    }

    fn element_or_err(&mut self, id: NodeId) -> DomResult<&mut ElementData> {
        match self.get_mut(id) {
            None => Err(DomError::NotFound(id)),
            Some(node) => node.as_element_mut().ok_or(DomError::NotAnElement(id)),
        }
    }

    /// Lowercase tag name of an element
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_str())
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.attr(name))
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.element(id).is_some_and(|e| e.has_attr(name))
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        self.element_or_err(id)?.set_attr(name, value);
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<String> {
        self.element_mut(id).and_then(|e| e.remove_attr(name))
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_some_and(|e| e.class_list().contains(class))
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) -> bool {
        self.element_mut(id).is_some_and(|e| e.add_class(class))
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) -> bool {
        self.element_mut(id).is_some_and(|e| e.remove_class(class))
    }

    pub fn style(&self, id: NodeId, prop: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.style().get_property(prop))
    }

    pub fn set_style(&mut self, id: NodeId, prop: &str, value: &str) -> DomResult<()> {
        self.element_or_err(id)?.set_style(prop, value);
        Ok(())
    }

    pub fn remove_style(&mut self, id: NodeId, prop: &str) -> Option<String> {
        self.element_mut(id).and_then(|e| e.remove_style(prop))
    }

    /// Pin the laid-out content height of an element
    pub fn set_intrinsic_height(&mut self, id: NodeId, height: f32) -> DomResult<()> {
        self.element_or_err(id)?.intrinsic_height = Some(height);
        Ok(())
    }

    /// Elements under `root` (exclusive) carrying attribute `name`, in document order
    pub fn find_by_attribute(&self, root: NodeId, name: &str) -> Vec<NodeId> {
        self.descendants(root)
            .filter(|&n| self.has_attribute(n, name))
            .collect()
    }

    /// Elements under `root` (exclusive) with the given tag
    pub fn find_by_tag(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(root)
            .filter(|&n| self.tag_name(n).is_some_and(|t| t.eq_ignore_ascii_case(tag)))
            .collect()
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .filter_map(|n| self.get(n).and_then(Node::as_text))
            .collect()
    }

    /// Raw node data, for serializers
    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.get(id).map(|n| &n.data)
    }
}

/// Iterator over direct children
pub struct Children<'a> {
    tree: &'a DomTree,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let cur = self.next?;
        self.next = self.tree.next_sibling(cur);
        Some(cur)
    }
}

/// Pre-order iterator over descendants
pub struct Descendants<'a> {
    tree: &'a DomTree,
    root: NodeId,
    next: Option<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let cur = self.next?;
        self.next = self.tree.first_child(cur).or_else(|| {
            let mut n = cur;
            loop {
                if n == self.root {
                    return None;
                }
                if let Some(sib) = self.tree.next_sibling(n) {
                    return Some(sib);
                }
                n = self.tree.parent(n)?;
            }
        });
        Some(cur)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list() -> (DomTree, NodeId, [NodeId; 3]) {
        let mut tree = DomTree::new();
        let ul = tree.create_element("ul");
        tree.append_child(tree.root(), ul).unwrap();
        let items = [0, 1, 2].map(|_| tree.create_element("li"));
        for li in items {
            tree.append_child(ul, li).unwrap();
        }
        (tree, ul, items)
    }

    #[test]
    fn test_append_and_iterate() {
        let (tree, ul, items) = list();
        assert_eq!(tree.children(ul).collect::<Vec<_>>(), items.to_vec());
        assert_eq!(tree.parent(items[1]), Some(ul));
        assert!(tree.is_attached(items[2]));
    }

    #[test]
    fn test_insert_before_and_after() {
        let (mut tree, ul, [a, b, c]) = list();
        tree.insert_before(ul, c, Some(a)).unwrap();
        assert_eq!(tree.children(ul).collect::<Vec<_>>(), vec![c, a, b]);

        tree.insert_after(a, c).unwrap();
        assert_eq!(tree.children(ul).collect::<Vec<_>>(), vec![a, c, b]);

        tree.insert_after(b, c).unwrap();
        assert_eq!(tree.children(ul).collect::<Vec<_>>(), vec![a, b, c]);
    }

    #[test]
    fn test_detach() {
        let (mut tree, ul, [a, b, c]) = list();
        tree.detach(b);
        assert_eq!(tree.children(ul).collect::<Vec<_>>(), vec![a, c]);
        assert!(!tree.is_attached(b));
        assert_eq!(tree.prev_sibling(c), Some(a));
    }

    #[test]
    fn test_hierarchy_request() {
        let (mut tree, ul, [a, ..]) = list();
        assert_eq!(
            tree.append_child(a, ul),
            Err(DomError::HierarchyRequest { parent: a, child: ul })
        );
    }

    #[test]
    fn test_descendants_document_order() {
        let (mut tree, ul, [a, b, _]) = list();
        let span = tree.create_element("span");
        tree.append_child(a, span).unwrap();
        let order: Vec<_> = tree.descendants(ul).collect();
        assert_eq!(order[..3], [a, span, b]);
        assert_eq!(tree.descendants(a).collect::<Vec<_>>(), vec![span]);
    }
}
