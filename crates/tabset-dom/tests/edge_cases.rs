//! Edge case tests for tabset-dom
//!
//! Tree surgery, attribute/style syncing and the lookups the widget relies on.

use tabset_dom::{DOMTokenList, DomError, DomTree, NodeId, StyleDeclaration};

fn element(tree: &mut DomTree, parent: NodeId, tag: &str) -> NodeId {
    let id = tree.create_element(tag);
    tree.append_child(parent, id).unwrap();
    id
}

// ============================================================================
// TREE SURGERY
// ============================================================================

#[test]
fn test_reinserting_keeps_siblings_linked() {
    let mut tree = DomTree::new();
    let root = tree.root();
    let list = element(&mut tree, root, "ul");
    let a = element(&mut tree, list, "li");
    let b = element(&mut tree, list, "li");
    let c = element(&mut tree, list, "li");

    // Move the middle child to the front, then back where it was
    tree.insert_before(list, b, Some(a)).unwrap();
    assert_eq!(tree.children(list).collect::<Vec<_>>(), vec![b, a, c]);
    tree.insert_before(list, b, Some(c)).unwrap();
    assert_eq!(tree.children(list).collect::<Vec<_>>(), vec![a, b, c]);

    assert_eq!(tree.prev_sibling(c), Some(b));
    assert_eq!(tree.next_sibling(a), Some(b));
    assert_eq!(tree.first_child(list), Some(a));
}

#[test]
fn test_insert_before_self_is_noop() {
    let mut tree = DomTree::new();
    let root = tree.root();
    let a = element(&mut tree, root, "div");
    let b = element(&mut tree, root, "div");

    tree.insert_before(root, b, Some(b)).unwrap();
    assert_eq!(tree.children(root).collect::<Vec<_>>(), vec![a, b]);
}

#[test]
fn test_reference_must_be_a_child() {
    let mut tree = DomTree::new();
    let root = tree.root();
    let a = element(&mut tree, root, "div");
    let inner = element(&mut tree, a, "span");
    let loose = tree.create_element("p");

    let err = tree.insert_before(root, loose, Some(inner)).unwrap_err();
    assert_eq!(err, DomError::NotAChild { parent: root, child: inner });
    assert!(!tree.is_attached(loose));
}

#[test]
fn test_cannot_insert_into_descendant() {
    let mut tree = DomTree::new();
    let root = tree.root();
    let outer = element(&mut tree, root, "div");
    let inner = element(&mut tree, outer, "div");

    assert!(matches!(
        tree.append_child(inner, outer),
        Err(DomError::HierarchyRequest { .. })
    ));
    assert!(matches!(tree.append_child(outer, outer), Err(DomError::HierarchyRequest { .. })));
    assert_eq!(tree.parent(inner), Some(outer));
}

#[test]
fn test_insert_after_last_and_detached() {
    let mut tree = DomTree::new();
    let root = tree.root();
    let a = element(&mut tree, root, "div");
    let b = tree.create_element("div");

    tree.insert_after(a, b).unwrap();
    assert_eq!(tree.next_sibling(a), Some(b));
    assert_eq!(tree.next_sibling(b), None);

    let orphan = tree.create_element("div");
    let other = tree.create_element("div");
    assert_eq!(tree.insert_after(orphan, other), Err(DomError::NotFound(orphan)));
}

#[test]
fn test_detached_subtree_is_not_attached() {
    let mut tree = DomTree::new();
    let root = tree.root();
    let outer = element(&mut tree, root, "section");
    let inner = element(&mut tree, outer, "div");

    tree.detach(outer);
    assert!(!tree.is_attached(inner));
    assert!(tree.contains(outer, inner));
    assert!(tree.find_by_tag(root, "div").is_empty());

    // Detaching twice is harmless
    tree.detach(outer);
    tree.append_child(root, outer).unwrap();
    assert!(tree.is_attached(inner));
}

#[test]
fn test_next_element_sibling_skips_text_and_comments() {
    let mut tree = DomTree::new();
    let root = tree.root();
    let a = element(&mut tree, root, "button");
    let text = tree.create_text("  ");
    tree.append_child(root, text).unwrap();
    let note = tree.create_comment("slot");
    tree.append_child(root, note).unwrap();
    let b = element(&mut tree, root, "div");

    assert_eq!(tree.next_sibling(a), Some(text));
    assert_eq!(tree.next_element_sibling(a), Some(b));
    assert_eq!(tree.next_element_sibling(b), None);
}

#[test]
fn test_operations_on_non_elements() {
    let mut tree = DomTree::new();
    let text = tree.create_text("hi");

    assert_eq!(tree.set_attribute(text, "id", "x"), Err(DomError::NotAnElement(text)));
    assert!(tree.set_style(text, "display", "none").is_err());
    assert!(!tree.add_class(text, "on"));
    assert_eq!(tree.get_attribute(text, "id"), None);
    assert_eq!(tree.tag_name(text), None);
}

// ============================================================================
// ATTRIBUTES, CLASSES, STYLE
// ============================================================================

#[test]
fn test_class_attribute_follows_class_list() {
    let mut tree = DomTree::new();
    let root = tree.root();
    let div = element(&mut tree, root, "div");

    assert!(tree.add_class(div, "is-open"));
    assert!(!tree.add_class(div, "is-open"));
    assert_eq!(tree.get_attribute(div, "class"), Some("is-open"));

    assert!(tree.remove_class(div, "is-open"));
    assert!(!tree.has_attribute(div, "class"));

    tree.set_attribute(div, "class", "  a   b ").unwrap();
    assert!(tree.has_class(div, "a"));
    assert!(tree.has_class(div, "b"));
    tree.remove_attribute(div, "class");
    assert!(!tree.has_class(div, "a"));
}

#[test]
fn test_style_attribute_follows_declarations() {
    let mut tree = DomTree::new();
    let root = tree.root();
    let div = element(&mut tree, root, "div");

    tree.set_attribute(div, "style", "color: red; ; bogus; height:10px").unwrap();
    assert_eq!(tree.style(div, "height"), Some("10px"));
    assert_eq!(tree.style(div, "COLOR"), Some("red"));

    tree.set_style(div, "display", "none").unwrap();
    assert_eq!(tree.get_attribute(div, "style"), Some("color: red; height: 10px; display: none;"));

    assert_eq!(tree.remove_style(div, "height"), Some("10px".to_string()));
    assert_eq!(tree.remove_style(div, "height"), None);
    tree.set_style(div, "color", "").unwrap();
    tree.remove_style(div, "display");
    assert!(!tree.has_attribute(div, "style"));
}

#[test]
fn test_attribute_order_is_stable() {
    let mut tree = DomTree::new();
    let root = tree.root();
    let div = element(&mut tree, root, "div");
    tree.set_attribute(div, "data-tabs-panel", "a").unwrap();
    tree.set_attribute(div, "role", "tabpanel").unwrap();
    tree.set_attribute(div, "data-tabs-panel", "b").unwrap();

    let names: Vec<&str> = tree.element(div).unwrap().attrs().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["data-tabs-panel", "role"]);
    assert_eq!(tree.remove_attribute(div, "role"), Some("tabpanel".to_string()));
}

#[test]
fn test_token_list_and_declaration_standalone() {
    let mut list = DOMTokenList::from_string("x y x");
    assert_eq!(list.length(), 2);
    assert!(!list.toggle("y", None));
    assert!(list.toggle("z", Some(true)));
    assert_eq!(list.value(), "x z");
    assert!(!list.add(""));

    let mut style = StyleDeclaration::parse("opacity: 0");
    style.set_property("Opacity", "1");
    assert_eq!(style.len(), 1);
    assert_eq!(style.css_text(), "opacity: 1;");
}

// ============================================================================
// LOOKUPS
// ============================================================================

#[test]
fn test_find_by_attribute_document_order() {
    let mut tree = DomTree::new();
    let root = tree.root();
    let outer = element(&mut tree, root, "div");
    tree.set_attribute(outer, "data-tabs", "").unwrap();
    let inner = element(&mut tree, outer, "div");
    tree.set_attribute(inner, "data-tabs", "").unwrap();
    let sibling = element(&mut tree, root, "div");
    tree.set_attribute(sibling, "data-tabs", "").unwrap();

    assert_eq!(tree.find_by_attribute(root, "data-tabs"), vec![outer, inner, sibling]);
    // The query root itself is excluded
    assert_eq!(tree.find_by_attribute(outer, "data-tabs"), vec![inner]);
}

#[test]
fn test_closest_and_text_content() {
    let mut tree = DomTree::new();
    let root = tree.root();
    let li = element(&mut tree, root, "li");
    let button = element(&mut tree, li, "button");
    let label = tree.create_text("Tab ");
    tree.append_child(button, label).unwrap();
    let strong = element(&mut tree, button, "strong");
    let text = tree.create_text("one");
    tree.append_child(strong, text).unwrap();

    let found = tree.closest(strong, |t, n| t.tag_name(n) == Some("li"));
    assert_eq!(found, Some(li));
    assert_eq!(tree.closest(strong, |t, n| t.tag_name(n) == Some("ul")), None);
    assert_eq!(tree.text_content(li), "Tab one");
}

#[test]
fn test_intrinsic_height_is_stored() {
    let mut tree = DomTree::new();
    let root = tree.root();
    let div = element(&mut tree, root, "div");
    tree.set_intrinsic_height(div, 42.0).unwrap();
    assert_eq!(tree.element(div).unwrap().intrinsic_height, Some(42.0));
}
