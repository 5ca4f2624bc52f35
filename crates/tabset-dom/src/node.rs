//! DOM Node
//!
//! Nodes link to their relatives by [`NodeId`] instead of pointers, so the
//! whole tree lives in one `Vec` and relocation is a handful of index writes.

use crate::{DOMTokenList, NodeId, StyleDeclaration};

/// DOM Node - Core structure
#[derive(Debug)]
pub struct Node {
    /// Parent node (NONE if detached or root)
    pub parent: NodeId,
    /// First child
    pub first_child: NodeId,
    /// Last child (for O(1) append)
    pub last_child: NodeId,
    /// Previous sibling
    pub prev_sibling: NodeId,
    /// Next sibling
    pub next_sibling: NodeId,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    fn with_data(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    /// Create a new element node
    pub fn element(tag: &str) -> Self {
        Self::with_data(NodeData::Element(ElementData::new(tag)))
    }

    /// Create a new text node
    pub fn text(content: &str) -> Self {
        Self::with_data(NodeData::Text(content.to_string()))
    }

    /// Create a comment node
    pub fn comment(content: &str) -> Self {
        Self::with_data(NodeData::Comment(content.to_string()))
    }

    /// Create a document node
    pub fn document() -> Self {
        Self::with_data(NodeData::Document)
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get text content if this is a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug)]
pub enum NodeData {
    /// Document root
    Document,
    /// Element
    Element(ElementData),
    /// Text content
    Text(String),
    /// Comment
    Comment(String),
}

/// Attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Element-specific data
///
/// `class` and `style` are kept both as raw attributes and as parsed
/// structures; every mutation goes through this type so the two never drift.
#[derive(Debug)]
pub struct ElementData {
    /// Lowercase tag name
    pub tag: String,
    attrs: Vec<Attribute>,
    classes: DOMTokenList,
    style: StyleDeclaration,
    /// Laid-out content height in px, when the host pins one
    pub intrinsic_height: Option<f32>,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            classes: DOMTokenList::new(),
            style: StyleDeclaration::new(),
            intrinsic_height: None,
        }
    }

    /// Get an attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Check if attribute exists
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|a| a.name == name)
    }

    /// Set an attribute
    pub fn set_attr(&mut self, name: &str, value: &str) {
        match name {
            "class" => self.classes = DOMTokenList::from_string(value),
            "style" => self.style = StyleDeclaration::parse(value),
            _ => {}
        }
        self.write_raw(name, value.to_string());
    }

    /// Remove an attribute, returning its previous value
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        match name {
            "class" => self.classes = DOMTokenList::new(),
            "style" => self.style = StyleDeclaration::new(),
            _ => {}
        }
        let pos = self.attrs.iter().position(|a| a.name == name)?;
        Some(self.attrs.remove(pos).value)
    }

    /// Iterate over attributes in insertion order
    pub fn attrs(&self) -> impl Iterator<Item = &Attribute> {
        self.attrs.iter()
    }

    /// Parsed class list
    pub fn class_list(&self) -> &DOMTokenList {
        &self.classes
    }

    /// Add a class; returns false if already present
    pub fn add_class(&mut self, class: &str) -> bool {
        let changed = self.classes.add(class);
        if changed {
            self.sync_class();
        }
        changed
    }

    /// Remove a class; returns false if absent
    pub fn remove_class(&mut self, class: &str) -> bool {
        let changed = self.classes.remove(class);
        if changed {
            self.sync_class();
        }
        changed
    }

    /// Parsed inline style
    pub fn style(&self) -> &StyleDeclaration {
        &self.style
    }

    /// Set an inline style property (empty value removes)
    pub fn set_style(&mut self, prop: &str, value: &str) {
        self.style.set_property(prop, value);
        self.sync_style();
    }

    /// Remove an inline style property
    pub fn remove_style(&mut self, prop: &str) -> Option<String> {
        let old = self.style.remove_property(prop);
        if old.is_some() {
            self.sync_style();
        }
        old
    }

    fn sync_class(&mut self) {
        if self.classes.is_empty() {
            self.attrs.retain(|a| a.name != "class");
        } else {
            let value = self.classes.value();
            self.write_raw("class", value);
        }
    }

    fn sync_style(&mut self) {
        if self.style.is_empty() {
            self.attrs.retain(|a| a.name != "style");
        } else {
            let value = self.style.css_text();
            self.write_raw("style", value);
        }
    }

    fn write_raw(&mut self, name: &str, value: String) {
        match self.attrs.iter_mut().find(|a| a.name == name) {
            Some(attr) => attr.value = value,
            None => self.attrs.push(Attribute {
                name: name.to_string(),
                value,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_attribute_stays_in_sync() {
        let mut elem = ElementData::new("DIV");
        assert_eq!(elem.tag, "div");

        elem.set_attr("class", "a b");
        assert!(elem.add_class("c"));
        assert_eq!(elem.attr("class"), Some("a b c"));

        elem.remove_class("a");
        elem.remove_class("b");
        elem.remove_class("c");
        assert!(!elem.has_attr("class"));
    }

    #[test]
    fn test_style_attribute_stays_in_sync() {
        let mut elem = ElementData::new("section");
        elem.set_style("display", "none");
        assert_eq!(elem.attr("style"), Some("display: none;"));

        assert_eq!(elem.remove_style("display").as_deref(), Some("none"));
        assert!(elem.attr("style").is_none());
        assert!(elem.remove_style("display").is_none());
    }
}
