//! HTML5 loader
//!
//! Parses with html5ever's RcDom and copies the result into our arena tree.
//! Whitespace-only text, doctypes and processing instructions are dropped.

use std::path::Path;

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use tabset_dom::{DomTree, NodeId};

use crate::HtmlError;

/// HTML5 loader
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlLoader;

impl HtmlLoader {
    pub fn new() -> Self {
        Self
    }

    /// Parse an HTML document. Fragments get the usual html/head/body
    /// wrapping.
    pub fn parse(&self, html: &str) -> Result<DomTree, HtmlError> {
        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())?;

        let mut tree = DomTree::new();
        let root = tree.root();
        self.convert_node(&dom.document, &mut tree, root)?;

        tracing::debug!("Loaded {} nodes", tree.len());
        Ok(tree)
    }

    /// Read and parse a file
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<DomTree, HtmlError> {
        let path = path.as_ref();
        tracing::debug!("Loading {}", path.display());
        let html = std::fs::read_to_string(path)?;
        self.parse(&html)
    }

    fn convert_node(&self, handle: &Handle, tree: &mut DomTree, parent: NodeId) -> Result<(), HtmlError> {
        match &handle.data {
            RcNodeData::Document => {
                for child in handle.children.borrow().iter() {
                    self.convert_node(child, tree, parent)?;
                }
            }
            RcNodeData::Text { contents } => {
                let text = contents.borrow().to_string();
                if !text.trim().is_empty() {
                    let id = tree.create_text(&text);
                    tree.append_child(parent, id)?;
                }
            }
            RcNodeData::Comment { contents } => {
                let id = tree.create_comment(&contents.to_string());
                tree.append_child(parent, id)?;
            }
            RcNodeData::Element { name, attrs, .. } => {
                let id = tree.create_element(name.local.as_ref());
                for attr in attrs.borrow().iter() {
                    tree.set_attribute(id, attr.name.local.as_ref(), &attr.value.to_string())?;
                }
                tree.append_child(parent, id)?;

                for child in handle.children.borrow().iter() {
                    self.convert_node(child, tree, id)?;
                }
            }
            RcNodeData::Doctype { .. } | RcNodeData::ProcessingInstruction { .. } => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let tree = HtmlLoader::new()
            .parse("<html><head><title>Test</title></head><body><p>Hello</p></body></html>")
            .unwrap();
        let p = tree.find_by_tag(tree.root(), "p");
        assert_eq!(p.len(), 1);
        assert_eq!(tree.text_content(p[0]), "Hello");
    }

    #[test]
    fn test_attributes_and_classes() {
        let tree = HtmlLoader::new()
            .parse(r#"<div data-tabs class="a b" style="height: 10px; color: red"></div>"#)
            .unwrap();
        let div = tree.find_by_attribute(tree.root(), "data-tabs")[0];
        assert_eq!(tree.get_attribute(div, "data-tabs"), Some(""));
        assert!(tree.has_class(div, "b"));
        assert_eq!(tree.style(div, "height"), Some("10px"));
    }

    #[test]
    fn test_whitespace_text_dropped() {
        let tree = HtmlLoader::new().parse("<ul>\n  <li>one</li>\n  <li>two</li>\n</ul>").unwrap();
        let ul = tree.find_by_tag(tree.root(), "ul")[0];
        assert_eq!(tree.children(ul).count(), 2);
    }

    #[test]
    fn test_missing_file() {
        let err = HtmlLoader::new().load_file("/definitely/not/here.html").unwrap_err();
        assert!(matches!(err, HtmlError::Io(_)));
    }
}
