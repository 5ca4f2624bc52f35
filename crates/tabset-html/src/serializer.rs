//! Markup writer
//!
//! Turns a tree (or part of it) back into HTML, to inspect what the widget
//! did to a document.

use tabset_dom::{DomTree, NodeData, NodeId};

/// Writes markup, compact or one element per line
#[derive(Debug, Clone)]
pub struct HtmlSerializer {
    /// Break and indent before every element
    pub pretty_print: bool,
    /// One level of indentation
    pub indent: String,
}

/// Elements written without an end tag
const VOID: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements whose text is written unescaped
const RAW_TEXT: &[&str] = &["script", "style"];

impl Default for HtmlSerializer {
    fn default() -> Self {
        Self {
            pretty_print: false,
            indent: "  ".to_string(),
        }
    }
}

impl HtmlSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self {
            pretty_print: true,
            ..Self::default()
        }
    }

    /// `innerHTML`: the children of `node`
    pub fn serialize_inner(&self, tree: &DomTree, node: NodeId) -> String {
        let mut out = String::new();
        self.serialize_children(tree, node, &mut out, 0);
        out
    }

    /// `outerHTML`: `node` and everything below it
    pub fn serialize_outer(&self, tree: &DomTree, node: NodeId) -> String {
        let mut out = String::new();
        self.serialize_node(tree, node, &mut out, 0);
        out
    }

    fn newline(&self, out: &mut String, depth: usize) {
        if !self.pretty_print || out.is_empty() {
            return;
        }
        out.push('\n');
        for _ in 0..depth {
            out.push_str(&self.indent);
        }
    }

    fn serialize_node(&self, tree: &DomTree, node: NodeId, out: &mut String, depth: usize) {
        let Some(data) = tree.data(node) else {
            return;
        };

        match data {
            NodeData::Document => self.serialize_children(tree, node, out, depth),
            NodeData::Element(elem) => {
                let tag = elem.tag.as_str();
                self.newline(out, depth);

                out.push('<');
                out.push_str(tag);
                for attr in elem.attrs() {
                    out.push(' ');
                    out.push_str(&attr.name);
                    if !attr.value.is_empty() {
                        out.push_str("=\"");
                        escape(&attr.value, true, out);
                        out.push('"');
                    }
                }
                out.push('>');

                if VOID.contains(&tag) {
                    return;
                }
                if RAW_TEXT.contains(&tag) {
                    self.serialize_children_raw(tree, node, out);
                } else {
                    self.serialize_children(tree, node, out, depth + 1);
                }

                let has_element_child = tree.children(node).any(|c| tree.is_element(c));
                if has_element_child {
                    self.newline(out, depth);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
            NodeData::Text(text) => {
                if self.pretty_print {
                    escape(text.trim(), false, out);
                } else {
                    escape(text, false, out);
                }
            }
            NodeData::Comment(text) => {
                self.newline(out, depth);
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
        }
    }

    fn serialize_children(&self, tree: &DomTree, parent: NodeId, out: &mut String, depth: usize) {
        for child in tree.children(parent) {
            self.serialize_node(tree, child, out, depth);
        }
    }

    fn serialize_children_raw(&self, tree: &DomTree, parent: NodeId, out: &mut String) {
        for child in tree.children(parent) {
            if let Some(NodeData::Text(text)) = tree.data(child) {
                out.push_str(text);
            }
        }
    }
}

/// Entity-escape `text`. Quotes only matter inside attribute values.
fn escape(text: &str, in_attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

/// innerHTML of an element
pub fn get_inner_html(tree: &DomTree, node: NodeId) -> String {
    HtmlSerializer::new().serialize_inner(tree, node)
}

/// outerHTML of an element
pub fn get_outer_html(tree: &DomTree, node: NodeId) -> String {
    HtmlSerializer::new().serialize_outer(tree, node)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escaping() {
        let mut text = String::new();
        escape(r#"<b> & "tabs""#, false, &mut text);
        assert_eq!(text, r#"&lt;b&gt; &amp; "tabs""#);

        let mut attr = String::new();
        escape(r#"{"crossfade": true}"#, true, &mut attr);
        assert_eq!(attr, "{&quot;crossfade&quot;: true}");
    }

    #[test]
    fn test_outer_html() {
        let mut tree = DomTree::new();
        let root = tree.root();
        let div = tree.create_element("div");
        tree.append_child(root, div).unwrap();
        tree.set_attribute(div, "data-tabs", "").unwrap();
        tree.set_attribute(div, "style", "display: none").unwrap();
        let br = tree.create_element("br");
        tree.append_child(div, br).unwrap();
        let text = tree.create_text("a < b");
        tree.append_child(div, text).unwrap();

        assert_eq!(
            get_outer_html(&tree, div),
            r#"<div data-tabs style="display: none"><br>a &lt; b</div>"#
        );
    }

    #[test]
    fn test_pretty_print() {
        let mut tree = DomTree::new();
        let root = tree.root();
        let ul = tree.create_element("ul");
        tree.append_child(root, ul).unwrap();
        for label in ["one", "two"] {
            let item = tree.create_element("li");
            tree.append_child(ul, item).unwrap();
            let text = tree.create_text(label);
            tree.append_child(item, text).unwrap();
        }

        assert_eq!(
            HtmlSerializer::pretty().serialize_outer(&tree, ul),
            "<ul>\n  <li>one</li>\n  <li>two</li>\n</ul>"
        );
    }
}
