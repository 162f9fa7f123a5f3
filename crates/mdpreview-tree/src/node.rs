//! Tree node representation for rendered markdown.

use std::ops::Range;

/// Tag prefix for pipeline-internal bookkeeping nodes.
///
/// Reserved nodes never reach output: the strip stage removes them before any
/// other tree stage runs, and the `:` in the tag fails the default element
/// gate as a backstop.
pub const RESERVED_PREFIX: &str = "reserved:";

/// A node in the render tree.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Node {
    /// An element with a tag, attributes and children.
    Element(Element),
    /// Plain text content.
    Text(String),
    /// An HTML comment (`<!-- ... -->`, without the delimiters).
    Comment(String),
    /// Embedded raw HTML exactly as emitted by the markdown parser.
    ///
    /// Raw nodes are upgraded to real nodes by the raw-HTML admission stage.
    /// If that stage does not run, raw nodes are dropped at materialization —
    /// untreated HTML never reaches output.
    Raw(String),
}

impl Node {
    /// Create a text node.
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    /// Borrow this node as an element, if it is one.
    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Mutably borrow this node as an element, if it is one.
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Self::Element(el)
    }
}

/// An element node.
///
/// Attributes keep insertion order so serialization is deterministic.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Element {
    /// Tag name (e.g. `p`, `h2`, `code`).
    pub tag: String,
    /// Attribute name/value pairs in insertion order.
    pub attrs: Vec<(String, String)>,
    /// Child nodes.
    pub children: Vec<Node>,
    /// Byte range in the source document, `None` for synthesized nodes.
    pub span: Option<Range<usize>>,
}

impl Element {
    /// Create an element with the given tag and no attributes or children.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Add an attribute (builder style).
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// Set children (builder style).
    #[must_use]
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Get an attribute value by name.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing any existing value.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    /// Append a class token to the `class` attribute.
    pub fn append_class(&mut self, class: &str) {
        match self.attrs.iter_mut().find(|(n, _)| n == "class") {
            Some((_, value)) => {
                if !value.split_whitespace().any(|token| token == class) {
                    if !value.is_empty() {
                        value.push(' ');
                    }
                    value.push_str(class);
                }
            }
            None => self.attrs.push(("class".to_owned(), class.to_owned())),
        }
    }

    /// Check whether the `class` attribute contains the given token.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|value| value.split_whitespace().any(|token| token == class))
    }

    /// Concatenated text content of this element and all descendants.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(el: &Element, out: &mut String) {
    for child in &el.children {
        match child {
            Node::Text(text) => out.push_str(text),
            Node::Element(child_el) => collect_text(child_el, out),
            Node::Comment(_) | Node::Raw(_) => {}
        }
    }
}

/// Visit every element in the tree, parents before children.
///
/// The root element itself is visited first.
pub fn walk_elements_mut(el: &mut Element, f: &mut dyn FnMut(&mut Element)) {
    f(el);
    for child in &mut el.children {
        if let Node::Element(child_el) = child {
            walk_elements_mut(child_el, f);
        }
    }
}

/// Visit every child list in the tree, parents before children.
///
/// Useful for transforms that splice or remove siblings.
pub fn walk_child_lists_mut(el: &mut Element, f: &mut dyn FnMut(&mut Vec<Node>)) {
    f(&mut el.children);
    for child in &mut el.children {
        if let Node::Element(child_el) = child {
            walk_child_lists_mut(child_el, f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_attr_set_and_get() {
        let mut el = Element::new("div");
        assert_eq!(el.attr("id"), None);

        el.set_attr("id", "intro");
        assert_eq!(el.attr("id"), Some("intro"));

        el.set_attr("id", "outro");
        assert_eq!(el.attr("id"), Some("outro"));
        assert_eq!(el.attrs.len(), 1);
    }

    #[test]
    fn test_append_class() {
        let mut el = Element::new("code");
        el.append_class("language-rust");
        el.append_class("line-numbers");
        el.append_class("language-rust"); // no duplicate
        assert_eq!(el.attr("class"), Some("language-rust line-numbers"));
        assert!(el.has_class("line-numbers"));
        assert!(!el.has_class("language"));
    }

    #[test]
    fn test_text_content_skips_comments() {
        let el = Element::new("p").with_children(vec![
            Node::text("Hello "),
            Node::Element(Element::new("em").with_children(vec![Node::text("world")])),
            Node::Comment("hidden".to_owned()),
        ]);
        assert_eq!(el.text_content(), "Hello world");
    }

    #[test]
    fn test_walk_elements_preorder() {
        let mut root = Element::new("root").with_children(vec![
            Node::Element(
                Element::new("ul")
                    .with_children(vec![Node::Element(Element::new("li"))]),
            ),
            Node::Element(Element::new("p")),
        ]);

        let mut order = Vec::new();
        walk_elements_mut(&mut root, &mut |el| order.push(el.tag.clone()));
        assert_eq!(order, ["root", "ul", "li", "p"]);
    }
}
