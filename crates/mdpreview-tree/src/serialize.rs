//! Tree → HTML serialization.

use std::fmt::Write;

use crate::node::{Element, Node};

/// Tags serialized without a closing tag in HTML output.
pub(crate) const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Final HTML output: raw nodes dropped, void tags unclosed, empty
    /// attribute values written bare (`disabled`).
    Html,
    /// Reparse round-trip: raw nodes verbatim, empty elements self-closed,
    /// attribute values always quoted so the output parses as XML.
    Reparse,
}

/// Serialize an element (including its own tag) to HTML.
#[must_use]
pub fn to_html(el: &Element) -> String {
    let mut out = String::with_capacity(256);
    write_element(el, &mut out, Mode::Html);
    out
}

/// Serialize an element's children to HTML.
#[must_use]
pub fn inner_html(el: &Element) -> String {
    let mut out = String::with_capacity(256);
    for child in &el.children {
        write_node(child, &mut out, Mode::Html);
    }
    out
}

/// Serialize an element's children keeping raw HTML verbatim.
///
/// Produces markup suitable for reparsing with [`crate::parse_fragment`];
/// used by the raw-HTML admission stage to rebuild the tree with embedded
/// HTML resolved into real nodes.
#[must_use]
pub fn inner_html_with_raw(el: &Element) -> String {
    let mut out = String::with_capacity(256);
    for child in &el.children {
        write_node(child, &mut out, Mode::Reparse);
    }
    out
}

fn write_node(node: &Node, out: &mut String, mode: Mode) {
    match node {
        Node::Element(el) => write_element(el, out, mode),
        Node::Text(text) => out.push_str(&escape_html(text)),
        Node::Comment(comment) => {
            let _ = write!(out, "<!--{comment}-->");
        }
        Node::Raw(raw) => {
            if mode == Mode::Reparse {
                out.push_str(raw);
            }
        }
    }
}

fn write_element(el: &Element, out: &mut String, mode: Mode) {
    out.push('<');
    out.push_str(&el.tag);
    for (name, value) in &el.attrs {
        if value.is_empty() && mode == Mode::Html {
            let _ = write!(out, " {name}");
        } else {
            let _ = write!(out, " {name}=\"{}\"", escape_html(value));
        }
    }
    if el.children.is_empty() {
        match mode {
            Mode::Reparse => out.push_str("/>"),
            Mode::Html if VOID_TAGS.contains(&el.tag.as_str()) => out.push('>'),
            Mode::Html => {
                let _ = write!(out, "></{}>", el.tag);
            }
        }
        return;
    }
    out.push('>');
    for child in &el.children {
        write_node(child, out, mode);
    }
    let _ = write!(out, "</{}>", el.tag);
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}
