//! Raw-HTML admission (tree pass).
//!
//! The markdown parser emits embedded HTML as opaque raw nodes, often split
//! across events (an opening tag in one node, markdown-formatted children,
//! then the closing tag). The only reliable way to resolve them is to
//! serialize the whole tree with raw text verbatim and reparse the result,
//! which is what this stage does. If the embedded HTML is not well formed
//! the tree is left unchanged and the raw nodes are dropped later at
//! materialization, so untreated HTML never reaches output.

use mdpreview_tree::{Element, Node, inner_html_with_raw, parse_fragment};
use tracing::warn;

use crate::error::StageError;
use crate::stage::TreeTransform;

/// Upgrades embedded raw HTML into real tree nodes.
pub struct RawHtml;

impl TreeTransform for RawHtml {
    fn name(&self) -> &str {
        "raw-html"
    }

    fn transform(&self, root: &mut Element) -> Result<(), StageError> {
        if !contains_raw(root) {
            return Ok(());
        }
        let html = inner_html_with_raw(root);
        match parse_fragment(&html) {
            Ok(nodes) => root.children = nodes,
            Err(err) => {
                warn!(error = %err, "embedded HTML is not well formed, leaving it unrendered");
            }
        }
        Ok(())
    }
}

fn contains_raw(el: &Element) -> bool {
    el.children.iter().any(|node| match node {
        Node::Raw(_) => true,
        Node::Element(child) => contains_raw(child),
        Node::Text(_) | Node::Comment(_) => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_inline_html_becomes_elements() {
        // "text <abbr title="x">y</abbr>" as the parser would emit it.
        let p = Element::new("p").with_children(vec![
            Node::text("text "),
            Node::Raw("<abbr title=\"x\">".to_owned()),
            Node::text("y"),
            Node::Raw("</abbr>".to_owned()),
        ]);
        let mut root = Element::new("root").with_children(vec![Node::Element(p)]);
        RawHtml.transform(&mut root).unwrap();

        let p = root.children[0].as_element().unwrap();
        assert_eq!(p.children.len(), 2);
        let abbr = p.children[1].as_element().unwrap();
        assert_eq!(abbr.tag, "abbr");
        assert_eq!(abbr.attr("title"), Some("x"));
        assert_eq!(abbr.text_content(), "y");
    }

    #[test]
    fn test_block_html_becomes_elements() {
        let mut root = Element::new("root").with_children(vec![Node::Raw(
            "<div class=\"note\"><p>hi</p></div>".to_owned(),
        )]);
        RawHtml.transform(&mut root).unwrap();
        let div = root.children[0].as_element().unwrap();
        assert_eq!(div.tag, "div");
        assert_eq!(div.attr("class"), Some("note"));
    }

    #[test]
    fn test_malformed_html_leaves_tree_unchanged() {
        let mut root = Element::new("root").with_children(vec![
            Node::Raw("<div><span></div>".to_owned()),
            Node::text("after"),
        ]);
        let before = root.clone();
        RawHtml.transform(&mut root).unwrap();
        assert_eq!(root, before);
    }

    #[test]
    fn test_tree_without_raw_untouched() {
        let mut root = Element::new("root").with_children(vec![Node::Element(
            Element::new("p").with_children(vec![Node::text("a < b")]),
        )]);
        let before = root.clone();
        RawHtml.transform(&mut root).unwrap();
        assert_eq!(root, before);
    }
}
