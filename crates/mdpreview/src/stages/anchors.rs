//! Heading anchor links (tree pass).

use mdpreview_tree::{Element, Node, walk_elements_mut};

use crate::error::StageError;
use crate::stage::TreeTransform;
use crate::stages::slug::is_heading;

/// Prepends a self-link anchor to every heading that carries an `id`.
///
/// Must run after [`crate::stages::HeadingSlugs`]; headings without an id
/// get no anchor.
pub struct HeadingAnchors;

impl TreeTransform for HeadingAnchors {
    fn name(&self) -> &str {
        "heading-anchors"
    }

    fn transform(&self, root: &mut Element) -> Result<(), StageError> {
        walk_elements_mut(root, &mut |el| {
            if !is_heading(&el.tag) {
                return;
            }
            let Some(id) = el.attr("id").map(str::to_owned) else {
                return;
            };
            let already_anchored = el
                .children
                .first()
                .and_then(Node::as_element)
                .is_some_and(|a| a.tag == "a" && a.has_class("anchor"));
            if already_anchored {
                return;
            }
            let icon = Element::new("span").with_attr("class", "icon icon-link");
            let anchor = Element::new("a")
                .with_attr("class", "anchor")
                .with_attr("aria-hidden", "true")
                .with_attr("href", format!("#{id}"))
                .with_children(vec![Node::Element(icon)]);
            el.children.insert(0, Node::Element(anchor));
        });
        Ok(())
    }
}
