//! Reserved-metadata stripper (tree pass).

use mdpreview_tree::{Element, RESERVED_PREFIX, walk_child_lists_mut};

use crate::error::StageError;
use crate::stage::TreeTransform;

/// Removes `reserved:*` bookkeeping elements (frontmatter metadata captured
/// by the tree builder) from the whole tree.
///
/// Runs first in the tree pass so no other stage observes reserved nodes.
pub struct StripReservedMeta;

impl TreeTransform for StripReservedMeta {
    fn name(&self) -> &str {
        "strip-reserved-meta"
    }

    fn transform(&self, root: &mut Element) -> Result<(), StageError> {
        walk_child_lists_mut(root, &mut |children| {
            children.retain(|node| {
                !node
                    .as_element()
                    .is_some_and(|el| el.tag.starts_with(RESERVED_PREFIX))
            });
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdpreview_tree::Node;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_removes_reserved_elements() {
        let mut root = Element::new("root").with_children(vec![
            Node::Element(Element::new("reserved:meta").with_attr("data-format", "yaml")),
            Node::Element(Element::new("p").with_children(vec![Node::text("kept")])),
        ]);
        StripReservedMeta.transform(&mut root).unwrap();
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].as_element().unwrap().tag, "p");
    }

    #[test]
    fn test_removes_nested_reserved_elements() {
        let mut root = Element::new("root").with_children(vec![Node::Element(
            Element::new("div")
                .with_children(vec![Node::Element(Element::new("reserved:marker"))]),
        )]);
        StripReservedMeta.transform(&mut root).unwrap();
        let div = root.children[0].as_element().unwrap();
        assert!(div.children.is_empty());
    }

    #[test]
    fn test_leaves_ordinary_tree_alone() {
        let mut root = Element::new("root")
            .with_children(vec![Node::Element(Element::new("h1")), Node::text("x")]);
        let before = root.clone();
        StripReservedMeta.transform(&mut root).unwrap();
        assert_eq!(root, before);
    }
}
