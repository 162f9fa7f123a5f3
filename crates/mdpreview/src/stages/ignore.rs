//! Ignored regions delimited by marker comments (tree pass).

use mdpreview_tree::{Element, Node, walk_child_lists_mut};

use crate::config::IgnoreMarkers;
use crate::error::StageError;
use crate::stage::TreeTransform;

/// Removes every node between an opening and a closing marker comment,
/// markers included. Markers pair up within one child list; an unclosed
/// opening marker drops the rest of its list.
pub struct IgnoreBlocks {
    markers: IgnoreMarkers,
}

impl IgnoreBlocks {
    /// Create the stage with the given marker delimiters.
    #[must_use]
    pub fn new(markers: IgnoreMarkers) -> Self {
        Self { markers }
    }
}

impl TreeTransform for IgnoreBlocks {
    fn name(&self) -> &str {
        "ignore-blocks"
    }

    fn transform(&self, root: &mut Element) -> Result<(), StageError> {
        walk_child_lists_mut(root, &mut |children| {
            let mut kept = Vec::with_capacity(children.len());
            let mut ignoring = false;
            for node in children.drain(..) {
                if let Node::Comment(content) = &node {
                    let content = content.trim();
                    if content == self.markers.open {
                        ignoring = true;
                        continue;
                    }
                    if content == self.markers.close {
                        ignoring = false;
                        continue;
                    }
                }
                if !ignoring {
                    kept.push(node);
                }
            }
            *children = kept;
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn stage() -> IgnoreBlocks {
        IgnoreBlocks::new(IgnoreMarkers::default())
    }

    fn para(text: &str) -> Node {
        Node::Element(Element::new("p").with_children(vec![Node::text(text)]))
    }

    #[test]
    fn test_region_removed_with_markers() {
        let mut root = Element::new("root").with_children(vec![
            para("before"),
            Node::Comment("ignore:start".to_owned()),
            para("secret"),
            Node::Comment("ignore:end".to_owned()),
            para("after"),
        ]);
        stage().transform(&mut root).unwrap();
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].as_element().unwrap().text_content(), "before");
        assert_eq!(root.children[1].as_element().unwrap().text_content(), "after");
    }

    #[test]
    fn test_unclosed_marker_drops_rest_of_list() {
        let mut root = Element::new("root").with_children(vec![
            para("kept"),
            Node::Comment("ignore:start".to_owned()),
            para("gone"),
            para("also gone"),
        ]);
        stage().transform(&mut root).unwrap();
        assert_eq!(root.children.len(), 1);
    }

    #[test]
    fn test_other_comments_survive() {
        let mut root = Element::new("root").with_children(vec![
            Node::Comment("attr:class=x".to_owned()),
            para("kept"),
        ]);
        let before = root.clone();
        stage().transform(&mut root).unwrap();
        assert_eq!(root, before);
    }

    #[test]
    fn test_custom_markers() {
        let mut root = Element::new("root").with_children(vec![
            Node::Comment("hide".to_owned()),
            para("gone"),
            Node::Comment("show".to_owned()),
            para("kept"),
        ]);
        IgnoreBlocks::new(IgnoreMarkers {
            open: "hide".to_owned(),
            close: "show".to_owned(),
        })
        .transform(&mut root)
        .unwrap();
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].as_element().unwrap().text_content(), "kept");
    }
}
