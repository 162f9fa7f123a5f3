//! Attribute channel comments (tree pass).
//!
//! A comment of the form `<!--attr:key=value&key2=value2-->` sets the listed
//! attributes on the nearest preceding element sibling (whitespace-only text
//! between them is skipped). The channel name is configurable; the comment
//! itself is left in place and dropped at materialization.

use mdpreview_tree::{Element, Node, walk_child_lists_mut};

use crate::error::StageError;
use crate::stage::TreeTransform;

/// Applies attribute-channel comments to their preceding element.
pub struct AttrChannel {
    prefix: String,
}

impl AttrChannel {
    /// Create the stage for the given channel name.
    #[must_use]
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            prefix: format!("{}:", channel.into()),
        }
    }
}

impl TreeTransform for AttrChannel {
    fn name(&self) -> &str {
        "attr-channel"
    }

    fn transform(&self, root: &mut Element) -> Result<(), StageError> {
        walk_child_lists_mut(root, &mut |children| {
            for i in 0..children.len() {
                let Some(payload) = channel_payload(&children[i], &self.prefix) else {
                    continue;
                };
                let Some(target) = preceding_element(children, i) else {
                    continue;
                };
                if let Some(el) = children[target].as_element_mut() {
                    for (name, value) in parse_payload(&payload) {
                        el.set_attr(name, value);
                    }
                }
            }
        });
        Ok(())
    }
}

fn channel_payload(node: &Node, prefix: &str) -> Option<String> {
    let Node::Comment(content) = node else {
        return None;
    };
    content.trim().strip_prefix(prefix).map(str::to_owned)
}

/// Index of the nearest element before `i`, skipping whitespace-only text.
fn preceding_element(children: &[Node], i: usize) -> Option<usize> {
    let mut j = i;
    while j > 0 {
        j -= 1;
        match &children[j] {
            Node::Element(_) => return Some(j),
            Node::Text(text) if text.trim().is_empty() => {}
            Node::Text(_) | Node::Comment(_) | Node::Raw(_) => return None,
        }
    }
    None
}

fn parse_payload(payload: &str) -> Vec<(String, String)> {
    payload
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) => (name.to_owned(), value.to_owned()),
            None => (pair.to_owned(), String::new()),
        })
        .collect()
}
