//! Heading slug ids (tree pass).

use std::collections::HashMap;

use mdpreview_tree::{Element, walk_elements_mut};

use crate::error::StageError;
use crate::stage::TreeTransform;

/// Assigns a slug `id` to every heading that does not already carry one.
///
/// Duplicate heading texts get a numeric suffix (`faq`, `faq-1`, ...), in
/// document order.
pub struct HeadingSlugs;

impl TreeTransform for HeadingSlugs {
    fn name(&self) -> &str {
        "heading-slugs"
    }

    fn transform(&self, root: &mut Element) -> Result<(), StageError> {
        let mut id_counts: HashMap<String, usize> = HashMap::new();
        walk_elements_mut(root, &mut |el| {
            if !is_heading(&el.tag) || el.attr("id").is_some() {
                return;
            }
            let base = slugify(&el.text_content());
            let count = id_counts.entry(base.clone()).or_insert(0);
            let id = if *count == 0 {
                base
            } else {
                format!("{base}-{count}")
            };
            *count += 1;
            el.set_attr("id", id);
        });
        Ok(())
    }
}

pub(crate) fn is_heading(tag: &str) -> bool {
    matches!(tag, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

/// Lowercase the text, replace runs of non-alphanumerics with single dashes,
/// and trim dashes at both ends.
fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        "section".to_owned()
    } else {
        slug
    }
}
