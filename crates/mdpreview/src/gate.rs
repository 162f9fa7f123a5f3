//! Element admission gate.
//!
//! The gate decides, per element visited during materialization, whether the
//! element survives into output. Rejecting an element discards its whole
//! subtree. A caller override fully replaces the default rule; the two are
//! never merged.

use std::rc::Rc;
use std::sync::LazyLock;

use mdpreview_tree::Element;
use regex::Regex;

/// Admission predicate: `(element, index within parent, parent)`.
pub type GateFn = Rc<dyn Fn(&Element, usize, Option<&Element>) -> bool>;

static PLAIN_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new("^[A-Za-z0-9]+$").unwrap());

/// The default admission rule: the tag is one or more ASCII alphanumerics.
///
/// Anything with punctuation in the tag is rejected, which keeps reserved
/// bookkeeping tags (`reserved:meta`), namespaced tags, and malformed tags
/// out of output even if an earlier stage failed to remove them.
#[must_use]
pub fn default_admit(element: &Element, _index: usize, _parent: Option<&Element>) -> bool {
    PLAIN_TAG.is_match(&element.tag)
}
