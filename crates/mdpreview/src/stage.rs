//! Transform stage contracts.
//!
//! A stage is a named unit of transformation belonging to exactly one pass:
//! source stages see the raw document text (and may contribute parser
//! options), tree stages mutate the parsed tree in place. Stage order is
//! semantically significant; later stages observe the effects of earlier
//! ones.

use std::fmt;
use std::rc::Rc;

use mdpreview_tree::Element;
use pulldown_cmark::Options;

use crate::error::StageError;

/// Which pass a stage runs in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pass {
    /// The pass over raw document text, before parsing.
    Source,
    /// The pass over the parsed tree.
    Tree,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Tree => f.write_str("tree"),
        }
    }
}

/// A stage of the source pass.
///
/// Source stages can contribute markdown parser options, rewrite the raw
/// text, or both. Rewrites chain in stage-list order.
pub trait SourceTransform {
    /// Stable stage name, used in logs and error reports.
    fn name(&self) -> &str;

    /// Parser option flags this stage contributes.
    fn parser_options(&self) -> Options {
        Options::empty()
    }

    /// Rewrite the document text. The default is the identity.
    fn rewrite(&self, source: String) -> Result<String, StageError> {
        Ok(source)
    }
}

/// A stage of the tree pass. Mutates the parsed tree in place.
pub trait TreeTransform {
    /// Stable stage name, used in logs and error reports.
    fn name(&self) -> &str;

    /// Transform the tree rooted at `root`.
    fn transform(&self, root: &mut Element) -> Result<(), StageError>;
}

/// A stage tagged with the pass it belongs to.
///
/// Stages are cheap to clone and share; the same stage value may appear in
/// several lists (or twice in one list, in which case it runs twice).
#[derive(Clone)]
pub enum Stage {
    /// A source-pass stage.
    Source(Rc<dyn SourceTransform>),
    /// A tree-pass stage.
    Tree(Rc<dyn TreeTransform>),
}

impl Stage {
    /// Wrap a source transform as a stage.
    pub fn source(transform: impl SourceTransform + 'static) -> Self {
        Self::Source(Rc::new(transform))
    }

    /// Wrap a tree transform as a stage.
    pub fn tree(transform: impl TreeTransform + 'static) -> Self {
        Self::Tree(Rc::new(transform))
    }

    /// The stage's name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Source(transform) => transform.name(),
            Self::Tree(transform) => transform.name(),
        }
    }

    /// The pass this stage belongs to.
    #[must_use]
    pub fn pass(&self) -> Pass {
        match self {
            Self::Source(_) => Pass::Source,
            Self::Tree(_) => Pass::Tree,
        }
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("pass", &self.pass())
            .field("name", &self.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Upper;

    impl SourceTransform for Upper {
        fn name(&self) -> &str {
            "upper"
        }

        fn rewrite(&self, source: String) -> Result<String, StageError> {
            Ok(source.to_uppercase())
        }
    }

    #[test]
    fn test_stage_name_and_pass() {
        let stage = Stage::source(Upper);
        assert_eq!(stage.name(), "upper");
        assert_eq!(stage.pass(), Pass::Source);
    }

    #[test]
    fn test_default_rewrite_is_identity() {
        struct OptionsOnly;
        impl SourceTransform for OptionsOnly {
            fn name(&self) -> &str {
                "options-only"
            }
        }
        let out = OptionsOnly.rewrite("abc".to_owned()).unwrap();
        assert_eq!(out, "abc");
        assert_eq!(OptionsOnly.parser_options(), Options::empty());
    }

    #[test]
    fn test_pass_display() {
        assert_eq!(Pass::Source.to_string(), "source");
        assert_eq!(Pass::Tree.to_string(), "tree");
    }
}
