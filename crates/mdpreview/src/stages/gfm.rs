//! Extended markdown syntax (source pass).

use pulldown_cmark::Options;

use crate::stage::SourceTransform;

/// The single built-in source stage: enables GitHub-flavored syntax
/// extensions on the markdown parser. No text rewrite.
pub struct GfmSyntax;

impl SourceTransform for GfmSyntax {
    fn name(&self) -> &str {
        "gfm-syntax"
    }

    fn parser_options(&self) -> Options {
        Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_GFM
    }
}
