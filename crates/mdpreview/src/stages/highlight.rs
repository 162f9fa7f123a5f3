//! Syntax highlighting for fenced code blocks (tree pass).
//!
//! Uses autumnus's linked HTML formatter, so highlighted output carries CSS
//! classes rather than inline styles. The formatter's HTML is reparsed into
//! tree nodes and replaces the original `pre` block.

use autumnus::{HtmlLinkedBuilder, formatter::Formatter, languages::Language};
use mdpreview_tree::{Element, Node, parse_fragment};

use crate::config::HighlightOptions;
use crate::error::StageError;
use crate::stage::TreeTransform;

/// Highlights `pre > code.language-*` blocks.
///
/// Unrecognized languages either leave the block untouched (the default) or
/// fail the render, per [`HighlightOptions::ignore_missing`].
pub struct Highlight {
    options: HighlightOptions,
}

impl Highlight {
    /// Create the stage with the given options.
    #[must_use]
    pub fn new(options: HighlightOptions) -> Self {
        Self { options }
    }

    fn visit(&self, el: &mut Element) -> Result<(), StageError> {
        for child in &mut el.children {
            if let Node::Element(child_el) = child {
                match self.highlight_block(child_el)? {
                    Some(replacement) => *child_el = replacement,
                    None => self.visit(child_el)?,
                }
            }
        }
        Ok(())
    }

    /// Highlight one code block, or `None` if `el` is not a highlightable
    /// block (wrong shape, no language, or tolerated unknown language).
    fn highlight_block(&self, el: &Element) -> Result<Option<Element>, StageError> {
        if el.tag != "pre" {
            return Ok(None);
        }
        let Some(code) = el.children.first().and_then(Node::as_element) else {
            return Ok(None);
        };
        if code.tag != "code" {
            return Ok(None);
        }
        let Some(language) = code.attr("class").and_then(|class| {
            class
                .split_whitespace()
                .find_map(|token| token.strip_prefix("language-"))
                .map(str::to_owned)
        }) else {
            return Ok(None);
        };

        let source = code.text_content();
        let lang = Language::guess(&language, &source);
        if matches!(lang, Language::PlainText) && language != "plaintext" && language != "text" {
            if self.options.ignore_missing {
                return Ok(None);
            }
            return Err(StageError::UnknownLanguage(language));
        }

        let Some(html) = render_highlighted(&source, lang) else {
            // Formatter failure is not the document's fault; keep the plain
            // block with its language-* class.
            return Ok(None);
        };
        let nodes = parse_fragment(&html)?;
        let Some(Node::Element(mut pre)) = nodes
            .into_iter()
            .find(|node| matches!(node, Node::Element(_)))
        else {
            return Ok(None);
        };
        pre.span = el.span.clone();
        Ok(Some(pre))
    }
}

impl TreeTransform for Highlight {
    fn name(&self) -> &str {
        "highlight"
    }

    fn transform(&self, root: &mut Element) -> Result<(), StageError> {
        self.visit(root)
    }
}

fn render_highlighted(source: &str, lang: Language) -> Option<String> {
    let formatter = HtmlLinkedBuilder::new()
        .source(source)
        .lang(lang)
        .build()
        .ok()?;
    let mut output: Vec<u8> = Vec::new();
    formatter.format(&mut output).ok()?;
    String::from_utf8(output).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn code_block(language: &str, source: &str) -> Element {
        let code = Element::new("code")
            .with_attr("class", format!("language-{language}"))
            .with_children(vec![Node::text(source)]);
        Element::new("root").with_children(vec![Node::Element(
            Element::new("pre").with_children(vec![Node::Element(code)]),
        )])
    }

    #[test]
    fn test_known_language_is_highlighted() {
        let mut root = code_block("rust", "fn main() {}\n");
        Highlight::new(HighlightOptions::default())
            .transform(&mut root)
            .unwrap();
        let pre = root.children[0].as_element().unwrap();
        assert_eq!(pre.tag, "pre");
        // The block was rebuilt from formatter output and still carries the
        // original source text.
        assert!(pre.text_content().contains("fn main"));
        assert!(!pre.children.is_empty());
    }

    #[test]
    fn test_unknown_language_tolerated_by_default() {
        let mut root = code_block("klingon", "nuqneH\n");
        let before = root.clone();
        Highlight::new(HighlightOptions::default())
            .transform(&mut root)
            .unwrap();
        assert_eq!(root, before);
    }

    #[test]
    fn test_unknown_language_fails_when_strict() {
        let mut root = code_block("klingon", "nuqneH\n");
        let err = Highlight::new(HighlightOptions {
            ignore_missing: false,
        })
        .transform(&mut root)
        .unwrap_err();
        assert!(matches!(err, StageError::UnknownLanguage(lang) if lang == "klingon"));
    }

    #[test]
    fn test_block_without_language_untouched() {
        let code = Element::new("code").with_children(vec![Node::text("plain\n")]);
        let mut root = Element::new("root").with_children(vec![Node::Element(
            Element::new("pre").with_children(vec![Node::Element(code)]),
        )]);
        let before = root.clone();
        Highlight::new(HighlightOptions::default())
            .transform(&mut root)
            .unwrap();
        assert_eq!(root, before);
    }
}
