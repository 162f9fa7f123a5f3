//! Markdown event stream → render tree.
//!
//! Translates pulldown-cmark events into a [`Element`] tree using a stack of
//! open elements. The tree keeps embedded raw HTML as [`Node::Raw`] leaves;
//! upgrading those to real nodes is a pipeline concern, not a builder one.

use std::ops::Range;

use pulldown_cmark::{
    Alignment, BlockQuoteKind, CodeBlockKind, Event, HeadingLevel, MetadataBlockKind, Options,
    Parser, Tag, TagEnd,
};

use crate::node::{Element, Node};

/// Build a render tree from markdown source.
///
/// `options` comes from the source-syntax stages. YAML metadata blocks are
/// always enabled so frontmatter is captured as a `reserved:meta` node
/// regardless of stage configuration.
#[must_use]
pub fn build_tree(source: &str, options: Options) -> Element {
    let options = options | Options::ENABLE_YAML_STYLE_METADATA_BLOCKS;
    let mut builder = TreeBuilder::new();
    for (event, range) in Parser::new_ext(source, options).into_offset_iter() {
        builder.event(event, range);
    }
    builder.finish()
}

/// Capture state for the current fenced or indented code block.
struct CodeCapture {
    language: Option<String>,
    buffer: String,
    span: Range<usize>,
}

/// Capture state for the current image (inner events become alt text).
struct ImageCapture {
    element: Element,
    alt: String,
}

/// Per-table context: alignments and current cell position.
struct TableCtx {
    aligns: Vec<Alignment>,
    cell: usize,
}

struct TreeBuilder {
    stack: Vec<Element>,
    code: Option<CodeCapture>,
    image: Option<ImageCapture>,
    /// Open tags inside an image capture, skipped for stack symmetry.
    suppressed: usize,
    tables: Vec<TableCtx>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![Element::new("root")],
            code: None,
            image: None,
            suppressed: 0,
            tables: Vec::new(),
        }
    }

    fn finish(mut self) -> Element {
        while self.stack.len() > 1 {
            self.pop();
        }
        self.stack.pop().unwrap_or_else(|| Element::new("root"))
    }

    fn event(&mut self, event: Event<'_>, range: Range<usize>) {
        match event {
            Event::Start(tag) => self.start_tag(tag, range),
            Event::End(tag) => self.end_tag(&tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => self.raw_html(&html),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => self.append(Element::new("br").into()),
            Event::Rule => self.append(spanned("hr", range).into()),
            Event::TaskListMarker(checked) => self.task_list_marker(checked),
            Event::FootnoteReference(label) => self.footnote_reference(&label),
            Event::InlineMath(_) | Event::DisplayMath(_) => {
                // Not supported
            }
        }
    }

    #[allow(clippy::too_many_lines)]
    fn start_tag(&mut self, tag: Tag<'_>, range: Range<usize>) {
        if self.image.is_some() {
            // Inner markup contributes alt text only; keep start/end symmetric.
            self.suppressed += 1;
            return;
        }
        match tag {
            Tag::Paragraph => self.push(spanned("p", range)),
            Tag::Heading {
                level, id, classes, ..
            } => {
                let mut el = spanned(heading_tag(level), range);
                if let Some(id) = id {
                    el.set_attr("id", id.into_string());
                }
                if !classes.is_empty() {
                    let joined = classes
                        .iter()
                        .map(AsRef::as_ref)
                        .collect::<Vec<_>>()
                        .join(" ");
                    el.set_attr("class", joined);
                }
                self.push(el);
            }
            Tag::BlockQuote(kind) => {
                let mut el = spanned("blockquote", range);
                if let Some(kind) = kind {
                    el.set_attr(
                        "class",
                        format!("markdown-alert markdown-alert-{}", alert_name(kind)),
                    );
                }
                self.push(el);
            }
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(ref info) if !info.is_empty() => {
                        // First whitespace token of the fence info is the language.
                        info.split_whitespace()
                            .next()
                            .map(std::borrow::ToOwned::to_owned)
                    }
                    _ => None,
                };
                self.code = Some(CodeCapture {
                    language,
                    buffer: String::new(),
                    span: range,
                });
            }
            Tag::List(start) => match start {
                Some(1) => self.push(spanned("ol", range)),
                Some(n) => {
                    let mut el = spanned("ol", range);
                    el.set_attr("start", n.to_string());
                    self.push(el);
                }
                None => self.push(spanned("ul", range)),
            },
            Tag::Item => self.push(spanned("li", range)),
            Tag::FootnoteDefinition(label) => {
                let mut el = spanned("section", range);
                el.set_attr("class", "footnote-definition".to_owned());
                el.set_attr("id", format!("fn-{label}"));
                self.push(el);
            }
            Tag::HtmlBlock => {}
            Tag::DefinitionList => self.push(spanned("dl", range)),
            Tag::DefinitionListTitle => self.push(spanned("dt", range)),
            Tag::DefinitionListDefinition => self.push(spanned("dd", range)),
            Tag::MetadataBlock(kind) => {
                let mut el = spanned("reserved:meta", range);
                let format = match kind {
                    MetadataBlockKind::YamlStyle => "yaml",
                    MetadataBlockKind::PlusesStyle => "toml",
                };
                el.set_attr("data-format", format.to_owned());
                self.push(el);
            }
            Tag::Table(aligns) => {
                self.push(spanned("table", range));
                self.tables.push(TableCtx { aligns, cell: 0 });
            }
            Tag::TableHead => {
                if let Some(ctx) = self.tables.last_mut() {
                    ctx.cell = 0;
                }
                self.push(Element::new("thead"));
                self.push(Element::new("tr"));
            }
            Tag::TableRow => {
                if let Some(ctx) = self.tables.last_mut() {
                    ctx.cell = 0;
                }
                self.push(spanned("tr", range));
            }
            Tag::TableCell => {
                let in_head = self
                    .stack
                    .iter()
                    .rev()
                    .find(|el| el.tag == "thead" || el.tag == "tbody")
                    .is_some_and(|el| el.tag == "thead");
                let mut el = Element::new(if in_head { "th" } else { "td" });
                if let Some(style) = self.tables.last().and_then(|ctx| {
                    alignment_style(ctx.aligns.get(ctx.cell).copied().unwrap_or(Alignment::None))
                }) {
                    el.set_attr("style", style.to_owned());
                }
                self.push(el);
            }
            Tag::Emphasis => self.push(spanned("em", range)),
            Tag::Strong => self.push(spanned("strong", range)),
            Tag::Strikethrough => self.push(spanned("s", range)),
            Tag::Link {
                dest_url, title, ..
            } => {
                let mut el = spanned("a", range);
                el.set_attr("href", dest_url.into_string());
                if !title.is_empty() {
                    el.set_attr("title", title.into_string());
                }
                self.push(el);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                let mut el = spanned("img", range);
                el.set_attr("src", dest_url.into_string());
                if !title.is_empty() {
                    el.set_attr("title", title.into_string());
                }
                self.image = Some(ImageCapture {
                    element: el,
                    alt: String::new(),
                });
            }
            Tag::Superscript => self.push(spanned("sup", range)),
            Tag::Subscript => self.push(spanned("sub", range)),
        }
    }

    fn end_tag(&mut self, tag: &TagEnd) {
        if self.image.is_some() {
            if self.suppressed > 0 {
                self.suppressed -= 1;
                return;
            }
            if matches!(tag, TagEnd::Image) {
                if let Some(capture) = self.image.take() {
                    let mut el = capture.element;
                    el.set_attr("alt", capture.alt);
                    self.append(el.into());
                }
            }
            return;
        }
        match tag {
            TagEnd::CodeBlock => {
                if let Some(capture) = self.code.take() {
                    let mut code_el = Element::new("code");
                    if let Some(lang) = capture.language {
                        code_el.set_attr("class", format!("language-{lang}"));
                    }
                    if !capture.buffer.is_empty() {
                        code_el.children.push(Node::Text(capture.buffer));
                    }
                    let pre = spanned("pre", capture.span).with_children(vec![code_el.into()]);
                    self.append(pre.into());
                }
            }
            TagEnd::TableHead => {
                // Close <tr> and <thead>, then open the body for data rows.
                self.pop();
                self.pop();
                self.push(Element::new("tbody"));
            }
            TagEnd::Table => {
                self.pop(); // tbody
                self.pop(); // table
                self.tables.pop();
            }
            TagEnd::TableCell => {
                self.pop();
                if let Some(ctx) = self.tables.last_mut() {
                    ctx.cell += 1;
                }
            }
            TagEnd::HtmlBlock => {}
            _ => self.pop(),
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(code) = self.code.as_mut() {
            code.buffer.push_str(text);
        } else {
            self.append(Node::text(text));
        }
    }

    fn inline_code(&mut self, code: &str) {
        let el = Element::new("code").with_children(vec![Node::text(code)]);
        self.append(el.into());
    }

    fn raw_html(&mut self, html: &str) {
        if self.image.is_none() {
            self.append(Node::Raw(html.to_owned()));
        }
    }

    fn soft_break(&mut self) {
        if let Some(code) = self.code.as_mut() {
            code.buffer.push('\n');
        } else {
            self.append(Node::text("\n"));
        }
    }

    /// Reference marker linking to its definition section.
    fn footnote_reference(&mut self, label: &str) {
        let link = Element::new("a")
            .with_attr("href", format!("#fn-{label}"))
            .with_children(vec![Node::text(label)]);
        let sup = Element::new("sup").with_children(vec![Node::Element(link)]);
        self.append(sup.into());
    }

    fn task_list_marker(&mut self, checked: bool) {
        let mut el = Element::new("input");
        el.set_attr("type", "checkbox");
        el.set_attr("disabled", "");
        if checked {
            el.set_attr("checked", "");
        }
        self.append(el.into());
    }

    fn push(&mut self, el: Element) {
        self.stack.push(el);
    }

    fn pop(&mut self) {
        if self.stack.len() > 1 {
            if let Some(el) = self.stack.pop() {
                self.append_to_top(Node::Element(el));
            }
        }
    }

    fn append(&mut self, node: Node) {
        if let Some(image) = self.image.as_mut() {
            if let Node::Text(text) = node {
                image.alt.push_str(&text);
            }
            return;
        }
        self.append_to_top(node);
    }

    fn append_to_top(&mut self, node: Node) {
        if let Some(top) = self.stack.last_mut() {
            // Merge adjacent text nodes so structure is stable for comparison.
            if let (Some(Node::Text(prev)), Node::Text(text)) = (top.children.last_mut(), &node) {
                prev.push_str(text);
                return;
            }
            top.children.push(node);
        }
    }
}

fn spanned(tag: &str, range: Range<usize>) -> Element {
    let mut el = Element::new(tag);
    el.span = Some(range);
    el
}

fn heading_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}

fn alert_name(kind: BlockQuoteKind) -> &'static str {
    match kind {
        BlockQuoteKind::Note => "note",
        BlockQuoteKind::Tip => "tip",
        BlockQuoteKind::Important => "important",
        BlockQuoteKind::Warning => "warning",
        BlockQuoteKind::Caution => "caution",
    }
}

fn alignment_style(align: Alignment) -> Option<&'static str> {
    match align {
        Alignment::Left => Some("text-align:left"),
        Alignment::Center => Some("text-align:center"),
        Alignment::Right => Some("text-align:right"),
        Alignment::None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn gfm() -> Options {
        Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_GFM
    }

    fn first_element<'a>(root: &'a Element, tag: &str) -> &'a Element {
        fn find<'a>(el: &'a Element, tag: &str) -> Option<&'a Element> {
            if el.tag == tag {
                return Some(el);
            }
            el.children
                .iter()
                .filter_map(Node::as_element)
                .find_map(|child| find(child, tag))
        }
        find(root, tag).unwrap_or_else(|| panic!("no <{tag}> in tree"))
    }

    #[test]
    fn test_paragraph() {
        let root = build_tree("Hello, world!", Options::empty());
        let p = first_element(&root, "p");
        assert_eq!(p.children, vec![Node::text("Hello, world!")]);
        assert!(p.span.is_some());
    }

    #[test]
    fn test_heading_levels() {
        let root = build_tree("## Section", Options::empty());
        let h2 = first_element(&root, "h2");
        assert_eq!(h2.text_content(), "Section");
        // No slug here: id assignment is a tree-stage concern.
        assert_eq!(h2.attr("id"), None);
    }

    #[test]
    fn test_inline_formatting() {
        let root = build_tree("*italic* and **bold** and ~~gone~~", gfm());
        assert_eq!(first_element(&root, "em").text_content(), "italic");
        assert_eq!(first_element(&root, "strong").text_content(), "bold");
        assert_eq!(first_element(&root, "s").text_content(), "gone");
    }

    #[test]
    fn test_code_block() {
        let root = build_tree("```rust\nfn main() {}\n```", Options::empty());
        let code = first_element(&root, "code");
        assert_eq!(code.attr("class"), Some("language-rust"));
        assert_eq!(code.text_content(), "fn main() {}\n");
    }

    #[test]
    fn test_code_block_without_language() {
        let root = build_tree("```\nplain\n```", Options::empty());
        let code = first_element(&root, "code");
        assert_eq!(code.attr("class"), None);
    }

    #[test]
    fn test_table_structure() {
        let root = build_tree("| A | B |\n|:--|--:|\n| 1 | 2 |", gfm());
        let table = first_element(&root, "table");
        let th = first_element(table, "th");
        assert_eq!(th.attr("style"), Some("text-align:left"));
        let td_count = first_element(table, "tbody")
            .children
            .iter()
            .filter_map(Node::as_element)
            .count();
        assert_eq!(td_count, 1); // one body row
        assert_eq!(first_element(table, "td").text_content(), "1");
    }

    #[test]
    fn test_ordered_list_start() {
        let root = build_tree("3. third\n4. fourth", Options::empty());
        let ol = first_element(&root, "ol");
        assert_eq!(ol.attr("start"), Some("3"));
    }

    #[test]
    fn test_task_list() {
        let root = build_tree("- [x] done\n- [ ] todo", gfm());
        let inputs: Vec<_> = root
            .children
            .iter()
            .filter_map(Node::as_element)
            .flat_map(|ul| ul.children.iter().filter_map(Node::as_element))
            .flat_map(|li| li.children.iter().filter_map(Node::as_element))
            .filter(|el| el.tag == "input")
            .collect();
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0].attr("checked"), Some(""));
        assert_eq!(inputs[1].attr("checked"), None);
    }

    #[test]
    fn test_footnote_reference_links_definition() {
        let root = build_tree(
            "text[^1]\n\n[^1]: the note\n",
            Options::ENABLE_FOOTNOTES,
        );
        let p = first_element(&root, "p");
        let sup = first_element(p, "sup");
        let link = first_element(sup, "a");
        assert_eq!(link.attr("href"), Some("#fn-1"));
        assert_eq!(link.text_content(), "1");
        assert_eq!(p.text_content(), "text1");

        let section = first_element(&root, "section");
        assert_eq!(section.attr("id"), Some("fn-1"));
        assert!(section.has_class("footnote-definition"));
        assert!(section.text_content().contains("the note"));
    }

    #[test]
    fn test_image_alt_capture() {
        let root = build_tree("![Some *alt* text](pic.png)", Options::empty());
        let img = first_element(&root, "img");
        assert_eq!(img.attr("src"), Some("pic.png"));
        assert_eq!(img.attr("alt"), Some("Some alt text"));
        assert!(img.children.is_empty());
    }

    #[test]
    fn test_raw_html_kept_as_raw() {
        let root = build_tree("before <em class=\"x\">mid</em> after", Options::empty());
        let p = first_element(&root, "p");
        assert!(
            p.children
                .iter()
                .any(|node| matches!(node, Node::Raw(raw) if raw.contains("<em"))),
            "raw HTML should stay a Raw leaf until admitted"
        );
    }

    #[test]
    fn test_frontmatter_becomes_reserved_node() {
        let root = build_tree("---\ntitle: Demo\n---\n\nbody", Options::empty());
        let meta = first_element(&root, "reserved:meta");
        assert_eq!(meta.attr("data-format"), Some("yaml"));
        assert!(meta.text_content().contains("title: Demo"));
    }

    #[test]
    fn test_soft_break_merges_text() {
        let root = build_tree("line one\nline two", Options::empty());
        let p = first_element(&root, "p");
        assert_eq!(p.children, vec![Node::text("line one\nline two")]);
    }

    #[test]
    fn test_blockquote_alert_class() {
        let root = build_tree("> [!NOTE]\n> careful", gfm());
        let bq = first_element(&root, "blockquote");
        assert_eq!(bq.attr("class"), Some("markdown-alert markdown-alert-note"));
    }

    #[test]
    fn test_empty_document() {
        let root = build_tree("", Options::empty());
        assert_eq!(root.tag, "root");
        assert!(root.children.is_empty());
    }
}
