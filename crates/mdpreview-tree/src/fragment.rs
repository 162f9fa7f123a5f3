//! HTML fragment → tree nodes, via quick-xml.
//!
//! Raw HTML embedded in markdown is close to XML but not XML: named entities
//! like `&nbsp;`, bare ampersands, and unclosed void tags like `<br>` appear
//! in the wild. [`parse_fragment`] normalizes entities to plain text or
//! XML-safe references, self-closes void tags, wraps the fragment in a
//! synthetic root, and parses with a strict reader — mismatched tags surface
//! as [`TreeError`].

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::TreeError;
use crate::node::{Element, Node};
use crate::serialize::VOID_TAGS;

/// Common named HTML entities converted to their Unicode characters before
/// parsing. The five XML-predefined entities stay as references.
const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("nbsp", "\u{a0}"),
    ("copy", "\u{a9}"),
    ("reg", "\u{ae}"),
    ("trade", "\u{2122}"),
    ("deg", "\u{b0}"),
    ("plusmn", "\u{b1}"),
    ("middot", "\u{b7}"),
    ("micro", "\u{b5}"),
    ("para", "\u{b6}"),
    ("sect", "\u{a7}"),
    ("laquo", "\u{ab}"),
    ("raquo", "\u{bb}"),
    ("times", "\u{d7}"),
    ("divide", "\u{f7}"),
    ("ndash", "\u{2013}"),
    ("mdash", "\u{2014}"),
    ("lsquo", "\u{2018}"),
    ("rsquo", "\u{2019}"),
    ("ldquo", "\u{201c}"),
    ("rdquo", "\u{201d}"),
    ("bull", "\u{2022}"),
    ("hellip", "\u{2026}"),
    ("permil", "\u{2030}"),
    ("dagger", "\u{2020}"),
    ("Dagger", "\u{2021}"),
    ("euro", "\u{20ac}"),
    ("pound", "\u{a3}"),
    ("yen", "\u{a5}"),
    ("cent", "\u{a2}"),
    ("frac12", "\u{bd}"),
    ("frac14", "\u{bc}"),
    ("frac34", "\u{be}"),
];

/// Parse an HTML fragment into tree nodes.
///
/// # Errors
///
/// Returns an error if the fragment is not well formed enough for a strict
/// parse (e.g. mismatched closing tags).
pub fn parse_fragment(html: &str) -> Result<Vec<Node>, TreeError> {
    let normalized = close_void_tags(&convert_entities(html));
    let wrapped = format!("<x-fragment>{normalized}</x-fragment>");

    let mut reader = Reader::from_str(&wrapped);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<Element> = vec![Element::new("x-fragment")];
    let mut wrapper_seen = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if wrapper_seen {
                    stack.push(element_from(&e)?);
                } else {
                    wrapper_seen = true;
                }
            }
            Event::Empty(e) => {
                let el = element_from(&e)?;
                append(&mut stack, Node::Element(el));
            }
            Event::End(_) => {
                // `stack.len() == 1` is the wrapper's own end tag.
                if stack.len() > 1 {
                    if let Some(el) = stack.pop() {
                        append(&mut stack, Node::Element(el));
                    }
                }
            }
            Event::Text(e) => {
                let text = reader.decoder().decode(&e)?.into_owned();
                append_text(&mut stack, &text);
            }
            Event::GeneralRef(e) => {
                let name = reader.decoder().decode(&e)?.into_owned();
                append_text(&mut stack, &decode_entity(&name));
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e).into_owned();
                append_text(&mut stack, &text);
            }
            Event::Comment(e) => {
                let content = reader.decoder().decode(&e)?.into_owned();
                // Undo the `&` → `&amp;` normalization inside comment text;
                // quick-xml does not resolve references in comments.
                append(&mut stack, Node::Comment(unescape_basic(&content)));
            }
            Event::PI(_) | Event::Decl(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
    }

    // Whatever remains open collapses into the wrapper.
    while stack.len() > 1 {
        if let Some(el) = stack.pop() {
            append(&mut stack, Node::Element(el));
        }
    }
    Ok(stack.pop().map(|el| el.children).unwrap_or_default())
}

fn element_from(e: &BytesStart<'_>) -> Result<Element, TreeError> {
    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut el = Element::new(tag);
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = unescape_basic(&String::from_utf8_lossy(&attr.value));
        el.attrs.push((key, value));
    }
    Ok(el)
}

fn append(stack: &mut Vec<Element>, node: Node) {
    if let Some(top) = stack.last_mut() {
        top.children.push(node);
    }
}

fn append_text(stack: &mut Vec<Element>, text: &str) {
    if let Some(top) = stack.last_mut() {
        if let Some(Node::Text(prev)) = top.children.last_mut() {
            prev.push_str(text);
            return;
        }
        top.children.push(Node::Text(text.to_owned()));
    }
}

/// Resolve an entity reference name to its text.
fn decode_entity(name: &str) -> String {
    match name {
        "lt" => "<".to_owned(),
        "gt" => ">".to_owned(),
        "amp" => "&".to_owned(),
        "quot" => "\"".to_owned(),
        "apos" => "'".to_owned(),
        numeric if numeric.starts_with('#') => {
            decode_numeric(numeric).unwrap_or_else(|| format!("&{name};"))
        }
        other => format!("&{other};"),
    }
}

fn decode_numeric(body: &str) -> Option<String> {
    let digits = &body[1..];
    let code = if let Some(hex) = digits.strip_prefix('x').or_else(|| digits.strip_prefix('X')) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        digits.parse().ok()?
    };
    char::from_u32(code).map(String::from)
}

/// Resolve the five XML entities and numeric references in a string.
fn unescape_basic(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if let Some(name) = entity_name(tail) {
            out.push_str(&decode_entity(name));
            rest = &tail[name.len() + 2..];
        } else {
            out.push('&');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

/// Entity name following a `&`, if `tail` looks like a reference.
fn entity_name(tail: &str) -> Option<&str> {
    let end = tail[1..].find(';').filter(|end| *end <= 31)?;
    let name = &tail[1..=end];
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '#')
        .then_some(name)
}

/// Self-close unclosed void tags (`<br>` → `<br/>`) so a strict XML parse
/// succeeds. HTML never closes these, so a bare occurrence is valid input,
/// not an authoring error. Comments are copied through untouched and quoted
/// attribute values may contain `>`.
fn close_void_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut i = 0;
    while let Some(off) = html[i..].find('<') {
        let start = i + off;
        out.push_str(&html[i..start]);
        if html[start..].starts_with("<!--") {
            let end = html[start..]
                .find("-->")
                .map_or(html.len(), |p| start + p + 3);
            out.push_str(&html[start..end]);
            i = end;
            continue;
        }
        let name_start = start + 1;
        let name_len: usize = html[name_start..]
            .chars()
            .take_while(char::is_ascii_alphanumeric)
            .map(char::len_utf8)
            .sum();
        let name_end = name_start + name_len;
        let name = html[name_start..name_end].to_ascii_lowercase();
        let Some(close) = tag_close(&html[name_end..]).map(|p| name_end + p) else {
            out.push_str(&html[start..]);
            return out;
        };
        let already_closed = html[start..close].ends_with('/');
        if VOID_TAGS.contains(&name.as_str()) && !already_closed {
            out.push_str(&html[start..close]);
            out.push_str("/>");
        } else {
            out.push_str(&html[start..=close]);
        }
        i = close + 1;
    }
    out.push_str(&html[i..]);
    out
}

/// Position of the `>` ending a tag, honoring quoted attribute values.
fn tag_close(s: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (k, c) in s.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '"' | '\'' => quote = Some(c),
                '>' => return Some(k),
                _ => {}
            },
        }
    }
    None
}

/// Normalize HTML entities so a strict XML parse succeeds.
///
/// Named entities from [`NAMED_ENTITIES`] become their Unicode characters;
/// the five XML entities and numeric references pass through; any other `&`
/// is escaped to `&amp;`.
fn convert_entities(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match tail[1..].find(';').filter(|end| *end <= 31) {
            Some(end) => {
                let name = &tail[1..=end];
                let is_numeric = name.starts_with('#') && decode_numeric(name).is_some();
                if is_numeric || matches!(name, "lt" | "gt" | "amp" | "quot" | "apos") {
                    out.push('&');
                    out.push_str(name);
                    out.push(';');
                } else if let Some((_, replacement)) =
                    NAMED_ENTITIES.iter().find(|(n, _)| *n == name)
                {
                    out.push_str(replacement);
                } else {
                    out.push_str("&amp;");
                    out.push_str(name);
                    out.push(';');
                }
                rest = &tail[end + 2..];
            }
            None => {
                out.push_str("&amp;");
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
