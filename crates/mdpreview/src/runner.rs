//! Pipeline execution.

use mdpreview_tree::{Element, Node, build_tree};
use pulldown_cmark::Options;
use tracing::debug;

use crate::config::PreviewConfig;
use crate::error::RenderError;
use crate::gate::default_admit;
use crate::registry::build_stage_list;
use crate::stage::{Pass, Stage};

/// Run the whole pipeline for one document.
///
/// An absent document renders like the empty string. Both passes build their
/// stage list fresh, apply the configured filter once, and run the surviving
/// stages in order; the first stage error aborts the render. The returned
/// element is the container `div` holding the gated output.
pub fn render(source: Option<&str>, config: &PreviewConfig) -> Result<Element, RenderError> {
    let source = source.unwrap_or_default();

    let source_stages = filtered(Pass::Source, config);
    let mut options = Options::empty();
    let mut text = source.to_owned();
    for stage in &source_stages {
        // A filter may hand back stages of the wrong kind; they are skipped
        // because a stage belongs to exactly one pass.
        let Stage::Source(transform) = stage else {
            continue;
        };
        options |= transform.parser_options();
        text = transform
            .rewrite(text)
            .map_err(|err| RenderError::SourceStage {
                stage: transform.name().to_owned(),
                source: err,
            })?;
    }

    let mut root = build_tree(&text, options);

    let tree_stages = filtered(Pass::Tree, config);
    for stage in &tree_stages {
        let Stage::Tree(transform) = stage else {
            continue;
        };
        transform
            .transform(&mut root)
            .map_err(|err| RenderError::TreeStage {
                stage: transform.name().to_owned(),
                source: err,
            })?;
    }

    Ok(materialize(root, config))
}

fn filtered(pass: Pass, config: &PreviewConfig) -> Vec<Stage> {
    let list = build_stage_list(pass, config);
    let list = match &config.filter {
        Some(filter) => filter(pass, list),
        None => list,
    };
    debug!(
        %pass,
        stages = ?list.iter().map(Stage::name).collect::<Vec<_>>(),
        "assembled stage list"
    );
    list
}

/// Gate the tree and wrap the survivors in the container element.
fn materialize(root: Element, config: &PreviewConfig) -> Element {
    let mut container = Element::new("div");
    let mut class = config.prefix_class.clone();
    if let Some(extra) = &config.class {
        class.push(' ');
        class.push_str(extra);
    }
    container.set_attr("class", class);
    if let Some(style) = &config.style {
        container.set_attr("style", style.clone());
    }
    container.set_attr("data-color-mode", config.color_mode.as_str());
    for (name, value) in &config.wrapper_attrs {
        container.set_attr(name.clone(), value.clone());
    }

    container.children = match &config.gate {
        Some(gate) => gate_nodes(root.children, None, gate.as_ref()),
        None => gate_nodes(root.children, None, &default_admit),
    };
    container
}

/// Apply the gate to every element, parents before children. A rejected
/// element takes its whole subtree with it; comments and leftover raw nodes
/// never reach output.
fn gate_nodes(
    nodes: Vec<Node>,
    parent: Option<&Element>,
    admit: &dyn Fn(&Element, usize, Option<&Element>) -> bool,
) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for (index, node) in nodes.into_iter().enumerate() {
        match node {
            Node::Element(mut el) => {
                if !admit(&el, index, parent) {
                    continue;
                }
                let children = std::mem::take(&mut el.children);
                el.children = gate_nodes(children, Some(&el), admit);
                out.push(Node::Element(el));
            }
            Node::Text(text) => out.push(Node::Text(text)),
            Node::Comment(_) | Node::Raw(_) => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_document() {
        let container = render(Some(""), &PreviewConfig::default()).unwrap();
        assert_eq!(container.tag, "div");
        assert!(container.children.is_empty());
    }

    #[test]
    fn test_absent_document_renders_like_empty() {
        let absent = render(None, &PreviewConfig::default()).unwrap();
        let empty = render(Some(""), &PreviewConfig::default()).unwrap();
        assert_eq!(absent, empty);
    }

    #[test]
    fn test_container_attributes() {
        let config = PreviewConfig::default()
            .with_class("docs")
            .with_style("padding: 1em")
            .with_color_mode(crate::config::ColorMode::Dark)
            .with_wrapper_attr("data-testid", "preview");
        let container = render(Some("hi"), &config).unwrap();
        assert_eq!(container.attr("class"), Some("md-preview docs"));
        assert_eq!(container.attr("style"), Some("padding: 1em"));
        assert_eq!(container.attr("data-color-mode"), Some("dark"));
        assert_eq!(container.attr("data-testid"), Some("preview"));
    }

    #[test]
    fn test_gate_rejection_discards_subtree() {
        let config = PreviewConfig::default().with_gate(|el, _, _| el.tag != "p");
        let container = render(Some("# Kept\n\ndropped"), &config).unwrap();
        let tags: Vec<_> = container
            .children
            .iter()
            .filter_map(|n| n.as_element().map(|el| el.tag.as_str()))
            .collect();
        assert_eq!(tags, ["h1"]);
    }

    #[test]
    fn test_gate_receives_parent_and_index() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let seen: Rc<RefCell<Vec<(String, usize, Option<String>)>>> =
            Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let config = PreviewConfig::default().with_gate(move |el, index, parent| {
            log.borrow_mut().push((
                el.tag.clone(),
                index,
                parent.map(|p| p.tag.clone()),
            ));
            true
        });
        render(Some("*a*"), &config).unwrap();
        let seen = seen.borrow();
        assert_eq!(seen[0], ("p".to_owned(), 0, None));
        assert_eq!(seen[1], ("em".to_owned(), 0, Some("p".to_owned())));
    }
}
