//! Preview configuration.

use std::fmt;
use std::rc::Rc;

use crate::gate::GateFn;
use crate::stage::{Pass, Stage};

/// Color scheme marker emitted on the container as `data-color-mode`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Light scheme (the default).
    #[default]
    Light,
    /// Dark scheme.
    Dark,
}

impl ColorMode {
    /// The attribute value for this mode.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

/// Options for the built-in highlight stage.
#[derive(Clone, Copy, Debug)]
pub struct HighlightOptions {
    /// Leave code blocks with an unrecognized language untouched instead of
    /// failing the render. On by default.
    pub ignore_missing: bool,
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self {
            ignore_missing: true,
        }
    }
}

/// Comment delimiters recognized by the ignore stage.
#[derive(Clone, Debug)]
pub struct IgnoreMarkers {
    /// Comment text opening an ignored region.
    pub open: String,
    /// Comment text closing an ignored region.
    pub close: String,
}

impl Default for IgnoreMarkers {
    fn default() -> Self {
        Self {
            open: "ignore:start".to_owned(),
            close: "ignore:end".to_owned(),
        }
    }
}

/// A scroll event forwarded to the configured callback.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollEvent {
    /// Scroll offset of the container, in pixels.
    pub offset: f64,
}

/// A pointer-over event forwarded to the configured callback.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    /// Horizontal position within the container.
    pub x: f64,
    /// Vertical position within the container.
    pub y: f64,
}

/// Stage-list override: receives the assembled list for a pass and returns
/// the list to actually run. Returning an empty list disables the pass.
pub type FilterFn = Rc<dyn Fn(Pass, Vec<Stage>) -> Vec<Stage>>;

/// Configuration for one preview component.
///
/// Immutable for the duration of one render; swap in a new value between
/// renders with [`crate::Preview::set_config`].
#[derive(Clone)]
pub struct PreviewConfig {
    /// Class-name prefix for the container element.
    pub prefix_class: String,
    /// Extra CSS class appended after the prefix.
    pub class: Option<String>,
    /// Inline style payload for the container.
    pub style: Option<String>,
    /// Additional attributes set on the container.
    pub wrapper_attrs: Vec<(String, String)>,
    /// Color scheme marker.
    pub color_mode: ColorMode,
    /// Highlight stage options.
    pub highlight: HighlightOptions,
    /// Comment channel name read by the attribute stage.
    pub attr_channel: String,
    /// Comment delimiters for ignored regions.
    pub ignore_markers: IgnoreMarkers,
    /// Extra source-pass stages, appended after the built-ins.
    pub source_stages: Vec<Stage>,
    /// Extra tree-pass stages, appended after the built-ins.
    pub tree_stages: Vec<Stage>,
    /// Stage-list override, invoked once per pass.
    pub filter: Option<FilterFn>,
    /// Element gate override. Fully replaces the default rule.
    pub gate: Option<GateFn>,
    /// Scroll callback, invoked synchronously on dispatch.
    pub on_scroll: Option<Rc<dyn Fn(&ScrollEvent)>>,
    /// Pointer-over callback, invoked synchronously on dispatch.
    pub on_pointer_over: Option<Rc<dyn Fn(&PointerEvent)>>,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            prefix_class: "md-preview".to_owned(),
            class: None,
            style: None,
            wrapper_attrs: Vec::new(),
            color_mode: ColorMode::default(),
            highlight: HighlightOptions::default(),
            attr_channel: "attr".to_owned(),
            ignore_markers: IgnoreMarkers::default(),
            source_stages: Vec::new(),
            tree_stages: Vec::new(),
            filter: None,
            gate: None,
            on_scroll: None,
            on_pointer_over: None,
        }
    }
}

impl PreviewConfig {
    /// Set the extra CSS class.
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Set the inline style payload.
    #[must_use]
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    /// Add a container attribute.
    #[must_use]
    pub fn with_wrapper_attr(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.wrapper_attrs.push((name.into(), value.into()));
        self
    }

    /// Set the color scheme marker.
    #[must_use]
    pub fn with_color_mode(mut self, mode: ColorMode) -> Self {
        self.color_mode = mode;
        self
    }

    /// Set the highlight stage options.
    #[must_use]
    pub fn with_highlight(mut self, options: HighlightOptions) -> Self {
        self.highlight = options;
        self
    }

    /// Set the comment channel name for the attribute stage.
    #[must_use]
    pub fn with_attr_channel(mut self, channel: impl Into<String>) -> Self {
        self.attr_channel = channel.into();
        self
    }

    /// Set the ignore-region comment delimiters.
    #[must_use]
    pub fn with_ignore_markers(
        mut self,
        open: impl Into<String>,
        close: impl Into<String>,
    ) -> Self {
        self.ignore_markers = IgnoreMarkers {
            open: open.into(),
            close: close.into(),
        };
        self
    }

    /// Append an extra stage to its pass's list.
    #[must_use]
    pub fn with_stage(mut self, stage: Stage) -> Self {
        match stage.pass() {
            Pass::Source => self.source_stages.push(stage),
            Pass::Tree => self.tree_stages.push(stage),
        }
        self
    }

    /// Set the stage-list override.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Fn(Pass, Vec<Stage>) -> Vec<Stage> + 'static) -> Self {
        self.filter = Some(Rc::new(filter));
        self
    }

    /// Set the element gate override.
    #[must_use]
    pub fn with_gate(
        mut self,
        gate: impl Fn(&mdpreview_tree::Element, usize, Option<&mdpreview_tree::Element>) -> bool
        + 'static,
    ) -> Self {
        self.gate = Some(Rc::new(gate));
        self
    }

    /// Set the scroll callback.
    #[must_use]
    pub fn with_on_scroll(mut self, callback: impl Fn(&ScrollEvent) + 'static) -> Self {
        self.on_scroll = Some(Rc::new(callback));
        self
    }

    /// Set the pointer-over callback.
    #[must_use]
    pub fn with_on_pointer_over(mut self, callback: impl Fn(&PointerEvent) + 'static) -> Self {
        self.on_pointer_over = Some(Rc::new(callback));
        self
    }
}

impl fmt::Debug for PreviewConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewConfig")
            .field("prefix_class", &self.prefix_class)
            .field("class", &self.class)
            .field("style", &self.style)
            .field("wrapper_attrs", &self.wrapper_attrs)
            .field("color_mode", &self.color_mode)
            .field("highlight", &self.highlight)
            .field("attr_channel", &self.attr_channel)
            .field("ignore_markers", &self.ignore_markers)
            .field("source_stages", &self.source_stages)
            .field("tree_stages", &self.tree_stages)
            .field("filter", &self.filter.as_ref().map(|_| "<filter>"))
            .field("gate", &self.gate.as_ref().map(|_| "<gate>"))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = PreviewConfig::default();
        assert_eq!(config.prefix_class, "md-preview");
        assert_eq!(config.attr_channel, "attr");
        assert_eq!(config.ignore_markers.open, "ignore:start");
        assert_eq!(config.ignore_markers.close, "ignore:end");
        assert!(config.highlight.ignore_missing);
        assert_eq!(config.color_mode, ColorMode::Light);
        assert!(config.filter.is_none());
        assert!(config.gate.is_none());
    }

    #[test]
    fn test_with_stage_routes_by_pass() {
        struct Noop;
        impl crate::stage::SourceTransform for Noop {
            fn name(&self) -> &str {
                "noop"
            }
        }
        let config = PreviewConfig::default().with_stage(Stage::source(Noop));
        assert_eq!(config.source_stages.len(), 1);
        assert!(config.tree_stages.is_empty());
    }

    #[test]
    fn test_color_mode_attribute_values() {
        assert_eq!(ColorMode::Light.as_str(), "light");
        assert_eq!(ColorMode::Dark.as_str(), "dark");
    }
}
