//! Configurable markdown preview pipeline.
//!
//! Converts a markdown document into a sanitized, annotated render tree in
//! two passes: a source pass over the raw text (parser options and text
//! rewrites) and a tree pass over the parsed tree (highlighting, raw-HTML
//! admission, heading slugs and anchors, ignore regions, attribute
//! comments). Every pipeline seam is open to callers:
//!
//! - extra [`Stage`]s append to either pass's built-in list;
//! - a [`FilterFn`] rewrites a pass's assembled stage list wholesale, up to
//!   disabling the pass by returning an empty list;
//! - a [`GateFn`] replaces the default element admission rule applied when
//!   the final tree is materialized.
//!
//! [`render`] is the one-shot entry point; [`Preview`] wraps it in a mounted
//! component whose [`PreviewHandle`] exposes the configuration and a live
//! reference to the rendered container across re-renders.
//!
//! ```
//! use mdpreview::{PreviewConfig, render};
//! use mdpreview_tree::to_html;
//!
//! let container = render(Some("# Title"), &PreviewConfig::default())?;
//! assert!(to_html(&container).contains("<h1 id=\"title\">"));
//! # Ok::<(), mdpreview::RenderError>(())
//! ```

mod config;
mod error;
mod gate;
mod preview;
mod registry;
mod runner;
mod stage;
pub mod stages;

pub use config::{
    ColorMode, FilterFn, HighlightOptions, IgnoreMarkers, PointerEvent, PreviewConfig,
    ScrollEvent,
};
pub use error::{RenderError, StageError};
pub use gate::{GateFn, default_admit};
pub use preview::{ContainerRef, Preview, PreviewHandle};
pub use registry::build_stage_list;
pub use runner::render;
pub use stage::{Pass, SourceTransform, Stage, TreeTransform};

pub use mdpreview_tree as tree;
