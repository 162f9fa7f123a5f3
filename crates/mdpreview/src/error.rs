//! Error types for the pipeline.

use thiserror::Error;

/// An error raised by a transform stage.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StageError {
    /// A fenced code block names a language the highlighter does not know
    /// and unknown languages are not tolerated.
    #[error("unknown code block language `{0}`")]
    UnknownLanguage(String),

    /// Embedded raw HTML could not be admitted into the tree.
    #[error("raw HTML admission failed")]
    RawHtml(#[from] mdpreview_tree::TreeError),

    /// A caller-supplied stage failed with its own message.
    #[error("{0}")]
    Message(String),
}

impl StageError {
    /// Create a [`StageError::Message`] from anything string-like.
    pub fn message(msg: impl Into<String>) -> Self {
        Self::Message(msg.into())
    }
}

/// A fatal render failure.
///
/// The first stage error aborts the render; no partial tree is produced.
/// The variant records which pass the failing stage belonged to.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RenderError {
    /// A source-pass stage failed while rewriting the document text.
    #[error("source stage `{stage}` failed")]
    SourceStage {
        /// Name of the failing stage.
        stage: String,
        #[source]
        source: StageError,
    },

    /// A tree-pass stage failed while transforming the parsed tree.
    #[error("tree stage `{stage}` failed")]
    TreeStage {
        /// Name of the failing stage.
        stage: String,
        #[source]
        source: StageError,
    },
}
