//! Error types for tree parsing.

/// Error while parsing an HTML fragment into tree nodes.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TreeError {
    /// XML parsing error, including mismatched closing tags.
    #[error("HTML parse error")]
    Parse(#[from] quick_xml::Error),

    /// Malformed attribute, e.g. a duplicated name.
    #[error("attribute error")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    /// Encoding error during parsing.
    #[error("encoding error")]
    Encoding(#[from] quick_xml::encoding::EncodingError),
}
