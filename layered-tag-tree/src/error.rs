//! Error types for tag tree construction.

use thiserror::Error;

/// Errors raised while building a [`TagNode`](crate::TagNode) tree.
#[derive(Debug, Error)]
pub enum TagTreeError {
    /// The underlying XML reader rejected the input.
    #[error("xml syntax error: {0}")]
    Syntax(#[from] quick_xml::Error),

    /// A closing tag appeared with no matching open tag.
    #[error("unexpected closing tag </{found}>")]
    UnexpectedClose { found: String },

    /// The input ended while a tag was still open.
    #[error("unclosed tag <{0}> at end of input")]
    Unclosed(String),
}

/// Result type for tag tree operations.
pub type TagTreeResult<T> = Result<T, TagTreeError>;
