//! Error types for annotation ingestion and graph construction.
//!
//! Only structural problems are errors. Recoverable data-quality issues
//! (malformed tokens, cyclic dependency edges, mentions without identity
//! data) are logged and skipped instead.

use thiserror::Error;

use layered_tag_tree::TagTreeError;

/// Errors that can occur while building or querying a document graph.
#[derive(Debug, Error)]
pub enum AnnotationError {
    /// Configuration named a dependency variant that does not exist.
    #[error(
        "unknown dependency variant '{0}': expected one of \"basic\", \"collapsed\", or \"collapsed-ccprocessed\""
    )]
    UnknownDependencyKind(String),

    /// Disambiguation data was supplied without the annotation it refers to.
    #[error("disambiguation input supplied without annotation input")]
    DisambiguationWithoutAnnotation,

    /// An edge or mention referenced a token the sentence does not have.
    #[error("sentence {sentence}: no token with index {index}")]
    InvalidTokenIndex { sentence: usize, index: usize },

    /// A mention referenced a sentence the document does not have.
    #[error("no sentence with id {0}")]
    InvalidSentenceIndex(usize),

    /// Required annotation structure is present but unusable.
    #[error("malformed annotation: {0}")]
    Malformed(String),

    /// An offset walk ran past the last token of the document.
    #[error("no token at or after offset {offset}: document text ends at {text_len}")]
    OffsetPastEnd { offset: usize, text_len: usize },

    /// The annotation markup could not be parsed.
    #[error(transparent)]
    Markup(#[from] TagTreeError),

    /// The disambiguation result could not be decoded.
    #[error("invalid disambiguation json: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration file could not be decoded.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// An input file could not be read.
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },
}

/// Result type for annotation operations.
pub type AnnotationResult<T> = Result<T, AnnotationError>;
