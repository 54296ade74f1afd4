#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Annotated document graphs for linguistic pipeline output.
//!
//! This crate reads the per-document output of an annotation pipeline
//! (tokens, tags, dependency edges, coreference chains and constituency
//! parses in CoreNLP-style XML) plus an optional entity-disambiguation
//! result, and builds one queryable graph:
//!
//! ```text
//! AnnotatedDocument
//! ├── Sentence (0 = placeholder, then 1..)
//! │   ├── Token (0 = ROOT) ── parents / children (dependency tree)
//! │   └── Entity (contiguous NER span + head)
//! ├── Mention  (token span, head, knowledge-base link)
//! └── Reference (deduplicated mentions, voted identity)
//! ```
//!
//! ## Modules
//!
//! - [`dependency`] - cycle-safe dependency tree construction
//! - [`entity`] - named-entity segmentation
//! - [`head`] - syntactic heads of token spans
//! - [`coreference`] - annotator coreference chains
//! - [`merge`] - merging entities and chains into references
//! - [`disambiguation`] - knowledge-base linking by majority vote
//! - [`parse_tree`] - constituency parses
//! - [`snapshot`] - RON / JSON snapshots of a document
//!
//! ## Example
//!
//! ```
//! use layered_annotations::{AnnotatedDocument, ReaderConfig};
//!
//! let xml = r#"<root><document><sentences>
//!   <sentence id="1"><tokens>
//!     <token id="1"><word>Paris</word><lemma>Paris</lemma><POS>NNP</POS>
//!       <NER>LOCATION</NER><CharacterOffsetBegin>0</CharacterOffsetBegin>
//!       <CharacterOffsetEnd>5</CharacterOffsetEnd></token>
//!   </tokens></sentence>
//! </sentences></document></root>"#;
//!
//! let doc = AnnotatedDocument::from_xml(xml, ReaderConfig::default()).unwrap();
//! assert_eq!(doc.sentences()[0].as_text(), "Paris");
//! assert_eq!(doc.references().len(), 1);
//! ```

mod config;
pub mod coreference;
pub mod dependency;
pub mod disambiguation;
mod document;
pub mod entity;
mod error;
pub mod head;
pub mod mention;
pub mod merge;
mod offset;
pub mod parse_tree;
mod reader;
mod sentence;
pub mod snapshot;
mod token;

#[cfg(test)]
mod tests;

pub use config::{DependencyKind, ReaderConfig, EXCLUDED_NER_TYPES};
pub use coreference::{ChainMention, CorefChain, CorefMentionSpec, MAX_MENTION_TOKENS};
pub use dependency::DependencyEdge;
pub use disambiguation::DisambiguationResult;
pub use document::AnnotatedDocument;
pub use entity::{Entity, EntitySegmenter};
pub use error::{AnnotationError, AnnotationResult};
pub use head::find_head;
pub use mention::{KbLink, Mention, MentionId, MentionSource, Reference, ReferenceIdx};
pub use parse_tree::ParseTree;
pub use sentence::Sentence;
pub use token::{DepLink, Token, TokenRef};

pub use layered_tag_tree::TagNode;
