//! Serializable document snapshots.
//!
//! A [`DocumentSnapshot`] is a plain-data view of an [`AnnotatedDocument`]
//! with every cross link replaced by a stable id, so it can be stored as
//! RON or JSON and compared across runs.
//!
//! # Key Types
//!
//! - [`DocumentSnapshot`] - canonical storage format
//! - [`SnapshotBuilder`] - traverses a document and produces a snapshot
//! - [`SnapshotId`] - stable identifier (e.g. "r-0", "m-3")
//!
//! # Example
//!
//! ```
//! use layered_annotations::{AnnotatedDocument, ReaderConfig};
//! use layered_annotations::snapshot::{DocumentSnapshot, SnapshotBuilder};
//!
//! let doc = AnnotatedDocument::new(ReaderConfig::default());
//! let snapshot = SnapshotBuilder::new(&doc).with_tokens().build();
//! let ron = snapshot.to_ron_string().unwrap();
//! assert_eq!(DocumentSnapshot::from_ron_string(&ron).unwrap(), snapshot);
//! ```
//!
//! [`AnnotatedDocument`]: crate::AnnotatedDocument

mod construction;
mod types;

pub use construction::SnapshotBuilder;
pub use types::{
    DocumentSnapshot, EdgeSnapshot, EntitySnapshot, MentionSnapshot, ReferenceSnapshot,
    SentenceSnapshot, SnapshotId, TokenSnapshot,
};
