//! Core types for the snapshot format.

use serde::{Deserialize, Serialize};

/// Stable identifier within a snapshot.
///
/// IDs follow the pattern `{prefix}-{index}`:
/// - `m-3` - the mention at arena index 3
/// - `r-0` - the reference with document id 0
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct SnapshotId(pub String);

impl SnapshotId {
    pub fn new(prefix: &str, index: usize) -> Self {
        Self(format!("{}-{}", prefix, index))
    }

    pub fn mention(index: usize) -> Self {
        Self::new("m", index)
    }

    pub fn reference(id: u32) -> Self {
        Self::new("r", id as usize)
    }

    /// The prefix part of the ID (e.g. "m" from "m-3").
    pub fn prefix(&self) -> Option<&str> {
        self.0.split('-').next()
    }

    /// The index part of the ID (e.g. 3 from "m-3").
    pub fn index(&self) -> Option<usize> {
        self.0.split('-').last()?.parse().ok()
    }
}

impl std::fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSnapshot {
    pub id: usize,
    pub word: String,
    pub lemma: String,
    pub pos: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ner: Option<String>,
    pub begin: usize,
    pub end: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mention: Option<SnapshotId>,
}

/// An accepted dependency edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    pub relation: String,
    pub governor: usize,
    pub dependent: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub ner: String,
    pub tokens: Vec<usize>,
    pub head: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceSnapshot {
    pub id: usize,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<EntitySnapshot>,
    /// Only filled when the builder includes tokens
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tokens: Vec<TokenSnapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<EdgeSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentionSnapshot {
    pub id: SnapshotId,
    pub sentence: usize,
    pub start: usize,
    pub end: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<usize>,
    pub text: String,
    /// NER tag, `COREF` or `OFFSET`
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kb_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSnapshot {
    pub id: SnapshotId,
    pub representative: SnapshotId,
    /// Surface text of the representative mention
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kb_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    pub mentions: Vec<MentionSnapshot>,
}

/// The canonical snapshot storage format.
///
/// # Determinism
///
/// - sentences appear in document order
/// - references appear in arena order, mentions by position
/// - IDs derive from arena indices and reference ids only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    /// Schema version for forward compatibility
    pub version: u32,
    pub sentences: Vec<SentenceSnapshot>,
    pub references: Vec<ReferenceSnapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disambiguated: Vec<SnapshotId>,
}

impl Default for DocumentSnapshot {
    fn default() -> Self {
        Self {
            version: 1,
            sentences: Vec::new(),
            references: Vec::new(),
            disambiguated: Vec::new(),
        }
    }
}

impl DocumentSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a document without token detail.
    pub fn from_document(doc: &crate::AnnotatedDocument) -> Self {
        crate::snapshot::SnapshotBuilder::new(doc).build()
    }

    /// Serialize to a RON string.
    pub fn to_ron_string(&self) -> Result<String, ron::Error> {
        let config = ron::ser::PrettyConfig::new()
            .depth_limit(6)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        ron::ser::to_string_pretty(self, config)
    }

    /// Deserialize from a RON string.
    pub fn from_ron_string(s: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json_string(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    pub fn mention_count(&self) -> usize {
        self.references.iter().map(|r| r.mentions.len()).sum()
    }

    pub fn find_reference(&self, id: &SnapshotId) -> Option<&ReferenceSnapshot> {
        self.references.iter().find(|r| &r.id == id)
    }
}
