//! Mentions, references and the per-document reference id counter.
//!
//! ```text
//! Barack Obama met Angela Merkel. He praised her.
//! ╰──────────╯     ╰───────────╯  ╰╯         ╰─╯
//!  m0 (ref 0)       m2 (ref 1)    m1 (ref 0) m3 (ref 1)
//! ```
//!
//! Mentions and references live in flat arenas on the document and point at
//! each other through [`MentionId`] and [`ReferenceIdx`].

use std::fmt;

/// Index of a mention in the document's mention arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MentionId(pub usize);

/// Index of a reference in the document's reference arena.
///
/// Not to be confused with [`Reference::id`], the document-unique id
/// assigned by the [`ReferenceIdCounter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReferenceIdx(pub usize);

impl fmt::Display for MentionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}", self.0)
    }
}

impl fmt::Display for ReferenceIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Where a mention came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MentionSource {
    /// A named-entity span with its tag
    NamedEntity { ner: String },
    /// A mention of an annotator coreference chain
    Coreference,
    /// Synthesized from a character-offset range
    Offset,
}

impl MentionSource {
    pub fn label(&self) -> &str {
        match self {
            MentionSource::NamedEntity { ner } => ner,
            MentionSource::Coreference => "COREF",
            MentionSource::Offset => "OFFSET",
        }
    }
}

/// Knowledge-base identity assigned to a single mention.
#[derive(Debug, Clone, PartialEq)]
pub struct KbLink {
    pub kb_identifier: String,
    pub disambiguation_score: f64,
    pub types: Vec<String>,
}

/// One occurrence of a referring expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Mention {
    pub sentence_id: usize,
    /// Token ids in span order
    pub tokens: Vec<usize>,
    /// Smallest token id of the span
    pub start: usize,
    /// Largest token id of the span
    pub end: usize,
    pub head: Option<usize>,
    /// Owning reference, set when references are linked
    pub reference: Option<ReferenceIdx>,
    pub source: MentionSource,
    pub kb: Option<KbLink>,
}

impl Mention {
    pub fn new(
        sentence_id: usize,
        tokens: Vec<usize>,
        head: Option<usize>,
        source: MentionSource,
    ) -> Self {
        let mut mention = Self {
            sentence_id,
            tokens,
            start: 0,
            end: 0,
            head,
            reference: None,
            source,
            kb: None,
        };
        mention.update_bounds();
        mention
    }

    /// Recompute [`start`](Self::start) and [`end`](Self::end) from the
    /// token span.
    pub fn update_bounds(&mut self) {
        self.start = self.tokens.iter().copied().min().unwrap_or(0);
        self.end = self.tokens.iter().copied().max().unwrap_or(0);
    }

    /// The `(sentence_id, head)` dedup key, absent for headless mentions.
    pub fn signature(&self) -> Option<(usize, usize)> {
        self.head.map(|head| (self.sentence_id, head))
    }
}

/// A deduplicated group of mentions denoting one real-world entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    /// Document-unique id
    pub id: u32,
    pub mentions: Vec<MentionId>,
    pub representative: MentionId,
    pub kb_identifier: Option<String>,
    pub types: Vec<String>,
}

impl Reference {
    /// A reference over `mentions`, represented by the first one.
    ///
    /// `mentions` must not be empty.
    pub fn new(id: u32, mentions: Vec<MentionId>) -> Self {
        let representative = mentions.first().copied().unwrap_or(MentionId(0));
        Self {
            id,
            mentions,
            representative,
            kb_identifier: None,
            types: Vec::new(),
        }
    }

    pub fn with_representative(mut self, representative: MentionId) -> Self {
        self.representative = representative;
        self
    }

    pub fn is_disambiguated(&self) -> bool {
        self.kb_identifier.is_some()
    }
}

/// Monotonic source of reference ids, one per document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceIdCounter {
    next: u32,
}

impl ReferenceIdCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// How many ids have been handed out.
    pub fn issued(&self) -> u32 {
        self.next
    }
}
