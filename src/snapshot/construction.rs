//! Snapshot construction from an [`AnnotatedDocument`].

use crate::document::AnnotatedDocument;
use crate::mention::{MentionId, ReferenceIdx};
use crate::sentence::Sentence;

use super::types::{
    DocumentSnapshot, EdgeSnapshot, EntitySnapshot, MentionSnapshot, ReferenceSnapshot,
    SentenceSnapshot, SnapshotId, TokenSnapshot,
};

/// Builder for constructing snapshots from documents.
///
/// By default only sentence text, entities and references are captured.
/// [`with_tokens`](Self::with_tokens) adds per-token detail and the
/// accepted dependency edges.
pub struct SnapshotBuilder<'a> {
    doc: &'a AnnotatedDocument,
    include_tokens: bool,
}

impl<'a> SnapshotBuilder<'a> {
    pub fn new(doc: &'a AnnotatedDocument) -> Self {
        Self {
            doc,
            include_tokens: false,
        }
    }

    pub fn with_tokens(mut self) -> Self {
        self.include_tokens = true;
        self
    }

    pub fn build(&self) -> DocumentSnapshot {
        let sentences = self
            .doc
            .sentences()
            .iter()
            .map(|s| self.sentence(s))
            .collect();
        let references = (0..self.doc.references().len())
            .filter_map(|idx| self.reference(ReferenceIdx(idx)))
            .collect();
        let disambiguated = self
            .doc
            .disambiguated_references()
            .map(|r| SnapshotId::reference(r.id))
            .collect();

        DocumentSnapshot {
            sentences,
            references,
            disambiguated,
            ..DocumentSnapshot::default()
        }
    }

    fn sentence(&self, sentence: &Sentence) -> SentenceSnapshot {
        let entities = sentence
            .entities
            .iter()
            .map(|e| EntitySnapshot {
                ner: e.ner.clone(),
                tokens: e.tokens.clone(),
                head: e.head,
                text: sentence.span_text(&e.tokens),
            })
            .collect();

        let mut snapshot = SentenceSnapshot {
            id: sentence.id,
            text: sentence.as_text(),
            entities,
            tokens: Vec::new(),
            dependencies: Vec::new(),
        };
        if !self.include_tokens {
            return snapshot;
        }

        for token in sentence.words() {
            snapshot.tokens.push(TokenSnapshot {
                id: token.id,
                word: token.word.clone(),
                lemma: token.lemma.clone(),
                pos: token.pos.clone(),
                ner: token.ner.clone(),
                begin: token.begin,
                end: token.end,
                mention: token.mention.map(|m| SnapshotId::mention(m.0)),
            });
        }
        for token in &sentence.tokens {
            for link in &token.children {
                snapshot.dependencies.push(EdgeSnapshot {
                    relation: link.relation.clone(),
                    governor: token.id,
                    dependent: link.token,
                });
            }
        }
        snapshot
    }

    fn mention(&self, id: MentionId) -> Option<MentionSnapshot> {
        let mention = self.doc.mention(id)?;
        Some(MentionSnapshot {
            id: SnapshotId::mention(id.0),
            sentence: mention.sentence_id,
            start: mention.start,
            end: mention.end,
            head: mention.head,
            text: self.doc.mention_text(id).unwrap_or_default(),
            source: mention.source.label().to_string(),
            kb_identifier: mention.kb.as_ref().map(|kb| kb.kb_identifier.clone()),
            score: mention.kb.as_ref().map(|kb| kb.disambiguation_score),
        })
    }

    fn reference(&self, idx: ReferenceIdx) -> Option<ReferenceSnapshot> {
        let reference = self.doc.reference(idx)?;
        let mut mentions: Vec<MentionSnapshot> = reference
            .mentions
            .iter()
            .filter_map(|id| self.mention(*id))
            .collect();
        mentions.sort_by_key(|m| (m.sentence, m.start, m.end));

        Some(ReferenceSnapshot {
            id: SnapshotId::reference(reference.id),
            representative: SnapshotId::mention(reference.representative.0),
            text: self.doc.reference_text(idx).unwrap_or_default(),
            kb_identifier: reference.kb_identifier.clone(),
            types: reference.types.clone(),
            mentions,
        })
    }
}
