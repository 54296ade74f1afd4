//! Locating mentions by character-offset range.

use crate::document::AnnotatedDocument;
use crate::head::find_head;
use crate::mention::{Mention, MentionId, MentionSource, Reference, ReferenceIdx};
use crate::token::TokenRef;
use crate::{AnnotationError, AnnotationResult};

impl AnnotatedDocument {
    /// The mention covering `[start, start + length)`, synthesizing one if
    /// none exists yet.
    ///
    /// Tokens are collected from `start` onward while they end within the
    /// range and stay in one sentence. The first collected token that
    /// already belongs to a mention decides the result. Otherwise the
    /// collected tokens become a new single-mention reference. Returns
    /// `None` when the range covers no token, and an error when the range
    /// reaches past the last token of the document.
    pub fn find_or_create_mention(
        &mut self,
        start: usize,
        length: usize,
    ) -> AnnotationResult<Option<MentionId>> {
        let Some(limit) = start.checked_add(length) else {
            return Err(AnnotationError::OffsetPastEnd {
                offset: start,
                text_len: self.text_len,
            });
        };
        let mut pointer = start;
        let mut found: Vec<TokenRef> = Vec::new();

        while pointer < limit {
            let Some((_, &token_ref)) = self.tokens_by_offset.range(pointer..).next() else {
                return Err(AnnotationError::OffsetPastEnd {
                    offset: pointer,
                    text_len: self.text_len,
                });
            };
            let Some(token) = self.token(token_ref) else {
                break;
            };
            if token.end > limit {
                break;
            }
            if found.first().map_or(false, |first| first.sentence != token_ref.sentence) {
                break;
            }
            found.push(token_ref);
            if let Some(mention) = token.mention {
                return Ok(Some(mention));
            }
            pointer = token.end.max(pointer.saturating_add(1));
        }

        let Some(first) = found.first() else {
            return Ok(None);
        };
        let sentence_id = first.sentence;
        let token_ids: Vec<usize> = found.iter().map(|t| t.token).collect();
        let head = self
            .sentence(sentence_id)
            .and_then(|sentence| find_head(sentence, &token_ids));

        let mention_id = MentionId(self.mentions.len());
        self.mentions.push(Mention::new(
            sentence_id,
            token_ids,
            head,
            MentionSource::Offset,
        ));
        let idx = ReferenceIdx(self.references.len());
        self.references
            .push(Reference::new(self.counter.next_id(), vec![mention_id]));
        self.link_reference(idx);

        log::debug!(
            "synthesized mention {} for offsets {}..{}",
            mention_id,
            start,
            limit
        );
        Ok(Some(mention_id))
    }
}
