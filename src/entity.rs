//! Named-entity segmentation.
//!
//! Runs of adjacent tokens sharing one NER tag become a single entity:
//!
//! ```text
//! Barack   Obama    met  Angela   Merkel
//! PERSON   PERSON   O    PERSON   PERSON
//! ╰──────────────╯       ╰──────────────╯
//!    entity 0               entity 1
//! ```

use crate::config::ReaderConfig;
use crate::head::find_head;
use crate::sentence::Sentence;

/// A contiguous named-entity span with its syntactic head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub sentence_id: usize,
    pub ner: String,
    /// Token ids in order
    pub tokens: Vec<usize>,
    pub head: usize,
}

impl Entity {
    /// The `(sentence_id, head)` dedup key.
    pub fn signature(&self) -> (usize, usize) {
        (self.sentence_id, self.head)
    }
}

/// Groups NER-tagged tokens of a sentence into [`Entity`] spans.
#[derive(Debug, Clone, Default)]
pub struct EntitySegmenter {
    exclude_ordinal_ners: bool,
}

impl EntitySegmenter {
    pub fn new(config: &ReaderConfig) -> Self {
        Self {
            exclude_ordinal_ners: config.exclude_ordinal_ners,
        }
    }

    pub fn with_exclude_ordinal_ners(mut self, exclude: bool) -> Self {
        self.exclude_ordinal_ners = exclude;
        self
    }

    /// Tag of a token as seen by segmentation.
    fn effective_label<'a>(&self, ner: Option<&'a str>) -> Option<&'a str> {
        let ner = ner?;
        if self.exclude_ordinal_ners && crate::config::EXCLUDED_NER_TYPES.contains(ner) {
            None
        } else {
            Some(ner)
        }
    }

    /// Spans of the sentence before head finding: `(tag, token ids)`.
    /// Spans never bridge a gap in token ids.
    pub fn spans(&self, sentence: &Sentence) -> Vec<(String, Vec<usize>)> {
        let mut spans: Vec<(String, Vec<usize>)> = Vec::new();
        let mut open: Option<(String, Vec<usize>)> = None;
        let mut previous: Option<&str> = None;
        let mut previous_id = 0;

        for token in sentence.words() {
            let label = self.effective_label(token.ner.as_deref());
            // a gap in token ids (a dropped token) ends any open span
            if token.id != previous_id + 1 {
                spans.extend(open.take());
                previous = None;
            }
            previous_id = token.id;
            if label == previous {
                if let Some((_, tokens)) = open.as_mut() {
                    tokens.push(token.id);
                }
                continue;
            }
            spans.extend(open.take());
            if let Some(label) = label {
                open = Some((label.to_string(), vec![token.id]));
            }
            previous = label;
        }
        spans.extend(open);
        spans
    }

    /// Replace the sentence's entities with freshly segmented ones and
    /// record each member token's entity index. Returns the entity count.
    pub fn segment(&self, sentence: &mut Sentence) -> usize {
        for token in sentence.tokens.iter_mut() {
            token.entity_idx = None;
        }

        let mut entities = Vec::new();
        for (ner, tokens) in self.spans(sentence) {
            match find_head(sentence, &tokens) {
                Some(head) => entities.push(Entity {
                    sentence_id: sentence.id,
                    ner,
                    tokens,
                    head,
                }),
                None => log::debug!(
                    "sentence {}: dropping headless {} entity '{}'",
                    sentence.id,
                    ner,
                    sentence.span_text(&tokens)
                ),
            }
        }

        for (idx, entity) in entities.iter().enumerate() {
            for id in &entity.tokens {
                if let Some(token) = sentence.token_mut(*id) {
                    token.entity_idx = Some(idx);
                }
            }
        }
        let count = entities.len();
        sentence.entities = entities;
        count
    }
}
