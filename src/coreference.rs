//! Annotator coreference chains.
//!
//! The annotator emits chains of mention descriptors. A descriptor names a
//! sentence, a token range `[start, end)` and a head token; at most one
//! descriptor per chain carries the representative flag.

use crate::mention::ReferenceIdCounter;
use crate::sentence::Sentence;
use crate::{AnnotationError, AnnotationResult};

/// Mentions spanning more tokens than this are discarded as noise.
pub const MAX_MENTION_TOKENS: usize = 5;

/// A raw coreference mention descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorefMentionSpec {
    pub sentence_id: usize,
    /// First token id of the mention
    pub start: usize,
    /// Token id one past the mention
    pub end: usize,
    pub head: usize,
    pub representative: bool,
}

impl CorefMentionSpec {
    pub fn new(sentence_id: usize, start: usize, end: usize, head: usize) -> Self {
        Self {
            sentence_id,
            start,
            end,
            head,
            representative: false,
        }
    }

    pub fn as_representative(mut self) -> Self {
        self.representative = true;
        self
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A validated mention of a [`CorefChain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainMention {
    pub sentence_id: usize,
    pub tokens: Vec<usize>,
    pub head: usize,
}

impl ChainMention {
    pub fn signature(&self) -> (usize, usize) {
        (self.sentence_id, self.head)
    }
}

/// A coreference chain with at least one mention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorefChain {
    /// Reference id reserved for this chain
    pub id: u32,
    pub mentions: Vec<ChainMention>,
    /// Position of the representative in [`mentions`](Self::mentions)
    pub representative: usize,
}

impl CorefChain {
    pub fn representative_mention(&self) -> &ChainMention {
        &self.mentions[self.representative]
    }

    /// Signature of the representative mention.
    pub fn signature(&self) -> (usize, usize) {
        self.representative_mention().signature()
    }
}

fn check_token(sentence: &Sentence, index: usize) -> AnnotationResult<()> {
    match sentence.token(index) {
        Some(token) if !token.is_root() => Ok(()),
        _ => Err(AnnotationError::InvalidTokenIndex {
            sentence: sentence.id,
            index,
        }),
    }
}

/// `None` when the head or every token of the span was dropped as
/// malformed; other dropped tokens are trimmed from the span.
fn build_mention(
    sentences: &[Sentence],
    spec: &CorefMentionSpec,
) -> AnnotationResult<Option<ChainMention>> {
    let sentence = sentences
        .get(spec.sentence_id)
        .filter(|s| !s.is_placeholder())
        .ok_or(AnnotationError::InvalidSentenceIndex(spec.sentence_id))?;
    if spec.is_empty() {
        return Err(AnnotationError::Malformed(format!(
            "empty coreference mention [{}, {}) in sentence {}",
            spec.start, spec.end, spec.sentence_id
        )));
    }
    let tokens: Vec<usize> = (spec.start..spec.end)
        .filter(|t| !sentence.is_skipped(*t))
        .collect();
    if sentence.is_skipped(spec.head) || tokens.is_empty() {
        log::warn!(
            "sentence {}: dropping coreference mention [{}, {}) on a skipped token",
            spec.sentence_id,
            spec.start,
            spec.end
        );
        return Ok(None);
    }
    for index in tokens.iter().copied().chain(std::iter::once(spec.head)) {
        check_token(sentence, index)?;
    }
    Ok(Some(ChainMention {
        sentence_id: spec.sentence_id,
        tokens,
        head: spec.head,
    }))
}

/// Validate raw chains against the sentences and reserve a reference id
/// for every chain that keeps at least one mention.
///
/// Descriptors longer than [`MAX_MENTION_TOKENS`] are discarded, as are
/// those headed by a token dropped while reading. Unknown sentences or
/// tokens are errors.
pub fn read_chains(
    sentences: &[Sentence],
    raw_chains: &[Vec<CorefMentionSpec>],
    counter: &mut ReferenceIdCounter,
) -> AnnotationResult<Vec<CorefChain>> {
    let mut chains = Vec::new();
    for raw in raw_chains {
        let mut mentions = Vec::new();
        let mut representative = None;
        for spec in raw {
            if spec.len() > MAX_MENTION_TOKENS {
                log::debug!(
                    "sentence {}: skipping {}-token coreference mention",
                    spec.sentence_id,
                    spec.len()
                );
                continue;
            }
            let Some(mention) = build_mention(sentences, spec)? else {
                continue;
            };
            if spec.representative {
                representative = Some(mentions.len());
            }
            mentions.push(mention);
        }
        if mentions.is_empty() {
            continue;
        }
        chains.push(CorefChain {
            id: counter.next_id(),
            mentions,
            representative: representative.unwrap_or(0),
        });
    }
    Ok(chains)
}
