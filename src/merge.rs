//! Merging named entities and coreference chains into references.
//!
//! Both sources are keyed by signature, `(sentence_id, head token id)`:
//!
//! ```text
//! NER entities      {(1,2) Obama, (1,5) Merkel, (1,7) Berlin}
//! chain signatures  {(1,2) Obama, (1,5) Merkel, (2,1) He?}
//! chain tokens      {(1,1) (1,2) (2,1) (1,4) (1,5) (2,3)}
//!
//! kept chains   = chain signatures ∩ NER signatures    → Obama, Merkel
//! novel entities = NER signatures ∖ chain tokens        → Berlin
//! ```

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::coreference::CorefChain;
use crate::entity::Entity;
use crate::mention::{Mention, MentionId, MentionSource, Reference, ReferenceIdCounter, ReferenceIdx};
use crate::sentence::Sentence;

/// Mentions and references produced by [`merge_references`], not yet
/// linked to tokens and sentences.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOutcome {
    pub mentions: Vec<Mention>,
    pub references: Vec<Reference>,
}

impl MergeOutcome {
    fn push_reference(&mut self, id: u32, mentions: Vec<Mention>, representative: usize) {
        let base = self.mentions.len();
        let ids: Vec<MentionId> = (base..base + mentions.len()).map(MentionId).collect();
        self.mentions.extend(mentions);
        self.references
            .push(Reference::new(id, ids).with_representative(MentionId(base + representative)));
    }
}

/// Deduplicate the sentences' entities against `chains`.
///
/// A chain is kept when its representative's signature matches an entity;
/// when several chains share a signature the earliest is kept. An entity
/// becomes its own single-mention reference when no chain mention covers
/// its head token; tokens it shares with a kept chain are trimmed.
/// Remaining entities are already represented by a chain and are dropped.
pub fn merge_references(
    sentences: &[Sentence],
    chains: &[CorefChain],
    counter: &mut ReferenceIdCounter,
) -> MergeOutcome {
    let entities: BTreeMap<(usize, usize), &Entity> = sentences
        .iter()
        .flat_map(|s| s.entities.iter())
        .map(|e| (e.signature(), e))
        .collect();

    let mut chain_tokens = HashSet::new();
    let mut kept: BTreeMap<(usize, usize), &CorefChain> = BTreeMap::new();
    for chain in chains {
        for mention in &chain.mentions {
            chain_tokens.extend(mention.tokens.iter().map(|t| (mention.sentence_id, *t)));
        }
        if entities.contains_key(&chain.signature()) {
            kept.entry(chain.signature()).or_insert(chain);
        } else {
            log::debug!(
                "dropping coreference chain {} without a matching entity at {:?}",
                chain.id,
                chain.signature()
            );
        }
    }

    let kept_tokens: HashSet<(usize, usize)> = kept
        .values()
        .flat_map(|chain| chain.mentions.iter())
        .flat_map(|m| m.tokens.iter().map(move |t| (m.sentence_id, *t)))
        .collect();

    let mut outcome = MergeOutcome::default();
    for chain in kept.values() {
        let mentions = chain
            .mentions
            .iter()
            .map(|m| {
                Mention::new(
                    m.sentence_id,
                    m.tokens.clone(),
                    Some(m.head),
                    MentionSource::Coreference,
                )
            })
            .collect();
        outcome.push_reference(chain.id, mentions, chain.representative);
    }

    for (signature, entity) in &entities {
        if chain_tokens.contains(signature) {
            continue;
        }
        let tokens: Vec<usize> = entity
            .tokens
            .iter()
            .copied()
            .filter(|t| !kept_tokens.contains(&(entity.sentence_id, *t)))
            .collect();
        let mention = Mention::new(
            entity.sentence_id,
            tokens,
            Some(entity.head),
            MentionSource::NamedEntity {
                ner: entity.ner.clone(),
            },
        );
        outcome.push_reference(counter.next_id(), vec![mention], 0);
    }
    outcome
}

/// Link one reference into the graph.
///
/// Each mention points at the reference, each untaken token points at its
/// mention and the sentences record the mention and the reference. Calling
/// this again for the same reference changes nothing.
pub fn link_reference(
    sentences: &mut [Sentence],
    mentions: &mut [Mention],
    references: &[Reference],
    idx: ReferenceIdx,
) {
    let Some(reference) = references.get(idx.0) else {
        return;
    };
    let mut sentence_ids = BTreeSet::new();
    for mention_id in &reference.mentions {
        let Some(mention) = mentions.get_mut(mention_id.0) else {
            continue;
        };
        mention.reference = Some(idx);
        mention.update_bounds();
        sentence_ids.insert(mention.sentence_id);

        let Some(sentence) = sentences.get_mut(mention.sentence_id) else {
            continue;
        };
        for token_id in &mention.tokens {
            if let Some(token) = sentence.token_mut(*token_id) {
                if token.mention.is_none() {
                    token.mention = Some(*mention_id);
                }
            }
        }
        if !sentence.mentions.contains(mention_id) {
            sentence.mentions.push(*mention_id);
        }
    }
    for sentence_id in sentence_ids {
        if let Some(sentence) = sentences.get_mut(sentence_id) {
            if !sentence.references.contains(&idx) {
                sentence.references.push(idx);
            }
        }
    }
}

/// Link every reference, in order.
pub fn link_references(
    sentences: &mut [Sentence],
    mentions: &mut [Mention],
    references: &[Reference],
) {
    for idx in 0..references.len() {
        link_reference(sentences, mentions, references, ReferenceIdx(idx));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coreference::ChainMention;
    use crate::token::Token;

    /// "Obama met Merkel in Berlin" / "He praised her"
    fn sentences() -> Vec<Sentence> {
        let mut first = Sentence::new(
            1,
            ["Obama", "met", "Merkel", "in", "Berlin"]
                .iter()
                .enumerate()
                .map(|(i, w)| Token::new(1, i + 1, *w))
                .collect(),
        );
        first.entities = vec![
            entity(1, "PERSON", &[1]),
            entity(1, "PERSON", &[3]),
            entity(1, "LOCATION", &[5]),
        ];
        let second = Sentence::new(
            2,
            ["He", "praised", "her"]
                .iter()
                .enumerate()
                .map(|(i, w)| Token::new(2, i + 1, *w))
                .collect(),
        );
        vec![Sentence::placeholder(), first, second]
    }

    fn entity(sentence_id: usize, ner: &str, tokens: &[usize]) -> Entity {
        Entity {
            sentence_id,
            ner: ner.to_string(),
            tokens: tokens.to_vec(),
            head: *tokens.last().unwrap(),
        }
    }

    fn chain(id: u32, mentions: &[(usize, &[usize], usize)]) -> CorefChain {
        CorefChain {
            id,
            mentions: mentions
                .iter()
                .map(|(s, tokens, head)| ChainMention {
                    sentence_id: *s,
                    tokens: tokens.to_vec(),
                    head: *head,
                })
                .collect(),
            representative: 0,
        }
    }

    fn signatures(outcome: &MergeOutcome) -> Vec<(u32, Vec<(usize, usize)>)> {
        outcome
            .references
            .iter()
            .map(|r| {
                (
                    r.id,
                    r.mentions
                        .iter()
                        .filter_map(|m| outcome.mentions[m.0].signature())
                        .collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_chains_and_novel_entities() {
        let sentences = sentences();
        let mut counter = ReferenceIdCounter::new();
        let chains = vec![
            chain(counter.next_id(), &[(1, &[1], 1), (2, &[1], 1)]),
            chain(counter.next_id(), &[(1, &[3], 3), (2, &[3], 3)]),
        ];
        let outcome = merge_references(&sentences, &chains, &mut counter);
        assert_eq!(
            signatures(&outcome),
            vec![
                (0, vec![(1, 1), (2, 1)]),
                (1, vec![(1, 3), (2, 3)]),
                (2, vec![(1, 5)]),
            ]
        );
        assert_eq!(outcome.mentions.len(), 5);
        assert_eq!(outcome.mentions[4].source.label(), "LOCATION");
    }

    #[test]
    fn test_chain_without_entity_is_dropped() {
        let sentences = sentences();
        let mut counter = ReferenceIdCounter::new();
        // "praised" is not an entity
        let chains = vec![chain(counter.next_id(), &[(2, &[2], 2)])];
        let outcome = merge_references(&sentences, &chains, &mut counter);
        assert_eq!(outcome.references.len(), 3);
        assert_eq!(outcome.references[0].id, 1);
    }

    #[test]
    fn test_entity_covered_by_unmatched_chain_is_dropped() {
        let sentences = sentences();
        let mut counter = ReferenceIdCounter::new();
        // represented by "praised", but also covers "Berlin"
        let chains = vec![chain(counter.next_id(), &[(2, &[2], 2), (1, &[4, 5], 5)])];
        let outcome = merge_references(&sentences, &chains, &mut counter);
        let heads: Vec<_> = signatures(&outcome).into_iter().flat_map(|(_, s)| s).collect();
        assert_eq!(heads, vec![(1, 1), (1, 3)]);
    }

    #[test]
    fn test_duplicate_chain_signature_keeps_earliest() {
        let sentences = sentences();
        let mut counter = ReferenceIdCounter::new();
        let chains = vec![
            chain(counter.next_id(), &[(1, &[1], 1), (2, &[1], 1)]),
            chain(counter.next_id(), &[(1, &[1], 1)]),
        ];
        let outcome = merge_references(&sentences, &chains, &mut counter);
        assert_eq!(outcome.references[0].id, 0);
        assert_eq!(outcome.references[0].mentions.len(), 2);
        assert!(outcome.references.iter().all(|r| r.id != 1));
    }

    #[test]
    fn test_novel_entity_is_trimmed_against_kept_chains() {
        let mut sentences = sentences();
        // "Merkel in Berlin" tagged as one span headed by "Berlin"
        sentences[1].entities[1] = entity(1, "PERSON", &[3]);
        sentences[1].entities[2] = entity(1, "LOCATION", &[4, 5]);
        let mut counter = ReferenceIdCounter::new();
        let chains = vec![chain(counter.next_id(), &[(1, &[3, 4], 3)])];
        let outcome = merge_references(&sentences, &chains, &mut counter);

        let berlin = outcome
            .mentions
            .iter()
            .find(|m| m.head == Some(5))
            .unwrap();
        assert_eq!(berlin.tokens, vec![5]);
        assert_eq!((berlin.start, berlin.end), (5, 5));
    }

    #[test]
    fn test_kept_references_are_disjoint() {
        let sentences = sentences();
        let mut counter = ReferenceIdCounter::new();
        let chains = vec![
            chain(counter.next_id(), &[(1, &[1], 1), (2, &[1], 1)]),
            chain(counter.next_id(), &[(1, &[3], 3), (2, &[3], 3)]),
        ];
        let outcome = merge_references(&sentences, &chains, &mut counter);
        let mut seen = HashSet::new();
        for mention in &outcome.mentions {
            for token in &mention.tokens {
                assert!(seen.insert((mention.sentence_id, *token)));
            }
        }
    }

    #[test]
    fn test_linking_is_symmetric_and_idempotent() {
        let mut sentences = sentences();
        let mut counter = ReferenceIdCounter::new();
        let chains = vec![chain(counter.next_id(), &[(1, &[1], 1), (2, &[1], 1)])];
        let MergeOutcome {
            mut mentions,
            references,
        } = merge_references(&sentences, &chains, &mut counter);

        link_references(&mut sentences, &mut mentions, &references);
        link_references(&mut sentences, &mut mentions, &references);

        assert_eq!(mentions[0].reference, Some(ReferenceIdx(0)));
        assert_eq!(sentences[2].tokens[1].mention, Some(MentionId(1)));
        assert_eq!(sentences[1].references, vec![ReferenceIdx(0), ReferenceIdx(1), ReferenceIdx(2)]);
        assert_eq!(sentences[2].references, vec![ReferenceIdx(0)]);
        assert_eq!(sentences[2].mentions, vec![MentionId(1)]);
    }

    #[test]
    fn test_no_chains_no_entities() {
        let sentences = vec![Sentence::placeholder()];
        let mut counter = ReferenceIdCounter::new();
        let outcome = merge_references(&sentences, &[], &mut counter);
        assert_eq!(outcome, MergeOutcome::default());
        assert_eq!(counter.issued(), 0);
    }
}
