//! Knowledge-base linking from an entity-disambiguation result.
//!
//! Each disambiguated mention is matched to the document by character
//! offsets and receives the best candidate's identity. Every reference then
//! takes the identity most of its mentions agree on.

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Deserialize;

use crate::document::AnnotatedDocument;
use crate::mention::{KbLink, ReferenceIdx};
use crate::AnnotationResult;

/// A disambiguation result as produced by the entity linker.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisambiguationResult {
    #[serde(default)]
    pub mentions: Vec<DisambiguatedMention>,
    /// Identity to metadata
    #[serde(default)]
    pub entity_metadata: HashMap<String, EntityMetadata>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisambiguatedMention {
    pub offset: usize,
    pub length: usize,
    #[serde(default)]
    pub best_entity: Option<BestEntity>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestEntity {
    #[serde(default)]
    pub kb_identifier: Option<String>,
    #[serde(default)]
    pub disambiguation_score: Option<Score>,
}

/// A confidence given either as a number or as a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Score {
    Number(f64),
    Text(String),
}

impl Score {
    pub fn value(&self) -> Option<f64> {
        match self {
            Score::Number(n) => Some(*n),
            Score::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EntityMetadata {
    #[serde(rename = "type", default)]
    pub types: Vec<String>,
}

impl DisambiguationResult {
    pub fn from_json(json: &str) -> AnnotationResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    fn metadata(&self, identity: &str, raw: &str) -> Option<&EntityMetadata> {
        self.entity_metadata
            .get(identity)
            .or_else(|| self.entity_metadata.get(raw))
    }
}

static UNICODE_ESCAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\u([dD][89abAB][0-9a-fA-F]{2})\\u([dD][c-fC-F][0-9a-fA-F]{2})|\\u([0-9a-fA-F]{4})")
        .expect("Invalid unicode escape regex")
});

/// Replace literal `\uXXXX` escapes (including surrogate pairs) with the
/// characters they name. Escapes that name no character are kept.
pub fn decode_unicode_escapes(text: &str) -> String {
    UNICODE_ESCAPE
        .replace_all(text, |caps: &Captures| {
            let hex = |i: usize| caps.get(i).and_then(|m| u32::from_str_radix(m.as_str(), 16).ok());
            let code = match (hex(1), hex(2), hex(3)) {
                (Some(high), Some(low), _) => {
                    Some(0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00))
                }
                (_, _, single) => single,
            };
            code.and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Pick an identity from `(identity, score)` votes.
///
/// The identity with the most votes wins. Ties go to the highest summed
/// score and then to the lexicographically smallest identity.
pub fn elect_identity<'a>(votes: impl IntoIterator<Item = (&'a str, f64)>) -> Option<&'a str> {
    let mut tally: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
    for (identity, score) in votes {
        let entry = tally.entry(identity).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += score;
    }
    let mut winner: Option<(&str, usize, f64)> = None;
    for (identity, (count, score)) in tally {
        let better = match winner {
            None => true,
            Some((_, best_count, best_score)) => {
                count > best_count || (count == best_count && score > best_score)
            }
        };
        if better {
            winner = Some((identity, count, score));
        }
    }
    winner.map(|(identity, _, _)| identity)
}

impl AnnotatedDocument {
    /// Decode a disambiguation result and apply it.
    pub fn read_disambiguation_json(&mut self, json: &str) -> AnnotationResult<()> {
        let result = DisambiguationResult::from_json(json)?;
        self.apply_disambiguation(&result)
    }

    /// Link disambiguated mentions and elect an identity for every
    /// reference. Links and identities from an earlier result are replaced.
    pub fn apply_disambiguation(&mut self, result: &DisambiguationResult) -> AnnotationResult<()> {
        for mention in self.mentions.iter_mut() {
            mention.kb = None;
        }
        for reference in self.references.iter_mut() {
            reference.kb_identifier = None;
            reference.types.clear();
        }

        let mut linked = 0;
        for mention in &result.mentions {
            if self.link_disambiguated_mention(mention, result)? {
                linked += 1;
            }
        }

        self.disambiguated.clear();
        for idx in 0..self.references.len() {
            if self.elect_reference_identity(ReferenceIdx(idx)) {
                self.disambiguated.push(ReferenceIdx(idx));
            }
        }
        log::info!(
            "linked {} of {} disambiguated mentions, {} references identified",
            linked,
            result.mentions.len(),
            self.disambiguated.len()
        );
        Ok(())
    }

    fn link_disambiguated_mention(
        &mut self,
        disambiguated: &DisambiguatedMention,
        result: &DisambiguationResult,
    ) -> AnnotationResult<bool> {
        let Some(best) = &disambiguated.best_entity else {
            return Ok(false);
        };
        let (Some(raw), Some(score)) = (
            best.kb_identifier.as_deref(),
            best.disambiguation_score.as_ref().and_then(Score::value),
        ) else {
            log::debug!(
                "skipping disambiguation at {} without identity or score",
                disambiguated.offset
            );
            return Ok(false);
        };
        let identity = decode_unicode_escapes(raw);
        let Some(metadata) = result.metadata(&identity, raw) else {
            log::debug!("skipping {}: no entity metadata", identity);
            return Ok(false);
        };
        let types = metadata
            .types
            .iter()
            .map(|t| self.config.strip_type_prefix(t).to_string())
            .collect();

        let Some(id) = self.find_or_create_mention(disambiguated.offset, disambiguated.length)?
        else {
            log::debug!(
                "no mention at offsets {}+{} for {}",
                disambiguated.offset,
                disambiguated.length,
                identity
            );
            return Ok(false);
        };
        if let Some(mention) = self.mentions.get_mut(id.0) {
            mention.kb = Some(KbLink {
                kb_identifier: identity,
                disambiguation_score: score,
                types,
            });
        }
        Ok(true)
    }

    /// Vote on the reference's identity; false when none of its mentions
    /// is linked.
    fn elect_reference_identity(&mut self, idx: ReferenceIdx) -> bool {
        let Some(reference) = self.references.get(idx.0) else {
            return false;
        };
        let links: Vec<&KbLink> = reference
            .mentions
            .iter()
            .filter_map(|id| self.mentions.get(id.0))
            .filter_map(|mention| mention.kb.as_ref())
            .collect();
        let Some(winner) =
            elect_identity(links.iter().map(|l| (l.kb_identifier.as_str(), l.disambiguation_score)))
        else {
            return false;
        };
        let types = links
            .iter()
            .find(|l| l.kb_identifier == winner)
            .map(|l| l.types.clone())
            .unwrap_or_default();
        let winner = winner.to_string();

        if let Some(reference) = self.references.get_mut(idx.0) {
            reference.kb_identifier = Some(winner);
            reference.types = types;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_majority_wins() {
        let votes = [("Q1", 0.2), ("Q2", 0.9), ("Q1", 0.3)];
        assert_eq!(elect_identity(votes), Some("Q1"));
    }

    #[test]
    fn test_tie_goes_to_higher_summed_score() {
        let votes = [("A", 0.5), ("B", 0.7), ("A", 0.4), ("B", 0.7)];
        assert_eq!(elect_identity(votes), Some("B"));
    }

    #[test]
    fn test_full_tie_goes_to_smallest_identity() {
        let votes = [("Zeta", 0.5), ("Alpha", 0.5)];
        assert_eq!(elect_identity(votes), Some("Alpha"));
        assert_eq!(elect_identity(Vec::<(&str, f64)>::new()), None);
    }

    #[test]
    fn test_score_as_number_or_string() {
        let json = r#"{
            "mentions": [
                {"offset": 0, "length": 5, "bestEntity": {"kbIdentifier": "YAGO:A", "disambiguationScore": 0.5}},
                {"offset": 6, "length": 5, "bestEntity": {"kbIdentifier": "YAGO:B", "disambiguationScore": "0.25"}},
                {"offset": 12, "length": 5, "bestEntity": {"kbIdentifier": "YAGO:C", "disambiguationScore": "high"}},
                {"offset": 18, "length": 5}
            ],
            "entityMetadata": {"YAGO:A": {"type": ["YAGO_person"], "readableRepr": "A"}}
        }"#;
        let result = DisambiguationResult::from_json(json).unwrap();
        let scores: Vec<Option<f64>> = result
            .mentions
            .iter()
            .map(|m| {
                m.best_entity
                    .as_ref()
                    .and_then(|b| b.disambiguation_score.as_ref())
                    .and_then(Score::value)
            })
            .collect();
        assert_eq!(scores, vec![Some(0.5), Some(0.25), None, None]);
        assert_eq!(result.entity_metadata["YAGO:A"].types, vec!["YAGO_person"]);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(DisambiguationResult::from_json("{\"mentions\": 3}").is_err());
        assert_eq!(
            DisambiguationResult::from_json("{}").unwrap(),
            DisambiguationResult::default()
        );
    }

    #[test]
    fn test_decode_unicode_escapes() {
        assert_eq!(decode_unicode_escapes(r"YAGO:Fran\u00e7ois_Hollande"), "YAGO:François_Hollande");
        assert_eq!(decode_unicode_escapes(r"YAGO:\ud83d\ude00"), "YAGO:😀");
        assert_eq!(decode_unicode_escapes(r"lone\ud83d"), r"lone\ud83d");
        assert_eq!(decode_unicode_escapes("plain"), "plain");
    }
}
