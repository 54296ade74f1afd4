//! Cycle-safe dependency tree construction.
//!
//! Edges arrive as governor/dependent index pairs. Collapsed and
//! cc-processed dependency lists are graphs rather than trees and may
//! contain cycles, so every edge is checked before it is attached:
//!
//! ```text
//! met ──nsubj──▶ Obama        accepted
//! Obama ──rcmod──▶ met        dropped: `Obama` is already below `met`
//! ```

use std::collections::HashSet;

use crate::sentence::Sentence;
use crate::token::DepLink;
use crate::{AnnotationError, AnnotationResult};

/// A raw dependency edge between two token ids of one sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEdge {
    pub governor: usize,
    pub dependent: usize,
    pub relation: String,
}

impl DependencyEdge {
    pub fn new(governor: usize, dependent: usize, relation: impl Into<String>) -> Self {
        Self {
            governor,
            dependent,
            relation: relation.into(),
        }
    }
}

/// Ids of `token_id` and every token reachable below it through accepted
/// child links.
pub fn collect_descendants(sentence: &Sentence, token_id: usize) -> HashSet<usize> {
    let mut seen = HashSet::new();
    let mut stack = vec![token_id];
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        if let Some(token) = sentence.token(id) {
            stack.extend(token.children.iter().map(|link| link.token));
        }
    }
    seen
}

/// Attach `edges` to the sentence's tokens in order.
///
/// An edge whose governor already sits below its dependent would close a
/// cycle and is dropped. Returns the number of accepted edges. An edge
/// naming a token id the sentence does not have is an error.
pub fn attach_edges(sentence: &mut Sentence, edges: &[DependencyEdge]) -> AnnotationResult<usize> {
    let mut accepted = 0;
    for edge in edges {
        for index in [edge.governor, edge.dependent] {
            if sentence.position_of(index).is_none() {
                return Err(AnnotationError::InvalidTokenIndex {
                    sentence: sentence.id,
                    index,
                });
            }
        }

        if collect_descendants(sentence, edge.dependent).contains(&edge.governor) {
            log::trace!(
                "sentence {}: dropping cyclic edge {}({} -> {})",
                sentence.id,
                edge.relation,
                edge.governor,
                edge.dependent
            );
            continue;
        }

        if let Some(governor) = sentence.token_mut(edge.governor) {
            governor
                .children
                .push(DepLink::new(edge.relation.clone(), edge.dependent));
        }
        if let Some(dependent) = sentence.token_mut(edge.dependent) {
            dependent
                .parents
                .push(DepLink::new(edge.relation.clone(), edge.governor));
        }
        accepted += 1;
    }
    Ok(accepted)
}
