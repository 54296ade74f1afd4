//! Syntactic heads of token spans.

use crate::sentence::Sentence;

/// The head of `span` within `sentence`.
///
/// A one-token span is its own head. Otherwise the head is the first token,
/// in span order, that takes part in the dependency tree and has no
/// governor inside the span. Returns `None` when no token qualifies, which
/// happens for spans whose tokens carry no accepted dependency edge.
pub fn find_head(sentence: &Sentence, span: &[usize]) -> Option<usize> {
    if let [only] = span {
        return Some(*only);
    }
    span.iter().copied().find(|id| {
        sentence.token(*id).map_or(false, |token| {
            token.in_dependency_tree()
                && !token.parents.iter().any(|link| span.contains(&link.token))
        })
    })
}
