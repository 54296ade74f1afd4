//! Reading annotator output into sentences and coreference descriptors.
//!
//! Expected layout (tag names are matched case-insensitively):
//!
//! ```text
//! <document>
//!   <sentences>
//!     <sentence id="1">
//!       <tokens><token id="1"><word/><lemma/><POS/><NER/>
//!               <CharacterOffsetBegin/><CharacterOffsetEnd/></token></tokens>
//!       <parse>(ROOT ...)</parse>
//!       <dependencies type="basic-dependencies">
//!         <dep type="nsubj"><governor idx="2"/><dependent idx="1"/></dep>
//!       </dependencies>
//!     </sentence>
//!   </sentences>
//!   <coreference>
//!     <coreference>
//!       <mention representative="true">
//!         <sentence/><start/><end/><head/>
//!       </mention>
//!     </coreference>
//!   </coreference>
//! </document>
//! ```

use std::collections::HashSet;
use std::str::FromStr;

use layered_tag_tree::TagNode;

use crate::config::ReaderConfig;
use crate::coreference::CorefMentionSpec;
use crate::dependency::{attach_edges, DependencyEdge};
use crate::parse_tree::ParseTree;
use crate::sentence::Sentence;
use crate::token::{normalize_word, Token};
use crate::{AnnotationError, AnnotationResult};

/// The `sentence` elements of the `sentences` container, in order.
pub(crate) fn sentence_nodes(root: &TagNode) -> Vec<&TagNode> {
    let Some(container) = root.find("sentences") else {
        return Vec::new();
    };
    container
        .children()
        .iter()
        .filter(|node| node.is("sentence"))
        .collect()
}

fn parse_field<T: FromStr>(text: Option<&str>) -> Option<T> {
    text.and_then(|t| t.trim().parse().ok())
}

fn read_token(node: &TagNode, sentence_id: usize, id: usize) -> Option<Token> {
    let word = node.child_text("word")?;
    let lemma = node.child_text("lemma")?;
    let pos = node.child_text("POS")?;
    let begin = parse_field(node.child_text("CharacterOffsetBegin"))?;
    let end = parse_field(node.child_text("CharacterOffsetEnd"))?;

    let mut token = Token::new(sentence_id, id, normalize_word(word.trim()))
        .with_lemma(lemma.trim())
        .with_pos(pos.trim())
        .with_offsets(begin, end);
    if let Some(ner) = node.child_text("NER") {
        token = token.with_ner(ner.trim());
    }
    Some(token)
}

/// Tokens of a sentence element. Malformed tokens are skipped; the ids of
/// those that still carried a usable id are returned alongside.
fn read_tokens(node: &TagNode, sentence_id: usize) -> (Vec<Token>, HashSet<usize>) {
    let mut tokens = Vec::new();
    let mut skipped = HashSet::new();
    let Some(container) = node.find("tokens") else {
        return (tokens, skipped);
    };
    for token_node in container.children().iter().filter(|n| n.is("token")) {
        let id: Option<usize> = parse_field(token_node.attr("id"));
        match id.and_then(|id| read_token(token_node, sentence_id, id)) {
            Some(token) if token.id > 0 => tokens.push(token),
            _ => {
                log::warn!(
                    "sentence {}: skipping malformed token {}",
                    sentence_id,
                    token_node.attr("id").unwrap_or("without id")
                );
                skipped.extend(id);
            }
        }
    }
    (tokens, skipped)
}

fn edge_index(dep: &TagNode, role: &str, sentence_id: usize) -> AnnotationResult<usize> {
    let raw = dep.find(role).and_then(|n| n.attr("idx"));
    parse_field(raw).ok_or_else(|| {
        AnnotationError::Malformed(format!(
            "sentence {}: {} index {:?} is not a number",
            sentence_id, role, raw
        ))
    })
}

/// Edges of the configured dependency list. A sentence without that list
/// has no edges.
fn read_edges(
    node: &TagNode,
    sentence_id: usize,
    config: &ReaderConfig,
    skipped: &HashSet<usize>,
) -> AnnotationResult<Vec<DependencyEdge>> {
    let Some(list) = node.find_where("dependencies", "type", config.dependencies.list_type())
    else {
        return Ok(Vec::new());
    };
    let mut edges = Vec::new();
    for dep in list.children().iter().filter(|n| n.is("dep")) {
        let governor = edge_index(dep, "governor", sentence_id)?;
        let dependent = edge_index(dep, "dependent", sentence_id)?;
        let relation = dep.attr("type").unwrap_or("dep");
        if skipped.contains(&governor) || skipped.contains(&dependent) {
            log::warn!(
                "sentence {}: dropping {}({}, {}) on a skipped token",
                sentence_id,
                relation,
                governor,
                dependent
            );
            continue;
        }
        edges.push(DependencyEdge::new(governor, dependent, relation));
    }
    Ok(edges)
}

/// Read one `sentence` element, which must carry id `expected_id`, with
/// its tokens, dependency tree and optional parse.
pub(crate) fn read_sentence(
    node: &TagNode,
    expected_id: usize,
    config: &ReaderConfig,
) -> AnnotationResult<Sentence> {
    let id: usize = parse_field(node.attr("id")).ok_or_else(|| {
        AnnotationError::Malformed(format!("sentence {} has no numeric id", expected_id))
    })?;
    if id != expected_id {
        return Err(AnnotationError::Malformed(format!(
            "expected sentence id {}, found {}",
            expected_id, id
        )));
    }

    let (tokens, skipped) = read_tokens(node, id);
    let edges = read_edges(node, id, config, &skipped)?;
    let mut sentence = Sentence::new(id, tokens).with_skipped(skipped);
    attach_edges(&mut sentence, &edges)?;

    if config.read_parse {
        if let Some(text) = node.child_text("parse") {
            match ParseTree::parse(text) {
                Ok(tree) => sentence.parse = Some(tree),
                Err(e) => log::warn!("sentence {}: {}", id, e),
            }
        }
    }
    Ok(sentence)
}

fn read_mention(node: &TagNode) -> Option<CorefMentionSpec> {
    let head = node.child_text("head").or_else(|| node.child_text("headword"));
    let mut spec = CorefMentionSpec::new(
        parse_field(node.child_text("sentence"))?,
        parse_field(node.child_text("start"))?,
        parse_field(node.child_text("end"))?,
        parse_field(head)?,
    );
    spec.representative = node.has_attr("representative");
    Some(spec)
}

/// Raw coreference chains in document order. Mentions missing a field
/// are skipped.
pub(crate) fn read_coreference(root: &TagNode) -> Vec<Vec<CorefMentionSpec>> {
    let Some(container) = root.find("coreference") else {
        return Vec::new();
    };
    container
        .children()
        .iter()
        .filter(|node| node.is("coreference"))
        .map(|chain| {
            chain
                .find_all("mention")
                .into_iter()
                .filter_map(|mention| {
                    let spec = read_mention(mention);
                    if spec.is_none() {
                        log::warn!("skipping coreference mention with a missing field");
                    }
                    spec
                })
                .collect()
        })
        .collect()
}
