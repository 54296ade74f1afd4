//! Sentences: token ownership, dependency queries and rendering.

use std::collections::BTreeSet;
use std::fmt::{self, Write as _};

use pathfinding::prelude::bfs;
use unicode_width::UnicodeWidthStr;

use crate::entity::Entity;
use crate::mention::{MentionId, ReferenceIdx};
use crate::parse_tree::ParseTree;
use crate::token::Token;

/// A sentence and everything derived from it.
///
/// `tokens[0]` is always the synthetic root. The document keeps an empty
/// placeholder at sentence index 0 so annotator ids (which start at 1)
/// index the sentence list directly; the placeholder has no tokens at all.
#[derive(Debug, Clone, PartialEq)]
pub struct Sentence {
    /// 1-based sentence id (0 for the placeholder)
    pub id: usize,
    /// Tokens ordered by id, root first
    pub tokens: Vec<Token>,
    /// Named-entity spans with a resolved head
    pub entities: Vec<Entity>,
    /// Mentions located in this sentence
    pub mentions: Vec<MentionId>,
    /// References with at least one mention in this sentence
    pub references: Vec<ReferenceIdx>,
    /// Constituency parse, when requested
    pub parse: Option<ParseTree>,
    /// Ids of tokens the annotator emitted but that were dropped as malformed
    pub skipped: BTreeSet<usize>,
}

impl Sentence {
    /// Create a sentence from its (non-root) tokens. A root token is
    /// inserted at index 0 and the rest are ordered by id.
    pub fn new(id: usize, mut tokens: Vec<Token>) -> Self {
        tokens.sort_by_key(|t| t.id);
        tokens.retain(|t| !t.is_root());
        tokens.insert(0, Token::root(id));
        Self {
            id,
            tokens,
            entities: Vec::new(),
            mentions: Vec::new(),
            references: Vec::new(),
            parse: None,
            skipped: BTreeSet::new(),
        }
    }

    /// The reserved sentence at index 0.
    pub fn placeholder() -> Self {
        Self {
            id: 0,
            tokens: Vec::new(),
            entities: Vec::new(),
            mentions: Vec::new(),
            references: Vec::new(),
            parse: None,
            skipped: BTreeSet::new(),
        }
    }

    /// Record ids of tokens dropped while reading.
    pub fn with_skipped(mut self, skipped: impl IntoIterator<Item = usize>) -> Self {
        self.skipped.extend(skipped);
        self
    }

    pub fn is_skipped(&self, token_id: usize) -> bool {
        self.skipped.contains(&token_id)
    }

    pub fn is_placeholder(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Position of the token with the given id in [`tokens`](Self::tokens).
    pub fn position_of(&self, token_id: usize) -> Option<usize> {
        match self.tokens.get(token_id) {
            Some(token) if token.id == token_id => Some(token_id),
            _ => self.tokens.binary_search_by_key(&token_id, |t| t.id).ok(),
        }
    }

    pub fn token(&self, token_id: usize) -> Option<&Token> {
        self.position_of(token_id).map(|pos| &self.tokens[pos])
    }

    pub fn token_mut(&mut self, token_id: usize) -> Option<&mut Token> {
        let pos = self.position_of(token_id)?;
        self.tokens.get_mut(pos)
    }

    /// The synthetic root, absent only for the placeholder.
    pub fn root(&self) -> Option<&Token> {
        self.tokens.first()
    }

    /// Tokens excluding the root.
    pub fn words(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|t| !t.is_root())
    }

    /// The sentence as a single line: words joined by single spaces.
    pub fn as_text(&self) -> String {
        self.words()
            .map(|t| t.word.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Words of the given token ids, joined by single spaces.
    pub fn span_text(&self, token_ids: &[usize]) -> String {
        token_ids
            .iter()
            .filter_map(|id| self.token(*id))
            .map(|t| t.word.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The whole dependency tree, rendered from the root.
    pub fn dependency_tree(&self) -> String {
        if self.is_placeholder() {
            return String::new();
        }
        self.subtree(0)
    }

    /// The dependency subtree below `token_id`, one tab-indented
    /// `<relation> token` line per dependent.
    pub fn subtree(&self, token_id: usize) -> String {
        let mut out = String::new();
        self.write_subtree(token_id, 1, &mut out);
        out
    }

    fn write_subtree(&self, token_id: usize, depth: usize, out: &mut String) {
        let Some(token) = self.token(token_id) else {
            return;
        };
        for link in &token.children {
            let Some(child) = self.token(link.token) else {
                continue;
            };
            for _ in 0..depth {
                out.push('\t');
            }
            let _ = writeln!(out, "<{}> {}", link.relation, child);
            self.write_subtree(child.id, depth + 1, out);
        }
    }

    /// Shortest path between two tokens over dependency links, ignoring
    /// edge direction. Both endpoints are included.
    pub fn shortest_path(&self, source: usize, target: usize) -> Option<Vec<usize>> {
        self.token(source)?;
        self.token(target)?;
        bfs(
            &source,
            |id| {
                self.token(*id)
                    .map(|t| {
                        t.children
                            .iter()
                            .chain(t.parents.iter())
                            .map(|link| link.token)
                            .collect::<Vec<_>>()
                    })
                    .unwrap_or_default()
            },
            |id| *id == target,
        )
    }

    /// Non-root tokens as aligned columns: id, word, pos, ner.
    pub fn token_table(&self) -> String {
        let id_width = self.words().map(|t| t.id.to_string().len()).max().unwrap_or(0);
        let word_width = self.words().map(|t| t.word.width()).max().unwrap_or(0);
        let pos_width = self.words().map(|t| t.pos.width()).max().unwrap_or(0);

        let mut lines = Vec::new();
        for token in self.words() {
            let word_pad = " ".repeat(word_width - token.word.width());
            let pos_pad = " ".repeat(pos_width - token.pos.width());
            lines.push(format!(
                "{:>id_width$}  {}{}  {}{}  {}",
                token.id,
                token.word,
                word_pad,
                token.pos,
                pos_pad,
                token.ner.as_deref().unwrap_or("-"),
                id_width = id_width,
            ));
        }
        lines.join("\n")
    }
}

impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_placeholder() {
            return writeln!(f, "S{} (null sentence)", self.id);
        }
        writeln!(f, "S{}", self.id)?;
        for token in &self.tokens {
            writeln!(f, "\t{}", token)?;
        }
        Ok(())
    }
}
