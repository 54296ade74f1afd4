//! Tokens and their dependency links.

use std::fmt;

use crate::mention::MentionId;

/// One end of a dependency edge, stored on the token at the other end.
///
/// `token` is the id of the linked token within the same sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepLink {
    pub relation: String,
    pub token: usize,
}

impl DepLink {
    pub fn new(relation: impl Into<String>, token: usize) -> Self {
        Self {
            relation: relation.into(),
            token,
        }
    }
}

/// Document-wide address of a token: sentence id plus token id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenRef {
    pub sentence: usize,
    pub token: usize,
}

impl TokenRef {
    pub fn new(sentence: usize, token: usize) -> Self {
        Self { sentence, token }
    }
}

/// A single annotated token.
///
/// Token 0 of every sentence is a synthetic ROOT that anchors the
/// dependency tree. It has no offsets, tags or mention.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Position within the sentence (0 = root)
    pub id: usize,
    pub sentence_id: usize,
    pub word: String,
    pub lemma: String,
    pub pos: String,
    /// Named-entity tag; `None` for untagged tokens
    pub ner: Option<String>,
    /// Character offset of the first character in the raw text
    pub begin: usize,
    /// Character offset one past the last character in the raw text
    pub end: usize,
    /// Governors of this token
    pub parents: Vec<DepLink>,
    /// Dependents of this token
    pub children: Vec<DepLink>,
    /// Mention covering this token, once references are linked
    pub mention: Option<MentionId>,
    /// Index of the entity in the sentence's entity list
    pub entity_idx: Option<usize>,
}

impl Token {
    /// Create a token with the given word; tags and offsets start empty.
    pub fn new(sentence_id: usize, id: usize, word: impl Into<String>) -> Self {
        Self {
            id,
            sentence_id,
            word: word.into(),
            lemma: String::new(),
            pos: String::new(),
            ner: None,
            begin: 0,
            end: 0,
            parents: Vec::new(),
            children: Vec::new(),
            mention: None,
            entity_idx: None,
        }
    }

    /// The synthetic root token of a sentence.
    pub fn root(sentence_id: usize) -> Self {
        Self::new(sentence_id, 0, "ROOT")
    }

    pub fn with_lemma(mut self, lemma: impl Into<String>) -> Self {
        self.lemma = lemma.into();
        self
    }

    pub fn with_pos(mut self, pos: impl Into<String>) -> Self {
        self.pos = pos.into();
        self
    }

    /// Set the NER tag. The annotator's outside tag `O` means untagged.
    pub fn with_ner(mut self, ner: impl Into<String>) -> Self {
        let ner = ner.into();
        self.ner = if ner == "O" { None } else { Some(ner) };
        self
    }

    pub fn with_offsets(mut self, begin: usize, end: usize) -> Self {
        self.begin = begin;
        self.end = end;
        self
    }

    pub fn is_root(&self) -> bool {
        self.id == 0
    }

    /// True if at least one accepted dependency edge touches this token.
    pub fn in_dependency_tree(&self) -> bool {
        !self.parents.is_empty() || !self.children.is_empty()
    }

    /// Document-wide address of this token.
    pub fn token_ref(&self) -> TokenRef {
        TokenRef::new(self.sentence_id, self.id)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return write!(f, "T{} {}", self.id, self.word);
        }
        write!(
            f,
            "T{} {} [{}] ({})",
            self.id,
            self.word,
            self.pos,
            self.ner.as_deref().unwrap_or("-")
        )
    }
}

/// Undo the annotator's escaping of bracket characters.
pub(crate) fn normalize_word(word: &str) -> String {
    match word {
        "-LRB-" => "(",
        "-RRB-" => ")",
        "-LSB-" => "[",
        "-RSB-" => "]",
        "-LCB-" => "{",
        "-RCB-" => "}",
        other => other,
    }
    .to_string()
}
