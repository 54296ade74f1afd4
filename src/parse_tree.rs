//! Constituency parses.
//!
//! The annotator renders each parse as a bracketed string:
//!
//! ```text
//! (ROOT (S (NP (NNP Obama)) (VP (VBD met) (NP (NNP Merkel)))))
//! ```
//!
//! Inner nodes carry a phrase label, leaves a POS tag and a word.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{AnnotationError, AnnotationResult};

static PARSE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(|\)|[^\s()]+").expect("Invalid parse token regex"));

/// A node of a constituency parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTree {
    /// Phrase label or POS tag
    pub label: String,
    /// The word, for leaves
    pub word: Option<String>,
    pub children: Vec<ParseTree>,
    /// Distance from the root node
    pub depth: usize,
}

impl ParseTree {
    /// Parse a bracketed parse string.
    pub fn parse(text: &str) -> AnnotationResult<Self> {
        let tokens: Vec<&str> = PARSE_TOKEN.find_iter(text).map(|m| m.as_str()).collect();
        let mut cursor = Cursor { tokens, pos: 0 };
        let tree = cursor.node(0)?;
        if let Some(extra) = cursor.peek() {
            return Err(malformed(format!("unexpected '{}' after parse", extra)));
        }
        Ok(tree)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Leaves in sentence order.
    pub fn leaves(&self) -> Vec<&ParseTree> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.is_leaf() {
                out.push(node);
            } else {
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    /// Words of the leaves, in order.
    pub fn words(&self) -> Vec<&str> {
        self.leaves()
            .into_iter()
            .filter_map(|leaf| leaf.word.as_deref())
            .collect()
    }
}

fn malformed(message: String) -> AnnotationError {
    AnnotationError::Malformed(format!("constituency parse: {}", message))
}

struct Cursor<'a> {
    tokens: Vec<&'a str>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<&'a str> {
        let token = self.peek();
        self.pos += 1;
        token
    }

    fn expect(&mut self, want: &str) -> AnnotationResult<()> {
        match self.next() {
            Some(got) if got == want => Ok(()),
            Some(got) => Err(malformed(format!("expected '{}', found '{}'", want, got))),
            None => Err(malformed(format!("expected '{}', found end of input", want))),
        }
    }

    fn node(&mut self, depth: usize) -> AnnotationResult<ParseTree> {
        self.expect("(")?;
        let label = match self.next() {
            Some(label) if label != "(" && label != ")" => label.to_string(),
            Some(other) => return Err(malformed(format!("expected a label, found '{}'", other))),
            None => return Err(malformed("expected a label, found end of input".to_string())),
        };

        let mut node = ParseTree {
            label,
            word: None,
            children: Vec::new(),
            depth,
        };
        loop {
            match self.peek() {
                Some("(") => node.children.push(self.node(depth + 1)?),
                Some(")") => {
                    self.pos += 1;
                    break;
                }
                Some(word) if node.word.is_none() && node.children.is_empty() => {
                    node.word = Some(word.to_string());
                    self.pos += 1;
                }
                Some(other) => {
                    return Err(malformed(format!("unexpected '{}' in ({}", other, node.label)))
                }
                None => return Err(malformed(format!("unclosed ({}", node.label))),
            }
        }
        if node.word.is_some() && !node.children.is_empty() {
            return Err(malformed(format!("({} has both a word and children", node.label)));
        }
        Ok(node)
    }
}

impl fmt::Display for ParseTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.depth {
            f.write_str("\t")?;
        }
        match &self.word {
            Some(word) => writeln!(f, "{} : {}", self.label, word)?,
            None => writeln!(f, "{} :", self.label)?,
        }
        for child in &self.children {
            write!(f, "{}", child)?;
        }
        Ok(())
    }
}
