//! The annotated document graph.
//!
//! [`AnnotatedDocument`] owns every sentence, mention and reference of one
//! document. Cross links are typed indices into those arenas:
//!
//! ```text
//! Token ──mention──▶ Mention ──reference──▶ Reference
//!                       ▲                      │
//!                       └────── mentions ──────┘
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use layered_tag_tree::TagNode;

use crate::config::ReaderConfig;
use crate::coreference::{read_chains, CorefChain};
use crate::entity::{Entity, EntitySegmenter};
use crate::mention::{Mention, MentionId, Reference, ReferenceIdCounter, ReferenceIdx};
use crate::merge::{link_reference, link_references, merge_references};
use crate::reader;
use crate::sentence::Sentence;
use crate::token::{Token, TokenRef};
use crate::{AnnotationError, AnnotationResult};

/// A document's sentences, tokens, entities and references.
#[derive(Debug, Clone)]
pub struct AnnotatedDocument {
    pub(crate) config: ReaderConfig,
    /// Index 0 is the empty placeholder
    pub(crate) sentences: Vec<Sentence>,
    /// Every non-root token, in document order
    pub(crate) tokens: Vec<TokenRef>,
    /// Begin offset to token; the first token registered at an offset wins
    pub(crate) tokens_by_offset: BTreeMap<usize, TokenRef>,
    /// Largest token end offset
    pub(crate) text_len: usize,
    pub(crate) coreferences: Vec<CorefChain>,
    pub(crate) mentions: Vec<Mention>,
    pub(crate) references: Vec<Reference>,
    pub(crate) disambiguated: Vec<ReferenceIdx>,
    pub(crate) counter: ReferenceIdCounter,
}

impl AnnotatedDocument {
    /// An empty document.
    pub fn new(config: ReaderConfig) -> Self {
        Self {
            config,
            sentences: vec![Sentence::placeholder()],
            tokens: Vec::new(),
            tokens_by_offset: BTreeMap::new(),
            text_len: 0,
            coreferences: Vec::new(),
            mentions: Vec::new(),
            references: Vec::new(),
            disambiguated: Vec::new(),
            counter: ReferenceIdCounter::new(),
        }
    }

    /// Build a document from annotation markup and, optionally, a
    /// disambiguation result for it.
    ///
    /// Disambiguation data without annotation markup is an error. With
    /// neither, the document is empty.
    pub fn from_sources(
        annotation: Option<&str>,
        disambiguation: Option<&str>,
        config: ReaderConfig,
    ) -> AnnotationResult<Self> {
        let mut doc = match (annotation, disambiguation) {
            (None, Some(_)) => return Err(AnnotationError::DisambiguationWithoutAnnotation),
            (None, None) => return Ok(Self::new(config)),
            (Some(xml), _) => Self::from_xml(xml, config)?,
        };
        if let Some(json) = disambiguation {
            doc.read_disambiguation_json(json)?;
        }
        Ok(doc)
    }

    /// Build a document from annotation markup.
    pub fn from_xml(xml: &str, config: ReaderConfig) -> AnnotationResult<Self> {
        let root = TagNode::parse(xml)?;
        Self::from_tag_tree(&root, config)
    }

    /// Build a document from an already parsed annotation tree.
    pub fn from_tag_tree(root: &TagNode, config: ReaderConfig) -> AnnotationResult<Self> {
        let mut doc = Self::new(config);
        let segmenter = EntitySegmenter::new(&doc.config);

        for node in reader::sentence_nodes(root) {
            let mut sentence = reader::read_sentence(node, doc.sentences.len(), &doc.config)?;
            segmenter.segment(&mut sentence);
            doc.push_sentence(sentence);
        }

        let raw_chains = reader::read_coreference(root);
        doc.coreferences = read_chains(&doc.sentences, &raw_chains, &mut doc.counter)?;

        let outcome = merge_references(&doc.sentences, &doc.coreferences, &mut doc.counter);
        doc.mentions = outcome.mentions;
        doc.references = outcome.references;
        doc.link_references();

        log::info!(
            "read {} sentences, {} tokens, {} references",
            doc.sentences.len() - 1,
            doc.tokens.len(),
            doc.references.len()
        );
        Ok(doc)
    }

    /// Load annotation and disambiguation files, see
    /// [`from_sources`](Self::from_sources).
    pub fn load(
        annotation: Option<&Path>,
        disambiguation: Option<&Path>,
        config: ReaderConfig,
    ) -> AnnotationResult<Self> {
        let annotation = annotation.map(read_file).transpose()?;
        let disambiguation = disambiguation.map(read_file).transpose()?;
        Self::from_sources(annotation.as_deref(), disambiguation.as_deref(), config)
    }

    /// Append a sentence and index its tokens.
    pub(crate) fn push_sentence(&mut self, sentence: Sentence) {
        for token in sentence.words() {
            let token_ref = token.token_ref();
            self.tokens.push(token_ref);
            self.tokens_by_offset.entry(token.begin).or_insert(token_ref);
            self.text_len = self.text_len.max(token.end);
        }
        self.sentences.push(sentence);
    }

    /// Link every reference to its mentions, tokens and sentences.
    pub fn link_references(&mut self) {
        link_references(&mut self.sentences, &mut self.mentions, &self.references);
    }

    /// Link a single reference, as [`link_references`](Self::link_references) does.
    pub fn link_reference(&mut self, idx: ReferenceIdx) {
        link_reference(&mut self.sentences, &mut self.mentions, &self.references, idx);
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Real sentences, without the placeholder.
    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences[1..]
    }

    /// Sentence by its 1-based id.
    pub fn sentence(&self, id: usize) -> Option<&Sentence> {
        self.sentences.get(id).filter(|s| !s.is_placeholder())
    }

    /// Every non-root token in document order.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> + '_ {
        self.tokens.iter().filter_map(move |t| self.token(*t))
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn token(&self, token_ref: TokenRef) -> Option<&Token> {
        self.sentences.get(token_ref.sentence)?.token(token_ref.token)
    }

    /// The token registered at exactly this begin offset.
    pub fn token_at_offset(&self, offset: usize) -> Option<&Token> {
        self.tokens_by_offset
            .get(&offset)
            .and_then(|t| self.token(*t))
    }

    /// Offset one past the last token.
    pub fn text_len(&self) -> usize {
        self.text_len
    }

    /// Entities of all sentences, in document order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.sentences.iter().flat_map(|s| s.entities.iter())
    }

    pub fn coreferences(&self) -> &[CorefChain] {
        &self.coreferences
    }

    pub fn mentions(&self) -> &[Mention] {
        &self.mentions
    }

    pub fn mention(&self, id: MentionId) -> Option<&Mention> {
        self.mentions.get(id.0)
    }

    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    pub fn reference(&self, idx: ReferenceIdx) -> Option<&Reference> {
        self.references.get(idx.0)
    }

    /// The reference a mention belongs to.
    pub fn reference_of(&self, id: MentionId) -> Option<&Reference> {
        self.mention(id)?.reference.and_then(|idx| self.reference(idx))
    }

    /// References that received a knowledge-base identity, in reference order.
    pub fn disambiguated_references(&self) -> impl Iterator<Item = &Reference> + '_ {
        self.disambiguated
            .iter()
            .filter_map(move |idx| self.reference(*idx))
    }

    pub fn disambiguated_count(&self) -> usize {
        self.disambiguated.len()
    }

    /// Surface text of a mention.
    pub fn mention_text(&self, id: MentionId) -> Option<String> {
        let mention = self.mention(id)?;
        Some(self.sentence(mention.sentence_id)?.span_text(&mention.tokens))
    }

    /// Surface text of a reference's representative mention.
    pub fn reference_text(&self, idx: ReferenceIdx) -> Option<String> {
        self.mention_text(self.reference(idx)?.representative)
    }
}

fn read_file(path: &Path) -> AnnotationResult<String> {
    std::fs::read_to_string(path).map_err(|e| AnnotationError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

impl fmt::Display for AnnotatedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for sentence in &self.sentences {
            writeln!(f, "{}", sentence)?;
        }
        Ok(())
    }
}
