#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Navigable tag tree for annotation pipelines.
//!
//! Annotators such as CoreNLP emit their results as XML. The document
//! graph in `layered-annotations` only needs a handful of navigation
//! primitives over that output, so this crate parses the markup once into
//! an owned [`TagNode`] tree and exposes exactly those primitives:
//!
//! - [`TagNode::find`] / [`TagNode::find_where`] - first descendant by tag
//!   name, optionally filtered by an attribute value
//! - [`TagNode::find_all`] - all descendants by tag name, in document order
//! - [`TagNode::attr`] / [`TagNode::text`] - attribute and text lookup
//!
//! Tag and attribute names are matched ASCII case-insensitively, so
//! `CharacterOffsetBegin` and `characteroffsetbegin` address the same tag.
//!
//! ## Example
//!
//! ```
//! use layered_tag_tree::TagNode;
//!
//! let root = TagNode::parse(r#"<doc><s id="1"><w>Hello</w></s></doc>"#).unwrap();
//! let sentence = root.find("s").unwrap();
//! assert_eq!(sentence.attr("id"), Some("1"));
//! assert_eq!(sentence.child_text("w"), Some("Hello"));
//! ```

mod error;
mod node;
mod parse;

pub use error::{TagTreeError, TagTreeResult};
pub use node::{Descendants, TagNode, DOCUMENT_TAG};
