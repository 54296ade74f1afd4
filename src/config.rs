//! Reader configuration.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::{AnnotationError, AnnotationResult};

/// NER categories that do not denote referential entities.
///
/// With [`ReaderConfig::exclude_ordinal_ners`] enabled, tokens tagged with
/// one of these are treated as untagged during entity segmentation.
pub static EXCLUDED_NER_TYPES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "TIME", "DATE", "NUMBER", "DURATION", "PERCENT", "SET", "ORDINAL", "MONEY",
    ]
    .into_iter()
    .collect()
});

/// Which of the annotator's dependency-edge lists to build trees from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyKind {
    /// Plain Stanford basic dependencies (always a tree).
    Basic,
    /// Collapsed dependencies (prepositions folded into relation labels).
    Collapsed,
    /// Collapsed dependencies with conjunct propagation.
    #[default]
    CollapsedCcprocessed,
}

impl DependencyKind {
    /// The configuration spelling of this variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyKind::Basic => "basic",
            DependencyKind::Collapsed => "collapsed",
            DependencyKind::CollapsedCcprocessed => "collapsed-ccprocessed",
        }
    }

    /// The `type` attribute of the matching `<dependencies>` list.
    pub fn list_type(&self) -> &'static str {
        match self {
            DependencyKind::Basic => "basic-dependencies",
            DependencyKind::Collapsed => "collapsed-dependencies",
            DependencyKind::CollapsedCcprocessed => "collapsed-ccprocessed-dependencies",
        }
    }
}

impl FromStr for DependencyKind {
    type Err = AnnotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(DependencyKind::Basic),
            "collapsed" => Ok(DependencyKind::Collapsed),
            "collapsed-ccprocessed" => Ok(DependencyKind::CollapsedCcprocessed),
            other => Err(AnnotationError::UnknownDependencyKind(other.to_string())),
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for reading an annotated document.
///
/// Can be built in code or loaded from TOML:
///
/// ```
/// use layered_annotations::{DependencyKind, ReaderConfig};
///
/// let config = ReaderConfig::from_toml_str(r#"
///     dependencies = "basic"
///     exclude_ordinal_ners = true
/// "#).unwrap();
/// assert_eq!(config.dependencies, DependencyKind::Basic);
/// assert!(config.is_excluded_ner("DATE"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReaderConfig {
    /// Dependency-edge list used for trees and head finding.
    pub dependencies: DependencyKind,
    /// Treat [`EXCLUDED_NER_TYPES`] as untagged during segmentation.
    pub exclude_ordinal_ners: bool,
    /// Namespace prefix stripped from knowledge-base type names.
    pub type_prefix: String,
    /// Also read each sentence's constituency parse.
    pub read_parse: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            dependencies: DependencyKind::default(),
            exclude_ordinal_ners: false,
            type_prefix: "YAGO_".to_string(),
            read_parse: false,
        }
    }
}

impl ReaderConfig {
    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the dependency list by its configuration spelling.
    ///
    /// Unknown spellings are a configuration error.
    pub fn with_dependencies(mut self, dependencies: &str) -> AnnotationResult<Self> {
        self.dependencies = dependencies.parse()?;
        Ok(self)
    }

    /// Enable or disable exclusion of non-referential NER categories.
    pub fn with_exclude_ordinal_ners(mut self, exclude: bool) -> Self {
        self.exclude_ordinal_ners = exclude;
        self
    }

    /// Enable or disable constituency parse reading.
    pub fn with_read_parse(mut self, read_parse: bool) -> Self {
        self.read_parse = read_parse;
        self
    }

    /// Decode a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> AnnotationResult<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Load a configuration file.
    pub fn from_toml_file(path: &Path) -> AnnotationResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| AnnotationError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&source)
    }

    /// Whether `ner` should be treated as untagged when segmenting entities.
    pub fn is_excluded_ner(&self, ner: &str) -> bool {
        self.exclude_ordinal_ners && EXCLUDED_NER_TYPES.contains(ner)
    }

    /// Strip [`type_prefix`](Self::type_prefix) from a knowledge-base type.
    pub fn strip_type_prefix<'a>(&self, kb_type: &'a str) -> &'a str {
        kb_type.strip_prefix(self.type_prefix.as_str()).unwrap_or(kb_type)
    }
}
