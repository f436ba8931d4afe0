//! Configuration of a read operation.
//!
//! [ReadOptions] can be built with `with_*` methods, from `(key, value)`
//! string pairs, or from a JSON document. Unknown keys are rejected in
//! every form.

use crate::error::UsageError;
use crate::model::taxon::SharedTaxonNamespace;
use crate::model::tree::RootingInterpretation;
use crate::model::TaxonTreeBuilder;
use crate::read::selection::Selection;
use serde::Deserialize;
use std::str::FromStr;

/// File size threshold (in bytes) for [ReadStrategy::Automatic].
/// Files smaller than this are read into memory; larger files use buffered I/O.
pub const AUTO_IN_MEMORY_THRESHOLD: u64 = 100 * 1024 * 1024; // 100 MB

/// Controls how a file is read during parsing. Streams and strings are
/// always read in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadStrategy {
    /// Read the file in chunks through a buffered I/O reader.
    Buffered,

    /// Load the entire file into a contiguous byte buffer before parsing.
    InMemory,

    /// Choose between [ReadStrategy::Buffered] and [ReadStrategy::InMemory]
    /// based on file size.
    #[default]
    Automatic,
}

impl ReadStrategy {
    /// Whether a file of `file_size` bytes is read buffered.
    pub fn use_buffered(self, file_size: u64) -> bool {
        match self {
            ReadStrategy::Buffered => true,
            ReadStrategy::InMemory => false,
            ReadStrategy::Automatic => file_size >= AUTO_IN_MEMORY_THRESHOLD,
        }
    }
}

impl FromStr for ReadStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "automatic" => Ok(ReadStrategy::Automatic),
            "buffered" => Ok(ReadStrategy::Buffered),
            "in-memory" => Ok(ReadStrategy::InMemory),
            _ => Err("expected one of automatic, buffered, in-memory".to_string()),
        }
    }
}

// =#========================================================================#=
// READ OPTIONS
// =#========================================================================#=
/// Resolved configuration of a `get_from_*`/`read_from_*` call.
///
/// # Example
/// ```
/// use phyloread::read::ReadOptions;
///
/// let typed = ReadOptions::default()
///     .with_collection_offset(Some(1))
///     .with_tree_offset(Some(-1));
/// let pairs = ReadOptions::from_pairs([("collection_offset", "1"), ("tree_offset", "-1")]).unwrap();
/// assert_eq!(typed, pairs);
///
/// let err = ReadOptions::from_pairs([("supress_leaf_node_taxa", "true")]).unwrap_err();
/// assert_eq!(
///     err.to_string(),
///     "unknown option 'supress_leaf_node_taxa', did you mean 'suppress_leaf_node_taxa'?"
/// );
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReadOptions {
    /// Collection to read (negative counts from the end); `None` reads all.
    pub collection_offset: Option<isize>,
    /// First tree of the selected collection to read (negative counts
    /// from the end); requires `collection_offset`.
    pub tree_offset: Option<isize>,
    pub suppress_internal_node_taxa: bool,
    pub suppress_leaf_node_taxa: bool,
    /// Turn `[&...]` comments into annotations
    pub extract_comment_metadata: bool,
    /// Keep edge comments on edges instead of merging them onto nodes
    pub distinct_nodes_and_edges: bool,
    pub preserve_underscores: bool,
    pub rooting: RootingInterpretation,
    pub read_strategy: ReadStrategy,
    /// Namespace for new lists; an append must not name a different one
    #[serde(skip)]
    pub taxon_namespace: Option<SharedTaxonNamespace>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            collection_offset: None,
            tree_offset: None,
            suppress_internal_node_taxa: true,
            suppress_leaf_node_taxa: false,
            extract_comment_metadata: false,
            distinct_nodes_and_edges: false,
            preserve_underscores: false,
            rooting: RootingInterpretation::AsSpecified,
            read_strategy: ReadStrategy::Automatic,
            taxon_namespace: None,
        }
    }
}

/// Namespaces compare by identity.
impl PartialEq for ReadOptions {
    fn eq(&self, other: &Self) -> bool {
        let same_namespace = match (&self.taxon_namespace, &other.taxon_namespace) {
            (Some(a), Some(b)) => std::rc::Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_namespace
            && self.collection_offset == other.collection_offset
            && self.tree_offset == other.tree_offset
            && self.suppress_internal_node_taxa == other.suppress_internal_node_taxa
            && self.suppress_leaf_node_taxa == other.suppress_leaf_node_taxa
            && self.extract_comment_metadata == other.extract_comment_metadata
            && self.distinct_nodes_and_edges == other.distinct_nodes_and_edges
            && self.preserve_underscores == other.preserve_underscores
            && self.rooting == other.rooting
            && self.read_strategy == other.read_strategy
    }
}

// ============================================================================
// Construction & Configuration (pub)
// ============================================================================
impl ReadOptions {
    /// Every key accepted by [set](Self::set) and
    /// [from_json_str](Self::from_json_str).
    pub const KEYS: &'static [&'static str] = &[
        "collection_offset",
        "tree_offset",
        "suppress_internal_node_taxa",
        "suppress_leaf_node_taxa",
        "extract_comment_metadata",
        "distinct_nodes_and_edges",
        "preserve_underscores",
        "rooting",
        "read_strategy",
    ];

    pub fn with_collection_offset(mut self, offset: Option<isize>) -> Self {
        self.collection_offset = offset;
        self
    }

    pub fn with_tree_offset(mut self, offset: Option<isize>) -> Self {
        self.tree_offset = offset;
        self
    }

    pub fn with_suppress_internal_node_taxa(mut self, suppress: bool) -> Self {
        self.suppress_internal_node_taxa = suppress;
        self
    }

    pub fn with_suppress_leaf_node_taxa(mut self, suppress: bool) -> Self {
        self.suppress_leaf_node_taxa = suppress;
        self
    }

    pub fn with_extract_comment_metadata(mut self, extract: bool) -> Self {
        self.extract_comment_metadata = extract;
        self
    }

    pub fn with_distinct_nodes_and_edges(mut self, distinct: bool) -> Self {
        self.distinct_nodes_and_edges = distinct;
        self
    }

    pub fn with_preserve_underscores(mut self, preserve: bool) -> Self {
        self.preserve_underscores = preserve;
        self
    }

    pub fn with_rooting(mut self, rooting: RootingInterpretation) -> Self {
        self.rooting = rooting;
        self
    }

    pub fn with_read_strategy(mut self, read_strategy: ReadStrategy) -> Self {
        self.read_strategy = read_strategy;
        self
    }

    pub fn with_taxon_namespace(mut self, taxon_namespace: SharedTaxonNamespace) -> Self {
        self.taxon_namespace = Some(taxon_namespace);
        self
    }

    /// Sets option `key` from its string form.
    ///
    /// Offsets take an integer or `none`; flags take `true` or `false`;
    /// `rooting` takes one of [RootingInterpretation::NAMES]; `read_strategy`
    /// takes `automatic`, `buffered` or `in-memory`.
    ///
    /// # Errors
    /// * [UsageError::UnknownOption] if `key` is not one of [KEYS](Self::KEYS)
    /// * [UsageError::InvalidOptionValue] if `value` cannot be parsed
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), UsageError> {
        let invalid = |reason: String| UsageError::InvalidOptionValue {
            key: key.to_string(),
            value: value.to_string(),
            reason,
        };

        match key {
            "collection_offset" => self.collection_offset = parse_offset(value).map_err(invalid)?,
            "tree_offset" => self.tree_offset = parse_offset(value).map_err(invalid)?,
            "suppress_internal_node_taxa" => {
                self.suppress_internal_node_taxa = parse_flag(value).map_err(invalid)?
            }
            "suppress_leaf_node_taxa" => {
                self.suppress_leaf_node_taxa = parse_flag(value).map_err(invalid)?
            }
            "extract_comment_metadata" => {
                self.extract_comment_metadata = parse_flag(value).map_err(invalid)?
            }
            "distinct_nodes_and_edges" => {
                self.distinct_nodes_and_edges = parse_flag(value).map_err(invalid)?
            }
            "preserve_underscores" => self.preserve_underscores = parse_flag(value).map_err(invalid)?,
            "rooting" => self.rooting = value.parse().map_err(invalid)?,
            "read_strategy" => self.read_strategy = value.parse().map_err(invalid)?,
            _ => {
                return Err(UsageError::UnknownOption {
                    key: key.to_string(),
                    suggestion: suggest_key(key).map(str::to_string),
                });
            }
        }
        Ok(())
    }

    /// Default options with each `(key, value)` pair applied in order.
    ///
    /// # Errors
    /// The first error of [set](Self::set).
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, UsageError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut options = Self::default();
        for (key, value) in pairs {
            options.set(key.as_ref(), value.as_ref())?;
        }
        Ok(options)
    }

    /// Options from a JSON object, e.g. `{"collection_offset": 0,
    /// "rooting": "force-rooted"}`; absent keys keep their defaults.
    ///
    /// # Errors
    /// [UsageError::OptionDocument] for malformed JSON, unknown keys or
    /// values of the wrong type.
    pub fn from_json_str(json: &str) -> Result<Self, UsageError> {
        serde_json::from_str(json).map_err(|e| UsageError::OptionDocument(e.to_string()))
    }

    /// Checks the combination of options, before any I/O happens.
    ///
    /// # Errors
    /// [UsageError::TreeOffsetWithoutCollectionOffset] for a `tree_offset`
    /// without a `collection_offset`, even if it is 0.
    pub fn validate(&self) -> Result<(), UsageError> {
        self.selection().map(|_| ())
    }

    /// The positional selection these options describe.
    pub fn selection(&self) -> Result<Selection, UsageError> {
        Selection::new(self.collection_offset, self.tree_offset)
    }

    /// A tree builder over `taxon_namespace` applying these options.
    pub fn tree_builder(&self, taxon_namespace: SharedTaxonNamespace) -> TaxonTreeBuilder {
        TaxonTreeBuilder::new(taxon_namespace)
            .with_suppress_internal_node_taxa(self.suppress_internal_node_taxa)
            .with_suppress_leaf_node_taxa(self.suppress_leaf_node_taxa)
            .with_extract_comment_metadata(self.extract_comment_metadata)
            .with_distinct_nodes_and_edges(self.distinct_nodes_and_edges)
            .with_rooting(self.rooting)
    }
}

fn parse_offset(value: &str) -> Result<Option<isize>, String> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("none") || value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| "expected an integer or 'none'".to_string())
}

fn parse_flag(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err("expected 'true' or 'false'".to_string()),
    }
}

/// The known key closest to `key`, if it is a near miss.
fn suggest_key(key: &str) -> Option<&'static str> {
    let key = key.to_ascii_lowercase().replace('-', "_");
    ReadOptions::KEYS
        .iter()
        .map(|&known| (known, edit_distance(&key, known)))
        .filter(|&(known, distance)| distance <= (known.len() / 5).max(3))
        .min_by_key(|&(_, distance)| distance)
        .map(|(known, _)| known)
}

/// Levenshtein distance.
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = diagonal + usize::from(ca != cb);
            diagonal = row[j + 1];
            row[j + 1] = substitution.min(row[j] + 1).min(row[j + 1] + 1);
        }
    }
    row[b.len()]
}

// =#========================================================================#=
// INTO READ OPTIONS
// =#========================================================================#=
/// Anything the read operations accept as configuration: [ReadOptions]
/// itself, `()` for the defaults, or `(key, value)` pairs.
pub trait IntoReadOptions {
    /// # Errors
    /// [UsageError] for unknown keys or unparseable values.
    fn into_read_options(self) -> Result<ReadOptions, UsageError>;
}

impl IntoReadOptions for ReadOptions {
    fn into_read_options(self) -> Result<ReadOptions, UsageError> {
        Ok(self)
    }
}

impl IntoReadOptions for &ReadOptions {
    fn into_read_options(self) -> Result<ReadOptions, UsageError> {
        Ok(self.clone())
    }
}

impl IntoReadOptions for () {
    fn into_read_options(self) -> Result<ReadOptions, UsageError> {
        Ok(ReadOptions::default())
    }
}

impl<K: AsRef<str>, V: AsRef<str>> IntoReadOptions for &[(K, V)] {
    fn into_read_options(self) -> Result<ReadOptions, UsageError> {
        ReadOptions::from_pairs(self.iter().map(|(k, v)| (k.as_ref(), v.as_ref())))
    }
}

impl<K: AsRef<str>, V: AsRef<str>, const N: usize> IntoReadOptions for [(K, V); N] {
    fn into_read_options(self) -> Result<ReadOptions, UsageError> {
        ReadOptions::from_pairs(self)
    }
}

impl<K: AsRef<str>, V: AsRef<str>, const N: usize> IntoReadOptions for &[(K, V); N] {
    fn into_read_options(self) -> Result<ReadOptions, UsageError> {
        self.as_slice().into_read_options()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> IntoReadOptions for Vec<(K, V)> {
    fn into_read_options(self) -> Result<ReadOptions, UsageError> {
        ReadOptions::from_pairs(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = ReadOptions::default();
        assert!(options.suppress_internal_node_taxa);
        assert!(!options.suppress_leaf_node_taxa);
        assert!(!options.extract_comment_metadata);
        assert!(!options.distinct_nodes_and_edges);
        assert_eq!(options.selection(), Ok(Selection::all()));
    }

    #[test]
    fn pairs_set_typed_values() {
        let options = ReadOptions::from_pairs(vec![
            ("collection_offset", "-1"),
            ("tree_offset", "2"),
            ("suppress_internal_node_taxa", "False"),
            ("rooting", "force_unrooted"),
            ("read_strategy", "in-memory"),
        ])
        .unwrap();
        assert_eq!(options.collection_offset, Some(-1));
        assert_eq!(options.tree_offset, Some(2));
        assert!(!options.suppress_internal_node_taxa);
        assert_eq!(options.rooting, RootingInterpretation::ForceUnrooted);
        assert_eq!(options.read_strategy, ReadStrategy::InMemory);
    }

    #[test]
    fn bad_values_name_the_key() {
        let err = ReadOptions::from_pairs([("tree_offset", "last")]).unwrap_err();
        assert!(matches!(err, UsageError::InvalidOptionValue { ref key, .. } if key == "tree_offset"));
        assert!(ReadOptions::from_pairs([("extract_comment_metadata", "yes please")]).is_err());
    }

    #[test]
    fn unknown_keys_get_suggestions() {
        let err = ReadOptions::default().set("collection-ofset", "1").unwrap_err();
        assert_eq!(
            err,
            UsageError::UnknownOption {
                key: "collection-ofset".to_string(),
                suggestion: Some("collection_offset".to_string()),
            }
        );
        let err = ReadOptions::default().set("colour", "blue").unwrap_err();
        assert!(matches!(err, UsageError::UnknownOption { suggestion: None, .. }));
    }

    #[test]
    fn json_document() {
        let options = ReadOptions::from_json_str(
            r#"{"collection_offset": 0, "tree_offset": -2, "rooting": "default-rooted"}"#,
        )
        .unwrap();
        assert_eq!(options.tree_offset, Some(-2));
        assert_eq!(options.rooting, RootingInterpretation::DefaultRooted);
        assert!(options.suppress_internal_node_taxa);

        let err = ReadOptions::from_json_str(r#"{"supress_leaf_node_taxa": true}"#).unwrap_err();
        assert!(matches!(err, UsageError::OptionDocument(_)));
    }

    #[test]
    fn automatic_strategy_by_size() {
        assert!(!ReadStrategy::Automatic.use_buffered(1024));
        assert!(ReadStrategy::Automatic.use_buffered(AUTO_IN_MEMORY_THRESHOLD));
        assert!(ReadStrategy::Buffered.use_buffered(0));
    }

    #[test]
    fn edit_distances() {
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("tree_offset", "tree_offset"), 0);
    }
}
