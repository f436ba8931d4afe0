//! Errors of the read operations.
//!
//! Every `get_from_*`/`read_from_*` call fails with a [ReadError] of one
//! of four kinds:
//! - [UsageError]: invalid configuration, raised before any I/O
//! - [AddressingError]: an offset the source's structure cannot satisfy
//! - [ParsingError]: the source violates its schema
//! - [std::io::Error]: the path or stream could not be read

use crate::parser::ParsingError;
use thiserror::Error;

/// Error of a read operation.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("Usage error: {0}")]
    Usage(#[from] UsageError),

    #[error("Addressing error: {0}")]
    Addressing(#[from] AddressingError),

    #[error(transparent)]
    Parse(#[from] ParsingError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReadError {
    pub fn is_usage(&self) -> bool {
        matches!(self, ReadError::Usage(_))
    }

    pub fn is_addressing(&self) -> bool {
        matches!(self, ReadError::Addressing(_))
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, ReadError::Parse(_))
    }

    pub fn is_io(&self) -> bool {
        matches!(self, ReadError::Io(_))
    }
}

/// Invalid configuration supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("tree_offset requires an explicit collection_offset")]
    TreeOffsetWithoutCollectionOffset,

    #[error("unknown option '{key}'{}", .suggestion.as_ref().map(|s| format!(", did you mean '{s}'?")).unwrap_or_default())]
    UnknownOption {
        key: String,
        suggestion: Option<String>,
    },

    #[error("invalid value {value:?} for option '{key}': {reason}")]
    InvalidOptionValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("unknown schema '{0}', expected one of: newick, nexus, json")]
    UnknownSchema(String),

    #[error("tree uses a different taxon namespace than the tree list")]
    ForeignTaxonNamespace,

    #[error("invalid options document: {0}")]
    OptionDocument(String),
}

/// A requested collection or tree does not exist in the source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressingError {
    #[error("collection_offset {offset} is out of range for {available} collection(s)")]
    CollectionOffset { offset: isize, available: usize },

    #[error("tree_offset {offset} is out of range for {available} tree(s)")]
    TreeOffset { offset: isize, available: usize },

    #[error("the source holds no trees")]
    NoTrees,
}
