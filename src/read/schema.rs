//! Schema identifiers and the parser seam every schema implements.

use crate::error::{ReadError, UsageError};
use crate::json::JsonParser;
use crate::model::TaxonTreeBuilder;
use crate::model::tree::Tree;
use crate::newick::NewickParser;
use crate::nexus::NexusParser;
use crate::parser::byte_parser::ByteParser;
use crate::parser::byte_source::ByteSource;
use crate::read::selection::Selection;
use std::fmt;
use std::str::FromStr;

/// A supported source schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Schema {
    Newick,
    Nexus,
    /// JSON reference form, see [crate::json]
    Json,
}

/// Lookup table of schema identifiers.
const SCHEMAS: &[(&str, Schema)] = &[
    ("newick", Schema::Newick),
    ("nexus", Schema::Nexus),
    ("json", Schema::Json),
];

impl Schema {
    /// Looks up a schema by identifier, ignoring case.
    ///
    /// # Errors
    /// [UsageError::UnknownSchema] for any other identifier.
    pub fn lookup(id: &str) -> Result<Schema, UsageError> {
        let id = id.trim();
        SCHEMAS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(id))
            .map(|&(_, schema)| schema)
            .ok_or_else(|| UsageError::UnknownSchema(id.to_string()))
    }

    pub fn id(self) -> &'static str {
        match self {
            Schema::Newick => "newick",
            Schema::Nexus => "nexus",
            Schema::Json => "json",
        }
    }

    /// Parses the selected trees of `byte_parser` with this schema's parser.
    pub(crate) fn parse<B: ByteSource>(
        self,
        tree_builder: TaxonTreeBuilder,
        byte_parser: ByteParser<B>,
        selection: &Selection,
        preserve_underscores: bool,
    ) -> Result<Vec<Tree>, ReadError> {
        match self {
            Schema::Newick => NewickParser::new(tree_builder)
                .with_preserve_underscores(preserve_underscores)
                .parse_selected(byte_parser, selection),
            Schema::Nexus => NexusParser::new(tree_builder)
                .with_preserve_underscores(preserve_underscores)
                .parse_selected(byte_parser, selection),
            Schema::Json => JsonParser::new(tree_builder).parse_selected(byte_parser, selection),
        }
    }
}

impl FromStr for Schema {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Schema::lookup(s)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Parser of one schema, reading the trees a [Selection] addresses.
///
/// A source consists of one or more collections of trees (a Newick source
/// is one collection, a Nexus document has one per TREES block).
/// Implementations report structural problems as
/// [ReadError::Parse] and unsatisfiable offsets as
/// [ReadError::Addressing].
pub trait SchemaParser {
    type Tree;

    /// Parses the trees selected by `selection`, in source order.
    fn parse_selected<B: ByteSource>(
        &mut self,
        byte_parser: ByteParser<B>,
        selection: &Selection,
    ) -> Result<Vec<Self::Tree>, ReadError>;
}
