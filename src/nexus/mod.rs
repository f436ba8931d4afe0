//! NEXUS format parser and writer for phylogenetic trees.
//!
//! This module provides:
//! - [NexusParser] - for reading the TAXA and TREES blocks of NEXUS documents
//! - [NexusWriter] - for writing a [TreeList](crate::model::TreeList) as NEXUS
//!
//! # Quick API
//! * [`parse_str`] - parses all trees of a document into a fresh namespace
//!
//! # Format
//! A NEXUS file typically contains:
//! - A TAXA block declaring the taxon labels
//! - One or more TREES blocks, each a collection of trees
//! - Optional TRANSLATE commands mapping short keys to taxon labels
//!
//! ## Details
//! * Blocks other than TAXA and TREES are skipped, as are commands other
//!   than `DIMENSIONS`/`TAXLABELS` and `TRANSLATE`/`TREE` within them
//! * `DIMENSIONS NTAX=<n>`, if given, must match the number of labels
//! * A TRANSLATE command is a comma separated list of pairs
//!   `<key> <label>`; with a TAXA block present, each label must be one
//!   of its taxa
//! * A label with spaces or punctuation must be enclosed in single
//!   quotes, an apostrophe within is written twice,
//!   e.g. `'Wilson''s storm-petrel'`
//! * One tree command has format `TREE [*] <name> = <Newick string>;`

mod defs;
mod parser;
mod writer;

pub use self::defs::NexusBlock;
pub use self::parser::NexusParser;
pub use self::writer::NexusWriter;

use crate::model::{TaxonNamespace, TaxonTreeBuilder, Tree};
use crate::parser::ParsingError;
use crate::parser::byte_parser::ByteParser;

// ============================================================================
// QUICK PARSING API (pub)
// ============================================================================
/// Parses all trees of a NEXUS document with default settings.
///
/// # Returns
/// * `Ok(Vec<Tree>)` - All trees of all TREES blocks, sharing one new namespace
/// * `Err(ParsingError)` - If the document is malformed
pub fn parse_str<S: AsRef<str>>(nexus: S) -> Result<Vec<Tree>, ParsingError> {
    let builder = TaxonTreeBuilder::new(TaxonNamespace::shared());
    NexusParser::new(builder).parse_all(ByteParser::for_str(nexus.as_ref()))
}
