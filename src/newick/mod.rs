//! Newick format parser and writer for phylogenetic trees.
//!
//! This module provides [`NewickParser`] to parse Newick strings into trees
//! through a [`TreeBuilder`](crate::model::TreeBuilder). It parses plain
//! Newick sources and the tree statements of Nexus TREES blocks.
//!
//! # Quick API
//! * [`parse_str`] - parses a single tree into a fresh namespace
//!
//! # Full API
//! For more control, configure a [`NewickParser`] and provide a
//! [`ByteParser`]:
//! * [`NewickParser::parse_tree`] - parse a single tree
//! * [`NewickParser::parse_all`] - parse all trees until EOF
//! * [`NewickParser::into_iter`] - obtain an iterator over trees
//!
//! Reading a whole source into a [`TreeList`](crate::model::TreeList), with
//! tree selection and configuration, goes through [`crate::read`].
//!
//! # Comments
//! Comments (`[...]`) are kept and attached to the tree, node or edge they
//! appear at. Those starting with `&` hold metadata, e.g. BEAST's
//! `(A[&rate=0.5]:1.0,B)` or NHX's `A:1.0[&&NHX:S=human]`, and can be turned
//! into annotations (see [`crate::model::metadata`]).

mod defs;
mod parser;
mod writer;

pub use self::parser::{NewickIterator, NewickParser};
pub use self::writer::{NewickStyle, TaxonNaming, to_newick, write_newick};

use crate::model::{TaxonNamespace, TaxonTreeBuilder, Tree};
use crate::parser::ParsingError;
use crate::parser::byte_parser::ByteParser;

// ============================================================================
// QUICK PARSING API (pub)
// ============================================================================
/// Parses a single Newick string with default settings.
///
/// Leaves are bound to taxa of a new namespace, internal labels stay plain
/// labels, and comments are kept raw on the nodes.
///
/// # Arguments
/// * `newick` - A Newick string (including the terminating semicolon)
///
/// # Returns
/// * [`Tree`] - The parsed tree
/// * [`ParsingError`] - If the Newick format is invalid
///
/// # Example
/// ```
/// use phyloread::newick::parse_str;
///
/// let tree = parse_str("((A:0.1,B:0.2)x:0.3,C:0.4);").unwrap();
/// assert_eq!(tree.num_leaves(), 3);
/// assert_eq!(tree.taxon_namespace().borrow().len(), 3);
/// ```
pub fn parse_str<S: AsRef<str>>(newick: S) -> Result<Tree, ParsingError> {
    let builder = TaxonTreeBuilder::new(TaxonNamespace::shared());
    let mut byte_parser = ByteParser::for_str(newick.as_ref());
    NewickParser::new(builder).parse_tree(&mut byte_parser)
}
