//! Phyloread is a library to read phylogenetic trees from Newick strings,
//! Nexus files and a JSON reference form into one shared tree and taxon
//! model.
//!
//! Core functionality provided:
//! - Tree model: arena [Tree]s of nodes, each owning its incoming edge,
//!   with labels or [Taxon](model::Taxon)s, edge lengths, raw comments and
//!   typed annotations. See [crate::model].
//! - Taxa: trees of a [TreeList] share one [TaxonNamespace], so the same
//!   label always denotes the same taxon, across several reads too.
//! - Reading: construct a new list with [TreeList::get_from_path],
//!   [get_from_stream](TreeList::get_from_stream) or
//!   [get_from_string](TreeList::get_from_string), or append to an
//!   existing one with the `read_from_*` counterparts. See [crate::read].
//! - Configurability ([ReadOptions]):
//!   - Select a collection (e.g. a Nexus TREES block) and its first tree,
//!     counting from the end with negative offsets
//!   - Whether internal and leaf names become taxa or plain labels
//!   - Turn `[&key=value]` comments into annotations
//!   - Keep node and edge comments apart or merge them onto nodes
//!   - Interpret or override the stated rooting
//! - Writers: Newick, Nexus and JSON, see [crate::newick::to_newick],
//!   [crate::nexus::NexusWriter] and [crate::json::write_json].
//!
//! # Usage patterns
//! 1. The read operations on [TreeList] (and [Tree] for a single tree)
//!    cover the common cases.
//! 2. The schema parsers ([NewickParser](newick::NewickParser),
//!    [NexusParser](nexus::NexusParser)) can be driven directly with any
//!    [TreeBuilder](model::TreeBuilder) implementation.
//!
//! ## Example
//! ```
//! use phyloread::{ReadOptions, TreeList};
//!
//! let mut trees = TreeList::get_from_string(
//!     "((Kea[&colour=olive]:1,Kaka:1):2,Kakapo:3);",
//!     "newick",
//!     ReadOptions::default().with_extract_comment_metadata(true),
//! ).unwrap();
//! let kea = trees[0].leaves().next().unwrap();
//! assert_eq!(kea.annotations().get("colour").unwrap().as_str(), Some("olive"));
//!
//! let added = trees.read_from_string("(Kakapo,(Kaka,Kea));", "newick", ()).unwrap();
//! assert_eq!(added, 1);
//! assert_eq!(trees.taxon_namespace().borrow().len(), 3);
//! ```
//!
//! Errors are reported as [ReadError], distinguishing invalid
//! configuration, unsatisfiable offsets, malformed sources and I/O errors.

pub mod error;
pub mod json;
pub mod model;
pub mod newick;
pub mod nexus;
pub mod parser;
pub mod read;

pub use error::{AddressingError, ReadError, UsageError};
pub use model::{TaxonNamespace, Tree, TreeList};
pub use parser::ParsingError;
pub use read::{ReadOptions, TreeSource};
