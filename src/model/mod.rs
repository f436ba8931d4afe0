//! The tree and taxon model every schema parser produces.
//!
//! - [Tree]: arena of [Node]s, each owning its incoming [Edge]
//! - [TaxonNamespace]: registry of [Taxon]s shared by trees through a
//!   [SharedTaxonNamespace]
//! - [TreeList]: trees in read order over one namespace
//! - [AnnotationSet]: structured metadata of a tree, node or edge, usually
//!   extracted from comments (see [metadata])
//!
//! Parsers report what they read to a [TreeBuilder]; [TaxonTreeBuilder] is
//! the builder applying the read configuration (taxon suppression, comment
//! placement, metadata extraction, rooting).

/// Typed key/value annotations
pub mod annotation;
/// Nexus name token translation
pub mod label_resolver;
/// Metadata comment grammar and extraction
pub mod metadata;
/// Nodes and edges
pub mod node;
/// Taxa and namespaces
pub mod taxon;
/// Builder applying the read configuration
pub mod taxon_tree_builder;
/// Arena tree, rooting and traversal
pub mod tree;
/// Parser-to-model seam
pub mod tree_builder;
/// Collections of trees
pub mod tree_list;

pub use annotation::{Annotation, AnnotationSet, AnnotationValue};
pub use label_resolver::LabelResolver;
pub use node::{Edge, Node, NodeIndex, NodeName};
pub use taxon::{SharedTaxonNamespace, Taxon, TaxonNamespace, TaxonRef};
pub use taxon_tree_builder::TaxonTreeBuilder;
pub use tree::{PostOrderIter, PreOrderIter, Rooting, RootingInterpretation, Tree};
pub use tree_builder::{BuildError, TreeBuilder, VertexRecord};
pub use tree_list::TreeList;
