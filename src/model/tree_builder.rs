//! The seam between schema parsers and the tree model.
//!
//! Parsers never construct [Tree](crate::model::Tree)s directly. They report
//! what they read (vertices bottom-up as [VertexRecord]s, tree names,
//! rootedness, comments) to a [TreeBuilder], which decides how names become
//! labels or taxa, where comments go, and whether metadata is extracted.
//!
//! # Builder lifecycle
//! ```text
//! Empty ──→ init_next() ──→ Building ──→ add_* / set_* ──→ finish_tree() ──→ Empty
//!   ↑                           │                                              │
//!   │                           └──────────→ abandon_tree() ───────────────────┤
//!   └──────────────────────────────────────────────────────────────────────────┘
//! ```
//! [abandon_tree](TreeBuilder::abandon_tree) is called by the parser when a
//! tree fails to parse, and must undo everything the partial tree caused
//! outside the builder (such as taxa it registered).

use crate::model::annotation::AnnotationSet;
use crate::model::label_resolver::LabelResolver;
use crate::model::tree::Rooting;
use thiserror::Error;

// =#========================================================================#=
// VERTEX RECORD
// =#========================================================================#=
/// Everything a parser read about one vertex and its incoming edge.
///
/// `name` is the raw taxon candidate, already unquoted and with the
/// underscore rule applied; an empty name is reported as `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexRecord {
    pub name: Option<String>,
    pub edge_length: Option<f64>,
    /// Comments the source places at the vertex
    pub node_comments: Vec<String>,
    /// Comments the source places at the incoming edge (around the length)
    pub edge_comments: Vec<String>,
    /// Already structured node metadata, from sources that have it
    pub node_metadata: AnnotationSet,
    /// Already structured edge metadata, from sources that have it
    pub edge_metadata: AnnotationSet,
}

impl VertexRecord {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_edge_length(mut self, length: f64) -> Self {
        self.edge_length = Some(length);
        self
    }
}

// =#========================================================================#=
// BUILD ERROR
// =#========================================================================#=
/// Failures a builder reports back to the parser, which adds position
/// information.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("builder used before init_next")]
    NotInitialized,
    #[error("{0}")]
    UnresolvedLabel(String),
    #[error("{0}")]
    InvalidMetadata(String),
    #[error("{0}")]
    InvalidStructure(String),
}

// =#========================================================================#=
// TREE BUILDER (trait)
// =#========================================================================#=
/// Receives parse events and assembles trees.
///
/// Parsers are generic over this trait, so the same Newick, Nexus and JSON
/// parsing code can feed different tree representations.
/// [TaxonTreeBuilder](crate::model::TaxonTreeBuilder) is the implementation
/// behind the read operations of [TreeList](crate::model::TreeList).
pub trait TreeBuilder {
    /// Identifies vertices during construction; returned by `add_*` and
    /// passed back as children.
    type NodeIdx: Copy;

    /// The tree type produced.
    type Tree;

    /// Prepares a new tree; `num_nodes_hint` is a capacity hint.
    fn init_next(&mut self, num_nodes_hint: usize);

    /// Sets the tree's name (e.g. a Nexus `TREE name = ...`).
    fn set_name(&mut self, name: String) -> Result<(), BuildError>;

    /// Records the rootedness the source states for the tree.
    fn set_rooting(&mut self, rooting: Rooting) -> Result<(), BuildError>;

    /// Adds a tree-level comment.
    fn add_tree_comment(&mut self, comment: String) -> Result<(), BuildError>;

    /// Adds structured tree-level metadata.
    fn add_tree_metadata(&mut self, metadata: AnnotationSet) -> Result<(), BuildError>;

    /// Adds a vertex without children.
    fn add_leaf(&mut self, record: VertexRecord) -> Result<Self::NodeIdx, BuildError>;

    /// Adds a vertex over already added, parentless `children`.
    fn add_internal(
        &mut self,
        children: Vec<Self::NodeIdx>,
        record: VertexRecord,
    ) -> Result<Self::NodeIdx, BuildError>;

    /// Completes the current tree with `root` as its root.
    fn finish_tree(&mut self, root: Self::NodeIdx) -> Result<Self::Tree, BuildError>;

    /// Discards the current tree and undoes its side effects.
    fn abandon_tree(&mut self);

    /// Registers taxa declared by the source ahead of any tree (Nexus TAXA
    /// block), in declaration order. Ignored by default.
    fn declare_taxa(&mut self, _labels: &[String]) {}

    /// Installs how vertex names are translated for the following trees.
    /// Ignored by default.
    fn set_resolver(&mut self, _resolver: LabelResolver) {}
}
