//! Nodes and edges of a [Tree](crate::model::Tree).
//!
//! Nodes live in the tree's arena and refer to each other by [NodeIndex].
//! Every node owns its incoming [Edge]; the root's edge has no tail.

use crate::model::annotation::AnnotationSet;
use crate::model::taxon::TaxonRef;
use std::rc::Rc;

/// Position of a node in its tree's arena.
pub type NodeIndex = usize;

// =#========================================================================#=
// NODE NAME
// =#========================================================================#=
/// What a node is called: nothing, a plain label, or a taxon.
///
/// Keeping this a single value makes label and taxon mutually exclusive by
/// construction.
#[derive(Debug, Clone, Default)]
pub enum NodeName {
    #[default]
    None,
    Label(String),
    Taxon(TaxonRef),
}

impl NodeName {
    /// The name as text, whichever kind it is.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            NodeName::None => None,
            NodeName::Label(label) => Some(label),
            NodeName::Taxon(taxon) => Some(taxon.label()),
        }
    }
}

/// Labels compare as text, taxa by their label (namespace identity is not
/// part of structural equality), and a label never equals a taxon.
impl PartialEq for NodeName {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NodeName::None, NodeName::None) => true,
            (NodeName::Label(a), NodeName::Label(b)) => a == b,
            (NodeName::Taxon(a), NodeName::Taxon(b)) => Rc::ptr_eq(a, b) || a.label() == b.label(),
            _ => false,
        }
    }
}

// =#========================================================================#=
// EDGE
// =#========================================================================#=
/// The connection from a node (its head) to its parent (its tail).
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    head: NodeIndex,
    tail: Option<NodeIndex>,
    length: Option<f64>,
    comments: Vec<String>,
    annotations: AnnotationSet,
}

impl Edge {
    pub(crate) fn new(head: NodeIndex, length: Option<f64>) -> Self {
        Self {
            head,
            tail: None,
            length,
            comments: Vec::new(),
            annotations: AnnotationSet::new(),
        }
    }

    /// The child end of the edge, i.e. the node owning it.
    pub fn head(&self) -> NodeIndex {
        self.head
    }

    /// The parent end; `None` for the root edge.
    pub fn tail(&self) -> Option<NodeIndex> {
        self.tail
    }

    /// Length, if the source gave one. Absent is distinct from `0.0`.
    pub fn length(&self) -> Option<f64> {
        self.length
    }

    pub fn set_length(&mut self, length: Option<f64>) {
        self.length = length;
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub fn comments_mut(&mut self) -> &mut Vec<String> {
        &mut self.comments
    }

    pub fn annotations(&self) -> &AnnotationSet {
        &self.annotations
    }

    pub fn annotations_mut(&mut self) -> &mut AnnotationSet {
        &mut self.annotations
    }

    pub(crate) fn set_tail(&mut self, tail: NodeIndex) {
        self.tail = Some(tail);
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut Vec<String>, &mut AnnotationSet) {
        (&mut self.comments, &mut self.annotations)
    }
}

// =#========================================================================#=
// NODE
// =#========================================================================#=
/// A vertex of a tree.
///
/// # Invariants
/// - a node is a leaf iff it has no children
/// - `edge().head() == index()` and `edge().tail() == parent()`
/// - at most one of [label](Node::label) and [taxon](Node::taxon) is set
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    index: NodeIndex,
    name: NodeName,
    parent: Option<NodeIndex>,
    children: Vec<NodeIndex>,
    edge: Edge,
    comments: Vec<String>,
    annotations: AnnotationSet,
}

impl Node {
    pub(crate) fn new(index: NodeIndex, name: NodeName, length: Option<f64>) -> Self {
        Self {
            index,
            name,
            parent: None,
            children: Vec::new(),
            edge: Edge::new(index, length),
            comments: Vec::new(),
            annotations: AnnotationSet::new(),
        }
    }

    pub fn index(&self) -> NodeIndex {
        self.index
    }

    pub fn name(&self) -> &NodeName {
        &self.name
    }

    /// Plain label, set when the node's name was not bound to a taxon.
    pub fn label(&self) -> Option<&str> {
        match &self.name {
            NodeName::Label(label) => Some(label),
            _ => None,
        }
    }

    pub fn taxon(&self) -> Option<&TaxonRef> {
        match &self.name {
            NodeName::Taxon(taxon) => Some(taxon),
            _ => None,
        }
    }

    /// Taxon label or plain label, whichever is set.
    pub fn display_label(&self) -> Option<&str> {
        self.name.as_str()
    }

    /// Replaces the name; setting a label clears the taxon and vice versa.
    pub fn set_name(&mut self, name: NodeName) {
        self.name = name;
    }

    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }

    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_internal(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// The incoming edge.
    pub fn edge(&self) -> &Edge {
        &self.edge
    }

    pub fn edge_mut(&mut self) -> &mut Edge {
        &mut self.edge
    }

    /// Shortcut for `edge().length()`.
    pub fn edge_length(&self) -> Option<f64> {
        self.edge.length
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub fn comments_mut(&mut self) -> &mut Vec<String> {
        &mut self.comments
    }

    pub fn annotations(&self) -> &AnnotationSet {
        &self.annotations
    }

    pub fn annotations_mut(&mut self) -> &mut AnnotationSet {
        &mut self.annotations
    }

    pub(crate) fn attach_child(&mut self, child: NodeIndex) {
        self.children.push(child);
    }

    pub(crate) fn attach_parent(&mut self, parent: NodeIndex) {
        self.parent = Some(parent);
        self.edge.set_tail(parent);
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut Vec<String>, &mut AnnotationSet) {
        (&mut self.comments, &mut self.annotations)
    }
}
