//! The phylogenetic tree.
//!
//! A [Tree] stores its [Node]s in an arena (`Vec<Node>`) and connects them
//! through [NodeIndex]es. It shares exactly one
//! [TaxonNamespace](crate::model::TaxonNamespace) with every other tree of
//! its [TreeList](crate::model::TreeList), and records rootedness as the
//! tri-state [Rooting].

use crate::model::annotation::AnnotationSet;
use crate::model::metadata::{MetadataError, extract_metadata_into};
use crate::model::node::{Node, NodeIndex, NodeName};
use crate::model::taxon::{SharedTaxonNamespace, TaxonRef};
use crate::newick::{NewickStyle, to_newick};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

// =#========================================================================#=
// ROOTING
// =#========================================================================#=
/// Whether a tree's root is a true ancestor, as far as the source says.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rooting {
    Rooted,
    Unrooted,
    /// The source did not say
    #[default]
    Unspecified,
}

impl Rooting {
    /// `Some(true)` for rooted, `Some(false)` for unrooted, `None` if unspecified.
    pub fn is_rooted(self) -> Option<bool> {
        match self {
            Rooting::Rooted => Some(true),
            Rooting::Unrooted => Some(false),
            Rooting::Unspecified => None,
        }
    }

    pub fn from_is_rooted(is_rooted: Option<bool>) -> Self {
        match is_rooted {
            Some(true) => Rooting::Rooted,
            Some(false) => Rooting::Unrooted,
            None => Rooting::Unspecified,
        }
    }
}

/// How the rooting stated by the source is turned into a tree's [Rooting].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RootingInterpretation {
    /// Keep what the source says, including unspecified
    #[default]
    AsSpecified,
    /// Rooted unless the source says unrooted
    DefaultRooted,
    /// Unrooted unless the source says rooted
    DefaultUnrooted,
    ForceRooted,
    ForceUnrooted,
}

impl RootingInterpretation {
    /// All accepted spellings, as used by [FromStr](std::str::FromStr).
    pub const NAMES: [&'static str; 5] = [
        "as-specified",
        "default-rooted",
        "default-unrooted",
        "force-rooted",
        "force-unrooted",
    ];

    /// Final rooting of a tree whose source stated `stated`.
    pub fn apply(self, stated: Rooting) -> Rooting {
        match (self, stated) {
            (RootingInterpretation::AsSpecified, stated) => stated,
            (RootingInterpretation::DefaultRooted, Rooting::Unspecified) => Rooting::Rooted,
            (RootingInterpretation::DefaultUnrooted, Rooting::Unspecified) => Rooting::Unrooted,
            (RootingInterpretation::DefaultRooted | RootingInterpretation::DefaultUnrooted, stated) => {
                stated
            }
            (RootingInterpretation::ForceRooted, _) => Rooting::Rooted,
            (RootingInterpretation::ForceUnrooted, _) => Rooting::Unrooted,
        }
    }
}

impl FromStr for RootingInterpretation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "as-specified" => Ok(RootingInterpretation::AsSpecified),
            "default-rooted" => Ok(RootingInterpretation::DefaultRooted),
            "default-unrooted" => Ok(RootingInterpretation::DefaultUnrooted),
            "force-rooted" => Ok(RootingInterpretation::ForceRooted),
            "force-unrooted" => Ok(RootingInterpretation::ForceUnrooted),
            _ => Err(format!("expected one of {}", Self::NAMES.join(", "))),
        }
    }
}

// =#========================================================================#=
// TREE
// =#========================================================================#=
/// A rooted or unrooted phylogenetic tree of arbitrary arity.
///
/// # Construction
/// Trees are built bottom-up: add leaves, then internal nodes over already
/// added children, then [set_root](Tree::set_root). Parsers do this through
/// a [TreeBuilder](crate::model::TreeBuilder).
///
/// ```
/// use phyloread::model::{NodeName, TaxonNamespace, Tree};
///
/// let namespace = TaxonNamespace::shared();
/// let a = namespace.borrow_mut().require_taxon("A");
/// let b = namespace.borrow_mut().require_taxon("B");
///
/// let mut tree = Tree::new(namespace.clone());
/// let leaf_a = tree.add_leaf(NodeName::Taxon(a), Some(1.0));
/// let leaf_b = tree.add_leaf(NodeName::Taxon(b), Some(2.0));
/// let root = tree.add_internal(vec![leaf_a, leaf_b], NodeName::None, None);
/// tree.set_root(root);
///
/// assert!(tree.is_valid());
/// assert_eq!(tree.num_leaves(), 2);
/// assert_eq!(tree.to_string(), "(A:1,B:2);");
/// ```
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    root_index: Option<NodeIndex>,
    label: Option<String>,
    rooting: Rooting,
    comments: Vec<String>,
    annotations: AnnotationSet,
    taxon_namespace: SharedTaxonNamespace,
}

// ============================================================================
// Construction (pub)
// ============================================================================
impl Tree {
    /// Creates an empty tree bound to `taxon_namespace`.
    pub fn new(taxon_namespace: SharedTaxonNamespace) -> Self {
        Self::with_capacity(taxon_namespace, 0)
    }

    /// Creates an empty tree with room for `num_nodes` nodes.
    pub fn with_capacity(taxon_namespace: SharedTaxonNamespace, num_nodes: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(num_nodes),
            root_index: None,
            label: None,
            rooting: Rooting::Unspecified,
            comments: Vec::new(),
            annotations: AnnotationSet::new(),
            taxon_namespace,
        }
    }

    /// Adds a childless node.
    pub fn add_leaf(&mut self, name: NodeName, edge_length: Option<f64>) -> NodeIndex {
        let index = self.nodes.len();
        self.nodes.push(Node::new(index, name, edge_length));
        index
    }

    /// Adds a node over `children`, which must already be in the tree and
    /// still be parentless.
    ///
    /// # Panics
    /// If a child index is out of bounds.
    pub fn add_internal(
        &mut self,
        children: Vec<NodeIndex>,
        name: NodeName,
        edge_length: Option<f64>,
    ) -> NodeIndex {
        let index = self.add_leaf(name, edge_length);
        for child in children {
            debug_assert!(self.nodes[child].parent().is_none(), "child {child} already attached");
            self.nodes[child].attach_parent(index);
            self.nodes[index].attach_child(child);
        }
        index
    }

    /// Declares `index` the root; its edge keeps no tail.
    pub fn set_root(&mut self, index: NodeIndex) {
        self.root_index = Some(index);
    }
}

// ============================================================================
// Accessors (pub)
// ============================================================================
impl Tree {
    pub fn is_root_set(&self) -> bool {
        self.root_index.is_some()
    }

    /// Index of the root node.
    ///
    /// # Panics
    /// If the root has not been set.
    pub fn root_index(&self) -> NodeIndex {
        self.root_index.expect("root of tree has not been set")
    }

    /// The root node.
    ///
    /// # Panics
    /// If the root has not been set.
    pub fn root(&self) -> &Node {
        &self.nodes[self.root_index()]
    }

    /// # Panics
    /// If `index` is out of bounds.
    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.nodes[index]
    }

    /// # Panics
    /// If `index` is out of bounds.
    pub fn node_mut(&mut self, index: NodeIndex) -> &mut Node {
        &mut self.nodes[index]
    }

    /// All nodes in arena order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    pub fn num_internal(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_internal()).count()
    }

    /// Leaves in pre-order (left to right).
    pub fn leaves(&self) -> impl Iterator<Item = &Node> + '_ {
        self.pre_order_iter().filter(|n| n.is_leaf())
    }

    /// Taxa referenced by nodes, in pre-order, without repetition.
    pub fn taxa(&self) -> Vec<TaxonRef> {
        let mut taxa: Vec<TaxonRef> = Vec::new();
        for taxon in self.pre_order_iter().filter_map(|n| n.taxon()) {
            if !taxa.iter().any(|t| Rc::ptr_eq(t, taxon)) {
                taxa.push(Rc::clone(taxon));
            }
        }
        taxa
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }

    pub fn rooting(&self) -> Rooting {
        self.rooting
    }

    pub fn set_rooting(&mut self, rooting: Rooting) {
        self.rooting = rooting;
    }

    /// `Some(true)` rooted, `Some(false)` unrooted, `None` unspecified.
    pub fn is_rooted(&self) -> Option<bool> {
        self.rooting.is_rooted()
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

    /// The namespace every taxon of this tree belongs to.
    pub fn taxon_namespace(&self) -> &SharedTaxonNamespace {
        &self.taxon_namespace
    }
}

// ============================================================================
// Metadata & validation (pub)
// ============================================================================
impl Tree {
    /// Moves metadata comments of the tree, every node and every edge into
    /// the respective annotation set.
    ///
    /// Running it twice changes nothing, since consumed comments are gone.
    ///
    /// # Returns
    /// The number of metadata comments consumed.
    ///
    /// # Errors
    /// The first malformed metadata comment; entities processed before it
    /// keep their extracted annotations.
    pub fn extract_comment_metadata(&mut self) -> Result<usize, MetadataError> {
        let mut consumed = extract_metadata_into(&mut self.comments, &mut self.annotations)?;
        for node in &mut self.nodes {
            let (comments, annotations) = node.parts_mut();
            consumed += extract_metadata_into(comments, annotations)?;
            let (comments, annotations) = node.edge_mut().parts_mut();
            consumed += extract_metadata_into(comments, annotations)?;
        }
        Ok(consumed)
    }

    /// Validates the tree structure.
    ///
    /// Checks that:
    /// - the root is set, in bounds and parentless, and is the only parentless node
    /// - every node's index matches its arena position
    /// - parent and child references agree, and every edge's head and tail
    ///   match its node and parent
    /// - every node is reachable from the root
    /// - every taxon belongs to the tree's namespace
    pub fn is_valid(&self) -> bool {
        let Some(root_index) = self.root_index else {
            return false;
        };
        if root_index >= self.nodes.len() || !self.nodes[root_index].is_root() {
            return false;
        }

        let namespace = self.taxon_namespace.borrow();
        for (index, node) in self.nodes.iter().enumerate() {
            if node.index() != index || node.edge().head() != index {
                return false;
            }
            if node.edge().tail() != node.parent() {
                return false;
            }

            match node.parent() {
                None if index != root_index => return false,
                None => {}
                Some(parent) => {
                    if parent >= self.nodes.len() || !self.nodes[parent].children().contains(&index) {
                        return false;
                    }
                }
            }

            for &child in node.children() {
                if child >= self.nodes.len() || self.nodes[child].parent() != Some(index) {
                    return false;
                }
            }

            if node.taxon().is_some_and(|t| !namespace.contains(t)) {
                return false;
            }
        }

        self.pre_order_iter().count() == self.nodes.len()
    }
}

impl std::ops::Index<NodeIndex> for Tree {
    type Output = Node;

    fn index(&self, index: NodeIndex) -> &Self::Output {
        &self.nodes[index]
    }
}

impl std::ops::IndexMut<NodeIndex> for Tree {
    fn index_mut(&mut self, index: NodeIndex) -> &mut Self::Output {
        &mut self.nodes[index]
    }
}

/// Structural equality: same nodes (names, lengths, comments, annotations,
/// shape), label, rooting and tree-level comments and annotations. Which
/// namespace the taxa live in is not compared.
impl PartialEq for Tree {
    fn eq(&self, other: &Self) -> bool {
        self.root_index == other.root_index
            && self.label == other.label
            && self.rooting == other.rooting
            && self.comments == other.comments
            && self.annotations == other.annotations
            && self.nodes == other.nodes
    }
}

/// Writes the tree as a Newick string with default [NewickStyle].
impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_newick(self, &NewickStyle::default()))
    }
}

// ============================================================================
// Printing (pub)
// ============================================================================
impl Tree {
    /// Renders the tree as indented ASCII art, one node per line.
    ///
    /// # Example Output
    /// ```text
    /// [4] root
    ///   ├─ [2] i1 (length: 0.300)
    ///   │   ├─ [0] A (length: 0.100)
    ///   │   └─ [1] B (length: 0.200)
    ///   └─ [3] C (length: 0.400)
    /// ```
    pub fn render_ascii(&self) -> String {
        let mut out = String::new();
        match self.root_index {
            Some(root) => self.render_node(root, "", true, &mut out),
            None => out.push_str("(no root set)\n"),
        }
        out
    }

    fn render_node(&self, index: NodeIndex, prefix: &str, is_last: bool, out: &mut String) {
        let node = &self.nodes[index];
        let connector = match (prefix.is_empty(), is_last) {
            (true, _) => "",
            (false, true) => "└─ ",
            (false, false) => "├─ ",
        };
        let name = node.display_label().unwrap_or("-");
        let length = node
            .edge_length()
            .map(|l| format!(" (length: {l:.3})"))
            .unwrap_or_default();
        out.push_str(&format!("{prefix}{connector}[{index}] {name}{length}\n"));

        let child_prefix = if prefix.is_empty() {
            "  ".to_string()
        } else {
            format!("{prefix}{}  ", if is_last { " " } else { "│" })
        };
        let last = node.num_children().saturating_sub(1);
        for (i, &child) in node.children().iter().enumerate() {
            self.render_node(child, &child_prefix, i == last, out);
        }
    }
}

// =#========================================================================#=
// ITERATORS
// =#========================================================================#=
impl Tree {
    /// Depth-first traversal, parents before children, children left to right.
    ///
    /// Yields nothing if the root is not set.
    pub fn pre_order_iter(&self) -> PreOrderIter<'_> {
        PreOrderIter {
            tree: self,
            stack: self.root_index.into_iter().collect(),
        }
    }

    /// Depth-first traversal, children (left to right) before parents.
    ///
    /// Yields nothing if the root is not set.
    pub fn post_order_iter(&self) -> PostOrderIter<'_> {
        PostOrderIter {
            tree: self,
            stack: self.root_index.map(|r| (r, false)).into_iter().collect(),
        }
    }

    /// Same as [pre_order_iter](Self::pre_order_iter).
    pub fn iter(&self) -> PreOrderIter<'_> {
        self.pre_order_iter()
    }
}

impl<'a> IntoIterator for &'a Tree {
    type Item = &'a Node;
    type IntoIter = PreOrderIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.pre_order_iter()
    }
}

/// Iterator for pre-order traversal (parents before children).
pub struct PreOrderIter<'a> {
    tree: &'a Tree,
    stack: Vec<NodeIndex>,
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let node = &self.tree.nodes[index];
        // Reversed, so the leftmost child is popped first
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

/// Iterator for post-order traversal (children before parents).
pub struct PostOrderIter<'a> {
    tree: &'a Tree,
    stack: Vec<(NodeIndex, bool)>,
}

impl<'a> Iterator for PostOrderIter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((index, children_visited)) = self.stack.pop() {
            let node = &self.tree.nodes[index];
            if children_visited || node.is_leaf() {
                return Some(node);
            }
            self.stack.push((index, true));
            self.stack.extend(node.children().iter().rev().map(|&c| (c, false)));
        }
        None
    }
}

// =#========================================================================#=
// TESTS
// =#========================================================================#=
#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::taxon::TaxonNamespace;

    /// ((A,B)x,C,D)root with lengths on leaves only
    fn polytomy() -> Tree {
        let namespace = TaxonNamespace::shared();
        let mut tree = Tree::new(namespace.clone());
        let leaf = |tree: &mut Tree, label: &str| {
            let taxon = namespace.borrow_mut().require_taxon(label);
            tree.add_leaf(NodeName::Taxon(taxon), Some(1.0))
        };
        let a = leaf(&mut tree, "A");
        let b = leaf(&mut tree, "B");
        let x = tree.add_internal(vec![a, b], NodeName::Label("x".into()), None);
        let c = leaf(&mut tree, "C");
        let d = leaf(&mut tree, "D");
        let root = tree.add_internal(vec![x, c, d], NodeName::Label("root".into()), None);
        tree.set_root(root);
        tree
    }

    fn names<'a>(nodes: impl Iterator<Item = &'a Node>) -> Vec<&'a str> {
        nodes.map(|n| n.display_label().unwrap_or("-")).collect()
    }

    #[test]
    fn traversal_orders() {
        let tree = polytomy();
        assert_eq!(names(tree.pre_order_iter()), vec!["root", "x", "A", "B", "C", "D"]);
        assert_eq!(names(tree.post_order_iter()), vec!["A", "B", "x", "C", "D", "root"]);
        assert_eq!(names(tree.leaves()), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn edges_point_to_parents() {
        let tree = polytomy();
        assert!(tree.is_valid());
        assert_eq!(tree.root().edge().tail(), None);
        for node in tree.iter().filter(|n| !n.is_root()) {
            assert_eq!(node.edge().tail(), node.parent());
            assert_eq!(node.edge().head(), node.index());
        }
    }

    #[test]
    fn unreachable_node_is_invalid() {
        let mut tree = polytomy();
        tree.add_leaf(NodeName::Label("stray".into()), None);
        assert!(!tree.is_valid());
    }

    #[test]
    fn foreign_taxon_is_invalid() {
        let mut tree = polytomy();
        let foreign = TaxonNamespace::new().require_taxon("A");
        tree.node_mut(0).set_name(NodeName::Taxon(foreign));
        assert!(!tree.is_valid());
    }

    #[test]
    fn equality_ignores_namespace_identity() {
        assert_eq!(polytomy(), polytomy());
        let mut other = polytomy();
        other.node_mut(0).edge_mut().set_length(Some(2.0));
        assert_ne!(polytomy(), other);
    }

    #[test]
    fn metadata_extraction_is_idempotent() {
        let mut tree = polytomy();
        tree.comments_mut().push("&posterior=0.9".into());
        tree.node_mut(2).comments_mut().extend(["plain".to_string(), "&support=87".to_string()]);
        tree.node_mut(0).edge_mut().comments_mut().push("&rate=1.5".into());

        assert_eq!(tree.extract_comment_metadata().unwrap(), 3);
        assert_eq!(tree.extract_comment_metadata().unwrap(), 0);
        assert_eq!(tree.node(2).comments(), ["plain".to_string()]);
        assert!(tree.node(2).annotations().contains_key("support"));
        assert!(tree.node(0).edge().annotations().contains_key("rate"));
        assert!(tree.annotations().contains_key("posterior"));
    }

    #[test]
    fn rooting_interpretation() {
        use RootingInterpretation::*;
        assert_eq!(AsSpecified.apply(Rooting::Unspecified), Rooting::Unspecified);
        assert_eq!(DefaultRooted.apply(Rooting::Unspecified), Rooting::Rooted);
        assert_eq!(DefaultRooted.apply(Rooting::Unrooted), Rooting::Unrooted);
        assert_eq!(DefaultUnrooted.apply(Rooting::Rooted), Rooting::Rooted);
        assert_eq!(ForceUnrooted.apply(Rooting::Rooted), Rooting::Unrooted);
        assert_eq!("Force_Rooted".parse::<RootingInterpretation>(), Ok(ForceRooted));
        assert!("rooted".parse::<RootingInterpretation>().is_err());
    }

    #[test]
    fn ascii_rendering_lists_every_node() {
        let rendered = polytomy().render_ascii();
        assert_eq!(rendered.lines().count(), 6);
        assert!(rendered.starts_with("[5] root\n"));
        assert!(rendered.contains("└─ [4] D (length: 1.000)"));
    }
}
