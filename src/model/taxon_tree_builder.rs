//! [TreeBuilder] producing [Tree]s whose taxa live in a shared
//! [TaxonNamespace](crate::model::TaxonNamespace).
//!
//! This is where the per-read configuration takes effect:
//! - names of internal nodes and of leaves become taxa or plain labels,
//!   depending on the two suppression flags
//! - comments are kept apart for nodes and edges, or merged onto the node
//! - metadata comments are optionally turned into annotations
//! - the source's rooting is interpreted

use crate::model::annotation::AnnotationSet;
use crate::model::label_resolver::LabelResolver;
use crate::model::metadata::{MetadataError, extract_metadata_into};
use crate::model::node::{NodeIndex, NodeName};
use crate::model::taxon::SharedTaxonNamespace;
use crate::model::tree::{Rooting, RootingInterpretation, Tree};
use crate::model::tree_builder::{BuildError, TreeBuilder, VertexRecord};

pub struct TaxonTreeBuilder {
    taxon_namespace: SharedTaxonNamespace,
    resolver: LabelResolver,
    suppress_internal_node_taxa: bool,
    suppress_leaf_node_taxa: bool,
    extract_comment_metadata: bool,
    distinct_nodes_and_edges: bool,
    rooting: RootingInterpretation,
    current_tree: Option<Tree>,
    /// Namespace length when the current tree was started
    namespace_mark: usize,
}

impl TaxonTreeBuilder {
    /// Builder with default policy: internal names are labels, leaf names are
    /// taxa, comments are merged onto nodes and kept raw.
    pub fn new(taxon_namespace: SharedTaxonNamespace) -> Self {
        Self {
            taxon_namespace,
            resolver: LabelResolver::Verbatim,
            suppress_internal_node_taxa: true,
            suppress_leaf_node_taxa: false,
            extract_comment_metadata: false,
            distinct_nodes_and_edges: false,
            rooting: RootingInterpretation::AsSpecified,
            current_tree: None,
            namespace_mark: 0,
        }
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

    pub fn with_rooting(mut self, rooting: RootingInterpretation) -> Self {
        self.rooting = rooting;
        self
    }

    pub fn taxon_namespace(&self) -> &SharedTaxonNamespace {
        &self.taxon_namespace
    }

    fn current(&mut self) -> Result<&mut Tree, BuildError> {
        self.current_tree.as_mut().ok_or(BuildError::NotInitialized)
    }

    /// Turns a vertex name into a label or a taxon per suppression policy.
    fn bind_name(&self, name: Option<String>, is_leaf: bool) -> Result<NodeName, BuildError> {
        let Some(name) = name else {
            return Ok(NodeName::None);
        };
        let suppress = if is_leaf {
            self.suppress_leaf_node_taxa
        } else {
            self.suppress_internal_node_taxa
        };
        if suppress {
            return Ok(NodeName::Label(name));
        }
        let label = self.resolver.resolve(&name)?;
        let taxon = self.taxon_namespace.borrow_mut().require_taxon(&label);
        Ok(NodeName::Taxon(taxon))
    }

    fn add_vertex(
        &mut self,
        children: Vec<NodeIndex>,
        record: VertexRecord,
    ) -> Result<NodeIndex, BuildError> {
        let VertexRecord {
            name,
            edge_length,
            node_comments,
            edge_comments,
            node_metadata,
            edge_metadata,
        } = record;

        let name = self.bind_name(name, children.is_empty())?;
        let distinct = self.distinct_nodes_and_edges;
        let extract = self.extract_comment_metadata;

        let tree = self.current()?;
        if let Some(&bad) = children
            .iter()
            .find(|&&c| c >= tree.num_nodes() || !tree.node(c).is_root())
        {
            return Err(BuildError::InvalidStructure(format!(
                "node {bad} cannot be attached as a child"
            )));
        }
        let index = if children.is_empty() {
            tree.add_leaf(name, edge_length)
        } else {
            tree.add_internal(children, name, edge_length)
        };

        let node = tree.node_mut(index);
        node.comments_mut().extend(node_comments);
        node.annotations_mut().merge(node_metadata);
        if distinct {
            let edge = node.edge_mut();
            edge.comments_mut().extend(edge_comments);
            edge.annotations_mut().merge(edge_metadata);
        } else {
            node.comments_mut().extend(edge_comments);
            node.annotations_mut().merge(edge_metadata);
        }

        if extract {
            let (comments, annotations) = node.parts_mut();
            extract_metadata_into(comments, annotations).map_err(metadata_error)?;
            let (comments, annotations) = node.edge_mut().parts_mut();
            extract_metadata_into(comments, annotations).map_err(metadata_error)?;
        }
        Ok(index)
    }
}

fn metadata_error(error: MetadataError) -> BuildError {
    BuildError::InvalidMetadata(error.to_string())
}

impl TreeBuilder for TaxonTreeBuilder {
    type NodeIdx = NodeIndex;
    type Tree = Tree;

    fn init_next(&mut self, num_nodes_hint: usize) {
        self.namespace_mark = self.taxon_namespace.borrow().len();
        self.current_tree = Some(Tree::with_capacity(
            self.taxon_namespace.clone(),
            num_nodes_hint,
        ));
    }

    fn set_name(&mut self, name: String) -> Result<(), BuildError> {
        self.current()?.set_label(Some(name));
        Ok(())
    }

    fn set_rooting(&mut self, rooting: Rooting) -> Result<(), BuildError> {
        self.current()?.set_rooting(rooting);
        Ok(())
    }

    fn add_tree_comment(&mut self, comment: String) -> Result<(), BuildError> {
        self.current()?.comments_mut().push(comment);
        Ok(())
    }

    fn add_tree_metadata(&mut self, metadata: AnnotationSet) -> Result<(), BuildError> {
        self.current()?.annotations_mut().merge(metadata);
        Ok(())
    }

    fn add_leaf(&mut self, record: VertexRecord) -> Result<NodeIndex, BuildError> {
        self.add_vertex(Vec::new(), record)
    }

    fn add_internal(
        &mut self,
        children: Vec<NodeIndex>,
        record: VertexRecord,
    ) -> Result<NodeIndex, BuildError> {
        if children.is_empty() {
            return Err(BuildError::InvalidStructure(
                "internal node without children".to_string(),
            ));
        }
        self.add_vertex(children, record)
    }

    fn finish_tree(&mut self, root: NodeIndex) -> Result<Tree, BuildError> {
        let mut tree = self.current_tree.take().ok_or(BuildError::NotInitialized)?;
        if root >= tree.num_nodes() {
            return Err(BuildError::InvalidStructure(format!(
                "root {root} is not a node of the tree"
            )));
        }
        tree.set_root(root);
        tree.set_rooting(self.rooting.apply(tree.rooting()));

        if self.extract_comment_metadata {
            let mut comments = std::mem::take(tree.comments_mut());
            extract_metadata_into(&mut comments, tree.annotations_mut()).map_err(metadata_error)?;
            *tree.comments_mut() = comments;
        }

        if !tree.is_valid() {
            return Err(BuildError::InvalidStructure(
                "tree is not connected to its root".to_string(),
            ));
        }
        Ok(tree)
    }

    fn abandon_tree(&mut self) {
        self.current_tree = None;
        self.taxon_namespace.borrow_mut().truncate(self.namespace_mark);
    }

    fn declare_taxa(&mut self, labels: &[String]) {
        let mut namespace = self.taxon_namespace.borrow_mut();
        for label in labels {
            namespace.require_taxon(label);
        }
    }

    fn set_resolver(&mut self, resolver: LabelResolver) {
        self.resolver = resolver;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::taxon::TaxonNamespace;
    use std::collections::HashMap;
    use std::rc::Rc;

    /// Builds (A,B)x with the given builder; the edge of A has comments.
    fn cherry(builder: &mut TaxonTreeBuilder) -> Result<Tree, BuildError> {
        builder.init_next(3);
        let mut a = VertexRecord::named("A").with_edge_length(1.0);
        a.node_comments.push("&support=90".into());
        a.edge_comments.push("&rate=0.5".into());
        a.edge_comments.push("slow".into());
        let a = builder.add_leaf(a)?;
        let b = builder.add_leaf(VertexRecord::named("B"))?;
        let x = builder.add_internal(vec![a, b], VertexRecord::named("x"))?;
        builder.finish_tree(x)
    }

    #[test]
    fn default_policy_binds_leaves_to_taxa() {
        let namespace = TaxonNamespace::shared();
        let tree = cherry(&mut TaxonTreeBuilder::new(namespace.clone())).unwrap();
        assert_eq!(namespace.borrow().labels(), vec!["A", "B"]);
        assert!(tree.node(0).taxon().is_some());
        assert_eq!(tree.root().label(), Some("x"));
        assert!(tree.root().taxon().is_none());
    }

    #[test]
    fn suppression_flags_are_independent() {
        let namespace = TaxonNamespace::shared();
        let mut builder = TaxonTreeBuilder::new(namespace.clone())
            .with_suppress_internal_node_taxa(false)
            .with_suppress_leaf_node_taxa(true);
        let tree = cherry(&mut builder).unwrap();
        assert_eq!(namespace.borrow().labels(), vec!["x"]);
        assert_eq!(tree.node(0).label(), Some("A"));
        assert!(tree.root().taxon().is_some());
    }

    #[test]
    fn merged_comments_go_to_the_node() {
        let tree = cherry(&mut TaxonTreeBuilder::new(TaxonNamespace::shared())).unwrap();
        let a = tree.node(0);
        assert_eq!(a.comments(), ["&support=90", "&rate=0.5", "slow"]);
        assert!(a.edge().comments().is_empty());
    }

    #[test]
    fn distinct_mode_with_extraction() {
        let mut builder = TaxonTreeBuilder::new(TaxonNamespace::shared())
            .with_distinct_nodes_and_edges(true)
            .with_extract_comment_metadata(true);
        let tree = cherry(&mut builder).unwrap();
        let a = tree.node(0);
        assert!(a.comments().is_empty());
        assert!(a.annotations().contains_key("support"));
        assert_eq!(a.edge().comments(), ["slow"]);
        assert!(a.edge().annotations().contains_key("rate"));
    }

    #[test]
    fn abandoned_tree_rolls_back_its_taxa() {
        let namespace = TaxonNamespace::shared();
        let mut builder = TaxonTreeBuilder::new(namespace.clone());
        builder.declare_taxa(&["Z".to_string()]);
        builder.init_next(2);
        builder.add_leaf(VertexRecord::named("A")).unwrap();
        builder.abandon_tree();
        assert_eq!(namespace.borrow().labels(), vec!["Z"]);
        assert!(matches!(builder.set_name("t".into()), Err(BuildError::NotInitialized)));
    }

    #[test]
    fn resolver_translates_taxon_names() {
        let namespace = TaxonNamespace::shared();
        let mut builder = TaxonTreeBuilder::new(namespace.clone());
        let labels = vec!["Gygis alba".to_string()];
        builder.declare_taxa(&labels);
        builder.set_resolver(LabelResolver::for_nexus(labels, HashMap::new()));
        builder.init_next(1);
        let leaf = builder.add_leaf(VertexRecord::named("1")).unwrap();
        let tree = builder.finish_tree(leaf).unwrap();
        let declared = namespace.borrow().get_taxon("Gygis alba").unwrap();
        assert!(Rc::ptr_eq(tree.root().taxon().unwrap(), &declared));
    }

    #[test]
    fn child_cannot_be_attached_twice() {
        let mut builder = TaxonTreeBuilder::new(TaxonNamespace::shared());
        builder.init_next(3);
        let a = builder.add_leaf(VertexRecord::named("A")).unwrap();
        builder.add_internal(vec![a], VertexRecord::default()).unwrap();
        assert!(matches!(
            builder.add_internal(vec![a], VertexRecord::default()),
            Err(BuildError::InvalidStructure(_))
        ));
    }
}
