//! Serde types of the JSON reference form, and their construction from a
//! [TreeList].

use crate::model::annotation::AnnotationSet;
use crate::model::node::NodeIndex;
use crate::model::tree::Tree;
use crate::model::tree_list::TreeList;
use serde::{Deserialize, Serialize};

// ============================================================================
// Schema Types
// ============================================================================

/// Top-level document: declared taxa and the collections of trees.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JsonDocument {
    /// Labels registered before any tree, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub taxa: Vec<String>,

    #[serde(default)]
    pub collections: Vec<JsonCollection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JsonCollection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default)]
    pub trees: Vec<JsonTree>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JsonTree {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Absent if the rooting is unspecified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_rooted: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,

    #[serde(default, skip_serializing_if = "AnnotationSet::is_empty")]
    pub metadata: AnnotationSet,

    pub root: JsonNode,
}

/// A node together with its incoming edge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JsonNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Length of the incoming edge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edge_comments: Vec<String>,

    #[serde(default, skip_serializing_if = "AnnotationSet::is_empty")]
    pub metadata: AnnotationSet,

    #[serde(default, skip_serializing_if = "AnnotationSet::is_empty")]
    pub edge_metadata: AnnotationSet,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<JsonNode>,
}

// ============================================================================
// Conversion from the model
// ============================================================================
impl JsonDocument {
    /// Document with all taxa of the list's namespace and the list as its
    /// only collection.
    pub fn from_tree_list(trees: &TreeList) -> Self {
        let taxa = trees
            .taxon_namespace()
            .borrow()
            .iter()
            .map(|taxon| taxon.label().to_string())
            .collect();
        let collection = JsonCollection {
            label: trees.label().map(str::to_string),
            trees: trees.iter().map(JsonTree::from_tree).collect(),
        };
        JsonDocument {
            taxa,
            collections: vec![collection],
        }
    }
}

impl JsonTree {
    /// # Panics
    /// If the tree has no root.
    pub fn from_tree(tree: &Tree) -> Self {
        JsonTree {
            label: tree.label().map(str::to_string),
            is_rooted: tree.is_rooted(),
            comments: tree.comments().to_vec(),
            metadata: tree.annotations().clone(),
            root: JsonNode::from_node(tree, tree.root_index()),
        }
    }
}

impl JsonNode {
    fn from_node(tree: &Tree, index: NodeIndex) -> Self {
        let node = tree.node(index);
        let edge = node.edge();
        JsonNode {
            label: node.display_label().map(str::to_string),
            length: edge.length(),
            comments: node.comments().to_vec(),
            edge_comments: edge.comments().to_vec(),
            metadata: node.annotations().clone(),
            edge_metadata: edge.annotations().clone(),
            children: node
                .children()
                .iter()
                .map(|&child| JsonNode::from_node(tree, child))
                .collect(),
        }
    }
}
