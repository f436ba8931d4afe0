//! Building trees from the JSON reference form.

use crate::error::ReadError;
use crate::json::document::{JsonDocument, JsonNode, JsonTree};
use crate::model::tree::Rooting;
use crate::model::tree_builder::{BuildError, TreeBuilder, VertexRecord};
use crate::parser::byte_parser::ByteParser;
use crate::parser::byte_source::ByteSource;
use crate::parser::parsing_error::{ParsingError, ParsingErrorType};
use crate::read::schema::SchemaParser;
use crate::read::selection::Selection;
use tracing::debug;

/// Parser for [JsonDocument]s, feeding a [TreeBuilder] like the text
/// parsers do, so the same naming and comment policy applies.
///
/// Labels are taken as written (no quoting rules apply).
pub struct JsonParser<T: TreeBuilder> {
    tree_builder: T,
}

impl<T: TreeBuilder> JsonParser<T> {
    pub fn new(tree_builder: T) -> Self {
        Self { tree_builder }
    }

    pub fn into_tree_builder(self) -> T {
        self.tree_builder
    }

    /// Parses a whole document and returns the trees of all collections.
    ///
    /// # Errors
    /// [InvalidJson](ParsingErrorType::InvalidJson) if the text is not a
    /// valid document, or the error of the first tree that cannot be built.
    pub fn parse_str(&mut self, json: &str) -> Result<Vec<T::Tree>, ParsingError> {
        let document = parse_document(json.as_bytes())?;
        self.tree_builder.declare_taxa(&document.taxa);
        document
            .collections
            .iter()
            .flat_map(|collection| collection.trees.iter())
            .map(|tree| self.build_tree(tree))
            .collect()
    }

    /// Builds one tree, abandoning it on error.
    fn build_tree(&mut self, tree: &JsonTree) -> Result<T::Tree, ParsingError> {
        self.tree_builder.init_next(count_nodes(&tree.root));
        match self.build_tree_inner(tree) {
            Ok(tree) => Ok(tree),
            Err(e) => {
                self.tree_builder.abandon_tree();
                Err(ParsingError::without_context(e.into()))
            }
        }
    }

    fn build_tree_inner(&mut self, tree: &JsonTree) -> Result<T::Tree, BuildError> {
        let builder = &mut self.tree_builder;
        if let Some(label) = &tree.label {
            builder.set_name(label.clone())?;
        }
        if tree.is_rooted.is_some() {
            builder.set_rooting(Rooting::from_is_rooted(tree.is_rooted))?;
        }
        for comment in &tree.comments {
            builder.add_tree_comment(comment.clone())?;
        }
        if !tree.metadata.is_empty() {
            builder.add_tree_metadata(tree.metadata.clone())?;
        }
        let root = build_node(builder, &tree.root)?;
        builder.finish_tree(root)
    }
}

/// Adds `node` and its descendants, children first.
fn build_node<T: TreeBuilder>(builder: &mut T, node: &JsonNode) -> Result<T::NodeIdx, BuildError> {
    let children = node
        .children
        .iter()
        .map(|child| build_node(builder, child))
        .collect::<Result<Vec<_>, _>>()?;

    let record = VertexRecord {
        name: node.label.clone(),
        edge_length: node.length,
        node_comments: node.comments.clone(),
        edge_comments: node.edge_comments.clone(),
        node_metadata: node.metadata.clone(),
        edge_metadata: node.edge_metadata.clone(),
    };
    if children.is_empty() {
        builder.add_leaf(record)
    } else {
        builder.add_internal(children, record)
    }
}

fn count_nodes(node: &JsonNode) -> usize {
    1 + node.children.iter().map(count_nodes).sum::<usize>()
}

fn parse_document(bytes: &[u8]) -> Result<JsonDocument, ParsingError> {
    serde_json::from_slice(bytes)
        .map_err(|e| ParsingError::without_context(ParsingErrorType::InvalidJson(e.to_string())))
}

// ============================================================================
// Read protocol
// ============================================================================
/// Each entry of `collections` is one collection.
impl<T: TreeBuilder> SchemaParser for JsonParser<T> {
    type Tree = T::Tree;

    fn parse_selected<B: ByteSource>(
        &mut self,
        mut byte_parser: ByteParser<B>,
        selection: &Selection,
    ) -> Result<Vec<T::Tree>, ReadError> {
        let document = parse_document(&byte_parser.read_remaining())?;
        self.tree_builder.declare_taxa(&document.taxa);

        let selected = match selection.resolve_collection(document.collections.len())? {
            Some(index) => {
                let trees = &document.collections[index].trees;
                let start = selection.resolve_tree_start(trees.len())?;
                debug!("Skipping {start} of {} trees in collection {index}", trees.len());
                &trees[start..]
            }
            None => {
                let mut trees = Vec::new();
                for collection in &document.collections {
                    for tree in &collection.trees {
                        trees.push(self.build_tree(tree)?);
                    }
                }
                return Ok(trees);
            }
        };

        let mut trees = Vec::with_capacity(selected.len());
        for tree in selected {
            trees.push(self.build_tree(tree)?);
        }
        Ok(trees)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TaxonNamespace, TaxonTreeBuilder};

    #[test]
    fn builds_through_the_tree_builder() {
        let json = r#"{
            "taxa": ["Tui", "Bellbird"],
            "collections": [{"trees": [{
                "label": "honeyeaters",
                "is_rooted": true,
                "root": {"label": "anc", "children": [
                    {"label": "Bellbird", "length": 0.5, "comments": ["&pos=1"]},
                    {"label": "Stitchbird", "length": 1.5}
                ]}
            }]}]
        }"#;
        let namespace = TaxonNamespace::shared();
        let builder = TaxonTreeBuilder::new(namespace.clone()).with_extract_comment_metadata(true);
        let trees = JsonParser::new(builder).parse_str(json).unwrap();

        let tree = &trees[0];
        assert_eq!(tree.label(), Some("honeyeaters"));
        assert_eq!(tree.is_rooted(), Some(true));
        assert_eq!(tree.root().label(), Some("anc"));
        assert_eq!(tree.node(0).annotations().get("pos").and_then(|v| v.as_i64()), Some(1));
        assert_eq!(namespace.borrow().labels(), vec!["Tui", "Bellbird", "Stitchbird"]);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let builder = TaxonTreeBuilder::new(TaxonNamespace::shared());
        let err = JsonParser::new(builder)
            .parse_str(r#"{"collections": [{"trees": [{"root": {}, "weight": 2}]}]}"#)
            .unwrap_err();
        assert!(matches!(err.kind(), ParsingErrorType::InvalidJson(_)));
    }
}
