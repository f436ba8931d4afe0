//! Shared helpers for the integration tests: fixture access, reading the
//! same fixture through each source kind, and model invariant checks.

#![allow(dead_code)]

use phyloread::read::IntoReadOptions;
use phyloread::{ReadError, Tree, TreeList};
use std::fs::File;
use std::path::PathBuf;

/// The three ways a source can be handed to the read operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Path,
    Stream,
    Text,
}

pub const SOURCE_KINDS: [SourceKind; 3] = [SourceKind::Path, SourceKind::Stream, SourceKind::Text];

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn fixture_text(name: &str) -> String {
    std::fs::read_to_string(fixture(name)).expect("fixture should be readable")
}

/// `TreeList::get_from_*` on fixture `name`, through the given source kind.
pub fn get_fixture<O: IntoReadOptions>(
    kind: SourceKind,
    name: &str,
    schema: &str,
    options: O,
) -> Result<TreeList, ReadError> {
    match kind {
        SourceKind::Path => TreeList::get_from_path(fixture(name), schema, options),
        SourceKind::Stream => {
            let file = File::open(fixture(name)).expect("fixture should open");
            TreeList::get_from_stream(file, schema, options)
        }
        SourceKind::Text => TreeList::get_from_string(&fixture_text(name), schema, options),
    }
}

/// `TreeList::read_from_*` on fixture `name`, through the given source kind.
pub fn read_fixture<O: IntoReadOptions>(
    trees: &mut TreeList,
    kind: SourceKind,
    name: &str,
    schema: &str,
    options: O,
) -> Result<usize, ReadError> {
    match kind {
        SourceKind::Path => trees.read_from_path(fixture(name), schema, options),
        SourceKind::Stream => {
            let file = File::open(fixture(name)).expect("fixture should open");
            trees.read_from_stream(file, schema, options)
        }
        SourceKind::Text => trees.read_from_string(&fixture_text(name), schema, options),
    }
}

/// Asserts the structural invariants every read tree must satisfy:
/// - no node carries both a label and a taxon
/// - a node is a leaf iff it has no children
/// - edges point from their node to its parent
/// - every taxon belongs to the tree's namespace
pub fn assert_tree_invariants(tree: &Tree) {
    assert!(tree.is_valid(), "tree is not connected: {tree}");
    let namespace = tree.taxon_namespace().borrow();
    for node in tree.nodes() {
        assert!(
            !(node.label().is_some() && node.taxon().is_some()),
            "node {} has both a label and a taxon",
            node.index()
        );
        assert_eq!(node.is_leaf(), node.children().is_empty());
        assert_eq!(node.edge().head(), node.index());
        assert_eq!(node.edge().tail(), node.parent());
        if let Some(taxon) = node.taxon() {
            assert!(namespace.contains(taxon), "taxon {taxon} is foreign");
        }
    }
}

/// Asserts [assert_tree_invariants] for every tree and that all trees share
/// the list's namespace.
pub fn assert_list_invariants(trees: &TreeList) {
    for tree in trees {
        assert!(
            std::rc::Rc::ptr_eq(tree.taxon_namespace(), trees.taxon_namespace()),
            "tree does not share the list's namespace"
        );
        assert_tree_invariants(tree);
    }
}
