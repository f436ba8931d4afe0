//! Newick string writing for [Tree]s.

use crate::model::annotation::AnnotationSet;
use crate::model::node::NodeIndex;
use crate::model::taxon::Taxon;
use crate::model::tree::{Rooting, Tree};
use crate::parser::utils::escape_label;
use std::collections::HashMap;
use std::io::{self, Write};

/// Rough number of characters per node, to pre-allocate strings
const CHARS_PER_NODE: usize = 12;

/// How taxa are named in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaxonNaming {
    /// Escaped taxon label
    #[default]
    Label,
    /// 1-based position of the taxon in the tree's namespace (as used with
    /// a Nexus `TRANSLATE` table)
    OneIndexed,
}

/// What to include when serializing a tree to Newick.
///
/// The default includes everything, so parsing the output yields the same
/// tree again (with annotations written back as metadata comments).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewickStyle {
    pub edge_lengths: bool,
    /// Raw comments of tree, nodes and edges
    pub comments: bool,
    /// Annotations, as `[&key=value,...]` comments
    pub annotations: bool,
    /// Leading `[&R]`/`[&U]` for trees whose rooting is known
    pub rooting_token: bool,
    pub taxon_naming: TaxonNaming,
}

impl Default for NewickStyle {
    fn default() -> Self {
        Self {
            edge_lengths: true,
            comments: true,
            annotations: true,
            rooting_token: true,
            taxon_naming: TaxonNaming::Label,
        }
    }
}

impl NewickStyle {
    /// Topology, names and edge lengths only.
    pub fn plain() -> Self {
        Self {
            comments: false,
            annotations: false,
            rooting_token: false,
            ..Self::default()
        }
    }
}

/// Returns the Newick representation of `tree` with closing semicolon.
///
/// # Example
/// ```
/// use phyloread::model::Tree;
/// use phyloread::newick::{NewickStyle, to_newick};
///
/// let tree = Tree::get_from_string("[&R] (('Little spotted kiwi':1,Tokoeka:1)[&support=0.9]:0.5,Rowi:1.5);", "newick", ()).unwrap();
/// assert_eq!(
///     to_newick(&tree, &NewickStyle::default()),
///     "[&R] ((Little_spotted_kiwi:1,Tokoeka:1)[&support=0.9]:0.5,Rowi:1.5);"
/// );
/// assert_eq!(
///     to_newick(&tree, &NewickStyle::plain()),
///     "((Little_spotted_kiwi:1,Tokoeka:1):0.5,Rowi:1.5);"
/// );
/// ```
pub fn to_newick(tree: &Tree, style: &NewickStyle) -> String {
    let keys = match style.taxon_naming {
        TaxonNaming::Label => None,
        TaxonNaming::OneIndexed => Some(taxon_keys(tree)),
    };

    let mut newick = String::with_capacity(tree.num_nodes() * CHARS_PER_NODE);
    if style.rooting_token {
        match tree.rooting() {
            Rooting::Rooted => newick.push_str("[&R] "),
            Rooting::Unrooted => newick.push_str("[&U] "),
            Rooting::Unspecified => {}
        }
    }
    if style.comments {
        for comment in tree.comments() {
            push_comment(&mut newick, comment);
            newick.push(' ');
        }
    }
    if style.annotations && !tree.annotations().is_empty() {
        push_annotations(&mut newick, tree.annotations());
        newick.push(' ');
    }

    if tree.is_root_set() {
        build_newick(tree, tree.root_index(), style, keys.as_ref(), &mut newick);
    }
    newick.push(';');
    newick
}

/// Writes `trees` in Newick format, one tree per line.
///
/// # Errors
/// Returns an I/O error if writing fails.
pub fn write_newick<'a, W, I>(mut writer: W, trees: I, style: &NewickStyle) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Tree>,
{
    for tree in trees {
        writer.write_all(to_newick(tree, style).as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

/// Maps each taxon of the tree's namespace to its 1-based position.
fn taxon_keys(tree: &Tree) -> HashMap<*const Taxon, usize> {
    tree.taxon_namespace()
        .borrow()
        .iter()
        .enumerate()
        .map(|(i, taxon)| (std::rc::Rc::as_ptr(taxon), i + 1))
        .collect()
}

/// Recursive helper for building the Newick string
fn build_newick(
    tree: &Tree,
    index: NodeIndex,
    style: &NewickStyle,
    keys: Option<&HashMap<*const Taxon, usize>>,
    newick: &mut String,
) {
    let node = tree.node(index);

    if node.is_internal() {
        newick.push('(');
        for (i, &child) in node.children().iter().enumerate() {
            if i > 0 {
                newick.push(',');
            }
            build_newick(tree, child, style, keys, newick);
        }
        newick.push(')');
    }

    match (node.taxon(), keys) {
        (Some(taxon), Some(keys)) => match keys.get(&std::rc::Rc::as_ptr(taxon)) {
            Some(key) => newick.push_str(&key.to_string()),
            None => newick.push_str(&escape_label(taxon.label())),
        },
        _ => {
            if let Some(name) = node.display_label() {
                newick.push_str(&escape_label(name));
            }
        }
    }

    if style.comments {
        node.comments().iter().for_each(|c| push_comment(newick, c));
    }
    if style.annotations && !node.annotations().is_empty() {
        push_annotations(newick, node.annotations());
    }

    let edge = node.edge();
    if let (true, Some(length)) = (style.edge_lengths, edge.length()) {
        newick.push(':');
        newick.push_str(&length.to_string());
    }
    if style.comments {
        edge.comments().iter().for_each(|c| push_comment(newick, c));
    }
    if style.annotations && !edge.annotations().is_empty() {
        push_annotations(newick, edge.annotations());
    }
}

fn push_comment(newick: &mut String, comment: &str) {
    newick.push('[');
    newick.push_str(comment);
    newick.push(']');
}

/// Writes annotations as one `[&name=value,...]` metadata comment.
fn push_annotations(out: &mut String, annotations: &AnnotationSet) {
    out.push_str("[&");
    for (i, annotation) in annotations.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&annotation.name);
        out.push('=');
        out.push_str(&annotation.value.to_string());
    }
    out.push(']');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeName, TaxonNamespace};

    #[test]
    fn one_indexed_taxa() {
        let namespace = TaxonNamespace::shared();
        namespace.borrow_mut().require_taxon("unused");
        let b = namespace.borrow_mut().require_taxon("B");
        let mut tree = Tree::new(namespace.clone());
        let leaf_b = tree.add_leaf(NodeName::Taxon(b), Some(0.25));
        let leaf_x = tree.add_leaf(NodeName::Label("x y".into()), None);
        let root = tree.add_internal(vec![leaf_b, leaf_x], NodeName::None, None);
        tree.set_root(root);

        let style = NewickStyle {
            taxon_naming: TaxonNaming::OneIndexed,
            ..NewickStyle::default()
        };
        assert_eq!(to_newick(&tree, &style), "(2:0.25,x_y);");
    }

    #[test]
    fn comments_are_written_where_they_are_read() {
        let namespace = TaxonNamespace::shared();
        let mut tree = Tree::new(namespace);
        let leaf = tree.add_leaf(NodeName::Label("A".into()), Some(1.0));
        tree.node_mut(leaf).comments_mut().push("node".into());
        tree.node_mut(leaf).edge_mut().comments_mut().push("edge".into());
        tree.node_mut(leaf).annotations_mut().insert("rate", 0.5);
        tree.set_root(leaf);
        tree.set_rooting(Rooting::Unrooted);

        assert_eq!(to_newick(&tree, &NewickStyle::default()), "[&U] A[node][&rate=0.5]:1[edge];");
        assert_eq!(to_newick(&tree, &NewickStyle::plain()), "A:1;");
    }
}
