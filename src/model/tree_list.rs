//! Ordered collection of trees over one shared taxon namespace.

use crate::error::UsageError;
use crate::model::taxon::{SharedTaxonNamespace, TaxonNamespace};
use crate::model::tree::Tree;
use std::fmt;
use std::rc::Rc;

/// Trees in read order, all sharing the list's
/// [TaxonNamespace](crate::model::TaxonNamespace).
///
/// Every tree held by a `TreeList` refers to exactly the namespace returned
/// by [taxon_namespace](TreeList::taxon_namespace); [push](TreeList::push)
/// and the read operations (see [crate::read]) enforce this.
///
/// # Example
/// ```
/// use phyloread::model::TreeList;
/// use std::rc::Rc;
///
/// let mut trees = TreeList::get_from_string("((A,B),C);(A,(B,C));", "newick", ()).unwrap();
/// assert_eq!(trees.len(), 2);
///
/// let added = trees.read_from_string("(C,(A,D));", "newick", ()).unwrap();
/// assert_eq!(added, 1);
/// assert_eq!(trees.taxon_namespace().borrow().labels(), vec!["A", "B", "C", "D"]);
/// assert!(trees.iter().all(|t| Rc::ptr_eq(t.taxon_namespace(), trees.taxon_namespace())));
/// ```
#[derive(Debug, Clone)]
pub struct TreeList {
    label: Option<String>,
    taxon_namespace: SharedTaxonNamespace,
    trees: Vec<Tree>,
}

impl TreeList {
    /// Creates an empty list with a fresh namespace.
    pub fn new() -> Self {
        Self::with_taxon_namespace(TaxonNamespace::shared())
    }

    /// Creates an empty list over an existing namespace, e.g. one shared
    /// with other lists.
    pub fn with_taxon_namespace(taxon_namespace: SharedTaxonNamespace) -> Self {
        Self {
            label: None,
            taxon_namespace,
            trees: Vec::new(),
        }
    }

    pub fn taxon_namespace(&self) -> &SharedTaxonNamespace {
        &self.taxon_namespace
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Tree> {
        self.trees.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Tree> {
        self.trees.get_mut(index)
    }

    pub fn first(&self) -> Option<&Tree> {
        self.trees.first()
    }

    pub fn last(&self) -> Option<&Tree> {
        self.trees.last()
    }

    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tree> {
        self.trees.iter()
    }

    pub fn into_trees(self) -> Vec<Tree> {
        self.trees
    }

    /// Appends `tree`.
    ///
    /// # Errors
    /// [UsageError::ForeignTaxonNamespace] if the tree does not use this
    /// list's namespace.
    pub fn push(&mut self, tree: Tree) -> Result<(), UsageError> {
        if !Rc::ptr_eq(tree.taxon_namespace(), &self.taxon_namespace) {
            return Err(UsageError::ForeignTaxonNamespace);
        }
        self.trees.push(tree);
        Ok(())
    }

    /// Keeps the first `len` trees. Taxa are never removed from the namespace.
    pub fn truncate(&mut self, len: usize) {
        self.trees.truncate(len);
    }

    /// Removes and returns the tree at `index`.
    ///
    /// # Panics
    /// If `index` is out of bounds.
    pub fn remove(&mut self, index: usize) -> Tree {
        self.trees.remove(index)
    }

    /// Appends trees already checked to share this namespace.
    pub(crate) fn append_checked(&mut self, trees: Vec<Tree>) {
        debug_assert!(
            trees
                .iter()
                .all(|t| Rc::ptr_eq(t.taxon_namespace(), &self.taxon_namespace))
        );
        self.trees.extend(trees);
    }
}

impl Default for TreeList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for TreeList {
    type Output = Tree;

    fn index(&self, index: usize) -> &Self::Output {
        &self.trees[index]
    }
}

impl<'a> IntoIterator for &'a TreeList {
    type Item = &'a Tree;
    type IntoIter = std::slice::Iter<'a, Tree>;

    fn into_iter(self) -> Self::IntoIter {
        self.trees.iter()
    }
}

/// Structural equality of the trees and the list label; namespaces are not
/// compared by identity.
impl PartialEq for TreeList {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label && self.trees == other.trees
    }
}

/// One Newick line per tree.
impl fmt::Display for TreeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for tree in &self.trees {
            writeln!(f, "{tree}")?;
        }
        Ok(())
    }
}
