//! Taxa and the namespace registry shared by co-occurring trees.
//!
//! - [Taxon]: an immutable, labelled operational taxonomic unit
//! - [TaxonNamespace]: ordered registry of taxa with lookup by label
//! - [SharedTaxonNamespace]: the reference-counted handle trees and tree
//!   lists hold, so all of them resolve names against the same registry
//!
//! Taxon identity is object identity: two [TaxonRef]s denote the same taxon
//! iff [Rc::ptr_eq] holds, never merely because their labels agree.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Shared handle to a [Taxon].
pub type TaxonRef = Rc<Taxon>;

/// Shared handle to a [TaxonNamespace].
///
/// Single-threaded shared ownership: concurrent reads into the same namespace
/// must be serialized by the caller.
pub type SharedTaxonNamespace = Rc<RefCell<TaxonNamespace>>;

// =#========================================================================#=
// TAXON
// =#========================================================================#=
/// A named operational taxonomic unit.
#[derive(Debug)]
pub struct Taxon {
    label: String,
}

impl Taxon {
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Display for Taxon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

// =#========================================================================#=
// TAXON NAMESPACE
// =#========================================================================#=
/// Ordered, append-only registry of [Taxon]s.
///
/// Taxa keep their insertion order and are never reordered. Lookup by label
/// is exact-string and returns the first registered taxon with that label.
///
/// # Example
/// ```
/// use phyloread::model::TaxonNamespace;
/// use std::rc::Rc;
///
/// let mut namespace = TaxonNamespace::new();
/// let a = namespace.require_taxon("A");
/// let b = namespace.require_taxon("B");
/// let a_again = namespace.require_taxon("A");
///
/// assert!(Rc::ptr_eq(&a, &a_again));
/// assert!(!Rc::ptr_eq(&a, &b));
/// assert_eq!(namespace.labels(), vec!["A", "B"]);
/// ```
#[derive(Debug, Default)]
pub struct TaxonNamespace {
    label: Option<String>,
    taxa: Vec<TaxonRef>,
    index: HashMap<String, usize>,
}

impl TaxonNamespace {
    /// Creates an empty namespace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty namespace wrapped in a [SharedTaxonNamespace].
    pub fn shared() -> SharedTaxonNamespace {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = Some(label.into());
    }

    /// Returns the taxon labelled `label`, registering a new one if there is none.
    pub fn require_taxon(&mut self, label: &str) -> TaxonRef {
        match self.get_taxon(label) {
            Some(taxon) => taxon,
            None => self.new_taxon(label),
        }
    }

    /// Registers a new taxon, even if one with the same label exists already.
    ///
    /// Label lookup keeps returning the earlier taxon.
    pub fn new_taxon(&mut self, label: &str) -> TaxonRef {
        let taxon = Rc::new(Taxon {
            label: label.to_string(),
        });
        self.index.entry(label.to_string()).or_insert(self.taxa.len());
        self.taxa.push(Rc::clone(&taxon));
        taxon
    }

    /// Looks up a taxon by exact label.
    pub fn get_taxon(&self, label: &str) -> Option<TaxonRef> {
        self.index.get(label).map(|&i| Rc::clone(&self.taxa[i]))
    }

    /// Returns the taxon at insertion position `index`.
    pub fn taxon_at(&self, index: usize) -> Option<&TaxonRef> {
        self.taxa.get(index)
    }

    /// Whether this exact taxon instance belongs to the namespace.
    pub fn contains(&self, taxon: &TaxonRef) -> bool {
        self.taxa.iter().any(|t| Rc::ptr_eq(t, taxon))
    }

    /// Whether some taxon has this label.
    pub fn has_label(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.taxa.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taxa.is_empty()
    }

    /// Iterates taxa in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, TaxonRef> {
        self.taxa.iter()
    }

    /// Labels in insertion order.
    pub fn labels(&self) -> Vec<&str> {
        self.taxa.iter().map(|t| t.label()).collect()
    }

    /// Drops every taxon registered after the first `len`.
    ///
    /// Only used to roll back the registrations of a tree that failed to parse;
    /// at that point no surviving tree references the dropped taxa.
    pub(crate) fn truncate(&mut self, len: usize) {
        if len >= self.taxa.len() {
            return;
        }
        self.taxa.truncate(len);
        self.index.retain(|_, i| *i < len);
    }
}

impl<'a> IntoIterator for &'a TaxonNamespace {
    type Item = &'a TaxonRef;
    type IntoIter = std::slice::Iter<'a, TaxonRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for TaxonNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => writeln!(f, "TaxonNamespace '{}' ({} taxa):", label, self.len())?,
            None => writeln!(f, "TaxonNamespace ({} taxa):", self.len())?,
        }
        for (i, taxon) in self.taxa.iter().enumerate() {
            writeln!(f, "  {}: {}", i + 1, taxon.label())?;
        }
        Ok(())
    }
}
