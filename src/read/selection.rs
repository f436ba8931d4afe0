//! Positional selection of a collection and its first tree.

use crate::error::{AddressingError, UsageError};

/// Which collection of a source to read, and from which tree on.
///
/// Offsets follow the usual convention for negative indices, counting
/// from the end, with one asymmetry for trees: a negative tree offset
/// reaching past the first tree selects the whole collection, while a
/// positive one past the last tree is an [AddressingError].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    collection_offset: Option<isize>,
    tree_offset: isize,
}

impl Selection {
    /// # Errors
    /// [UsageError::TreeOffsetWithoutCollectionOffset] for any given
    /// `tree_offset` (0 included) without `collection_offset`.
    pub fn new(collection_offset: Option<isize>, tree_offset: Option<isize>) -> Result<Self, UsageError> {
        if collection_offset.is_none() && tree_offset.is_some() {
            return Err(UsageError::TreeOffsetWithoutCollectionOffset);
        }
        Ok(Self {
            collection_offset,
            tree_offset: tree_offset.unwrap_or(0),
        })
    }

    /// All trees of all collections.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn collection_offset(&self) -> Option<isize> {
        self.collection_offset
    }

    pub fn tree_offset(&self) -> isize {
        self.tree_offset
    }

    /// Resolves the collection offset against the number of collections.
    ///
    /// # Returns
    /// `None` if all collections are selected, else the index of the
    /// selected one.
    ///
    /// # Errors
    /// [AddressingError::CollectionOffset] if the offset does not address
    /// one of the `available` collections.
    pub fn resolve_collection(&self, available: usize) -> Result<Option<usize>, AddressingError> {
        let Some(offset) = self.collection_offset else {
            return Ok(None);
        };
        let index = if offset < 0 {
            available.checked_sub(offset.unsigned_abs())
        } else {
            Some(offset.unsigned_abs()).filter(|&i| i < available)
        };
        match index {
            Some(index) => Ok(Some(index)),
            None => Err(AddressingError::CollectionOffset { offset, available }),
        }
    }

    /// Resolves the tree offset against the number of trees of the
    /// selected collection and returns the index of the first tree to read.
    ///
    /// # Errors
    /// [AddressingError::TreeOffset] for a positive offset `>= available`.
    /// Offset 0 is valid for an empty collection.
    pub fn resolve_tree_start(&self, available: usize) -> Result<usize, AddressingError> {
        let offset = self.tree_offset;
        if offset < 0 {
            return Ok(available.saturating_sub(offset.unsigned_abs()));
        }
        let start = offset.unsigned_abs();
        if start == 0 || start < available {
            Ok(start)
        } else {
            Err(AddressingError::TreeOffset { offset, available })
        }
    }
}
