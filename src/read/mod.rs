//! Reading trees from paths, streams and strings into a [TreeList].
//!
//! Two families of operations, both taking a schema identifier (`"newick"`,
//! `"nexus"` or `"json"`) and options (see [IntoReadOptions]):
//! - construct-new: [TreeList::get_from_path], [TreeList::get_from_stream],
//!   [TreeList::get_from_string] return a new list, over a new namespace
//!   unless [ReadOptions::taxon_namespace] names one
//! - append: [TreeList::read_from_path], [TreeList::read_from_stream],
//!   [TreeList::read_from_string] append to an existing list, resolving
//!   taxa in its namespace, and return the number of trees added
//!
//! A failed read leaves the list unchanged.
//!
//! # Example
//! ```
//! use phyloread::model::TreeList;
//!
//! let nexus = "#NEXUS
//! BEGIN TREES;
//!     TREE burnin = ((A,B),C);
//!     TREE sample1 = ((A,C),B);
//!     TREE sample2 = (A,(B,C));
//! END;";
//! let trees = TreeList::get_from_string(nexus, "nexus", [("collection_offset", "0"), ("tree_offset", "1")]).unwrap();
//! assert_eq!(trees.len(), 2);
//! assert_eq!(trees[0].label(), Some("sample1"));
//!
//! let err = TreeList::get_from_string(nexus, "nexus", [("tree_offset", "1")]).unwrap_err();
//! assert!(err.is_usage());
//! ```

mod options;
pub(crate) mod schema;
pub(crate) mod selection;
mod source;

pub use self::options::{AUTO_IN_MEMORY_THRESHOLD, IntoReadOptions, ReadOptions, ReadStrategy};
pub use self::schema::{Schema, SchemaParser};
pub use self::selection::Selection;
pub use self::source::TreeSource;

use crate::error::{AddressingError, ReadError, UsageError};
use crate::model::taxon::{SharedTaxonNamespace, TaxonNamespace};
use crate::model::tree::Tree;
use crate::model::tree_list::TreeList;
use crate::parser::byte_parser::ByteParser;
use std::io::Read;
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, info};

// ============================================================================
// Construct-new (pub)
// ============================================================================
impl TreeList {
    /// Reads a new list from `source`.
    ///
    /// # Arguments
    /// * `source` - Path, stream or text to read
    /// * `schema` - Schema identifier, see [Schema::lookup]
    /// * `options` - [ReadOptions], `()` or `(key, value)` pairs
    ///
    /// # Errors
    /// * [ReadError::Usage] - Invalid options or schema, before any I/O
    /// * [ReadError::Addressing] - An offset the source cannot satisfy
    /// * [ReadError::Parse] - Malformed source
    /// * [ReadError::Io] - The source could not be read
    pub fn get_from_source(
        source: TreeSource<'_>,
        schema: &str,
        options: impl IntoReadOptions,
    ) -> Result<TreeList, ReadError> {
        let options = options.into_read_options()?;
        let selection = options.selection()?;
        let schema = Schema::lookup(schema)?;

        let namespace = options
            .taxon_namespace
            .clone()
            .unwrap_or_else(TaxonNamespace::shared);
        let mut trees = TreeList::with_taxon_namespace(namespace);
        let read = read_trees(source, schema, &options, &selection, trees.taxon_namespace())?;
        trees.append_checked(read);
        Ok(trees)
    }

    /// Reads a new list from the file at `path`, see [get_from_source](Self::get_from_source).
    pub fn get_from_path<P: AsRef<Path>>(
        path: P,
        schema: &str,
        options: impl IntoReadOptions,
    ) -> Result<TreeList, ReadError> {
        Self::get_from_source(TreeSource::Path(path.as_ref()), schema, options)
    }

    /// Reads a new list from an open stream, see [get_from_source](Self::get_from_source).
    pub fn get_from_stream<R: Read>(
        mut reader: R,
        schema: &str,
        options: impl IntoReadOptions,
    ) -> Result<TreeList, ReadError> {
        Self::get_from_source(TreeSource::Stream(&mut reader), schema, options)
    }

    /// Reads a new list from text, see [get_from_source](Self::get_from_source).
    pub fn get_from_string(
        text: &str,
        schema: &str,
        options: impl IntoReadOptions,
    ) -> Result<TreeList, ReadError> {
        Self::get_from_source(TreeSource::Text(text), schema, options)
    }
}

// ============================================================================
// Append-into-existing (pub)
// ============================================================================
impl TreeList {
    /// Appends the trees of `source` to this list, resolving taxa in its
    /// namespace, and returns how many were added.
    ///
    /// On error the list is unchanged.
    ///
    /// # Errors
    /// As for [get_from_source](Self::get_from_source); additionally
    /// [UsageError::ForeignTaxonNamespace] if the options name a namespace
    /// other than this list's.
    pub fn read_from_source(
        &mut self,
        source: TreeSource<'_>,
        schema: &str,
        options: impl IntoReadOptions,
    ) -> Result<usize, ReadError> {
        let options = options.into_read_options()?;
        let selection = options.selection()?;
        let schema = Schema::lookup(schema)?;
        if let Some(namespace) = &options.taxon_namespace {
            if !Rc::ptr_eq(namespace, self.taxon_namespace()) {
                return Err(UsageError::ForeignTaxonNamespace.into());
            }
        }

        let read = read_trees(source, schema, &options, &selection, self.taxon_namespace())?;
        let count = read.len();
        self.append_checked(read);
        Ok(count)
    }

    /// Appends the trees of the file at `path`, see [read_from_source](Self::read_from_source).
    pub fn read_from_path<P: AsRef<Path>>(
        &mut self,
        path: P,
        schema: &str,
        options: impl IntoReadOptions,
    ) -> Result<usize, ReadError> {
        self.read_from_source(TreeSource::Path(path.as_ref()), schema, options)
    }

    /// Appends the trees of an open stream, see [read_from_source](Self::read_from_source).
    pub fn read_from_stream<R: Read>(
        &mut self,
        mut reader: R,
        schema: &str,
        options: impl IntoReadOptions,
    ) -> Result<usize, ReadError> {
        self.read_from_source(TreeSource::Stream(&mut reader), schema, options)
    }

    /// Appends the trees of `text`, see [read_from_source](Self::read_from_source).
    pub fn read_from_string(
        &mut self,
        text: &str,
        schema: &str,
        options: impl IntoReadOptions,
    ) -> Result<usize, ReadError> {
        self.read_from_source(TreeSource::Text(text), schema, options)
    }
}

// ============================================================================
// Single tree (pub)
// ============================================================================
impl Tree {
    /// Reads the first selected tree of `source`, see [TreeList::get_from_source].
    ///
    /// # Errors
    /// As for [TreeList::get_from_source]; [AddressingError::NoTrees] if nothing is
    /// selected.
    pub fn get_from_source(
        source: TreeSource<'_>,
        schema: &str,
        options: impl IntoReadOptions,
    ) -> Result<Tree, ReadError> {
        let trees = TreeList::get_from_source(source, schema, options)?;
        trees
            .into_trees()
            .into_iter()
            .next()
            .ok_or_else(|| AddressingError::NoTrees.into())
    }

    pub fn get_from_path<P: AsRef<Path>>(
        path: P,
        schema: &str,
        options: impl IntoReadOptions,
    ) -> Result<Tree, ReadError> {
        Self::get_from_source(TreeSource::Path(path.as_ref()), schema, options)
    }

    pub fn get_from_stream<R: Read>(
        mut reader: R,
        schema: &str,
        options: impl IntoReadOptions,
    ) -> Result<Tree, ReadError> {
        Self::get_from_source(TreeSource::Stream(&mut reader), schema, options)
    }

    /// # Example
    /// ```
    /// use phyloread::model::Tree;
    ///
    /// let tree = Tree::get_from_string("(Kakapo,(Kea,Kaka));", "newick", ()).unwrap();
    /// assert_eq!(tree.num_leaves(), 3);
    /// ```
    pub fn get_from_string(
        text: &str,
        schema: &str,
        options: impl IntoReadOptions,
    ) -> Result<Tree, ReadError> {
        Self::get_from_source(TreeSource::Text(text), schema, options)
    }
}

// ============================================================================
// Dispatch
// ============================================================================
/// Opens `source` and parses the selected trees into `namespace`.
fn read_trees(
    source: TreeSource<'_>,
    schema: Schema,
    options: &ReadOptions,
    selection: &Selection,
    namespace: &SharedTaxonNamespace,
) -> Result<Vec<Tree>, ReadError> {
    let description = source.describe();
    let builder = options.tree_builder(namespace.clone());
    let preserve = options.preserve_underscores;

    let trees = match source {
        TreeSource::Path(path) => {
            let file_size = std::fs::metadata(path)?.len();
            if options.read_strategy.use_buffered(file_size) {
                debug!("Reading {} buffered ({} bytes)", description, file_size);
                let byte_parser = ByteParser::from_file_buffered(path)?;
                schema.parse(builder, byte_parser, selection, preserve)?
            } else {
                let byte_parser = ByteParser::from_file_in_memory(path)?;
                schema.parse(builder, byte_parser, selection, preserve)?
            }
        }
        TreeSource::Stream(reader) => {
            let byte_parser = ByteParser::from_reader(reader)?;
            schema.parse(builder, byte_parser, selection, preserve)?
        }
        TreeSource::Text(text) => {
            schema.parse(builder, ByteParser::for_str(text), selection, preserve)?
        }
    };

    info!("Read {} trees from {} as {}", trees.len(), description, schema);
    Ok(trees)
}
