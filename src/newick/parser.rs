//! Structs and logic to parse Newick strings.
//!
//! This module provides the [NewickParser] struct, which parses single
//! trees, all trees of a source, or trees lazily via a [NewickIterator].

use crate::error::ReadError;
use crate::model::tree::Rooting;
use crate::model::tree_builder::{BuildError, TreeBuilder, VertexRecord};
use crate::newick::defs::{
    DEFAULT_NUM_NODES_GUESS, EDGE_LENGTH_BYTES, NEWICK_LABEL_DELIMITERS, ROOTED_TOKEN,
    UNROOTED_TOKEN,
};
use crate::parser::byte_parser::ByteParser;
use crate::parser::byte_source::ByteSource;
use crate::parser::parsing_error::ParsingError;
use crate::parser::utils::normalize_unquoted;
use crate::read::schema::SchemaParser;
use crate::read::selection::Selection;
use tracing::debug;

// =#========================================================================#=
// NEWICK PARSER
// =#========================================================================#=
/// Parser (configuration) for Newick trees of arbitrary arity.
///
/// Generic over [TreeBuilder]: the parser only tokenizes and reports each
/// vertex as a [VertexRecord], the builder decides what it becomes.
///
/// # Format
/// * `tree ::= [comments] subtree [comments] ';'`
/// * `subtree ::= [comments] ( '(' subtree (',' subtree)* ')' )? suffix`
/// * `suffix ::= [label] [comments] [':' [comments] number [comments]]`
///
/// Furthermore:
/// * Labels may be single quoted, with `''` standing for one quote; in
///   unquoted labels `_` stands for a space (unless underscores are
///   preserved)
/// * Comments are `[...]`, may nest, and can occur wherever whitespace can
/// * A leading `[&R]` or `[&U]` states that the tree is rooted or unrooted
/// * A vertex may be unlabelled, e.g. `(,(,));`
///
/// # Example
/// ```
/// use phyloread::model::{TaxonNamespace, TaxonTreeBuilder};
/// use phyloread::newick::NewickParser;
/// use phyloread::parser::ByteParser;
///
/// let input = "[&R] ((Pukeko:1.0,Takahe:1.0):0.5,Weka:1.5);";
/// let mut byte_parser = ByteParser::for_str(input);
/// let namespace = TaxonNamespace::shared();
/// let mut newick_parser = NewickParser::new(TaxonTreeBuilder::new(namespace.clone()));
///
/// let tree = newick_parser.parse_tree(&mut byte_parser).unwrap();
/// assert_eq!(tree.is_rooted(), Some(true));
/// assert_eq!(namespace.borrow().labels(), vec!["Pukeko", "Takahe", "Weka"]);
/// ```
pub struct NewickParser<T: TreeBuilder> {
    tree_builder: T,
    preserve_underscores: bool,
    num_nodes_hint: usize,
}

// ============================================================================
// Construction & Configuration, Deconstruction (pub)
// ============================================================================
impl<T: TreeBuilder> NewickParser<T> {
    pub fn new(tree_builder: T) -> Self {
        Self {
            tree_builder,
            preserve_underscores: false,
            num_nodes_hint: DEFAULT_NUM_NODES_GUESS,
        }
    }

    /// Keeps underscores of unquoted labels instead of reading them as spaces.
    pub fn with_preserve_underscores(mut self, preserve: bool) -> Self {
        self.preserve_underscores = preserve;
        self
    }

    pub fn tree_builder(&self) -> &T {
        &self.tree_builder
    }

    /// Used by [NexusParser](crate::nexus::NexusParser) to declare taxa and
    /// install TRANSLATE resolution.
    pub(crate) fn tree_builder_mut(&mut self) -> &mut T {
        &mut self.tree_builder
    }

    pub fn into_tree_builder(self) -> T {
        self.tree_builder
    }
}

// ============================================================================
// API Parsing (pub)
// ============================================================================
impl<T: TreeBuilder> NewickParser<T> {
    /// Consumes the parser and returns an iterator over trees from the byte source.
    ///
    /// The parser can be retrieved again via [NewickIterator::into_parser].
    pub fn into_iter<B: ByteSource>(self, byte_parser: ByteParser<B>) -> NewickIterator<B, T> {
        NewickIterator {
            byte_parser,
            parser: self,
            done: false,
        }
    }

    /// Parses all Newick trees from the byte source until EOF.
    ///
    /// # Arguments
    /// * `byte_parser` - A byte parser with underlying source containing only
    ///   Newick strings, except for whitespace and `[...]` comments.
    ///
    /// # Returns
    /// * `Ok(Vec<T::Tree>)` - All parsed trees
    /// * `Err(ParsingError)` - If any tree fails to parse
    pub fn parse_all<B: ByteSource>(
        &mut self,
        mut byte_parser: ByteParser<B>,
    ) -> Result<Vec<T::Tree>, ParsingError> {
        let mut trees = Vec::new();
        while !at_end(&mut byte_parser)? {
            trees.push(self.parse_tree(&mut byte_parser)?);
        }
        Ok(trees)
    }

    /// Parses a single Newick tree, including its terminating `;`.
    ///
    /// On failure the builder abandons the partial tree, so nothing it
    /// registered (such as new taxa) survives.
    ///
    /// # Arguments
    /// * `parser` - The byte parser positioned before a Newick tree
    ///
    /// # Returns
    /// * `Ok(T::Tree)` - The parsed phylogenetic tree
    /// * `Err(ParsingError)` - If the Newick format is invalid
    pub fn parse_tree<B: ByteSource>(
        &mut self,
        parser: &mut ByteParser<B>,
    ) -> Result<T::Tree, ParsingError> {
        self.parse_tree_named(parser, None)
    }

    /// Like [parse_tree](Self::parse_tree), naming the tree `tree_name`.
    pub(crate) fn parse_tree_named<B: ByteSource>(
        &mut self,
        parser: &mut ByteParser<B>,
        tree_name: Option<String>,
    ) -> Result<T::Tree, ParsingError> {
        self.tree_builder.init_next(self.num_nodes_hint);
        match self.parse_tree_body(parser, tree_name) {
            Ok((tree, num_nodes)) => {
                self.num_nodes_hint = num_nodes;
                Ok(tree)
            }
            Err(e) => {
                self.tree_builder.abandon_tree();
                Err(e)
            }
        }
    }

    /// Counts the trees from the current position to EOF, leaving the
    /// position unchanged.
    ///
    /// # Errors
    /// If a comment or quote is left open, or the last tree lacks its `;`.
    pub fn count_trees<B: ByteSource>(
        &mut self,
        parser: &mut ByteParser<B>,
    ) -> Result<usize, ParsingError> {
        let start = parser.position();
        let mut count = 0;
        let result = loop {
            match skip_tree(parser) {
                Ok(true) => count += 1,
                Ok(false) => break Ok(count),
                Err(e) => break Err(e),
            }
        };
        parser.set_position(start);
        result
    }
}

// ============================================================================
// Parsing
// ============================================================================
impl<T: TreeBuilder> NewickParser<T> {
    /// Parses `[comments] subtree ';'` into the builder's current tree and
    /// finishes it. Also returns the number of vertices.
    fn parse_tree_body<B: ByteSource>(
        &mut self,
        parser: &mut ByteParser<B>,
        tree_name: Option<String>,
    ) -> Result<(T::Tree, usize), ParsingError> {
        if let Some(name) = tree_name {
            let result = self.tree_builder.set_name(name);
            self.check(result, parser)?;
        }

        let mut leading = Vec::new();
        parser.collect_comments_and_whitespace(&mut leading)?;
        for comment in leading {
            let result = match rooting_token(&comment) {
                Some(rooting) => self.tree_builder.set_rooting(rooting),
                None => self.tree_builder.add_tree_comment(comment),
            };
            self.check(result, parser)?;
        }

        if parser.is_eof() {
            return Err(ParsingError::unexpected_eof(parser));
        }
        if parser.peek_is(b';') {
            return Err(ParsingError::invalid_newick_string(
                parser,
                "Empty tree".to_string(),
            ));
        }

        let mut num_nodes = 0;
        let root = self.parse_subtree(parser, &mut num_nodes)?;

        // Consume the terminating semicolon
        parser.skip_comment_and_whitespace()?;
        if !parser.consume_if(b';') {
            if parser.is_eof() {
                return Err(ParsingError::unexpected_eof(parser));
            }
            let next_char = parser.peek().map(char::from);
            return Err(ParsingError::invalid_newick_string(
                parser,
                format!("Expected ';' at end of tree but found {:?}", next_char),
            ));
        }

        let result = self.tree_builder.finish_tree(root);
        let tree = self.check(result, parser)?;
        Ok((tree, num_nodes))
    }

    /// Parses a vertex with all its descendants and returns its index:
    /// - `(child, child, ...)suffix` for an internal vertex
    /// - `suffix` for a leaf
    fn parse_subtree<B: ByteSource>(
        &mut self,
        parser: &mut ByteParser<B>,
        num_nodes: &mut usize,
    ) -> Result<T::NodeIdx, ParsingError> {
        let mut node_comments = Vec::new();
        parser.collect_comments_and_whitespace(&mut node_comments)?;

        let children = if parser.consume_if(b'(') {
            Some(self.parse_children(parser, num_nodes)?)
        } else {
            None
        };

        let record = self.parse_suffix(parser, node_comments)?;
        *num_nodes += 1;
        let result = match children {
            Some(children) => self.tree_builder.add_internal(children, record),
            None => self.tree_builder.add_leaf(record),
        };
        self.check(result, parser)
    }

    /// Parses `child, child, ...)` after the opening parenthesis.
    fn parse_children<B: ByteSource>(
        &mut self,
        parser: &mut ByteParser<B>,
        num_nodes: &mut usize,
    ) -> Result<Vec<T::NodeIdx>, ParsingError> {
        let mut children = Vec::new();
        loop {
            children.push(self.parse_subtree(parser, num_nodes)?);

            parser.skip_comment_and_whitespace()?;
            if parser.consume_if(b',') {
                continue;
            }
            if parser.consume_if(b')') {
                return Ok(children);
            }
            if parser.is_eof() {
                return Err(ParsingError::unexpected_eof(parser));
            }
            let next_char = parser.peek().map(char::from);
            return Err(ParsingError::invalid_newick_string(
                parser,
                format!("Expected ',' or ')' after child but found {:?}", next_char),
            ));
        }
    }

    /// Parses what follows a vertex: label, node comments, and the edge
    /// part `:length` with the comments around it.
    fn parse_suffix<B: ByteSource>(
        &mut self,
        parser: &mut ByteParser<B>,
        node_comments: Vec<String>,
    ) -> Result<VertexRecord, ParsingError> {
        let mut record = VertexRecord {
            node_comments,
            ..VertexRecord::default()
        };

        let name = if parser.peek() == Some(b'\'') {
            parser.parse_quoted_label()?
        } else {
            let token = parser.parse_unquoted_label(NEWICK_LABEL_DELIMITERS)?;
            normalize_unquoted(&token, self.preserve_underscores)
        };
        record.name = Some(name).filter(|n| !n.is_empty());

        parser.collect_comments_and_whitespace(&mut record.node_comments)?;
        if parser.consume_if(b':') {
            parser.collect_comments_and_whitespace(&mut record.edge_comments)?;
            record.edge_length = Some(parse_edge_length(parser)?);
            parser.collect_comments_and_whitespace(&mut record.edge_comments)?;
        }
        Ok(record)
    }

    /// Adds the parser position to a builder failure.
    fn check<B: ByteSource, V>(
        &self,
        result: Result<V, BuildError>,
        parser: &mut ByteParser<B>,
    ) -> Result<V, ParsingError> {
        result.map_err(|e| ParsingError::from_build_error(e, parser))
    }
}

/// Parses an edge length number, supporting scientific notation
/// (e.g. `1.5e-10`).
fn parse_edge_length<B: ByteSource>(parser: &mut ByteParser<B>) -> Result<f64, ParsingError> {
    let mut length_str = String::new();
    while let Some(b) = parser.peek() {
        if EDGE_LENGTH_BYTES.contains(&b) {
            length_str.push(b as char);
            parser.next_byte();
        } else {
            break;
        }
    }

    length_str.parse().map_err(|_| {
        ParsingError::invalid_newick_string(parser, format!("Invalid edge length: {:?}", length_str))
    })
}

/// Rooting stated by a `[&R]`/`[&U]` comment (either case).
fn rooting_token(comment: &str) -> Option<Rooting> {
    let comment = comment.trim();
    if comment.eq_ignore_ascii_case(ROOTED_TOKEN) {
        Some(Rooting::Rooted)
    } else if comment.eq_ignore_ascii_case(UNROOTED_TOKEN) {
        Some(Rooting::Unrooted)
    } else {
        None
    }
}

/// Whether only comments and whitespace remain; the position is kept.
fn at_end<B: ByteSource>(parser: &mut ByteParser<B>) -> Result<bool, ParsingError> {
    let start = parser.position();
    parser.skip_comment_and_whitespace()?;
    let eof = parser.is_eof();
    parser.set_position(start);
    Ok(eof)
}

/// Skips one tree statement without building it.
///
/// # Returns
/// `false` if only comments and whitespace were left.
fn skip_tree<B: ByteSource>(parser: &mut ByteParser<B>) -> Result<bool, ParsingError> {
    parser.skip_comment_and_whitespace()?;
    if parser.is_eof() {
        return Ok(false);
    }
    parser.skip_statement()?;
    Ok(true)
}

// ============================================================================
// Read protocol
// ============================================================================
/// A Newick source is a single collection.
impl<T: TreeBuilder> SchemaParser for NewickParser<T> {
    type Tree = T::Tree;

    fn parse_selected<B: ByteSource>(
        &mut self,
        mut byte_parser: ByteParser<B>,
        selection: &Selection,
    ) -> Result<Vec<T::Tree>, ReadError> {
        selection.resolve_collection(1)?;

        if selection.tree_offset() != 0 {
            let available = self.count_trees(&mut byte_parser)?;
            let start = selection.resolve_tree_start(available)?;
            debug!("Skipping {start} of {available} Newick trees");
            for _ in 0..start {
                skip_tree(&mut byte_parser)?;
            }
        }

        Ok(self.parse_all(byte_parser)?)
    }
}

// =#========================================================================#=
// NEWICK ITERATOR (lazy parser)
// =#========================================================================#=
/// Iterator to parse Newick trees.
///
/// Created by [NewickParser::into_iter()].
/// Yields `Result<T::Tree, ParsingError>` for each tree and stops after the
/// first error.
pub struct NewickIterator<B, T>
where
    B: ByteSource,
    T: TreeBuilder,
{
    parser: NewickParser<T>,
    byte_parser: ByteParser<B>,
    done: bool,
}

impl<B, T> NewickIterator<B, T>
where
    B: ByteSource,
    T: TreeBuilder,
{
    /// Consumes the iterator and returns the underlying [NewickParser].
    pub fn into_parser(self) -> NewickParser<T> {
        self.parser
    }
}

impl<B, T> Iterator for NewickIterator<B, T>
where
    B: ByteSource,
    T: TreeBuilder,
{
    type Item = Result<T::Tree, ParsingError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match at_end(&mut self.byte_parser) {
            Ok(true) => {
                self.done = true;
                return None;
            }
            Ok(false) => {}
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        }

        let result = self.parser.parse_tree(&mut self.byte_parser);
        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }
}
