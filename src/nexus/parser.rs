//! Structs and logic to parse NEXUS files.
//!
//! [NexusParser] walks the blocks of a NEXUS document, registers the taxa
//! of TAXA blocks and hands the tree statements of TREES blocks to a
//! [NewickParser]. Each TREES block is one collection of trees.

use crate::error::{AddressingError, ReadError};
use crate::model::label_resolver::LabelResolver;
use crate::model::tree_builder::TreeBuilder;
use crate::newick::NewickParser;
use crate::nexus::defs::{
    BLOCK_BEGIN, BLOCK_END, BLOCK_ENDBLOCK, BLOCK_NAME_DELIMITERS, DIMENSIONS, NEXUS_HEADER,
    NEXUS_LABEL_DELIMITERS, NTAX, NexusBlock, TAXLABELS, TRANSLATE, TREE, TREE_NAME_DELIMITERS,
};
use crate::parser::byte_parser::ByteParser;
use crate::parser::byte_source::ByteSource;
use crate::parser::parsing_error::ParsingError;
use crate::parser::utils::normalize_unquoted;
use crate::read::schema::SchemaParser;
use crate::read::selection::Selection;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

// =#========================================================================#=
// NEXUS PARSER
// =#========================================================================#=
/// Parser (configuration) for NEXUS documents with TAXA and TREES blocks.
///
/// # Format
/// * The document starts with `#NEXUS`
/// * Blocks are `BEGIN <name>; ... END;` (or `ENDBLOCK;`), names and
///   keywords in any case; blocks other than TAXA and TREES are skipped
/// * TAXA: `DIMENSIONS NTAX=<n>;` (optional, must match) and
///   `TAXLABELS <label> ...;`
/// * TREES: optional `TRANSLATE <key> <label>, ...;`, then
///   `TREE [*] <name> = <newick>;` statements
///
/// Vertex names of a TREES block resolve via its TRANSLATE table, the
/// labels of the preceding TAXA block, or their 1-based TAXA position
/// (see [LabelResolver]).
///
/// # Example
/// ```
/// use phyloread::model::{TaxonNamespace, TaxonTreeBuilder};
/// use phyloread::nexus::NexusParser;
/// use phyloread::parser::ByteParser;
///
/// let input = "#NEXUS
/// BEGIN TAXA; TAXLABELS Kaka Kea; END;
/// BEGIN TREES; TRANSLATE 1 Kaka, 2 Kea; TREE parrots = (1,2); END;";
/// let namespace = TaxonNamespace::shared();
/// let mut parser = NexusParser::new(TaxonTreeBuilder::new(namespace.clone()));
///
/// let trees = parser.parse_all(ByteParser::for_str(input)).unwrap();
/// assert_eq!(trees[0].label(), Some("parrots"));
/// assert_eq!(namespace.borrow().labels(), vec!["Kaka", "Kea"]);
/// ```
pub struct NexusParser<T: TreeBuilder> {
    newick_parser: NewickParser<T>,
    preserve_underscores: bool,
    /// Labels of the most recent TAXA block
    taxa_labels: Vec<String>,
}

// ============================================================================
// Construction & Configuration, Deconstruction (pub)
// ============================================================================
impl<T: TreeBuilder> NexusParser<T> {
    pub fn new(tree_builder: T) -> Self {
        Self {
            newick_parser: NewickParser::new(tree_builder),
            preserve_underscores: false,
            taxa_labels: Vec::new(),
        }
    }

    /// Keeps underscores of unquoted labels instead of reading them as spaces.
    pub fn with_preserve_underscores(mut self, preserve: bool) -> Self {
        self.newick_parser = self.newick_parser.with_preserve_underscores(preserve);
        self.preserve_underscores = preserve;
        self
    }

    pub fn tree_builder(&self) -> &T {
        self.newick_parser.tree_builder()
    }

    pub fn into_tree_builder(self) -> T {
        self.newick_parser.into_tree_builder()
    }
}

// ============================================================================
// API Parsing (pub)
// ============================================================================
impl<T: TreeBuilder> NexusParser<T> {
    /// Parses the trees of all TREES blocks of the document.
    ///
    /// # Returns
    /// * `Ok(Vec<T::Tree>)` - The trees in document order
    /// * `Err(ParsingError)` - If the document is malformed
    pub fn parse_all<B: ByteSource>(
        &mut self,
        mut byte_parser: ByteParser<B>,
    ) -> Result<Vec<T::Tree>, ParsingError> {
        parse_nexus_header(&mut byte_parser)?;
        let mut trees = Vec::new();
        while let Some(block) = next_block(&mut byte_parser)? {
            match block {
                NexusBlock::Taxa => self.read_taxa_block(&mut byte_parser)?,
                NexusBlock::Trees => {
                    self.parse_trees_prelude(&mut byte_parser)?;
                    self.parse_tree_statements(&mut byte_parser, &mut trees)?;
                }
                other => skip_block(&mut byte_parser, &other)?,
            }
        }
        Ok(trees)
    }

    /// Counts the TREES blocks from the current position to EOF, leaving
    /// the position unchanged. The `#NEXUS` header must already be consumed.
    pub fn count_trees_blocks<B: ByteSource>(
        &self,
        parser: &mut ByteParser<B>,
    ) -> Result<usize, ParsingError> {
        let start = parser.position();
        let result = count_blocks(parser, &NexusBlock::Trees);
        parser.set_position(start);
        result
    }
}

fn count_blocks<B: ByteSource>(
    parser: &mut ByteParser<B>,
    kind: &NexusBlock,
) -> Result<usize, ParsingError> {
    let mut count = 0;
    while let Some(block) = next_block(parser)? {
        if block == *kind {
            count += 1;
        }
        skip_statements_to_block_end(parser)?;
    }
    Ok(count)
}

// ============================================================================
// Parsing Blocks
// ============================================================================
impl<T: TreeBuilder> NexusParser<T> {
    /// Reads a TAXA block (after `BEGIN TAXA;`) up to and including its
    /// end, registering its labels with the builder.
    fn read_taxa_block<B: ByteSource>(
        &mut self,
        parser: &mut ByteParser<B>,
    ) -> Result<(), ParsingError> {
        let mut ntax = None;
        let mut labels = Vec::new();

        loop {
            parser.skip_comment_and_whitespace()?;
            if parser.is_eof() {
                return Err(ParsingError::unexpected_eof(parser));
            }
            if consume_block_end(parser)? {
                break;
            }
            if parser.consume_if_keyword(DIMENSIONS) {
                ntax = self.parse_dimensions(parser)?;
            } else if parser.consume_if_keyword(TAXLABELS) {
                labels = self.parse_taxlabels(parser)?;
            } else {
                parser.skip_statement()?;
            }
        }

        if let Some(n) = ntax {
            if n != labels.len() {
                return Err(ParsingError::invalid_taxa_block(
                    parser,
                    format!("NTAX={} but {} labels were given", n, labels.len()),
                ));
            }
        }

        debug!("Read TAXA block with {} taxa", labels.len());
        self.newick_parser.tree_builder_mut().declare_taxa(&labels);
        self.taxa_labels = labels;
        Ok(())
    }

    /// Parses the `key=value` pairs of a DIMENSIONS command and returns
    /// the NTAX value, if given.
    fn parse_dimensions<B: ByteSource>(
        &self,
        parser: &mut ByteParser<B>,
    ) -> Result<Option<usize>, ParsingError> {
        let mut ntax = None;
        loop {
            parser.skip_comment_and_whitespace()?;
            if parser.consume_if(b';') {
                return Ok(ntax);
            }
            if parser.is_eof() {
                return Err(ParsingError::unexpected_eof(parser));
            }

            let key = parser.parse_unquoted_label(b"=; \t\n\r[")?;
            parser.skip_comment_and_whitespace()?;
            if !parser.consume_if(b'=') {
                return Err(ParsingError::invalid_taxa_block(
                    parser,
                    format!("Expected '=' after DIMENSIONS parameter {:?}", key),
                ));
            }
            parser.skip_comment_and_whitespace()?;
            let value = parser.parse_unquoted_label(NEXUS_LABEL_DELIMITERS)?;

            if key.eq_ignore_ascii_case(NTAX) {
                let n = value.parse().map_err(|_| {
                    ParsingError::invalid_taxa_block(
                        parser,
                        format!("NTAX must be a non-negative integer, found {:?}", value),
                    )
                })?;
                ntax = Some(n);
            }
        }
    }

    /// Parses the labels of a TAXLABELS command up to its `;`.
    fn parse_taxlabels<B: ByteSource>(
        &self,
        parser: &mut ByteParser<B>,
    ) -> Result<Vec<String>, ParsingError> {
        let mut labels = Vec::new();
        let mut seen = HashSet::new();
        loop {
            parser.skip_comment_and_whitespace()?;
            if parser.consume_if(b';') {
                return Ok(labels);
            }
            if parser.is_eof() {
                return Err(ParsingError::unexpected_eof(parser));
            }

            let label = self.parse_token(parser, NEXUS_LABEL_DELIMITERS)?;
            if label.is_empty() {
                let next_char = parser.peek().map(char::from);
                return Err(ParsingError::invalid_taxa_block(
                    parser,
                    format!("Unexpected {:?} in TAXLABELS", next_char),
                ));
            }
            if !seen.insert(label.clone()) {
                return Err(ParsingError::invalid_taxa_block(
                    parser,
                    format!("Taxon label {:?} declared twice", label),
                ));
            }
            labels.push(label);
        }
    }

    /// Handles the commands of a TREES block before its first tree
    /// statement and installs the block's label resolution.
    fn parse_trees_prelude<B: ByteSource>(
        &mut self,
        parser: &mut ByteParser<B>,
    ) -> Result<(), ParsingError> {
        let mut translation = HashMap::new();
        loop {
            parser.skip_comment_and_whitespace()?;
            if parser.is_eof() {
                return Err(ParsingError::unexpected_eof(parser));
            }
            if parser.peek_is_keyword(TREE) || at_block_end(parser) {
                break;
            }
            if parser.consume_if_keyword(TRANSLATE) {
                self.parse_translate(parser, &mut translation)?;
            } else {
                // TITLE, LINK and the like
                parser.skip_statement()?;
            }
        }

        let resolver = LabelResolver::for_nexus(self.taxa_labels.clone(), translation);
        self.newick_parser.tree_builder_mut().set_resolver(resolver);
        Ok(())
    }

    /// Parses the `key label` pairs of a TRANSLATE command into
    /// `translation`.
    fn parse_translate<B: ByteSource>(
        &self,
        parser: &mut ByteParser<B>,
        translation: &mut HashMap<String, String>,
    ) -> Result<(), ParsingError> {
        loop {
            parser.skip_comment_and_whitespace()?;
            if parser.consume_if(b';') {
                return Ok(());
            }
            if parser.is_eof() {
                return Err(ParsingError::unexpected_eof(parser));
            }

            let key = self.parse_token(parser, NEXUS_LABEL_DELIMITERS)?;
            parser.skip_comment_and_whitespace()?;
            let label = self.parse_token(parser, NEXUS_LABEL_DELIMITERS)?;
            if key.is_empty() || label.is_empty() {
                return Err(ParsingError::invalid_translate_command(
                    parser,
                    "Expected pairs of '<key> <label>'".to_string(),
                ));
            }
            if !self.taxa_labels.is_empty() && !self.taxa_labels.contains(&label) {
                return Err(ParsingError::invalid_translate_command(
                    parser,
                    format!("Label {:?} (key {:?}) is not declared in the TAXA block", label, key),
                ));
            }
            if translation.insert(key.clone(), label).is_some() {
                return Err(ParsingError::invalid_translate_command(
                    parser,
                    format!("Key {:?} is translated twice", key),
                ));
            }

            parser.skip_comment_and_whitespace()?;
            if parser.consume_if(b',') {
                continue;
            }
            if parser.consume_if(b';') {
                return Ok(());
            }
            if parser.is_eof() {
                return Err(ParsingError::unexpected_eof(parser));
            }
            let next_char = parser.peek().map(char::from);
            return Err(ParsingError::invalid_translate_command(
                parser,
                format!("Expected ',' or ';' after pair but found {:?}", next_char),
            ));
        }
    }

    /// Parses all remaining tree statements of the current TREES block,
    /// including the block end.
    fn parse_tree_statements<B: ByteSource>(
        &mut self,
        parser: &mut ByteParser<B>,
        trees: &mut Vec<T::Tree>,
    ) -> Result<(), ParsingError> {
        loop {
            parser.skip_comment_and_whitespace()?;
            if parser.is_eof() {
                return Err(ParsingError::unexpected_eof(parser));
            }
            if consume_block_end(parser)? {
                return Ok(());
            }
            if parser.consume_if_keyword(TREE) {
                trees.push(self.parse_single_tree(parser)?);
            } else {
                parser.skip_statement()?;
            }
        }
    }

    /// Parses `[*] <name> = <newick>;` after the TREE keyword.
    fn parse_single_tree<B: ByteSource>(
        &mut self,
        parser: &mut ByteParser<B>,
    ) -> Result<T::Tree, ParsingError> {
        parser.skip_comment_and_whitespace()?;
        // Default tree marker
        parser.consume_if(b'*');
        parser.skip_comment_and_whitespace()?;

        let name = self.parse_token(parser, TREE_NAME_DELIMITERS)?;
        parser.skip_comment_and_whitespace()?;
        if !parser.consume_if(b'=') {
            let next_char = parser.peek().map(char::from);
            return Err(ParsingError::invalid_trees_block(
                parser,
                format!("Expected '=' after tree name {:?} but found {:?}", name, next_char),
            ));
        }

        let name = Some(name).filter(|n| !n.is_empty());
        self.newick_parser.parse_tree_named(parser, name)
    }

    /// A quoted label as written, or an unquoted one with underscores
    /// read as spaces (unless preserved).
    fn parse_token<B: ByteSource>(
        &self,
        parser: &mut ByteParser<B>,
        delimiters: &[u8],
    ) -> Result<String, ParsingError> {
        if parser.peek() == Some(b'\'') {
            parser.parse_quoted_label()
        } else {
            let token = parser.parse_unquoted_label(delimiters)?;
            Ok(normalize_unquoted(&token, self.preserve_underscores))
        }
    }
}

// ============================================================================
// Parsing Helpers
// ============================================================================
/// Consumes the `#NEXUS` header, allowing leading whitespace and comments.
fn parse_nexus_header<B: ByteSource>(parser: &mut ByteParser<B>) -> Result<(), ParsingError> {
    parser.skip_comment_and_whitespace()?;
    if !parser.consume_if_sequence(NEXUS_HEADER) {
        return Err(ParsingError::missing_nexus_header(parser));
    }
    Ok(())
}

/// Consumes `BEGIN <name>;` and returns the block kind, or `None` if only
/// whitespace and comments are left.
fn next_block<B: ByteSource>(parser: &mut ByteParser<B>) -> Result<Option<NexusBlock>, ParsingError> {
    parser.skip_comment_and_whitespace()?;
    if parser.is_eof() {
        return Ok(None);
    }
    if !parser.consume_if_keyword(BLOCK_BEGIN) {
        return Err(ParsingError::invalid_formatting(parser));
    }

    parser.skip_comment_and_whitespace()?;
    let name = parser.parse_unquoted_label(BLOCK_NAME_DELIMITERS)?;
    parser.skip_comment_and_whitespace()?;
    if name.is_empty() || !parser.consume_if(b';') {
        return Err(ParsingError::invalid_block_name(parser));
    }
    Ok(Some(NexusBlock::from_name(&name)))
}

/// Whether the next statement is `END;` or `ENDBLOCK;`.
fn at_block_end<B: ByteSource>(parser: &mut ByteParser<B>) -> bool {
    parser.peek_is_keyword(BLOCK_END) || parser.peek_is_keyword(BLOCK_ENDBLOCK)
}

/// Consumes `END;` or `ENDBLOCK;` if it is the next statement.
fn consume_block_end<B: ByteSource>(parser: &mut ByteParser<B>) -> Result<bool, ParsingError> {
    if !(parser.consume_if_keyword(BLOCK_END) || parser.consume_if_keyword(BLOCK_ENDBLOCK)) {
        return Ok(false);
    }
    parser.skip_comment_and_whitespace()?;
    if !parser.consume_if(b';') {
        return Err(ParsingError::invalid_formatting(parser));
    }
    Ok(true)
}

/// Skips statements up to and including the end of the current block.
fn skip_statements_to_block_end<B: ByteSource>(
    parser: &mut ByteParser<B>,
) -> Result<(), ParsingError> {
    loop {
        parser.skip_comment_and_whitespace()?;
        if parser.is_eof() {
            return Err(ParsingError::unexpected_eof(parser));
        }
        if consume_block_end(parser)? {
            return Ok(());
        }
        parser.skip_statement()?;
    }
}

fn skip_block<B: ByteSource>(parser: &mut ByteParser<B>, block: &NexusBlock) -> Result<(), ParsingError> {
    debug!("Skipping {:?} block", block);
    skip_statements_to_block_end(parser)
}

/// Counts the tree statements up to the end of the current TREES block,
/// leaving the position unchanged.
fn count_tree_statements<B: ByteSource>(parser: &mut ByteParser<B>) -> Result<usize, ParsingError> {
    let start = parser.position();
    let mut count = 0;
    let result = loop {
        if let Err(e) = parser.skip_comment_and_whitespace() {
            break Err(e);
        }
        if parser.is_eof() {
            break Err(ParsingError::unexpected_eof(parser));
        }
        if at_block_end(parser) {
            break Ok(count);
        }
        if parser.peek_is_keyword(TREE) {
            count += 1;
        }
        if let Err(e) = parser.skip_statement() {
            break Err(e);
        }
    };
    parser.set_position(start);
    result
}

/// Skips statements up to and including the next tree statement.
fn skip_tree_statement<B: ByteSource>(parser: &mut ByteParser<B>) -> Result<(), ParsingError> {
    loop {
        parser.skip_comment_and_whitespace()?;
        let is_tree = parser.peek_is_keyword(TREE);
        parser.skip_statement()?;
        if is_tree {
            return Ok(());
        }
    }
}

// ============================================================================
// Read protocol
// ============================================================================
/// Every TREES block is one collection. Reading stops after the selected
/// block; TAXA blocks up to there are read regardless of selection.
impl<T: TreeBuilder> SchemaParser for NexusParser<T> {
    type Tree = T::Tree;

    fn parse_selected<B: ByteSource>(
        &mut self,
        mut byte_parser: ByteParser<B>,
        selection: &Selection,
    ) -> Result<Vec<T::Tree>, ReadError> {
        parse_nexus_header(&mut byte_parser)?;

        let target = match selection.collection_offset() {
            Some(offset) if offset < 0 => {
                let available = self.count_trees_blocks(&mut byte_parser)?;
                selection.resolve_collection(available)?
            }
            Some(offset) => Some(offset.unsigned_abs()),
            None => None,
        };

        let mut trees = Vec::new();
        let mut num_trees_blocks = 0;
        while let Some(block) = next_block(&mut byte_parser)? {
            match block {
                NexusBlock::Taxa => self.read_taxa_block(&mut byte_parser)?,
                NexusBlock::Trees if target.is_none_or(|t| t == num_trees_blocks) => {
                    self.parse_trees_prelude(&mut byte_parser)?;
                    let num_before = trees.len();
                    if selection.tree_offset() != 0 {
                        let available = count_tree_statements(&mut byte_parser)?;
                        let start = selection.resolve_tree_start(available)?;
                        debug!("Skipping {start} of {available} trees in TREES block {num_trees_blocks}");
                        for _ in 0..start {
                            skip_tree_statement(&mut byte_parser)?;
                        }
                    }
                    self.parse_tree_statements(&mut byte_parser, &mut trees)?;
                    if trees.len() == num_before {
                        warn!("Selected TREES block {num_trees_blocks} holds no trees");
                    }

                    num_trees_blocks += 1;
                    if target.is_some() {
                        return Ok(trees);
                    }
                }
                NexusBlock::Trees => {
                    skip_block(&mut byte_parser, &NexusBlock::Trees)?;
                    num_trees_blocks += 1;
                }
                other => skip_block(&mut byte_parser, &other)?,
            }
        }

        match (target, selection.collection_offset()) {
            (Some(_), Some(offset)) => Err(AddressingError::CollectionOffset {
                offset,
                available: num_trees_blocks,
            }
            .into()),
            _ => Ok(trees),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TaxonNamespace, TaxonTreeBuilder, Tree};
    use crate::parser::ParsingErrorType;

    fn parse(input: &str) -> Result<Vec<Tree>, ParsingError> {
        let builder = TaxonTreeBuilder::new(TaxonNamespace::shared());
        NexusParser::new(builder).parse_all(ByteParser::for_str(input))
    }

    fn leaf_labels(tree: &Tree) -> Vec<&str> {
        tree.leaves().filter_map(|n| n.display_label()).collect()
    }

    #[test]
    fn header_is_required() {
        let err = parse("BEGIN TREES; TREE t = (A,B); END;").unwrap_err();
        assert_eq!(*err.kind(), ParsingErrorType::MissingNexusHeader);
        assert!(parse("[generated] #nexus\n").unwrap().is_empty());
    }

    #[test]
    fn translate_keys_and_taxa_positions() {
        let trees = parse(
            "#NEXUS
            begin taxa; dimensions ntax=3; taxlabels Hoiho Korora 'Tawaki penguin'; end;
            begin trees;
                translate h Hoiho, k Korora;
                tree one = (h,(k,3));
                tree * two = ('Tawaki penguin',(1,2));
            endblock;",
        )
        .unwrap();
        assert_eq!(leaf_labels(&trees[0]), vec!["Hoiho", "Korora", "Tawaki penguin"]);
        assert_eq!(leaf_labels(&trees[1]), vec!["Tawaki penguin", "Hoiho", "Korora"]);
        assert_eq!(trees[1].label(), Some("two"));
    }

    #[test]
    fn ntax_must_match_labels() {
        let err = parse("#NEXUS BEGIN TAXA; DIMENSIONS NTAX=3; TAXLABELS A B; END;").unwrap_err();
        assert!(matches!(err.kind(), ParsingErrorType::InvalidTaxaBlock(_)));
    }

    #[test]
    fn translate_target_must_be_declared() {
        let err = parse(
            "#NEXUS BEGIN TAXA; TAXLABELS A B; END;
            BEGIN TREES; TRANSLATE 1 A, 2 C; TREE t = (1,2); END;",
        )
        .unwrap_err();
        assert!(matches!(err.kind(), ParsingErrorType::InvalidTranslateCommand(_)));
    }

    #[test]
    fn out_of_range_taxon_number() {
        let err = parse("#NEXUS BEGIN TAXA; TAXLABELS A B; END; BEGIN TREES; TREE t = (1,3); END;")
            .unwrap_err();
        assert!(matches!(err.kind(), ParsingErrorType::UnresolvedLabel(_)));
    }

    #[test]
    fn unknown_blocks_and_commands_are_skipped() {
        let trees = parse(
            "#NEXUS
            BEGIN DATA; MATRIX A 'acg;t' [;] B acgt; END;
            BEGIN TREES; TITLE 'my trees'; LINK TAXA = x; TREE t = [&R] (A,B); END;",
        )
        .unwrap();
        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].is_rooted(), Some(true));
    }

    #[test]
    fn unterminated_block() {
        let err = parse("#NEXUS BEGIN TREES; TREE t = (A,B);").unwrap_err();
        assert_eq!(*err.kind(), ParsingErrorType::UnexpectedEof);
    }

    #[test]
    fn counting_keeps_position() {
        let mut input = ByteParser::for_str(
            "BEGIN TREES; END; BEGIN TAXA; TAXLABELS A; END; BEGIN trees; TREE t = (A); END;",
        );
        let parser = NexusParser::new(TaxonTreeBuilder::new(TaxonNamespace::shared()));
        assert_eq!(parser.count_trees_blocks(&mut input).unwrap(), 2);
        assert_eq!(input.position(), 0);

        let mut block = ByteParser::for_str("TREE a = (A,B); [TREE x = y;] TREE b = (A,B); END;");
        assert_eq!(count_tree_statements(&mut block).unwrap(), 2);
        assert_eq!(block.position(), 0);
    }
}
