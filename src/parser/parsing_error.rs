//! Structural parse errors for Newick, Nexus and JSON sources.
//!
//! A [ParsingError] records what went wrong ([ParsingErrorType]), the byte
//! position in the source, and a short slice of the text that follows, so
//! malformed input can be located without re-reading the file.

use crate::model::tree_builder::BuildError;
use crate::parser::byte_parser::ByteParser;
use crate::parser::byte_source::ByteSource;
use std::fmt;
use thiserror::Error;

/// Number of bytes of following text attached to an error
const DEFAULT_CONTEXT_LENGTH: usize = 50;

// =#========================================================================#=
// PARSING ERROR TYPE
// =#========================================================================#=
/// Kinds of structural errors a schema parser reports.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParsingErrorType {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("source does not start with a #NEXUS header")]
    MissingNexusHeader,
    #[error("invalid block name")]
    InvalidBlockName,
    #[error("invalid TAXA block: {0}")]
    InvalidTaxaBlock(String),
    #[error("invalid TREES block: {0}")]
    InvalidTreesBlock(String),
    #[error("invalid TRANSLATE command: {0}")]
    InvalidTranslateCommand(String),
    #[error("unclosed comment")]
    UnclosedComment,
    #[error("unclosed quoted label")]
    UnclosedQuote,
    #[error("label or comment is not valid UTF-8")]
    InvalidUtf8,
    #[error("invalid Newick string: {0}")]
    InvalidNewickString(String),
    #[error("invalid formatting")]
    InvalidFormatting,
    #[error("could not resolve label: {0}")]
    UnresolvedLabel(String),
    #[error("invalid metadata comment: {0}")]
    InvalidMetadata(String),
    #[error("invalid tree structure: {0}")]
    InvalidTreeStructure(String),
    #[error("invalid JSON tree document: {0}")]
    InvalidJson(String),
}

impl From<BuildError> for ParsingErrorType {
    fn from(error: BuildError) -> Self {
        match error {
            BuildError::UnresolvedLabel(msg) => ParsingErrorType::UnresolvedLabel(msg),
            BuildError::InvalidMetadata(msg) => ParsingErrorType::InvalidMetadata(msg),
            BuildError::InvalidStructure(msg) => ParsingErrorType::InvalidTreeStructure(msg),
            BuildError::NotInitialized => {
                ParsingErrorType::InvalidTreeStructure("no tree in construction".to_string())
            }
        }
    }
}

// =#========================================================================#=
// PARSING ERROR
// =#========================================================================#=
/// Parsing error with position and the text following it.
#[derive(Debug, Clone, PartialEq, Error)]
pub struct ParsingError {
    kind: ParsingErrorType,
    position: usize,
    context: String,
}

impl ParsingError {
    /// Creates an error of `kind` at the parser's current position.
    pub fn from_parser<S: ByteSource>(kind: ParsingErrorType, parser: &mut ByteParser<S>) -> Self {
        Self {
            kind,
            position: parser.position(),
            context: parser.get_context_as_string(DEFAULT_CONTEXT_LENGTH),
        }
    }

    /// Creates an error that has no meaningful byte position,
    /// such as a failure reported by a document parser.
    pub fn without_context(kind: ParsingErrorType) -> Self {
        Self {
            kind,
            position: 0,
            context: String::new(),
        }
    }

    pub fn unexpected_eof<S: ByteSource>(parser: &mut ByteParser<S>) -> Self {
        Self::from_parser(ParsingErrorType::UnexpectedEof, parser)
    }

    pub fn missing_nexus_header<S: ByteSource>(parser: &mut ByteParser<S>) -> Self {
        Self::from_parser(ParsingErrorType::MissingNexusHeader, parser)
    }

    pub fn invalid_block_name<S: ByteSource>(parser: &mut ByteParser<S>) -> Self {
        Self::from_parser(ParsingErrorType::InvalidBlockName, parser)
    }

    pub fn invalid_taxa_block<S: ByteSource>(parser: &mut ByteParser<S>, msg: String) -> Self {
        Self::from_parser(ParsingErrorType::InvalidTaxaBlock(msg), parser)
    }

    pub fn invalid_trees_block<S: ByteSource>(parser: &mut ByteParser<S>, msg: String) -> Self {
        Self::from_parser(ParsingErrorType::InvalidTreesBlock(msg), parser)
    }

    pub fn invalid_translate_command<S: ByteSource>(parser: &mut ByteParser<S>, msg: String) -> Self {
        Self::from_parser(ParsingErrorType::InvalidTranslateCommand(msg), parser)
    }

    pub fn unclosed_comment<S: ByteSource>(parser: &mut ByteParser<S>) -> Self {
        Self::from_parser(ParsingErrorType::UnclosedComment, parser)
    }

    pub fn unclosed_quote<S: ByteSource>(parser: &mut ByteParser<S>) -> Self {
        Self::from_parser(ParsingErrorType::UnclosedQuote, parser)
    }

    pub fn invalid_utf8<S: ByteSource>(parser: &mut ByteParser<S>) -> Self {
        Self::from_parser(ParsingErrorType::InvalidUtf8, parser)
    }

    pub fn invalid_newick_string<S: ByteSource>(parser: &mut ByteParser<S>, msg: String) -> Self {
        Self::from_parser(ParsingErrorType::InvalidNewickString(msg), parser)
    }

    pub fn invalid_formatting<S: ByteSource>(parser: &mut ByteParser<S>) -> Self {
        Self::from_parser(ParsingErrorType::InvalidFormatting, parser)
    }

    /// Positions a failure reported by a [TreeBuilder](crate::model::TreeBuilder).
    pub fn from_build_error<S: ByteSource>(error: BuildError, parser: &mut ByteParser<S>) -> Self {
        Self::from_parser(error.into(), parser)
    }

    /// The kind of error.
    pub fn kind(&self) -> &ParsingErrorType {
        &self.kind
    }

    /// Byte offset at which the error was detected.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Up to 50 bytes of source text following [position](Self::position).
    pub fn context(&self) -> &str {
        &self.context
    }
}

impl fmt::Display for ParsingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at position {}", self.kind, self.position)?;
        if !self.context.is_empty() {
            write!(f, "\n  Context (next {} bytes): {}", self.context.len(), self.context)?;
        }
        Ok(())
    }
}
