//! Parsing infrastructure shared by the schema readers.
//!
//! - [ByteSource] and its in-memory and buffered implementations
//! - [ByteParser], the tokenizing primitives
//! - [ParsingError], the structural error type of all schema parsers
//! - [utils], label quoting rules

pub mod buffered_byte_source;
pub mod byte_parser;
pub mod byte_source;
pub mod in_memory_byte_source;
pub mod parsing_error;
pub mod utils;

pub use byte_parser::{ByteParser, ConsumeMode};
pub use byte_source::ByteSource;
pub use parsing_error::{ParsingError, ParsingErrorType};
