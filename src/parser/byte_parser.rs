//! Byte-level tokenizing primitives for Newick and Nexus text.
//!
//! [ByteParser] wraps a [ByteSource] and offers peek/consume operations,
//! comment handling (collecting or skipping `[...]`, nested), keyword
//! matching and quote-aware label parsing. The schema parsers are written
//! entirely on top of these primitives.

use crate::parser::buffered_byte_source::BufferedByteSource;
use crate::parser::byte_source::ByteSource;
use crate::parser::in_memory_byte_source::InMemoryByteSource;
use crate::parser::parsing_error::ParsingError;
use std::io::Read;
use std::path::Path;

// =#========================================================================#=
// BYTE PARSER
// =#========================================================================#=
/// A byte-by-byte parser over a [ByteSource].
///
/// Keyword matching is ASCII case-insensitive, as Nexus requires. Labels are
/// decoded as UTF-8 (lossy), so non-ASCII taxon names survive parsing.
///
/// # Example
/// ```
/// use phyloread::parser::ByteParser;
///
/// let mut parser = ByteParser::for_str("BEGIN TREES; [comment] TREE t1 = (A,B);");
/// assert!(parser.consume_if_keyword(b"begin"));
/// parser.skip_whitespace();
/// assert!(parser.peek_is_keyword(b"TREES"));
/// ```
pub struct ByteParser<S: ByteSource> {
    source: S,
}

impl ByteParser<InMemoryByteSource> {
    /// Creates a parser over a copy of `input`.
    pub fn for_str(input: &str) -> Self {
        Self::new(InMemoryByteSource::from_vec(input.as_bytes().to_vec()))
    }

    /// Creates a parser over owned bytes.
    pub fn from_bytes(input: Vec<u8>) -> Self {
        Self::new(InMemoryByteSource::from_vec(input))
    }

    /// Loads the whole file at `path` into memory.
    ///
    /// # Errors
    /// I/O errors from opening or reading the file.
    pub fn from_file_in_memory<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        Ok(Self::new(InMemoryByteSource::from_file(path)?))
    }

    /// Drains an open stream into memory. The stream itself stays with the caller.
    ///
    /// # Errors
    /// I/O errors reported by the reader.
    pub fn from_reader<R: Read>(reader: R) -> std::io::Result<Self> {
        Ok(Self::new(InMemoryByteSource::from_reader(reader)?))
    }
}

impl ByteParser<BufferedByteSource> {
    /// Opens the file at `path` for buffered parsing.
    ///
    /// # Errors
    /// I/O errors from opening the file.
    pub fn from_file_buffered<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        Ok(Self::new(BufferedByteSource::from_file(path)?))
    }
}

// ============================================================================
// Basic access (pub)
// ============================================================================
impl<S: ByteSource> ByteParser<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    #[inline(always)]
    pub fn peek(&mut self) -> Option<u8> {
        self.source.peek()
    }

    #[inline(always)]
    pub fn next_byte(&mut self) -> Option<u8> {
        self.source.next_byte()
    }

    pub fn is_eof(&mut self) -> bool {
        self.source.is_eof()
    }

    pub fn position(&self) -> usize {
        self.source.position()
    }

    pub fn set_position(&mut self, pos: usize) {
        self.source.set_position(pos);
    }

    /// Consumes everything up to EOF and returns it.
    pub fn read_remaining(&mut self) -> Vec<u8> {
        self.source.remaining()
    }

    /// Returns up to `k` bytes from the current position, for error messages.
    pub fn get_context(&mut self, k: usize) -> Vec<u8> {
        self.source.get_context(k)
    }

    /// Like [get_context](Self::get_context), decoded lossily as UTF-8.
    pub fn get_context_as_string(&mut self, k: usize) -> String {
        String::from_utf8_lossy(&self.get_context(k)).into_owned()
    }
}

// ============================================================================
// Whitespace & comments (pub)
// ============================================================================
impl<S: ByteSource> ByteParser<S> {
    /// Skips spaces, tabs, carriage returns and newlines.
    pub fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() {
                self.next_byte();
            } else {
                break;
            }
        }
    }

    /// Parses a `[...]` comment at the current position and returns its
    /// content without the outer brackets. Nested brackets are kept verbatim.
    ///
    /// # Returns
    /// * `Ok(Some(content))` - A comment was consumed
    /// * `Ok(None)` - No comment starts here
    ///
    /// # Errors
    /// [UnclosedComment](crate::parser::ParsingErrorType::UnclosedComment)
    /// if EOF is reached before the closing bracket.
    pub fn parse_comment(&mut self) -> Result<Option<String>, ParsingError> {
        if self.peek() != Some(b'[') {
            return Ok(None);
        }
        let start = self.position();
        self.next_byte();

        let mut depth = 1usize;
        let mut content = Vec::new();
        while let Some(b) = self.next_byte() {
            match b {
                b'[' => depth += 1,
                b']' => {
                    depth -= 1;
                    if depth == 0 {
                        return self.decode(content, start).map(Some);
                    }
                }
                _ => {}
            }
            content.push(b);
        }

        self.set_position(start);
        Err(ParsingError::unclosed_comment(self))
    }

    /// Skips a `[...]` comment if one starts at the current position.
    ///
    /// # Returns
    /// `true` if a comment was skipped.
    ///
    /// # Errors
    /// If the comment is never closed.
    pub fn skip_comment(&mut self) -> Result<bool, ParsingError> {
        Ok(self.parse_comment()?.is_some())
    }

    /// Skips any mix of whitespace and comments.
    pub fn skip_comment_and_whitespace(&mut self) -> Result<(), ParsingError> {
        self.skip_whitespace();
        while self.skip_comment()? {
            self.skip_whitespace();
        }
        Ok(())
    }

    /// Skips whitespace and appends the content of every comment passed
    /// on the way to `comments`, in source order.
    pub fn collect_comments_and_whitespace(
        &mut self,
        comments: &mut Vec<String>,
    ) -> Result<(), ParsingError> {
        self.skip_whitespace();
        while let Some(comment) = self.parse_comment()? {
            comments.push(comment);
            self.skip_whitespace();
        }
        Ok(())
    }
}

// ============================================================================
// Matching & consuming (pub)
// ============================================================================
impl<S: ByteSource> ByteParser<S> {
    /// Checks the current byte against `ch`, ignoring ASCII case.
    pub fn peek_is(&mut self, ch: u8) -> bool {
        self.peek().is_some_and(|b| b.eq_ignore_ascii_case(&ch))
    }

    /// Checks whether the next bytes equal `sequence`, ignoring ASCII case.
    pub fn peek_is_sequence(&mut self, sequence: &[u8]) -> bool {
        let context = self.source.peek_slice(sequence.len());
        context.len() == sequence.len() && context.eq_ignore_ascii_case(sequence)
    }

    /// Checks whether the next bytes are the keyword `word` as a whole word,
    /// i.e. not followed by a letter, digit or underscore.
    pub fn peek_is_keyword(&mut self, word: &[u8]) -> bool {
        let context = self.source.peek_slice(word.len() + 1);
        if context.len() < word.len() || !context[..word.len()].eq_ignore_ascii_case(word) {
            return false;
        }
        match context.get(word.len()) {
            Some(b) => !(b.is_ascii_alphanumeric() || *b == b'_'),
            None => true,
        }
    }

    /// Consumes the current byte if it equals `ch` (ASCII case-insensitive).
    pub fn consume_if(&mut self, ch: u8) -> bool {
        if self.peek_is(ch) {
            self.next_byte();
            true
        } else {
            false
        }
    }

    /// Consumes `sequence` if the next bytes match it.
    pub fn consume_if_sequence(&mut self, sequence: &[u8]) -> bool {
        if !self.peek_is_sequence(sequence) {
            return false;
        }
        for _ in 0..sequence.len() {
            self.next_byte();
        }
        true
    }

    /// Consumes the keyword `word` if it is next as a whole word.
    pub fn consume_if_keyword(&mut self, word: &[u8]) -> bool {
        if !self.peek_is_keyword(word) {
            return false;
        }
        for _ in 0..word.len() {
            self.next_byte();
        }
        true
    }

    /// Consumes bytes until `target` is found.
    ///
    /// # Returns
    /// `true` if `target` was found, `false` if EOF was reached first.
    pub fn consume_until(&mut self, target: u8, mode: ConsumeMode) -> bool {
        while let Some(b) = self.peek() {
            if b == target {
                if mode == ConsumeMode::Inclusive {
                    self.next_byte();
                }
                return true;
            }
            self.next_byte();
        }
        false
    }

    /// Consumes one statement up to and including its terminating `;`.
    ///
    /// Semicolons inside comments and quoted labels do not end the statement.
    ///
    /// # Errors
    /// If EOF comes first, or a comment or quote is left open.
    pub fn skip_statement(&mut self) -> Result<(), ParsingError> {
        loop {
            match self.peek() {
                None => return Err(ParsingError::unexpected_eof(self)),
                Some(b'[') => {
                    self.skip_comment()?;
                }
                Some(b'\'') => {
                    self.parse_quoted_label()?;
                }
                Some(b';') => {
                    self.next_byte();
                    return Ok(());
                }
                Some(_) => {
                    self.next_byte();
                }
            }
        }
    }
}

// ============================================================================
// Labels (pub)
// ============================================================================
impl<S: ByteSource> ByteParser<S> {
    /// Parses a quoted or unquoted label at the current position.
    ///
    /// Quoted labels are returned without their quotes (and with `''`
    /// collapsed); unquoted labels run until one of `delimiters`. No
    /// underscore conversion happens here.
    ///
    /// # Errors
    /// If a quoted label is never closed.
    pub fn parse_label(&mut self, delimiters: &[u8]) -> Result<String, ParsingError> {
        if self.peek() == Some(b'\'') {
            self.parse_quoted_label()
        } else {
            self.parse_unquoted_label(delimiters)
        }
    }

    /// Parses a single-quoted label; `''` inside stands for one quote.
    ///
    /// # Errors
    /// [UnclosedQuote](crate::parser::ParsingErrorType::UnclosedQuote)
    /// if EOF is reached inside the quotes.
    pub fn parse_quoted_label(&mut self) -> Result<String, ParsingError> {
        let start = self.position();
        self.next_byte();

        let mut label = Vec::new();
        loop {
            match self.next_byte() {
                Some(b'\'') => {
                    if self.peek() == Some(b'\'') {
                        label.push(b'\'');
                        self.next_byte();
                    } else {
                        return self.decode(label, start);
                    }
                }
                Some(b) => label.push(b),
                None => {
                    self.set_position(start);
                    return Err(ParsingError::unclosed_quote(self));
                }
            }
        }
    }

    /// Parses an unquoted label up to (excluding) the first of `delimiters`
    /// or EOF. May return an empty string.
    ///
    /// # Errors
    /// [InvalidUtf8](crate::parser::ParsingErrorType::InvalidUtf8) if the
    /// label is not valid UTF-8.
    pub fn parse_unquoted_label(&mut self, delimiters: &[u8]) -> Result<String, ParsingError> {
        let start = self.position();
        let mut label = Vec::new();
        while let Some(b) = self.peek() {
            if delimiters.contains(&b) {
                break;
            }
            label.push(b);
            self.next_byte();
        }
        self.decode(label, start)
    }

    /// Decodes token bytes read from `start`; on invalid UTF-8 the error
    /// points at `start`.
    fn decode(&mut self, bytes: Vec<u8>, start: usize) -> Result<String, ParsingError> {
        String::from_utf8(bytes).map_err(|_| {
            self.set_position(start);
            ParsingError::invalid_utf8(self)
        })
    }
}

/// Whether `consume_until` also consumes the target it stops at.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConsumeMode {
    /// Stop after the target.
    Inclusive,
    /// Stop at the target.
    Exclusive,
}
