//! Byte source abstraction underneath [ByteParser](crate::parser::ByteParser).
//!
//! Tree sources arrive as files, open streams or in-memory text. The parsers
//! only ever see a [ByteSource], so the same Newick and Nexus logic runs on
//! all of them.

// =#========================================================================#=
// BYTE SOURCE (Trait)
// =#========================================================================#=
/// Random-access view on the bytes of one tree source.
///
/// Implementations:
/// - [InMemoryByteSource](crate::parser::in_memory_byte_source::InMemoryByteSource)
///   for strings, streams and small files
/// - [BufferedByteSource](crate::parser::buffered_byte_source::BufferedByteSource)
///   for large files that should not be loaded at once
///
/// Positions are absolute byte offsets from the start of the source. Parsers
/// rely on [set_position](ByteSource::set_position) to count trees in a
/// first pass and then rewind, so every implementation must support seeking
/// back to a position it has already reported.
pub trait ByteSource {
    /// Returns the current byte without consuming it, `None` at EOF.
    fn peek(&mut self) -> Option<u8>;

    /// Returns the current byte and advances past it, `None` at EOF.
    fn next_byte(&mut self) -> Option<u8>;

    /// Returns up to `k` bytes starting at the current position without
    /// consuming them. Fewer bytes are returned near EOF.
    fn peek_slice(&mut self, k: usize) -> &[u8];

    /// Returns up to `k` bytes from the current position as an owned vector,
    /// used to give [ParsingError](crate::parser::ParsingError)s context.
    fn get_context(&mut self, k: usize) -> Vec<u8> {
        self.peek_slice(k).to_vec()
    }

    /// Current absolute byte offset.
    fn position(&self) -> usize;

    /// Moves to the absolute byte offset `pos`.
    fn set_position(&mut self, pos: usize);

    /// `true` if no bytes are left.
    fn is_eof(&mut self) -> bool;

    /// Consumes and returns every byte from the current position to EOF.
    ///
    /// Used by readers that hand the rest of the source to a
    /// document parser (the JSON reference form).
    fn remaining(&mut self) -> Vec<u8> {
        let mut bytes = Vec::new();
        while let Some(b) = self.next_byte() {
            bytes.push(b);
        }
        bytes
    }
}
