//! In-memory byte source, used for strings, streams and small files.

use crate::parser::byte_source::ByteSource;
use std::fs::File;
use std::io::Read;
use std::path::Path;

// =#========================================================================#=
// IN MEMORY BYTE SOURCE
// =#========================================================================#=
/// A byte source owning the complete content of a tree source.
pub struct InMemoryByteSource {
    input: Vec<u8>,
    pos: usize,
}

impl InMemoryByteSource {
    /// Wraps an owned byte vector.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self { input: bytes, pos: 0 }
    }

    /// Reads the whole file at `path` into memory.
    ///
    /// The file handle is closed before this returns, on success and on error.
    ///
    /// # Errors
    /// Any I/O error from opening or reading the file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Drains `reader` into memory.
    ///
    /// The reader is only borrowed for the duration of this call, so a caller
    /// passing an open stream keeps ownership of it.
    ///
    /// # Errors
    /// Any I/O error reported by the reader.
    pub fn from_reader<R: Read>(mut reader: R) -> std::io::Result<Self> {
        let mut contents = Vec::new();
        reader.read_to_end(&mut contents)?;
        Ok(Self::from_vec(contents))
    }

    /// Number of bytes held.
    pub fn len(&self) -> usize {
        self.input.len()
    }

    /// `true` if the source holds no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }
}

impl ByteSource for InMemoryByteSource {
    #[inline(always)]
    fn peek(&mut self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    #[inline(always)]
    fn next_byte(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    #[inline(always)]
    fn peek_slice(&mut self, k: usize) -> &[u8] {
        let start = self.pos.min(self.input.len());
        let end = (self.pos + k).min(self.input.len());
        &self.input[start..end]
    }

    #[inline]
    fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    fn set_position(&mut self, pos: usize) {
        self.pos = pos;
    }

    fn is_eof(&mut self) -> bool {
        self.pos >= self.input.len()
    }

    fn remaining(&mut self) -> Vec<u8> {
        let start = self.pos.min(self.input.len());
        self.pos = self.input.len();
        self.input[start..].to_vec()
    }
}
