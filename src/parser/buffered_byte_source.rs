//! Buffered byte source for large files.
//!
//! [BufferedByteSource] keeps only a [BufReader] window of the file in
//! memory. Seeking back (needed when trees are counted before the selected
//! ones are parsed) goes through the underlying [Seek] implementation.

use crate::parser::byte_source::ByteSource;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

// =#========================================================================#=
// BUFFERED BYTE SOURCE
// =#========================================================================#=
/// A byte source streaming from a seekable reader, by default a [File].
pub struct BufferedByteSource<R: Read + Seek = File> {
    reader: BufReader<R>,
    /// Scratch space for peeks that cross the end of the reader's buffer
    peek_buffer: Vec<u8>,
    pos: usize,
}

impl BufferedByteSource<File> {
    /// Opens the file at `path` for buffered reading.
    ///
    /// The file is closed when the source is dropped.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened.
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        Ok(Self::new(File::open(path)?))
    }
}

impl<R: Read + Seek> BufferedByteSource<R> {
    /// Sized for the longest keyword peeked at during parsing (`ENDBLOCK`,
    /// `TRANSLATE`, `TAXLABELS`) plus a delimiter.
    const PEEK_BUFFER_CAPACITY: usize = 16;

    /// Wraps a seekable reader positioned at its start.
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            peek_buffer: Vec::with_capacity(Self::PEEK_BUFFER_CAPACITY),
            pos: 0,
        }
    }
}

impl<R: Read + Seek> ByteSource for BufferedByteSource<R> {
    fn peek(&mut self) -> Option<u8> {
        let buf = self.reader.fill_buf().ok()?;
        buf.first().copied()
    }

    fn next_byte(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.reader.consume(1);
        self.pos += 1;
        Some(byte)
    }

    fn peek_slice(&mut self, k: usize) -> &[u8] {
        self.peek_buffer.clear();

        let buf = match self.reader.fill_buf() {
            Ok(b) => b,
            Err(_) => return &self.peek_buffer,
        };

        if buf.len() >= k {
            self.peek_buffer.extend_from_slice(&buf[..k]);
            return &self.peek_buffer;
        }

        // Peek crosses the buffer boundary: read ahead, then seek back
        self.peek_buffer.extend_from_slice(buf);
        let first = buf.len();
        self.reader.consume(first);
        while self.peek_buffer.len() < k {
            let buf = match self.reader.fill_buf() {
                Ok([]) | Err(_) => break,
                Ok(b) => b,
            };
            let take = (k - self.peek_buffer.len()).min(buf.len());
            self.peek_buffer.extend_from_slice(&buf[..take]);
            self.reader.consume(take);
        }
        let _ = self.reader.seek(SeekFrom::Start(self.pos as u64));

        &self.peek_buffer
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn set_position(&mut self, pos: usize) {
        if self.reader.seek(SeekFrom::Start(pos as u64)).is_ok() {
            self.pos = pos;
        }
    }

    fn is_eof(&mut self) -> bool {
        match self.reader.fill_buf() {
            Ok(buf) => buf.is_empty(),
            Err(_) => true,
        }
    }
}

// =#========================================================================#=
// TESTS
// =#========================================================================#=
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn peek_slice_across_buffer_boundary_keeps_position() {
        // BufReader holds 8 KiB, so the keyword straddles the first refill
        let text = "x".repeat(8190) + "BEGIN TREES;";
        let mut source = BufferedByteSource::new(Cursor::new(text.into_bytes()));
        for _ in 0..8190 {
            source.next_byte();
        }
        assert_eq!(source.peek_slice(6), b"BEGIN ");
        assert_eq!(source.position(), 8190);
        assert_eq!(source.next_byte(), Some(b'B'));
        assert_eq!(source.next_byte(), Some(b'E'));
        assert_eq!(source.next_byte(), Some(b'G'));
    }

    #[test]
    fn rewind_after_reading() {
        let mut source = BufferedByteSource::new(Cursor::new(b"(A,B);(C,D);".to_vec()));
        while source.next_byte() != Some(b';') {}
        let mark = source.position();
        assert_eq!(source.remaining(), b"(C,D);".to_vec());
        assert!(source.is_eof());
        source.set_position(mark);
        assert_eq!(source.peek(), Some(b'('));
        source.set_position(0);
        assert_eq!(source.get_context(4), b"(A,B".to_vec());
    }
}
