//! Byte cursor for decoding.

use crate::error::CodecError;

/// A forward-only cursor over an input buffer.
///
/// Tracks the absolute offset so every decode error can report where in
/// the input it was detected.
#[derive(Debug)]
pub struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Absolute offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos == self.bytes.len()
    }

    /// Read a single byte, advancing the cursor.
    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        let slice = self.read_exact(1)?;
        Ok(slice[0])
    }

    /// Read exactly `N` bytes into a fixed-size array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let slice = self.read_exact(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    /// Read exactly `n` bytes, advancing the cursor.
    pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if self.remaining() < n {
            return Err(CodecError::UnexpectedEndOfInput {
                offset: self.pos,
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }
}
