//! Canonical ULEB128 encoding and decoding.
//!
//! Every length prefix and enum tag on the wire is an unsigned LEB128
//! integer: 7 data bits per byte, continuation bit set on all but the
//! last byte. Decoding is strict — each value has exactly one accepted
//! encoding. A padded encoding (trailing zero-continuation bytes) or a
//! value past the length cap is rejected, never normalized. Canonical
//! form matters because these bytes feed consensus-relevant hashing and
//! signing upstream.

use crate::cursor::Cursor;
use crate::error::CodecError;
use bytes::BufMut;

const DATA_BITS_MASK: u8 = 0x7F;
const CONTINUATION_BIT_MASK: u8 = 0x80;

/// Lengths and tags are capped below 2^32.
pub const MAX_VALUE: u64 = u32::MAX as u64;

/// Encode `value` as a minimal ULEB128 into `buf`.
pub fn encode(value: u64, buf: &mut impl BufMut) {
    if value < CONTINUATION_BIT_MASK as u64 {
        // Fast path for small values (the common case for lengths).
        buf.put_u8(value as u8);
        return;
    }

    let mut val = value;
    while val >= CONTINUATION_BIT_MASK as u64 {
        buf.put_u8((val as u8 & DATA_BITS_MASK) | CONTINUATION_BIT_MASK);
        val >>= 7;
    }
    buf.put_u8(val as u8);
}

/// Decode a canonical ULEB128 from the cursor.
///
/// Fails with `NonCanonicalVarint` if the encoding uses more bytes than
/// the minimal representation requires, and `VarintOverflow` if the
/// value exceeds [`MAX_VALUE`] (or the encoding runs past the byte count
/// any in-range value could need).
pub fn decode(cur: &mut Cursor<'_>) -> Result<u64, CodecError> {
    let start = cur.position();
    let mut value: u64 = 0;
    let mut shift: u32 = 0;

    loop {
        let byte = cur.read_u8()?;
        value |= ((byte & DATA_BITS_MASK) as u64) << shift;

        if byte & CONTINUATION_BIT_MASK == 0 {
            // A final zero byte after at least one continuation byte
            // means the same value had a shorter encoding.
            if shift > 0 && byte == 0 {
                return Err(CodecError::NonCanonicalVarint { offset: start });
            }
            if value > MAX_VALUE {
                return Err(CodecError::VarintOverflow { offset: start });
            }
            return Ok(value);
        }

        shift += 7;
        // 5 bytes carry 35 data bits — already past the 32-bit cap.
        if shift >= 35 {
            return Err(CodecError::VarintOverflow { offset: start });
        }
    }
}

/// Number of bytes `encode` will emit for `value`.
pub fn size(value: u64) -> usize {
    let data_bits = 64 - value.leading_zeros() as usize;
    usize::max(1, data_bits.div_ceil(7))
}
