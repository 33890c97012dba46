//! Wire primitives shared by every coder
//!
//! Writers append to a `Vec<u8>`; readers consume from the front of a
//! `&mut &[u8]` and leave it pointing at the first unread byte.

use crate::error::{DecodeResult, DecodingError};
use crate::time::Timestamp;

/// Longest LEB128 encoding of a `u64`
pub const MAX_VARINT_LEN: usize = 10;

/// Encoded width of a timestamp
pub const INSTANT_LEN: usize = 8;

const SIGN_BIT: u64 = 1 << 63;

pub fn write_u8(out: &mut Vec<u8>, value: u8) {
    out.push(value);
}

/// Writes an unsigned LEB128 varint
pub fn write_varint(out: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        out.push((value as u8) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

/// Writes a timestamp as 8 big-endian bytes with the sign bit flipped
///
/// Flipping the sign bit makes the unsigned byte order of encodings agree
/// with timestamp order, so encoded timestamps sort correctly as raw keys.
pub fn write_instant(out: &mut Vec<u8>, timestamp: Timestamp) {
    let shifted = (timestamp.millis() as u64) ^ SIGN_BIT;
    out.extend_from_slice(&shifted.to_be_bytes());
}

/// Writes a varint length followed by the bytes
pub fn write_len_prefixed(out: &mut Vec<u8>, bytes: &[u8]) {
    write_varint(out, bytes.len() as u64);
    out.extend_from_slice(bytes);
}

/// Splits `len` bytes off the front of the input
pub fn take<'a>(input: &mut &'a [u8], len: usize, what: &'static str) -> DecodeResult<&'a [u8]> {
    if input.len() < len {
        return Err(DecodingError::UnexpectedEof {
            what,
            needed: len,
            remaining: input.len(),
        });
    }
    let (head, tail) = input.split_at(len);
    *input = tail;
    Ok(head)
}

pub fn read_u8(input: &mut &[u8], what: &'static str) -> DecodeResult<u8> {
    let (&first, rest) = input.split_first().ok_or(DecodingError::UnexpectedEof {
        what,
        needed: 1,
        remaining: 0,
    })?;
    *input = rest;
    Ok(first)
}

/// Reads an unsigned LEB128 varint of at most ten bytes
pub fn read_varint(input: &mut &[u8], what: &'static str) -> DecodeResult<u64> {
    let mut result = 0u64;
    for index in 0..MAX_VARINT_LEN {
        let byte = read_u8(input, what)?;
        // The tenth byte only has room for the top bit of a u64.
        if index == MAX_VARINT_LEN - 1 && byte > 0x01 {
            return Err(DecodingError::VarintOverflow);
        }
        result |= u64::from(byte & 0x7f) << (7 * index);
        if byte & 0x80 == 0 {
            return Ok(result);
        }
    }
    Err(DecodingError::VarintOverflow)
}

pub fn read_instant(input: &mut &[u8]) -> DecodeResult<Timestamp> {
    let bytes = take(input, INSTANT_LEN, "timestamp")?;
    let mut buf = [0u8; INSTANT_LEN];
    buf.copy_from_slice(bytes);
    let shifted = u64::from_be_bytes(buf) ^ SIGN_BIT;
    Ok(Timestamp::from_millis(shifted as i64))
}

/// Reads a varint length and that many bytes
///
/// The declared length is checked against `limit` and against the remaining
/// input before anything is sliced.
pub fn read_len_prefixed<'a>(
    input: &mut &'a [u8],
    what: &'static str,
    limit: usize,
) -> DecodeResult<&'a [u8]> {
    let declared = read_varint(input, what)?;
    if declared > limit as u64 {
        return Err(DecodingError::LimitExceeded {
            what,
            declared,
            limit,
        });
    }
    if declared > input.len() as u64 {
        return Err(DecodingError::LengthOutOfBounds {
            what,
            declared,
            remaining: input.len(),
        });
    }
    take(input, declared as usize, what)
}

/// Reads a length-prefixed UTF-8 string
pub fn read_string(input: &mut &[u8], what: &'static str, limit: usize) -> DecodeResult<String> {
    let bytes = read_len_prefixed(input, what, limit)?;
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|e| DecodingError::InvalidUtf8 {
            what,
            reason: e.to_string(),
        })
}
