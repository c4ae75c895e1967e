use std::ops::Range;

use super::error::PayloadError;
use crate::protocols::common::hex::hex_pair;

/// Byte-oriented access to a hex-text payload.
///
/// Offsets and lengths are in bytes (two hex digits each). A trailing odd
/// digit does not count towards the length.
pub struct PayloadReader<'a> {
    payload: &'a str,
}

impl<'a> PayloadReader<'a> {
    pub fn new(payload: &'a str) -> Self {
        Self { payload }
    }

    pub fn byte_len(&self) -> usize {
        self.payload.len() / 2
    }

    pub fn require_len(&self, needed: usize) -> Result<(), PayloadError> {
        if self.byte_len() < needed {
            return Err(PayloadError::TooShort {
                needed,
                actual: self.byte_len(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, PayloadError> {
        let digits = self.payload.as_bytes();
        let pair = digits
            .get(offset * 2..offset * 2 + 2)
            .ok_or(PayloadError::TooShort {
                needed: offset + 1,
                actual: self.byte_len(),
            })?;
        hex_pair([pair[0], pair[1]]).ok_or(PayloadError::InvalidHex { offset })
    }

    pub fn read_array<const N: usize>(&self, offset: usize) -> Result<[u8; N], PayloadError> {
        let mut out = [0u8; N];
        for (idx, byte) in out.iter_mut().enumerate() {
            *byte = self.read_u8(offset + idx)?;
        }
        Ok(out)
    }

    pub fn read_bytes(&self, range: Range<usize>) -> Result<Vec<u8>, PayloadError> {
        range.map(|offset| self.read_u8(offset)).collect()
    }

    /// The hex text covering `range`, as sent.
    pub fn read_hex(&self, range: Range<usize>) -> Result<&'a str, PayloadError> {
        self.read_bytes(range.clone())?;
        Ok(&self.payload[range.start * 2..range.end * 2])
    }

    /// Everything from byte `offset` on, including a trailing odd digit.
    pub fn rest_hex(&self, offset: usize) -> &'a str {
        self.payload.get(offset * 2..).unwrap_or("")
    }
}
