use std::ops::Range;

use super::error::EnvelopeError;
use super::layout;
use crate::protocols::common::hex::{first_non_hex, hex_pair};

/// Field access over one record token.
///
/// `validate` must succeed before any field is read; after that the token is
/// known to be ASCII hex and at least `MIN_RECORD_LEN` long.
pub struct RecordReader<'a> {
    token: &'a str,
}

impl<'a> RecordReader<'a> {
    pub fn new(token: &'a str) -> Self {
        Self { token }
    }

    pub fn require_len(&self, needed: usize) -> Result<(), EnvelopeError> {
        let actual = self.token.chars().count();
        if actual < needed {
            return Err(EnvelopeError::IncompleteRecord {
                token: self.token.to_string(),
                needed,
                actual,
            });
        }
        Ok(())
    }

    pub fn require_hex(&self) -> Result<(), EnvelopeError> {
        match first_non_hex(self.token) {
            Some(offset) => Err(EnvelopeError::MalformedHex {
                token: self.token.to_string(),
                offset,
            }),
            None => Ok(()),
        }
    }

    pub fn validate(&self) -> Result<(), EnvelopeError> {
        self.require_len(layout::MIN_RECORD_LEN)?;
        self.require_hex()
    }

    pub fn read_str(&self, range: Range<usize>) -> Result<&'a str, EnvelopeError> {
        self.token
            .get(range.clone())
            .ok_or_else(|| EnvelopeError::IncompleteRecord {
                token: self.token.to_string(),
                needed: range.end,
                actual: self.token.len(),
            })
    }

    pub fn read_u8(&self, range: Range<usize>) -> Result<u8, EnvelopeError> {
        let offset = range.start;
        let value = match self.read_str(range)?.as_bytes() {
            [hi, lo] => hex_pair([*hi, *lo]),
            _ => None,
        };
        value.ok_or_else(|| EnvelopeError::MalformedHex {
            token: self.token.to_string(),
            offset,
        })
    }

    pub fn payload(&self) -> &'a str {
        self.token.get(layout::PAYLOAD_OFFSET..).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::RecordReader;
    use crate::protocols::envelope::error::EnvelopeError;
    use crate::protocols::envelope::layout;

    #[test]
    fn validate_short_token() {
        let err = RecordReader::new("0103").validate().unwrap_err();
        assert_eq!(
            err,
            EnvelopeError::IncompleteRecord {
                token: "0103".to_string(),
                needed: 14,
                actual: 4,
            }
        );
    }

    #[test]
    fn validate_non_hex_token() {
        let err = RecordReader::new("01030312005g1020").validate().unwrap_err();
        assert!(matches!(err, EnvelopeError::MalformedHex { offset: 11, .. }));
    }

    #[test]
    fn short_check_runs_before_hex_check() {
        let err = RecordReader::new("zz").validate().unwrap_err();
        assert_eq!(err.kind(), "incomplete-record");
    }

    #[test]
    fn reads_fields() {
        let reader = RecordReader::new("0103031200501010205010100");
        reader.validate().unwrap();
        assert_eq!(reader.read_u8(layout::UNIT_TYPE_RANGE).unwrap(), 0x01);
        assert_eq!(reader.read_u8(layout::ORIGIN_DEST_RANGE).unwrap(), 0x03);
        assert_eq!(reader.read_str(layout::UNIT_ID_RANGE).unwrap(), "03120");
        assert_eq!(reader.read_u8(layout::REGISTER_ID_RANGE).unwrap(), 0x05);
        assert_eq!(reader.payload(), "01010205010100");
    }

    #[test]
    fn payload_may_be_short() {
        let reader = RecordReader::new("01030312005abc");
        reader.validate().unwrap();
        assert_eq!(reader.payload(), "abc");
    }
}
