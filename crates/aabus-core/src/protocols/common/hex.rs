use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Value of a single ASCII hex digit, case-insensitive.
pub(crate) fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}

/// Decode the two hex digits at `pair` into one byte.
pub(crate) fn hex_pair(pair: [u8; 2]) -> Option<u8> {
    Some((hex_value(pair[0])? << 4) | hex_value(pair[1])?)
}

/// Offset of the first non-hex character, if any.
pub(crate) fn first_non_hex(text: &str) -> Option<usize> {
    text.bytes().position(|b| hex_value(b).is_none())
}

/// One byte carried on the wire as two hex digits.
///
/// Serialises as its lowercase two-digit form (`"0a"`), which is how the bus
/// monitor and the record grammar spell register ids and unit types.
///
/// # Examples
/// ```
/// use aabus_core::HexByte;
///
/// let id: HexByte = "0A".parse().unwrap();
/// assert_eq!(id.value(), 0x0a);
/// assert_eq!(id.to_string(), "0a");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HexByte(pub u8);

impl HexByte {
    pub fn value(self) -> u8 {
        self.0
    }
}

impl From<u8> for HexByte {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl fmt::Display for HexByte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}", self.0)
    }
}

/// Error returned when a string is not exactly two hex digits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected two hex digits, got '{0}'")]
pub struct ParseHexByteError(String);

impl FromStr for HexByte {
    type Err = ParseHexByteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.as_bytes() {
            [hi, lo] => hex_pair([*hi, *lo])
                .map(HexByte)
                .ok_or_else(|| ParseHexByteError(s.to_string())),
            _ => Err(ParseHexByteError(s.to_string())),
        }
    }
}

impl Serialize for HexByte {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HexByte {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::{HexByte, first_non_hex, hex_pair, hex_value};

    #[test]
    fn hex_value_accepts_both_cases() {
        assert_eq!(hex_value(b'7'), Some(7));
        assert_eq!(hex_value(b'c'), Some(12));
        assert_eq!(hex_value(b'C'), Some(12));
        assert_eq!(hex_value(b'g'), None);
    }

    #[test]
    fn hex_pair_combines_nibbles() {
        assert_eq!(hex_pair(*b"a5"), Some(0xa5));
        assert_eq!(hex_pair(*b"5z"), None);
    }

    #[test]
    fn first_non_hex_reports_offset() {
        assert_eq!(first_non_hex("0102ff"), None);
        assert_eq!(first_non_hex("01x2"), Some(2));
    }

    #[test]
    fn hex_byte_serialises_as_lowercase_text() {
        let value = serde_json::to_value(HexByte(0x0a)).unwrap();
        assert_eq!(value, serde_json::json!("0a"));
        let back: HexByte = serde_json::from_value(value).unwrap();
        assert_eq!(back, HexByte(0x0a));
    }

    #[test]
    fn hex_byte_rejects_wrong_width() {
        assert!("1".parse::<HexByte>().is_err());
        assert!("123".parse::<HexByte>().is_err());
    }
}
