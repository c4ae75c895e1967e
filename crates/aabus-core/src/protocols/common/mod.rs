pub(crate) mod hex;
pub(crate) mod tables;

pub use hex::{HexByte, ParseHexByteError};
