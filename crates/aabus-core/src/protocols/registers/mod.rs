//! Register payload decoding.
//!
//! `dispatch` maps a register id to its description and decoder. Decoders
//! are pure and total over hex input: a payload shorter than the register's
//! minimum becomes `DecodedRegister::Incomplete`, any code missing from a
//! lookup table becomes that table's `Unknown(code)`. Byte offsets and
//! minimum lengths live in `layout`, hex access in `reader`.

pub mod dispatch;
pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use dispatch::{DecodedRegister, Register, dispatch};
pub use parser::{
    AirconError, FirmwareStatus, SetUid, SystemStatus, UnitType, ZoneConfig, ZoneConfigExtended,
    ZoneState,
};
