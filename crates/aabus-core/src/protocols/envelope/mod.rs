//! Message envelope parsing.
//!
//! A frame body is one command word (`setCAN`, `getCAN`, `ackCAN`) followed
//! by whitespace-separated record tokens. Each token carries fixed-width hex
//! fields; the fields are split here and the payload is handed to
//! [`crate::protocols::registers::dispatch`].
//!
//! Record-level errors never abort the rest of the body: they are returned
//! alongside the records that did parse.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use error::EnvelopeError;
pub use parser::{CommandKind, Message, ParsedRecord, parse_message, parse_record};
