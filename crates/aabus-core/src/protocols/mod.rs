//! Protocol decoding modules.
//!
//! Each layer follows the same structure:
//! - `layout`: markers, field ranges and minimum lengths (source of truth)
//! - `reader`: safe access to bytes or hex text
//! - `parser`: domain-level decoding (no direct indexing)
//! - `error`: explicit, actionable errors
//!
//! `framing` turns a byte stream into frame bodies, `envelope` splits a body
//! into records, `registers` decodes each record payload. Everything here is
//! pure; sources and analysis handle I/O and aggregation.

pub(crate) mod common;
pub mod envelope;
pub mod framing;
pub mod registers;
