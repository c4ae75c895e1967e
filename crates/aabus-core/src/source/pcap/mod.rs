//! PCAP/PCAPNG source.
//!
//! Reads captured packets, keeps TCP segments carrying payload and emits
//! their bytes as chunks keyed by connection direction. Retransmitted bytes
//! are trimmed per direction so the framer sees each byte once.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;
pub mod tcp;

pub use parser::{PcapFileSource, PcapOptions};
