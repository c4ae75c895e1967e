//! Byte sources feeding the decoder.
//!
//! A source yields chunks tagged with the stream they belong to. Live
//! sockets, files and stdin go through [`ReaderSource`]; captures through
//! [`PcapFileSource`], which splits TCP traffic per connection direction.

mod pcap;
mod reader;

pub use pcap::{PcapFileSource, PcapOptions};
pub use reader::{DEFAULT_CHUNK_SIZE, ReaderSource};

use thiserror::Error;

/// A run of bytes from one stream.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamChunk {
    /// Capture timestamp in seconds since the Unix epoch, when known.
    pub ts: Option<f64>,
    /// Stream identifier; chunks with the same id share one decoder.
    pub stream: String,
    pub data: Vec<u8>,
}

pub trait ChunkSource {
    fn next_chunk(&mut self) -> Result<Option<StreamChunk>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PCAP parse error: {0}")]
    Pcap(String),
}

impl From<pcap::error::PcapSourceError> for SourceError {
    fn from(value: pcap::error::PcapSourceError) -> Self {
        match value {
            pcap::error::PcapSourceError::Io(err) => SourceError::Io(err),
            pcap::error::PcapSourceError::Pcap { context, message } => {
                SourceError::Pcap(format!("{context}: {message}"))
            }
        }
    }
}
