//! Per-stream decoding pipeline: framer, envelope parser, register dispatch.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::protocols::envelope::{EnvelopeError, ParsedRecord, parse_message};
use crate::protocols::framing::{Framer, FramerConfig};

/// Outcome of one record token or message body, in stream order.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeEvent {
    Record(ParsedRecord),
    Rejected(EnvelopeError),
}

/// Running counters for one decoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderStats {
    /// Complete frames extracted by the framer.
    pub frames: u64,
    /// Frames with nothing to decode (`Ping` or blank bodies).
    pub keepalives: u64,
    pub records: u64,
    pub rejections: u64,
}

/// Decoder for a single byte stream.
///
/// Each TCP direction or live connection needs its own instance; the framer
/// buffer is never shared.
///
/// # Examples
/// ```
/// use aabus_core::StreamDecoder;
///
/// let mut decoder = StreamDecoder::new();
/// let records = decoder.feed(b"<U>getCAN 0103031200501010205010100</U=4c>");
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].description, "Sys Status");
/// ```
#[derive(Debug, Default)]
pub struct StreamDecoder {
    framer: Framer,
    stats: DecoderStats,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FramerConfig) -> Self {
        Self {
            framer: Framer::with_config(config),
            stats: DecoderStats::default(),
        }
    }

    /// Feed one chunk and return the records it completed.
    ///
    /// Rejections are logged and counted but not returned; use
    /// [`StreamDecoder::feed_events`] to see them.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<ParsedRecord> {
        self.feed_events(chunk)
            .into_iter()
            .filter_map(|event| match event {
                DecodeEvent::Record(record) => Some(record),
                DecodeEvent::Rejected(_) => None,
            })
            .collect()
    }

    /// Feed one chunk and return records and rejections in arrival order.
    pub fn feed_events(&mut self, chunk: &[u8]) -> Vec<DecodeEvent> {
        let mut events = Vec::new();
        for frame in self.framer.feed(chunk) {
            self.stats.frames += 1;
            debug!(tag = frame.tag(), bytes = frame.body().len(), "frame");

            match parse_message(frame.body()) {
                Ok(None) => self.stats.keepalives += 1,
                Ok(Some(message)) => {
                    for record in message.records {
                        events.push(self.record_event(record));
                    }
                }
                Err(err) => events.push(self.reject(err)),
            }
        }
        events
    }

    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    /// Bytes waiting for the rest of a frame.
    pub fn retained(&self) -> &[u8] {
        self.framer.retained()
    }

    pub fn discarded(&self) -> u64 {
        self.framer.discarded()
    }

    fn record_event(&mut self, record: Result<ParsedRecord, EnvelopeError>) -> DecodeEvent {
        match record {
            Ok(record) => {
                self.stats.records += 1;
                DecodeEvent::Record(record)
            }
            Err(err) => self.reject(err),
        }
    }

    fn reject(&mut self, err: EnvelopeError) -> DecodeEvent {
        self.stats.rejections += 1;
        warn!(kind = err.kind(), error = %err, "rejected");
        DecodeEvent::Rejected(err)
    }
}
