use std::collections::BTreeMap;

use crate::StreamSummary;
use crate::decoder::StreamDecoder;
use crate::protocols::framing::FramerConfig;

/// Decoder plus input counters for one stream.
#[derive(Debug)]
pub(crate) struct StreamState {
    pub(crate) decoder: StreamDecoder,
    pub(crate) chunks: u64,
    pub(crate) bytes: u64,
}

impl StreamState {
    fn new(config: FramerConfig) -> Self {
        Self {
            decoder: StreamDecoder::with_config(config),
            chunks: 0,
            bytes: 0,
        }
    }
}

/// Streams keyed by id; ordered so summaries come out sorted.
#[derive(Debug, Default)]
pub(crate) struct StreamTable {
    config: FramerConfig,
    streams: BTreeMap<String, StreamState>,
}

impl StreamTable {
    pub(crate) fn new(config: FramerConfig) -> Self {
        Self {
            config,
            streams: BTreeMap::new(),
        }
    }

    /// The state for `stream`, created on first use.
    pub(crate) fn get_or_insert(&mut self, stream: &str) -> &mut StreamState {
        let config = self.config;
        self.streams
            .entry(stream.to_string())
            .or_insert_with(|| StreamState::new(config))
    }

    pub(crate) fn summaries(&self) -> Vec<StreamSummary> {
        self.streams
            .iter()
            .map(|(stream, state)| {
                let stats = state.decoder.stats();
                StreamSummary {
                    stream: stream.clone(),
                    chunks: state.chunks,
                    bytes: state.bytes,
                    frames: stats.frames,
                    records: stats.records,
                    rejections: stats.rejections,
                    discarded_bytes: state.decoder.discarded(),
                    retained_bytes: state.decoder.retained().len() as u64,
                }
            })
            .collect()
    }

    pub(crate) fn states(&self) -> impl Iterator<Item = &StreamState> {
        self.streams.values()
    }
}
