use std::fs::File;
use std::path::Path;

use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::debug;

use crate::decoder::DecodeEvent;
use crate::protocols::framing::FramerConfig;
use crate::source::{
    ChunkSource, PcapFileSource, PcapOptions, ReaderSource, SourceError, StreamChunk,
};
use crate::{DEFAULT_GENERATED_AT, RecordEntry, SessionReport, SessionSummary, make_stub_report};

mod streams;
mod tallies;

use streams::StreamTable;
use tallies::{RegisterTally, RejectionTally};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

/// Decode every TCP stream of a capture.
pub fn analyze_pcap_file(path: &Path, options: PcapOptions) -> Result<SessionReport, AnalysisError> {
    let source = PcapFileSource::open_with(path, options)?;
    analyze_source(&path.display().to_string(), path.metadata()?.len(), source)
}

/// Decode a raw byte dump as a single stream named after the file.
pub fn analyze_raw_file(path: &Path) -> Result<SessionReport, AnalysisError> {
    let label = path.display().to_string();
    let file = File::open(path)?;
    let bytes = file.metadata()?.len();
    let source = ReaderSource::new(label.clone(), file);
    analyze_source(&label, bytes, source)
}

/// Drive `source` to its end and build the session report.
///
/// # Examples
/// ```
/// use aabus_core::{ReaderSource, analyze_source};
///
/// let bytes = b"<U>getCAN 0103031200501010205010100</U=4c>";
/// let report = analyze_source("dump", bytes.len() as u64, ReaderSource::new("dump", &bytes[..]))?;
/// assert_eq!(report.summary.records, 1);
/// assert_eq!(report.registers[0].description, "Sys Status");
/// # Ok::<(), aabus_core::AnalysisError>(())
/// ```
pub fn analyze_source<S: ChunkSource>(
    input_path: &str,
    input_bytes: u64,
    mut source: S,
) -> Result<SessionReport, AnalysisError> {
    let mut first_ts = None;
    let mut last_ts = None;
    let mut streams = StreamTable::new(FramerConfig::default());
    let mut registers = RegisterTally::default();
    let mut rejections = RejectionTally::default();
    let mut records = Vec::new();

    while let Some(StreamChunk { ts, stream, data }) = source.next_chunk()? {
        update_ts_bounds(&mut first_ts, &mut last_ts, ts);
        let ts_text = ts_to_rfc3339(ts);

        let state = streams.get_or_insert(&stream);
        state.chunks += 1;
        state.bytes += data.len() as u64;
        for event in state.decoder.feed_events(&data) {
            match event {
                DecodeEvent::Record(record) => {
                    registers.add(&record);
                    records.push(RecordEntry {
                        ts: ts_text.clone(),
                        stream: stream.clone(),
                        record,
                    });
                }
                DecodeEvent::Rejected(err) => rejections.add(&err, &stream, ts_text.as_deref()),
            }
        }
    }

    let mut report = make_stub_report(input_path, input_bytes);
    report.summary = summarize(&streams);
    report.summary.time_start = ts_to_rfc3339(first_ts);
    report.summary.time_end = ts_to_rfc3339(last_ts);
    report.generated_at = report
        .summary
        .time_end
        .clone()
        .or_else(|| report.summary.time_start.clone())
        .unwrap_or_else(|| DEFAULT_GENERATED_AT.to_string());
    report.streams = streams.summaries();
    report.registers = registers.summaries();
    report.rejections = rejections.summaries();
    report.records = records;

    debug!(
        streams = report.streams.len(),
        records = report.summary.records,
        rejections = report.summary.rejections,
        "session analysed"
    );
    Ok(report)
}

fn summarize(streams: &StreamTable) -> SessionSummary {
    let mut summary = SessionSummary::default();
    for state in streams.states() {
        let stats = state.decoder.stats();
        summary.chunks += state.chunks;
        summary.bytes += state.bytes;
        summary.frames += stats.frames;
        summary.keepalives += stats.keepalives;
        summary.records += stats.records;
        summary.rejections += stats.rejections;
        summary.discarded_bytes += state.decoder.discarded();
        summary.retained_bytes += state.decoder.retained().len() as u64;
    }
    summary
}

fn update_ts_bounds(first: &mut Option<f64>, last: &mut Option<f64>, ts: Option<f64>) {
    let Some(ts) = ts else {
        return;
    };
    if first.is_none_or(|existing| ts < existing) {
        *first = Some(ts);
    }
    if last.is_none_or(|existing| ts > existing) {
        *last = Some(ts);
    }
}

fn ts_to_rfc3339(ts: Option<f64>) -> Option<String> {
    let ts = ts?;
    let nanos = (ts * 1_000_000_000.0) as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
}
