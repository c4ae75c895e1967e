//! aabus core library: decoding of the Advantage Air wall-tablet bus.
//!
//! The control box and its tablets exchange `<U>…</U=XX>` framed text
//! messages over TCP. This crate turns raw bytes from that stream into
//! structured records: the framer extracts message bodies, the envelope
//! parser splits them into CAN records, and the register dispatch decodes
//! each payload. Parsing is pure and byte-oriented; I/O is isolated in
//! `source` modules and aggregation in `analysis`.
//!
//! Invariants:
//! - Framing is chunk-invariant: how bytes are split across `feed` calls
//!   never changes the frames produced.
//! - Every stream owns its decoder; buffers are never shared.
//! - Nothing malformed ends a session. Bad bodies and records are reported
//!   and skipped, unknown registers and codes are passed through.
//! - Reports are deterministic for a given input.
//!
//! # Examples
//! ```
//! use aabus_core::{DecodedRegister, StreamDecoder};
//!
//! let mut decoder = StreamDecoder::new();
//! let records = decoder.feed(b"<U>setCAN 1 0101aabbc0aaabbcc0000</U=2f>");
//! assert_eq!(records.len(), 1);
//! assert!(matches!(records[0].decoded, DecodedRegister::SetUid(_)));
//! ```

use serde::{Deserialize, Serialize};

mod analysis;
mod decoder;
mod protocols;
mod source;

pub use analysis::{AnalysisError, analyze_pcap_file, analyze_raw_file, analyze_source};
pub use decoder::{DecodeEvent, DecoderStats, StreamDecoder};
pub use protocols::common::tables::{
    ActivationStatus, FanSpeed, Mode, OriginDest, SensorType, Switch, Vendor,
};
pub use protocols::common::{HexByte, ParseHexByteError};
pub use protocols::envelope::{
    CommandKind, EnvelopeError, Message, ParsedRecord, parse_message, parse_record,
};
pub use protocols::framing::{Frame, Framer, FramerConfig};
pub use protocols::registers::{
    AirconError, DecodedRegister, FirmwareStatus, Register, SetUid, SystemStatus, UnitType,
    ZoneConfig, ZoneConfigExtended, ZoneState, dispatch,
};
pub use source::{
    ChunkSource, DEFAULT_CHUNK_SIZE, PcapFileSource, PcapOptions, ReaderSource, SourceError,
    StreamChunk,
};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when no capture time is available.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";
/// Maximum number of examples kept per rejection kind.
pub const MAX_REJECTION_EXAMPLES: usize = 3;

/// Decoded session with deterministic ordering.
///
/// # Examples
/// ```
/// use aabus_core::make_stub_report;
///
/// let report = make_stub_report("session.pcapng", 123);
/// assert_eq!(report.report_version, aabus_core::REPORT_VERSION);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    pub tool: ToolInfo,
    /// RFC3339 timestamp of the last captured chunk, or the epoch.
    pub generated_at: String,
    pub input: InputInfo,
    pub summary: SessionSummary,
    /// Per-stream counters, sorted by stream id.
    pub streams: Vec<StreamSummary>,
    /// Record counts per register id, ascending.
    pub registers: Vec<RegisterSummary>,
    /// Rejection counts per kind, sorted by kind.
    pub rejections: Vec<RejectionSummary>,
    /// Decoded records in arrival order.
    pub records: Vec<RecordEntry>,
}

/// Tool metadata embedded in reports.
///
/// # Examples
/// ```
/// use aabus_core::ToolInfo;
///
/// let tool = ToolInfo {
///     name: "aabus".to_string(),
///     version: "0.1.0".to_string(),
/// };
/// assert_eq!(tool.name, "aabus");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

/// Input metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the analyzer.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// Totals over every stream of the session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSummary {
    pub chunks: u64,
    /// Payload bytes handed to the decoders.
    pub bytes: u64,
    pub frames: u64,
    /// Frames without records (`Ping` or blank bodies).
    pub keepalives: u64,
    pub records: u64,
    pub rejections: u64,
    /// Bytes dropped by the framers (noise before frames, retention trims).
    pub discarded_bytes: u64,
    /// Bytes of unfinished frames left when the input ended.
    pub retained_bytes: u64,
    /// RFC3339 timestamp of the first chunk, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_start: Option<String>,
    /// RFC3339 timestamp of the last chunk, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_end: Option<String>,
}

/// Counters for one stream (one TCP direction or one raw input).
///
/// # Examples
/// ```
/// use aabus_core::StreamSummary;
///
/// let stream = StreamSummary {
///     stream: "192.168.1.2:10002 -> 192.168.1.50:40000".to_string(),
///     chunks: 2,
///     bytes: 84,
///     frames: 2,
///     records: 2,
///     rejections: 0,
///     discarded_bytes: 0,
///     retained_bytes: 0,
/// };
/// assert_eq!(stream.records, 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamSummary {
    pub stream: String,
    pub chunks: u64,
    pub bytes: u64,
    pub frames: u64,
    pub records: u64,
    pub rejections: u64,
    pub discarded_bytes: u64,
    pub retained_bytes: u64,
}

/// Record count for one register id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterSummary {
    pub register_id: HexByte,
    pub description: String,
    pub count: u64,
}

/// Rejections of one kind.
///
/// # Examples
/// ```
/// use aabus_core::RejectionSummary;
///
/// let summary = RejectionSummary {
///     kind: "incomplete-record".to_string(),
///     count: 1,
///     examples: vec!["raw: incomplete record '0103': need 14 hex digits, got 4".to_string()],
/// };
/// assert_eq!(summary.count, 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectionSummary {
    /// Stable kind identifier (`incomplete-record`, `malformed-hex`,
    /// `unrecognized-command`).
    pub kind: String,
    pub count: u64,
    /// At most three examples, formatted as `stream @ ts: message`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

/// One decoded record with its origin in the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordEntry {
    /// RFC3339 timestamp of the chunk that completed the frame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
    pub stream: String,
    pub record: ParsedRecord,
}

/// Build a stub report with base fields filled and empty aggregates.
///
/// # Examples
/// ```
/// use aabus_core::make_stub_report;
///
/// let report = make_stub_report("dump.bin", 123);
/// assert_eq!(report.generated_at, aabus_core::DEFAULT_GENERATED_AT);
/// assert!(report.records.is_empty());
/// ```
pub fn make_stub_report(input_path: &str, input_bytes: u64) -> SessionReport {
    SessionReport {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "aabus".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        summary: SessionSummary::default(),
        streams: vec![],
        registers: vec![],
        rejections: vec![],
        records: vec![],
    }
}
