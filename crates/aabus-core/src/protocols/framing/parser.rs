use std::ops::Range;

use bytes::{Buf, Bytes, BytesMut};
use tracing::trace;

use super::layout;
use super::reader::{EndMarker, MarkerReader};

/// One `<U>…</U=XX>` message extracted from the stream.
///
/// The tag is the two hex digits of the end marker. It is exposed for
/// diagnostics only and never checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    body: Bytes,
    tag: u8,
}

impl Frame {
    pub fn new(body: Bytes, tag: u8) -> Self {
        Self { body, tag }
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn tag(&self) -> u8 {
        self.tag
    }

}

/// Framer tuning. The default keeps every unmatched byte until the session
/// ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FramerConfig {
    /// Upper bound on retained bytes; older bytes that cannot belong to the
    /// frame in progress are dropped once it is exceeded.
    pub max_retained: Option<usize>,
}

/// Where the next scan resumes. Positions are offsets into the retained
/// buffer and are reset whenever bytes are removed from its front.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ScanState {
    /// Start marker of the frame in progress.
    start: Option<usize>,
    /// First offset not yet searched for the next marker.
    cursor: usize,
}

/// Location of a complete frame inside the retained buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FrameSpan {
    start: usize,
    body: Range<usize>,
    end: usize,
    tag: u8,
}

/// Incremental extractor of frames from an unbounded byte stream.
///
/// Owns the retained buffer for exactly one stream. Feed it chunks in arrival
/// order; markers split across chunks are recognised once the rest arrives.
///
/// # Examples
/// ```
/// use aabus_core::Framer;
///
/// let mut framer = Framer::new();
/// assert!(framer.feed(b"<U>getCAN 01").is_empty());
/// let frames = framer.feed(b"0203</U=4c><U>Pi");
/// assert_eq!(frames.len(), 1);
/// assert_eq!(frames[0].body(), b"getCAN 010203");
/// assert_eq!(framer.retained(), b"<U>Pi");
/// ```
#[derive(Debug)]
pub struct Framer {
    buffer: BytesMut,
    config: FramerConfig,
    scan: ScanState,
    discarded: u64,
}

impl Default for Framer {
    fn default() -> Self {
        Self::new()
    }
}

impl Framer {
    pub fn new() -> Self {
        Self::with_config(FramerConfig::default())
    }

    pub fn with_config(config: FramerConfig) -> Self {
        Self {
            buffer: BytesMut::with_capacity(layout::INITIAL_CAPACITY),
            config,
            scan: ScanState::default(),
            discarded: 0,
        }
    }

    /// Append `chunk` and return every frame completed by it, in order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Frame> {
        if chunk.is_empty() {
            return Vec::new();
        }
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(frame) = self.try_extract_one() {
            frames.push(frame);
        }
        self.enforce_limit();
        frames
    }

    /// Bytes kept for the next call (a partial frame and/or noise).
    pub fn retained(&self) -> &[u8] {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Bytes dropped so far: noise before frames and anything trimmed by the
    /// retention limit.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    pub fn clear(&mut self) {
        self.discarded += self.buffer.len() as u64;
        self.buffer.clear();
        self.scan = ScanState::default();
    }

    fn try_extract_one(&mut self) -> Option<Frame> {
        let span = scan_frame(&self.buffer, &mut self.scan)?;
        self.scan = ScanState::default();
        if span.start > 0 {
            trace!(bytes = span.start, "dropping bytes before frame start");
            self.discarded += span.start as u64;
        }

        let consumed = self.buffer.split_to(span.end).freeze();
        Some(Frame::new(consumed.slice(span.body), span.tag))
    }

    fn enforce_limit(&mut self) {
        let Some(limit) = self.config.max_retained else {
            return;
        };
        if self.buffer.len() <= limit {
            return;
        }

        let reader = MarkerReader::new(&self.buffer);
        let len = self.buffer.len();
        let keep_from = match (self.scan.start, reader.rfind_start()) {
            (Some(pos), _) if len - pos <= limit => pos,
            (_, Some(pos)) if len - pos <= limit => pos,
            _ => len - reader.partial_start_len(),
        };
        trace!(bytes = keep_from, limit, "retention limit exceeded");
        self.buffer.advance(keep_from);
        self.discarded += keep_from as u64;

        self.scan = match self.scan.start {
            Some(pos) if pos == keep_from => ScanState {
                start: Some(0),
                cursor: self.scan.cursor - keep_from,
            },
            _ => ScanState::default(),
        };
    }
}

/// Find the first complete frame in `buffer`, resuming from `state`.
///
/// A frame runs from the first start marker to the first valid end marker
/// after it, so a repeated `<U>` stays inside the body. When no frame is
/// complete, `state` records how far the search got; the tail that could
/// still grow into a marker is searched again on the next call.
fn scan_frame(buffer: &[u8], state: &mut ScanState) -> Option<FrameSpan> {
    let reader = MarkerReader::new(buffer);
    let start = match state.start {
        Some(start) => start,
        None => {
            let Some(start) = reader.find_start(state.cursor) else {
                state.cursor = rescan_from(buffer, layout::START_MARKER.len(), state.cursor);
                return None;
            };
            state.start = Some(start);
            state.cursor = start + layout::START_MARKER.len();
            start
        }
    };

    loop {
        let Some(end) = reader.find_end_prefix(state.cursor) else {
            state.cursor = rescan_from(buffer, layout::END_MARKER_PREFIX.len(), state.cursor);
            return None;
        };
        match reader.read_end_marker(end) {
            EndMarker::Complete { tag } => {
                return Some(FrameSpan {
                    start,
                    body: start + layout::START_MARKER.len()..end,
                    end: end + layout::END_MARKER_LEN,
                    tag,
                });
            }
            EndMarker::Partial => {
                state.cursor = end;
                return None;
            }
            EndMarker::Invalid => state.cursor = end + layout::END_MARKER_PREFIX.len(),
        }
    }
}

/// Offset from which a marker of `marker_len` bytes may still begin once more
/// bytes arrive.
fn rescan_from(buffer: &[u8], marker_len: usize, cursor: usize) -> usize {
    buffer.len().saturating_sub(marker_len - 1).max(cursor)
}
