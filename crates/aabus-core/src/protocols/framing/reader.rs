use super::layout;
use crate::protocols::common::hex::hex_pair;

/// Result of inspecting the bytes at an end-marker candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndMarker {
    /// `</U=XX>` with a valid two-digit tag.
    Complete { tag: u8 },
    /// Valid so far but the buffer ends before the closing `>`.
    Partial,
    /// Not an end marker; scanning resumes after the prefix.
    Invalid,
}

pub struct MarkerReader<'a> {
    buffer: &'a [u8],
}

impl<'a> MarkerReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer }
    }

    pub fn find(&self, needle: &[u8], from: usize) -> Option<usize> {
        let haystack = self.buffer.get(from..)?;
        haystack
            .windows(needle.len())
            .position(|window| window == needle)
            .map(|pos| pos + from)
    }

    pub fn find_start(&self, from: usize) -> Option<usize> {
        self.find(layout::START_MARKER, from)
    }

    pub fn rfind_start(&self) -> Option<usize> {
        self.buffer
            .windows(layout::START_MARKER.len())
            .rposition(|window| window == layout::START_MARKER)
    }

    pub fn find_end_prefix(&self, from: usize) -> Option<usize> {
        self.find(layout::END_MARKER_PREFIX, from)
    }

    /// Inspect the end marker whose prefix starts at `offset`.
    pub fn read_end_marker(&self, offset: usize) -> EndMarker {
        let tail_start = offset + layout::END_MARKER_PREFIX.len();
        let tail = self.buffer.get(tail_start..).unwrap_or(&[]);

        for (idx, byte) in tail.iter().take(layout::TAG_LEN + 1).enumerate() {
            let valid = if idx < layout::TAG_LEN {
                byte.is_ascii_hexdigit()
            } else {
                *byte == layout::END_MARKER_CLOSE
            };
            if !valid {
                return EndMarker::Invalid;
            }
        }

        if tail.len() <= layout::TAG_LEN {
            return EndMarker::Partial;
        }
        match hex_pair([tail[0], tail[1]]) {
            Some(tag) => EndMarker::Complete { tag },
            None => EndMarker::Invalid,
        }
    }

    /// Length of the buffer suffix that could still grow into a start marker.
    pub fn partial_start_len(&self) -> usize {
        let marker = layout::START_MARKER;
        (1..marker.len())
            .rev()
            .find(|&len| self.buffer.ends_with(&marker[..len]))
            .unwrap_or(0)
    }
}
