//! Stream framing for the bridge's `<U>…</U=XX>` messages.
//!
//! The framer keeps a per-stream buffer, scans it by index for start and end
//! markers and hands out complete frame bodies. The two-digit tag in the end
//! marker is a checksum on the bus; it is captured but never verified.
//! Marker byte strings live in `layout`, marker inspection in `reader`.

pub mod layout;
pub mod parser;
pub mod reader;

pub use parser::{Frame, Framer, FramerConfig};
