pub const START_MARKER: &[u8; 3] = b"<U>";
pub const END_MARKER_PREFIX: &[u8; 4] = b"</U=";
pub const TAG_LEN: usize = 2;
pub const END_MARKER_CLOSE: u8 = b'>';
pub const END_MARKER_LEN: usize = END_MARKER_PREFIX.len() + TAG_LEN + 1;

pub const INITIAL_CAPACITY: usize = 4 * 1024;
