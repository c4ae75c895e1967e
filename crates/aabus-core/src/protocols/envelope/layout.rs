use std::ops::Range;

pub const MIN_RECORD_LEN: usize = 14;

pub const UNIT_TYPE_RANGE: Range<usize> = 0..2;
pub const ORIGIN_DEST_RANGE: Range<usize> = 2..4;
pub const UNIT_ID_RANGE: Range<usize> = 4..9;
pub const REGISTER_ID_RANGE: Range<usize> = 9..11;
pub const PAYLOAD_OFFSET: usize = 11;

pub const PING_BODY: &str = "Ping";
pub const KEEPALIVE_TOKEN: &str = "1";

pub const SET_CAN: &str = "setCAN";
pub const GET_CAN: &str = "getCAN";
pub const ACK_CAN: &str = "ackCAN";
