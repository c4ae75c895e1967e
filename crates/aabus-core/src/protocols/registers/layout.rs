use std::ops::Range;

pub const ZONE_CONFIG: u8 = 0x01;
pub const UNIT_TYPE: u8 = 0x02;
pub const ZONE_STATE: u8 = 0x03;
pub const ZONE_CONFIG_EXTENDED: u8 = 0x04;
pub const SYSTEM_STATUS: u8 = 0x05;
pub const FIRMWARE_STATUS: u8 = 0x06;
pub const TABLET: u8 = 0x07;
pub const AIRCON_ERROR: u8 = 0x08;
pub const ACTIVATION: u8 = 0x09;
pub const SET_UID: u8 = 0x0a;
pub const SENSOR_PAIR: u8 = 0x12;
pub const INFO_BYTE: u8 = 0x13;

pub const ZONE_CONFIG_LEN: usize = 7;
pub const UNIT_TYPE_LEN: usize = 3;
pub const ZONE_STATE_LEN: usize = 7;
pub const ZONE_CONFIG_EXTENDED_LEN: usize = 7;
pub const SYSTEM_STATUS_LEN: usize = 7;
pub const FIRMWARE_STATUS_LEN: usize = 7;
pub const AIRCON_ERROR_LEN: usize = 7;
pub const SET_UID_LEN: usize = 3;

pub const ZONE_CONFIG_CONSTANT_ZONES_RANGE: Range<usize> = 3..6;

pub const ZONE_STATE_FLAGS_OFFSET: usize = 1;
pub const ZONE_OPEN_MASK: u8 = 0x80;
pub const ZONE_PERCENT_MASK: u8 = 0x7f;
pub const MEASURED_WHOLE_OFFSET: usize = 4;
pub const MEASURED_FRACTION_OFFSET: usize = 5;

/// Set-points are sent in half degrees.
pub const SET_TEMPERATURE_SCALE: f64 = 2.0;

pub const AIRCON_ERROR_CODE_RANGE: Range<usize> = 0..5;
pub const AIRCON_ERROR_RESERVED_RANGE: Range<usize> = 5..7;

pub const SET_UID_RANGE: Range<usize> = 0..3;
