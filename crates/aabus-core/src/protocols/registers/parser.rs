use serde::{Deserialize, Serialize};

use super::error::PayloadError;
use super::layout;
use super::reader::PayloadReader;
use crate::protocols::common::tables::{
    ActivationStatus, FanSpeed, Mode, SensorType, Switch, Vendor,
};

/// Register 0x01: zone count and constant-zone assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneConfig {
    pub header: u8,
    pub zone_count: u8,
    pub constant_zone_count: u8,
    pub constant_zones: [u8; 3],
    pub filter_status: u8,
}

/// Register 0x02: unit vendor and activation-code state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitType {
    pub vendor: Vendor,
    pub activation: ActivationStatus,
}

/// Register 0x03: live state of one zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneState {
    pub zone: u8,
    pub open: bool,
    /// Damper opening, 0..=127.
    pub percent: u8,
    pub sensor: SensorType,
    /// Degrees Celsius.
    pub set_temperature: f64,
    /// `"<whole>.<fraction>°C"` built from the two raw bytes as sent; the
    /// fraction byte is printed as a number, not scaled.
    pub measured_temperature: String,
}

/// Register 0x04: per-zone damper limits and motion sensing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneConfigExtended {
    pub zone: u8,
    pub min_damper: u8,
    pub max_damper: u8,
    pub motion_status: u8,
    pub motion_config: u8,
    pub motion_zone_error: u8,
    pub signal_strength: u8,
}

/// Register 0x05: overall system mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub power: Switch,
    pub mode: Mode,
    pub fan: FanSpeed,
    pub set_temperature: f64,
    /// Zone id as the two hex digits sent.
    pub my_zone: String,
    pub fresh_air: Switch,
}

/// Register 0x06: control box and RF firmware versions.
///
/// The trailing lock bytes are not decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareStatus {
    pub major: u8,
    pub minor: u8,
    pub control_box_type: u8,
    pub rf_major: u8,
}

/// Register 0x08: air-conditioner fault code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirconError {
    /// Code used for the lookup: the ASCII text with NUL/space padding
    /// trimmed from the end.
    pub code: String,
    /// All five ASCII bytes as sent, padding included.
    pub raw_code: String,
    pub description: String,
    /// Whether `code` matched the fault table.
    pub known: bool,
    /// The two reserved bytes, normally `0000`.
    pub reserved: String,
}

/// Register 0x0a: unit UID assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetUid {
    pub uid: String,
    pub additional: String,
}

static AIRCON_FAULTS: [(&str, &str); 9] = [
    (
        "AA1",
        "Communication error between Advantage Air componentry and A/C unit",
    ),
    ("AA2", "Multiple unit controllers detected"),
    ("AA3", "Communication error"),
    ("AA4", "System is not detecting any temperature sensors"),
    (
        "AA81",
        "Wall sensor detected but no zone allocated or multiple zones allocated",
    ),
    (
        "AA82",
        "Wall sensor detected but no zone allocated or multiple zones allocated",
    ),
    (
        "AA83",
        "Wall sensor detected but no zone allocated or multiple zones allocated",
    ),
    ("AA86", "Wireless wall sensor detected with low battery reading"),
    ("AA89", "Multiple sensors detected on the same zone"),
];

pub fn decode_zone_config(payload: &str) -> Result<ZoneConfig, PayloadError> {
    let reader = PayloadReader::new(payload);
    reader.require_len(layout::ZONE_CONFIG_LEN)?;

    Ok(ZoneConfig {
        header: reader.read_u8(0)?,
        zone_count: reader.read_u8(1)?,
        constant_zone_count: reader.read_u8(2)?,
        constant_zones: reader.read_array(layout::ZONE_CONFIG_CONSTANT_ZONES_RANGE.start)?,
        filter_status: reader.read_u8(6)?,
    })
}

pub fn decode_unit_type(payload: &str) -> Result<UnitType, PayloadError> {
    let reader = PayloadReader::new(payload);
    reader.require_len(layout::UNIT_TYPE_LEN)?;

    Ok(UnitType {
        vendor: Vendor::from_code(reader.read_u8(0)?),
        activation: ActivationStatus::from_code(reader.read_u8(1)?),
    })
}

pub fn decode_zone_state(payload: &str) -> Result<ZoneState, PayloadError> {
    let reader = PayloadReader::new(payload);
    reader.require_len(layout::ZONE_STATE_LEN)?;

    let flags = reader.read_u8(layout::ZONE_STATE_FLAGS_OFFSET)?;
    let whole = reader.read_u8(layout::MEASURED_WHOLE_OFFSET)?;
    let fraction = reader.read_u8(layout::MEASURED_FRACTION_OFFSET)?;

    Ok(ZoneState {
        zone: reader.read_u8(0)?,
        open: flags & layout::ZONE_OPEN_MASK != 0,
        percent: flags & layout::ZONE_PERCENT_MASK,
        sensor: SensorType::from_code(reader.read_u8(2)?),
        set_temperature: half_degrees(reader.read_u8(3)?),
        measured_temperature: format!("{whole}.{fraction}°C"),
    })
}

pub fn decode_zone_config_extended(payload: &str) -> Result<ZoneConfigExtended, PayloadError> {
    let reader = PayloadReader::new(payload);
    reader.require_len(layout::ZONE_CONFIG_EXTENDED_LEN)?;

    let [
        zone,
        min_damper,
        max_damper,
        motion_status,
        motion_config,
        motion_zone_error,
        signal_strength,
    ] = reader.read_array::<7>(0)?;

    Ok(ZoneConfigExtended {
        zone,
        min_damper,
        max_damper,
        motion_status,
        motion_config,
        motion_zone_error,
        signal_strength,
    })
}

pub fn decode_system_status(payload: &str) -> Result<SystemStatus, PayloadError> {
    let reader = PayloadReader::new(payload);
    reader.require_len(layout::SYSTEM_STATUS_LEN)?;

    Ok(SystemStatus {
        power: Switch::from_flag(reader.read_u8(0)?),
        mode: Mode::from_code(reader.read_u8(1)?),
        fan: FanSpeed::from_code(reader.read_u8(2)?),
        set_temperature: half_degrees(reader.read_u8(3)?),
        my_zone: reader.read_hex(4..5)?.to_string(),
        fresh_air: Switch::from_flag(reader.read_u8(5)?),
    })
}

pub fn decode_firmware_status(payload: &str) -> Result<FirmwareStatus, PayloadError> {
    let reader = PayloadReader::new(payload);
    reader.require_len(layout::FIRMWARE_STATUS_LEN)?;

    Ok(FirmwareStatus {
        major: reader.read_u8(0)?,
        minor: reader.read_u8(1)?,
        control_box_type: reader.read_u8(2)?,
        rf_major: reader.read_u8(3)?,
    })
}

pub fn decode_aircon_error(payload: &str) -> Result<AirconError, PayloadError> {
    let reader = PayloadReader::new(payload);
    reader.require_len(layout::AIRCON_ERROR_LEN)?;

    let raw_code: String = reader
        .read_bytes(layout::AIRCON_ERROR_CODE_RANGE)?
        .into_iter()
        .map(ascii_char)
        .collect();
    let code = raw_code.trim_end_matches(['\0', ' ']).to_string();
    let reserved = reader.read_hex(layout::AIRCON_ERROR_RESERVED_RANGE)?.to_string();

    let known = AIRCON_FAULTS.iter().find(|(key, _)| *key == code);
    let description = match known {
        Some((_, description)) => description.to_string(),
        None => format!("Unknown Error Code: {code}"),
    };

    Ok(AirconError {
        known: known.is_some(),
        code,
        raw_code,
        description,
        reserved,
    })
}

pub fn decode_set_uid(payload: &str) -> Result<SetUid, PayloadError> {
    let reader = PayloadReader::new(payload);
    reader.require_len(layout::SET_UID_LEN)?;

    Ok(SetUid {
        uid: reader.read_hex(layout::SET_UID_RANGE)?.to_string(),
        additional: reader.rest_hex(layout::SET_UID_RANGE.end).to_string(),
    })
}

fn half_degrees(raw: u8) -> f64 {
    f64::from(raw) / layout::SET_TEMPERATURE_SCALE
}

fn ascii_char(byte: u8) -> char {
    if byte.is_ascii() {
        char::from(byte)
    } else {
        char::REPLACEMENT_CHARACTER
    }
}
