use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::error::PayloadError;
use super::layout;
use super::parser::{
    AirconError, FirmwareStatus, SetUid, SystemStatus, UnitType, ZoneConfig, ZoneConfigExtended,
    ZoneState, decode_aircon_error, decode_firmware_status, decode_set_uid,
    decode_system_status, decode_unit_type, decode_zone_config, decode_zone_config_extended,
    decode_zone_state,
};

/// Register ids seen on the bus.
///
/// Ids with a description but no decoder (`Tablet`, `Activation`,
/// `SensorPair`, `InfoByte`) pass their payload through untouched, as do ids
/// outside this list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    ZoneConfig,
    UnitType,
    ZoneState,
    ZoneConfigExtended,
    SystemStatus,
    FirmwareStatus,
    Tablet,
    AirconError,
    Activation,
    SetUid,
    SensorPair,
    InfoByte,
    Unknown(u8),
}

impl Register {
    pub fn from_code(code: u8) -> Self {
        match code {
            layout::ZONE_CONFIG => Register::ZoneConfig,
            layout::UNIT_TYPE => Register::UnitType,
            layout::ZONE_STATE => Register::ZoneState,
            layout::ZONE_CONFIG_EXTENDED => Register::ZoneConfigExtended,
            layout::SYSTEM_STATUS => Register::SystemStatus,
            layout::FIRMWARE_STATUS => Register::FirmwareStatus,
            layout::TABLET => Register::Tablet,
            layout::AIRCON_ERROR => Register::AirconError,
            layout::ACTIVATION => Register::Activation,
            layout::SET_UID => Register::SetUid,
            layout::SENSOR_PAIR => Register::SensorPair,
            layout::INFO_BYTE => Register::InfoByte,
            other => Register::Unknown(other),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Register::ZoneConfig => layout::ZONE_CONFIG,
            Register::UnitType => layout::UNIT_TYPE,
            Register::ZoneState => layout::ZONE_STATE,
            Register::ZoneConfigExtended => layout::ZONE_CONFIG_EXTENDED,
            Register::SystemStatus => layout::SYSTEM_STATUS,
            Register::FirmwareStatus => layout::FIRMWARE_STATUS,
            Register::Tablet => layout::TABLET,
            Register::AirconError => layout::AIRCON_ERROR,
            Register::Activation => layout::ACTIVATION,
            Register::SetUid => layout::SET_UID,
            Register::SensorPair => layout::SENSOR_PAIR,
            Register::InfoByte => layout::INFO_BYTE,
            Register::Unknown(code) => code,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Register::ZoneConfig => "Zone CFG",
            Register::UnitType => "Unit Type",
            Register::ZoneState => "Zone State",
            Register::ZoneConfigExtended => "Zone Cfg",
            Register::SystemStatus => "Sys Status",
            Register::FirmwareStatus => "FW Vers",
            Register::Tablet => "Tablet?",
            Register::AirconError => "AC Error",
            Register::Activation => "Activation",
            Register::SetUid => "UID",
            Register::SensorPair => "Sensor Pair",
            Register::InfoByte => "Info Byte",
            Register::Unknown(_) => "Unknown",
        }
    }

    /// Decode `payload` with this register's decoder.
    pub fn decode(self, payload: &str) -> DecodedRegister {
        let decoded = match self {
            Register::ZoneConfig => decode_zone_config(payload).map(DecodedRegister::ZoneConfig),
            Register::UnitType => decode_unit_type(payload).map(DecodedRegister::UnitType),
            Register::ZoneState => decode_zone_state(payload).map(DecodedRegister::ZoneState),
            Register::ZoneConfigExtended => {
                decode_zone_config_extended(payload).map(DecodedRegister::ZoneConfigExtended)
            }
            Register::SystemStatus => {
                decode_system_status(payload).map(DecodedRegister::SystemStatus)
            }
            Register::FirmwareStatus => {
                decode_firmware_status(payload).map(DecodedRegister::FirmwareStatus)
            }
            Register::AirconError => decode_aircon_error(payload).map(DecodedRegister::AirconError),
            Register::SetUid => decode_set_uid(payload).map(DecodedRegister::SetUid),
            Register::Tablet
            | Register::Activation
            | Register::SensorPair
            | Register::InfoByte
            | Register::Unknown(_) => Ok(DecodedRegister::passthrough(payload)),
        };

        match decoded {
            Ok(decoded) => decoded,
            Err(PayloadError::TooShort { needed, actual }) => {
                DecodedRegister::Incomplete { needed, actual }
            }
            Err(err @ PayloadError::InvalidHex { .. }) => {
                warn!(register = %self, error = %err, "payload is not hex, passing through");
                DecodedRegister::passthrough(payload)
            }
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}", self.code())
    }
}

/// Register payload after decoding.
///
/// # Examples
/// ```
/// use aabus_core::{DecodedRegister, dispatch};
///
/// let (description, decoded) = dispatch(0x0a, "aabbcc0000");
/// assert_eq!(description, "UID");
/// match decoded {
///     DecodedRegister::SetUid(uid) => assert_eq!(uid.uid, "aabbcc"),
///     other => panic!("unexpected {other:?}"),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodedRegister {
    ZoneConfig(ZoneConfig),
    UnitType(UnitType),
    ZoneState(ZoneState),
    ZoneConfigExtended(ZoneConfigExtended),
    SystemStatus(SystemStatus),
    FirmwareStatus(FirmwareStatus),
    AirconError(AirconError),
    SetUid(SetUid),
    /// Raw payload of a register without a decoder.
    Unknown { payload: String },
    /// Payload shorter than the register's minimum, in bytes.
    Incomplete { needed: usize, actual: usize },
}

impl DecodedRegister {
    fn passthrough(payload: &str) -> Self {
        DecodedRegister::Unknown {
            payload: payload.to_string(),
        }
    }
}

/// Look up `register_id` and decode `payload` with its decoder.
///
/// Never fails: ids without a decoder yield [`DecodedRegister::Unknown`] with
/// the payload unchanged, short payloads yield
/// [`DecodedRegister::Incomplete`].
pub fn dispatch(register_id: u8, payload: &str) -> (&'static str, DecodedRegister) {
    let register = Register::from_code(register_id);
    (register.description(), register.decode(payload))
}

#[cfg(test)]
mod tests {
    use super::{DecodedRegister, Register, dispatch};

    #[test]
    fn known_ids_have_descriptions() {
        assert_eq!(dispatch(0x05, "01010205010100").0, "Sys Status");
        assert_eq!(dispatch(0x0a, "aabbcc").0, "UID");
        assert_eq!(dispatch(0x13, "").0, "Info Byte");
    }

    #[test]
    fn unknown_id_passes_payload_through() {
        for id in [0x00, 0x0b, 0x11, 0x14, 0xff] {
            let (description, decoded) = dispatch(id, "DeadBeef1");
            assert_eq!(description, "Unknown");
            assert_eq!(
                decoded,
                DecodedRegister::Unknown {
                    payload: "DeadBeef1".to_string()
                }
            );
        }
    }

    #[test]
    fn described_id_without_decoder_passes_through() {
        let (description, decoded) = dispatch(0x07, "0102");
        assert_eq!(description, "Tablet?");
        assert!(matches!(decoded, DecodedRegister::Unknown { .. }));
    }

    #[test]
    fn short_payload_is_incomplete() {
        let (_, decoded) = dispatch(0x03, "010203");
        assert_eq!(
            decoded,
            DecodedRegister::Incomplete {
                needed: 7,
                actual: 3
            }
        );
    }

    #[test]
    fn code_round_trips() {
        for code in 0..=u8::MAX {
            assert_eq!(Register::from_code(code).code(), code);
        }
    }

    #[test]
    fn decoded_serialises_with_kind_tag() {
        let (_, decoded) = dispatch(0x0a, "aabbcc0000");
        let value = serde_json::to_value(&decoded).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "kind": "set_uid", "uid": "aabbcc", "additional": "0000" })
        );
        let back: DecodedRegister = serde_json::from_value(value).unwrap();
        assert_eq!(back, decoded);
    }
}
