//! Record presentation for `monitor` and `replay`.

use aabus_core::{DecodedRegister, ParsedRecord};
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// One JSON line: the record, stamped with the time it was printed.
#[derive(Debug, Serialize)]
struct JsonLine<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    time: Option<String>,
    #[serde(flatten)]
    record: &'a ParsedRecord,
}

/// `<command> unit:<id> from:<origin> register:<id>:<description> <fields>`
pub fn text_line(record: &ParsedRecord) -> String {
    let mut line = format!(
        "{} unit:{} from:{} register:{}:{}",
        record.command, record.unit_id, record.origin, record.register_id, record.description
    );
    let fields = fields(&record.decoded);
    if !fields.is_empty() {
        line.push(' ');
        line.push_str(&fields);
    }
    line
}

pub fn json_line(record: &ParsedRecord, stamped: bool) -> serde_json::Result<String> {
    let time = if stamped { now_rfc3339() } else { None };
    serde_json::to_string(&JsonLine { time, record })
}

fn now_rfc3339() -> Option<String> {
    OffsetDateTime::now_utc().format(&Rfc3339).ok()
}

fn fields(decoded: &DecodedRegister) -> String {
    match decoded {
        DecodedRegister::ZoneConfig(cfg) => format!(
            "zones:{} constant:{} constant_zones:{:02x}{:02x}{:02x} filter:{}",
            cfg.zone_count,
            cfg.constant_zone_count,
            cfg.constant_zones[0],
            cfg.constant_zones[1],
            cfg.constant_zones[2],
            cfg.filter_status
        ),
        DecodedRegister::UnitType(unit) => {
            format!("vendor:{} activation:{}", unit.vendor, unit.activation)
        }
        DecodedRegister::ZoneState(zone) => format!(
            "zone:{} open:{} percent:{} sensor:{} set:{}°C measured:{}",
            zone.zone,
            zone.open,
            zone.percent,
            zone.sensor,
            zone.set_temperature,
            zone.measured_temperature
        ),
        DecodedRegister::ZoneConfigExtended(cfg) => format!(
            "zone:{} min:{} max:{} motion:{} motion_config:{} motion_error:{} signal:{}",
            cfg.zone,
            cfg.min_damper,
            cfg.max_damper,
            cfg.motion_status,
            cfg.motion_config,
            cfg.motion_zone_error,
            cfg.signal_strength
        ),
        DecodedRegister::SystemStatus(status) => format!(
            "power:{} mode:{} fan:{} set:{}°C myzone:{} fresh_air:{}",
            status.power,
            status.mode,
            status.fan,
            status.set_temperature,
            status.my_zone,
            status.fresh_air
        ),
        DecodedRegister::FirmwareStatus(fw) => format!(
            "firmware:{}.{} cb_type:{} rf_firmware:{}",
            fw.major, fw.minor, fw.control_box_type, fw.rf_major
        ),
        DecodedRegister::AirconError(err) => format!("code:{} {}", err.code, err.description),
        DecodedRegister::SetUid(uid) => {
            if uid.additional.is_empty() {
                format!("uid:{}", uid.uid)
            } else {
                format!("uid:{} additional:{}", uid.uid, uid.additional)
            }
        }
        DecodedRegister::Unknown { payload } => format!("payload:{payload}"),
        DecodedRegister::Incomplete { needed, actual } => {
            format!("incomplete: need {needed} bytes, got {actual}")
        }
    }
}

#[cfg(test)]
mod tests {
    use aabus_core::{CommandKind, parse_record};

    use super::{json_line, text_line};

    #[test]
    fn system_status_line() {
        let record = parse_record(CommandKind::GetCan, "0103031200501010205010100").unwrap();
        assert_eq!(
            text_line(&record),
            "getCAN unit:03120 from:CB register:05:Sys Status \
             power:On mode:Cool fan:Medium set:2.5°C myzone:01 fresh_air:On"
        );
    }

    #[test]
    fn zone_state_line() {
        let record = parse_record(CommandKind::GetCan, "010303120030185022b150500").unwrap();
        assert_eq!(
            text_line(&record),
            "getCAN unit:03120 from:CB register:03:Zone State \
             zone:1 open:true percent:5 sensor:Wired set:21.5°C measured:21.5°C"
        );
    }

    #[test]
    fn unknown_register_shows_payload() {
        let record = parse_record(CommandKind::AckCan, "0109aabbc9900ff").unwrap();
        assert_eq!(
            text_line(&record),
            "ackCAN unit:aabbc from:09 register:99:Unknown payload:00ff"
        );
    }

    #[test]
    fn short_payload_is_marked() {
        let record = parse_record(CommandKind::GetCan, "01030312001010203").unwrap();
        assert!(text_line(&record).ends_with("incomplete: need 7 bytes, got 3"));
    }

    #[test]
    fn json_line_flattens_record() {
        let record = parse_record(CommandKind::SetCan, "0101aabbc0aaabbcc0000").unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&json_line(&record, false).unwrap()).unwrap();
        assert!(value.get("time").is_none());
        assert_eq!(value["command"], "setCAN");
        assert_eq!(value["decoded"]["uid"], "aabbcc");

        let stamped: serde_json::Value =
            serde_json::from_str(&json_line(&record, true).unwrap()).unwrap();
        assert!(stamped["time"].is_string());
    }
}
