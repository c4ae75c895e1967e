//! Static code → label tables used by the envelope and register decoders.
//!
//! Every table is a closed enum with an `Unknown(code)` arm, so a code the
//! bus sends that is not listed here still round-trips with its raw value.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! code_table {
    (
        $(#[$meta:meta])*
        pub enum $name:ident, unknown = $unknown:literal {
            $($variant:ident = $code:literal => $label:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant,)+
            Unknown(u8),
        }

        impl $name {
            pub fn from_code(code: u8) -> Self {
                match code {
                    $($code => Self::$variant,)+
                    other => Self::Unknown(other),
                }
            }

            pub fn code(self) -> u8 {
                match self {
                    $(Self::$variant => $code,)+
                    Self::Unknown(code) => code,
                }
            }

            /// Table label, `None` for codes outside the table.
            pub fn label(self) -> Option<&'static str> {
                match self {
                    $(Self::$variant => Some($label),)+
                    Self::Unknown(_) => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.label() {
                    Some(label) => f.write_str(label),
                    None => write!(f, $unknown, self.code()),
                }
            }
        }
    };
}

code_table! {
    /// Who sent (or is addressed by) a CAN record.
    pub enum OriginDest, unknown = "{:02x}" {
        Tablet = 0x01 => "Tablet",
        ControlBox = 0x03 => "CB",
    }
}

code_table! {
    /// Air-conditioner manufacturer reported by the unit type register.
    pub enum Vendor, unknown = "Unknown(0x{:02X})" {
        Daikin = 0x11 => "Daikin",
        Panasonic = 0x12 => "Panasonic",
        Fujitsu = 0x13 => "Fujitsu",
        SamsungDvm = 0x19 => "Samsung DVM",
    }
}

code_table! {
    pub enum ActivationStatus, unknown = "Unknown({})" {
        NoCode = 0 => "No Code",
        Expired = 1 => "Expired",
        CodeEnabled = 2 => "Code Enabled",
    }
}

code_table! {
    /// Temperature sensor fitted to a zone.
    pub enum SensorType, unknown = "Unknown({})" {
        NoSensor = 0 => "No Sensor",
        Rf = 1 => "RF",
        Wired = 2 => "Wired",
        Rf2CanBooster = 3 => "RF2CAN Booster",
        RfX = 4 => "RF_X",
    }
}

code_table! {
    pub enum Mode, unknown = "Unknown({})" {
        Cool = 1 => "Cool",
        Heat = 2 => "Heat",
        Vent = 3 => "Vent",
        Auto = 4 => "Auto",
        Dry = 5 => "Dry",
        MyAuto = 6 => "MyAuto",
    }
}

code_table! {
    pub enum FanSpeed, unknown = "Unknown({})" {
        Off = 0 => "Off",
        Low = 1 => "Low",
        Medium = 2 => "Medium",
        High = 3 => "High",
        Auto = 4 => "Auto",
        AutoAa = 5 => "AutoAA",
    }
}

/// On/off flag where only `0x01` means on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    pub fn from_flag(flag: u8) -> Self {
        if flag == 0x01 { Switch::On } else { Switch::Off }
    }
}

impl fmt::Display for Switch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Switch::On => "On",
            Switch::Off => "Off",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_map_to_labels() {
        assert_eq!(Vendor::from_code(0x19).to_string(), "Samsung DVM");
        assert_eq!(ActivationStatus::from_code(2).to_string(), "Code Enabled");
        assert_eq!(SensorType::from_code(3).to_string(), "RF2CAN Booster");
        assert_eq!(Mode::from_code(6), Mode::MyAuto);
        assert_eq!(FanSpeed::from_code(5).to_string(), "AutoAA");
        assert_eq!(OriginDest::from_code(0x03).to_string(), "CB");
    }

    #[test]
    fn unmapped_codes_keep_raw_value() {
        assert_eq!(Vendor::from_code(0x2a), Vendor::Unknown(0x2a));
        assert_eq!(Vendor::from_code(0x2a).to_string(), "Unknown(0x2A)");
        assert_eq!(ActivationStatus::from_code(9).to_string(), "Unknown(9)");
        assert_eq!(SensorType::from_code(200).to_string(), "Unknown(200)");
        assert_eq!(Mode::from_code(0).to_string(), "Unknown(0)");
        assert_eq!(FanSpeed::from_code(6).to_string(), "Unknown(6)");
        assert_eq!(OriginDest::from_code(0x05).to_string(), "05");
    }

    #[test]
    fn code_round_trips_for_every_byte() {
        for code in 0..=u8::MAX {
            assert_eq!(Mode::from_code(code).code(), code);
            assert_eq!(Vendor::from_code(code).code(), code);
        }
    }

    #[test]
    fn switch_only_treats_one_as_on() {
        assert_eq!(Switch::from_flag(0x01), Switch::On);
        assert_eq!(Switch::from_flag(0x00), Switch::Off);
        assert_eq!(Switch::from_flag(0x02), Switch::Off);
    }

    #[test]
    fn unknown_serialises_with_code() {
        let value = serde_json::to_value(FanSpeed::Unknown(9)).unwrap();
        assert_eq!(value, serde_json::json!({ "Unknown": 9 }));
    }
}
