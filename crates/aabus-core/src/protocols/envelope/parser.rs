use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::EnvelopeError;
use super::layout;
use super::reader::RecordReader;
use crate::protocols::common::hex::HexByte;
use crate::protocols::common::tables::OriginDest;
use crate::protocols::registers::{DecodedRegister, dispatch};

/// Message kinds carried by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    #[serde(rename = "setCAN")]
    SetCan,
    #[serde(rename = "getCAN")]
    GetCan,
    #[serde(rename = "ackCAN")]
    AckCan,
}

impl CommandKind {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            layout::SET_CAN => Some(CommandKind::SetCan),
            layout::GET_CAN => Some(CommandKind::GetCan),
            layout::ACK_CAN => Some(CommandKind::AckCan),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CommandKind::SetCan => layout::SET_CAN,
            CommandKind::GetCan => layout::GET_CAN,
            CommandKind::AckCan => layout::ACK_CAN,
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded CAN record, the unit of output of the pipeline.
///
/// # Examples
/// ```
/// use aabus_core::{CommandKind, parse_record};
///
/// let record = parse_record(CommandKind::GetCan, "0103031200501010205010100").unwrap();
/// assert_eq!(record.unit_id, "03120");
/// assert_eq!(record.origin.to_string(), "CB");
/// assert_eq!(record.description, "Sys Status");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedRecord {
    pub command: CommandKind,
    pub unit_type: HexByte,
    pub origin_dest: HexByte,
    pub origin: OriginDest,
    pub unit_id: String,
    pub register_id: HexByte,
    pub description: String,
    pub decoded: DecodedRegister,
}

/// A framed message body split into its command and records.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub command: CommandKind,
    /// One entry per record token, keepalive tokens excluded, in body order.
    pub records: Vec<Result<ParsedRecord, EnvelopeError>>,
}

/// Parse one frame body.
///
/// Returns `Ok(None)` for bodies that carry nothing to decode (blank or
/// `Ping`). An unrecognized command rejects the whole body; record-level
/// problems are reported per token inside [`Message::records`].
pub fn parse_message(body: &[u8]) -> Result<Option<Message>, EnvelopeError> {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() || text.starts_with(layout::PING_BODY) {
        return Ok(None);
    }

    let mut tokens = text.split_whitespace();
    let Some(first) = tokens.next() else {
        return Ok(None);
    };
    let command = CommandKind::from_token(first).ok_or_else(|| {
        EnvelopeError::UnrecognizedCommand {
            command: first.to_string(),
        }
    })?;

    let records = tokens
        .filter(|token| *token != layout::KEEPALIVE_TOKEN)
        .map(|token| parse_record(command, token))
        .collect();

    Ok(Some(Message { command, records }))
}

/// Split one record token into its fields and decode the payload.
pub fn parse_record(command: CommandKind, token: &str) -> Result<ParsedRecord, EnvelopeError> {
    let reader = RecordReader::new(token);
    reader.validate()?;

    let origin_dest = reader.read_u8(layout::ORIGIN_DEST_RANGE)?;
    let register_id = reader.read_u8(layout::REGISTER_ID_RANGE)?;
    let (description, decoded) = dispatch(register_id, reader.payload());

    Ok(ParsedRecord {
        command,
        unit_type: HexByte(reader.read_u8(layout::UNIT_TYPE_RANGE)?),
        origin_dest: HexByte(origin_dest),
        origin: OriginDest::from_code(origin_dest),
        unit_id: reader.read_str(layout::UNIT_ID_RANGE)?.to_string(),
        register_id: HexByte(register_id),
        description: description.to_string(),
        decoded,
    })
}
