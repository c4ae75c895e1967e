use thiserror::Error;

/// Why a message body or one of its records produced no decoded record.
///
/// None of these end a session: an unrecognized command drops its body, the
/// other variants drop a single record token.
///
/// # Examples
/// ```
/// use aabus_core::EnvelopeError;
///
/// let err = EnvelopeError::IncompleteRecord {
///     token: "0103".to_string(),
///     needed: 14,
///     actual: 4,
/// };
/// assert_eq!(err.kind(), "incomplete-record");
/// assert!(err.to_string().contains("need 14"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    #[error("unrecognized command '{command}'")]
    UnrecognizedCommand { command: String },
    #[error("incomplete record '{token}': need {needed} hex digits, got {actual}")]
    IncompleteRecord {
        token: String,
        needed: usize,
        actual: usize,
    },
    #[error("malformed hex in record '{token}' at offset {offset}")]
    MalformedHex { token: String, offset: usize },
}

impl EnvelopeError {
    /// Stable identifier used in reports and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            EnvelopeError::UnrecognizedCommand { .. } => "unrecognized-command",
            EnvelopeError::IncompleteRecord { .. } => "incomplete-record",
            EnvelopeError::MalformedHex { .. } => "malformed-hex",
        }
    }
}
