//! Error types for the chat and control-plane protocols.

use thiserror::Error;

/// Why a raw chat line could not be turned into a [`ChatEvent`](crate::ChatEvent).
///
/// Every variant is recoverable: the caller logs the line and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// A `@tags` block with no space separating it from the rest of the line.
    #[error("malformed tag block")]
    MalformedTags,

    /// The line carries no ` PRIVMSG ` token.
    #[error("not a PRIVMSG line")]
    NotPrivmsg,

    /// The part before ` PRIVMSG ` does not start with `:`.
    #[error("missing sender prefix")]
    MissingPrefix,

    /// The part after ` PRIVMSG ` has no ` :` separating channel and text.
    #[error("missing channel or message separator")]
    MissingChannel,
}

impl ParseError {
    /// Static label for log fields.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MalformedTags => "malformed_tags",
            Self::NotPrivmsg => "not_privmsg",
            Self::MissingPrefix => "missing_prefix",
            Self::MissingChannel => "missing_channel",
        }
    }
}

/// Control-plane (JSON-over-websocket) protocol errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ControlError {
    /// The payload was not valid JSON or did not match the expected shape.
    #[error("invalid control message: {0}")]
    Json(#[from] serde_json::Error),

    /// The peer answered with a different opcode than the exchange requires.
    #[error("expected opcode {expected}, got {got}")]
    UnexpectedOpcode {
        /// Opcode the exchange was waiting for.
        expected: u8,
        /// Opcode actually received.
        got: u8,
    },

    /// A required field was absent from the payload.
    #[error("missing field: {0}")]
    MissingField(&'static str),
}
