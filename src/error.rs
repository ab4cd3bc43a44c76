//! Unified error handling for nuitbot.
//!
//! Every failure the run loop can see is a [`BotError`]. Only two are fatal:
//! running out of primary re-joins and invalid startup configuration (which
//! never reaches the loop). Everything else is logged where it happens.

use nuit_proto::ControlError;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Errors surfaced by connection supervision, the control plane and actions.
#[derive(Debug, Error)]
pub enum BotError {
    /// Peer unreachable or refused the websocket upgrade.
    #[error("failed to connect to {target}: {source}")]
    Connect {
        target: String,
        #[source]
        source: tungstenite::Error,
    },

    /// A supervisor ran out of connect attempts.
    #[error("{target} unavailable after {attempts} attempts")]
    Unavailable { target: String, attempts: u32 },

    /// The link is disabled or not currently open.
    #[error("{0} is not connected")]
    NotConnected(&'static str),

    /// Control-plane authentication was rejected or malformed.
    #[error("control-plane handshake failed: {0}")]
    Handshake(#[from] ControlError),

    /// A write to a socket failed.
    #[error("send failed: {0}")]
    Send(#[source] tungstenite::Error),

    /// A read from a socket failed.
    #[error("receive failed: {0}")]
    Receive(#[source] tungstenite::Error),

    /// The peer closed the connection.
    #[error("connection closed by peer")]
    Closed,

    /// The peer did not answer in time.
    #[error("timed out waiting for {0}")]
    Timeout(&'static str),

    /// An external process or artifact write failed.
    #[error("external action `{action}` failed: {reason}")]
    ExternalAction { action: String, reason: String },

    /// A connect was abandoned because shutdown was requested.
    #[error("shutdown in progress")]
    ShuttingDown,

    /// The primary chat connection could not be re-joined.
    #[error("giving up after {0} re-join attempts")]
    RejoinsExhausted(u32),
}

impl BotError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Connect { .. } => "connect_error",
            Self::Unavailable { .. } => "unavailable",
            Self::NotConnected(_) => "not_connected",
            Self::Handshake(_) => "handshake_error",
            Self::Send(_) => "send_error",
            Self::Receive(_) => "receive_error",
            Self::Closed => "closed",
            Self::Timeout(_) => "timeout",
            Self::ExternalAction { .. } => "external_action_error",
            Self::ShuttingDown => "shutting_down",
            Self::RejoinsExhausted(_) => "rejoins_exhausted",
        }
    }

    /// Whether this error means the underlying socket is gone.
    pub fn is_disconnect(&self) -> bool {
        matches!(
            self,
            Self::Send(_) | Self::Receive(_) | Self::Closed | Self::NotConnected(_)
        )
    }

    pub(crate) fn external(action: impl Into<String>, reason: impl ToString) -> Self {
        Self::ExternalAction {
            action: action.into(),
            reason: reason.to_string(),
        }
    }
}
