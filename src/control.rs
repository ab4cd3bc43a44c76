//! Control-plane session.
//!
//! Drives the hello / identify / identified exchange on every fresh
//! control-plane socket (as a [`ConnectHook`]) and sends remote hotkey
//! requests once identified.

use crate::error::BotError;
use crate::network::{ConnectHook, ConnectOutcome, Link, Readiness, Supervisor};
use async_trait::async_trait;
use nuit_proto::control::{Hello, Identified, Identify, Request, RequestResponse};
use nuit_proto::{ControlError, KeySequence};
use std::time::Duration;
use tokio::time::{Instant, timeout, timeout_at};
use tracing::{debug, info, warn};

/// Where the identify exchange stands on one socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    /// Waiting for the opcode 0 greeting.
    AwaitingHello,
    /// Identify sent, waiting for opcode 2.
    Identifying,
    /// Server acknowledged; requests may be sent.
    Identified,
    /// Server answered with something other than the expected message.
    Rejected,
}

/// Pure state machine for the identify exchange.
pub struct HandshakeMachine<'a> {
    state: HandshakeState,
    secret: &'a str,
}

impl<'a> HandshakeMachine<'a> {
    pub fn new(secret: &'a str) -> Self {
        Self {
            state: HandshakeState::AwaitingHello,
            secret,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> HandshakeState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        matches!(
            self.state,
            HandshakeState::Identified | HandshakeState::Rejected
        )
    }

    /// Name of the message the machine is waiting for.
    pub fn awaiting(&self) -> &'static str {
        match self.state {
            HandshakeState::AwaitingHello => "control hello",
            _ => "control identified",
        }
    }

    /// Feed one inbound frame; returns the frame to send back, if any.
    ///
    /// Frames arriving after the exchange finished are ignored.
    pub fn step(&mut self, text: &str) -> Result<Option<String>, ControlError> {
        match self.state {
            HandshakeState::AwaitingHello => {
                let reply = Hello::decode(text)
                    .and_then(|hello| Identify::answer(&hello, self.secret).encode())
                    .inspect_err(|_| self.state = HandshakeState::Rejected)?;
                self.state = HandshakeState::Identifying;
                Ok(Some(reply))
            }
            HandshakeState::Identifying => {
                let identified =
                    Identified::decode(text).inspect_err(|_| self.state = HandshakeState::Rejected)?;
                debug!(
                    rpc_version = identified.negotiated_rpc_version,
                    "Control plane identified"
                );
                self.state = HandshakeState::Identified;
                Ok(None)
            }
            HandshakeState::Identified | HandshakeState::Rejected => Ok(None),
        }
    }
}

/// Run the identify exchange on a freshly opened socket.
///
/// A rejected or malformed exchange is [`BotError::Handshake`]; transport
/// failures and silence longer than `wait` per message are returned as-is.
pub async fn identify(link: &mut Link, secret: &str, wait: Duration) -> Result<(), BotError> {
    let mut machine = HandshakeMachine::new(secret);
    while !machine.is_finished() {
        let text = timeout(wait, link.recv_text())
            .await
            .map_err(|_| BotError::Timeout(machine.awaiting()))??;
        if let Some(reply) = machine.step(&text)? {
            link.send_text(reply).await?;
        }
    }
    Ok(())
}

/// [`ConnectHook`] that authenticates every control-plane socket.
///
/// Rejection is reported as [`Readiness::Degraded`] rather than an error so
/// the supervisor does not keep redialling a peer that answers but refuses
/// our secret.
pub struct ControlHandshake {
    secret: String,
    wait: Duration,
}

impl ControlHandshake {
    pub fn new(secret: impl Into<String>, wait: Duration) -> Self {
        Self {
            secret: secret.into(),
            wait,
        }
    }
}

#[async_trait]
impl ConnectHook for ControlHandshake {
    async fn on_connect(&self, outcome: ConnectOutcome<'_>) -> Result<Readiness, BotError> {
        match outcome {
            ConnectOutcome::Connected(link) => match identify(link, &self.secret, self.wait).await {
                Ok(()) => {
                    info!("Control plane authenticated");
                    Ok(Readiness::Ready)
                }
                Err(BotError::Handshake(e)) => {
                    warn!(error = %e, "Control plane rejected identification, remote hotkeys disabled");
                    Ok(Readiness::Degraded)
                }
                Err(e) => Err(e),
            },
            ConnectOutcome::Failed(e) => {
                warn!(code = e.error_code(), error = %e, "Control plane unavailable");
                Ok(Readiness::Degraded)
            }
        }
    }
}

/// Press `sequence` on the remote side.
///
/// Waits up to `wait` for the response carrying this request's id. Late
/// answers to earlier requests and unsolicited events are skipped.
pub async fn trigger_hotkey(
    control: &mut Supervisor,
    sequence: &KeySequence,
    wait: Duration,
) -> Result<(), BotError> {
    let request = Request::trigger_hotkey(sequence)?;
    control.send_text(request.encode()?).await?;

    let deadline = Instant::now() + wait;
    loop {
        let text = timeout_at(deadline, control.recv_text())
            .await
            .map_err(|_| BotError::Timeout("hotkey response"))??;
        match RequestResponse::decode(&text) {
            Ok(response) if response.answers(&request) => {
                debug!(
                    request_id = %request.request_id,
                    result = response.request_status.result,
                    code = response.request_status.code,
                    "Hotkey acknowledged"
                );
                return Ok(());
            }
            Ok(response) => debug!(request_id = %response.request_id, "Skipping stale response"),
            Err(e) => debug!(error = %e, "Skipping unrelated control message"),
        }
    }
}
