//! Control-plane protocol: JSON envelopes over a websocket.
//!
//! The exchange is fixed:
//!
//! 1. server sends [`Hello`] (opcode 0) with a `challenge` and `salt`
//! 2. client answers with [`Identify`] (opcode 1) carrying [`authenticate`]'s output
//! 3. server confirms with opcode 2; anything else means authentication failed
//!
//! After that the client may send [`Request`]s (opcode 6); each is answered
//! by a [`RequestResponse`] (opcode 7) echoing its `requestId`.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::ControlError;

/// Opcode of the server greeting.
pub const OP_HELLO: u8 = 0;
/// Opcode of the client identification.
pub const OP_IDENTIFY: u8 = 1;
/// Opcode of the server's successful-identification acknowledgement.
pub const OP_IDENTIFIED: u8 = 2;
/// Opcode of a client request.
pub const OP_REQUEST: u8 = 6;
/// Opcode of the server's answer to a request.
pub const OP_REQUEST_RESPONSE: u8 = 7;

/// Request type used to press a key combination on the remote side.
pub const TRIGGER_HOTKEY_BY_KEY_SEQUENCE: &str = "TriggerHotkeyByKeySequence";

/// Compute the authentication string for a challenge.
///
/// `base64(sha256(base64(sha256(secret + salt)) + challenge))`, with every
/// concatenation performed on the raw strings.
pub fn authenticate(secret: &str, challenge: &str, salt: &str) -> String {
    let secret_hash = BASE64.encode(sha256(format!("{secret}{salt}").as_bytes()));
    BASE64.encode(sha256(format!("{secret_hash}{challenge}").as_bytes()))
}

fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Outer `{op, d}` envelope shared by every message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Message opcode.
    pub op: u8,
    /// Opcode-specific payload.
    #[serde(default)]
    pub d: Value,
}

impl Envelope {
    /// Decode any envelope from text.
    pub fn decode(text: &str) -> Result<Self, ControlError> {
        Ok(serde_json::from_str(text)?)
    }

    fn expect(self, expected: u8) -> Result<Value, ControlError> {
        if self.op == expected {
            Ok(self.d)
        } else {
            Err(ControlError::UnexpectedOpcode {
                expected,
                got: self.op,
            })
        }
    }
}

/// Challenge and salt offered by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthChallenge {
    /// Per-connection challenge.
    pub challenge: String,
    /// Per-password salt.
    pub salt: String,
}

/// Opcode 0 greeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hello {
    /// Protocol revision the server speaks.
    pub rpc_version: u32,
    /// Absent when the server has authentication disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<AuthChallenge>,
}

impl Hello {
    /// Decode a hello, rejecting any other opcode.
    pub fn decode(text: &str) -> Result<Self, ControlError> {
        let d = Envelope::decode(text)?.expect(OP_HELLO)?;
        Ok(serde_json::from_value(d)?)
    }
}

/// Opcode 1 identification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identify {
    /// Echo of the hello's `rpcVersion`.
    pub rpc_version: u32,
    /// Output of [`authenticate`], omitted when the server asked for none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<String>,
}

impl Identify {
    /// Answer a hello using `secret`.
    pub fn answer(hello: &Hello, secret: &str) -> Self {
        Self {
            rpc_version: hello.rpc_version,
            authentication: hello
                .authentication
                .as_ref()
                .map(|auth| authenticate(secret, &auth.challenge, &auth.salt)),
        }
    }

    /// Encode as an opcode 1 envelope.
    pub fn encode(&self) -> Result<String, ControlError> {
        encode(OP_IDENTIFY, self)
    }
}

/// Opcode 2 acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identified {
    /// Revision both sides agreed on.
    #[serde(default)]
    pub negotiated_rpc_version: u32,
}

impl Identified {
    /// Decode an acknowledgement. Any other opcode is an authentication failure.
    pub fn decode(text: &str) -> Result<Self, ControlError> {
        let d = Envelope::decode(text)?.expect(OP_IDENTIFIED)?;
        Ok(serde_json::from_value(d)?)
    }
}

/// Opcode 6 request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Name of the remote operation.
    pub request_type: String,
    /// Fresh identifier per request.
    pub request_id: String,
    /// Operation arguments.
    pub request_data: Value,
}

impl Request {
    /// Build a request with a new random identifier.
    pub fn new(request_type: impl Into<String>, request_data: Value) -> Self {
        Self {
            request_type: request_type.into(),
            request_id: Uuid::new_v4().to_string(),
            request_data,
        }
    }

    /// Build a hotkey request for a key combination.
    pub fn trigger_hotkey(sequence: &KeySequence) -> Result<Self, ControlError> {
        Ok(Self::new(
            TRIGGER_HOTKEY_BY_KEY_SEQUENCE,
            serde_json::to_value(sequence)?,
        ))
    }

    /// Encode as an opcode 6 envelope.
    pub fn encode(&self) -> Result<String, ControlError> {
        encode(OP_REQUEST, self)
    }
}

/// Opcode 7 answer to a [`Request`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestResponse {
    /// Identifier of the request this answers.
    pub request_id: String,
    /// Outcome reported by the server.
    #[serde(default)]
    pub request_status: RequestStatus,
}

/// `requestStatus` block of a [`RequestResponse`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestStatus {
    /// Whether the request succeeded.
    #[serde(default)]
    pub result: bool,
    /// Server status code.
    #[serde(default)]
    pub code: u32,
}

impl RequestResponse {
    /// Decode a response. Other opcodes (events, for instance) are
    /// [`ControlError::UnexpectedOpcode`].
    pub fn decode(text: &str) -> Result<Self, ControlError> {
        let d = Envelope::decode(text)?.expect(OP_REQUEST_RESPONSE)?;
        Ok(serde_json::from_value(d)?)
    }

    /// Whether this answers `request`.
    pub fn answers(&self, request: &Request) -> bool {
        self.request_id == request.request_id
    }
}

/// Key combination pressed by [`TRIGGER_HOTKEY_BY_KEY_SEQUENCE`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeySequence {
    /// Key identifier, e.g. `OBS_KEY_SCROLLLOCK`.
    pub key_id: String,
    /// Modifier keys held while pressing.
    pub key_modifiers: KeyModifiers,
}

/// Modifier flags for a [`KeySequence`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyModifiers {
    /// Shift key.
    #[serde(default)]
    pub shift: bool,
    /// Control key.
    #[serde(default)]
    pub control: bool,
    /// Alt key.
    #[serde(default)]
    pub alt: bool,
    /// Command / super key.
    #[serde(default)]
    pub command: bool,
}

fn encode<T: Serialize>(op: u8, payload: &T) -> Result<String, ControlError> {
    let envelope = Envelope {
        op,
        d: serde_json::to_value(payload)?,
    };
    Ok(serde_json::to_string(&envelope)?)
}
