//! # nuit-proto
//!
//! Wire formats spoken by nuitbot:
//!
//! - the chat feed: inbound `PRIVMSG` lines parsed into [`ChatEvent`]s and
//!   outbound [`ChatCommand`]s rendered to single lines
//! - the control plane: JSON opcode envelopes and the challenge/response
//!   [`authenticate`](control::authenticate) transform
//!
//! Nothing here touches a socket.
//!
//! ## Parsing chat lines
//!
//! ```rust
//! use nuit_proto::{parse, ChatCommand};
//!
//! let line = "@display-name=Foo :foo!foo@foo.tmi.twitch.tv PRIVMSG #chan :!discord";
//! let event = parse(line).expect("valid PRIVMSG");
//! assert_eq!(event.display_name(), "Foo");
//! assert_eq!(event.channel(), "chan");
//!
//! let reply = ChatCommand::Privmsg(event.channel().to_owned(), "hi".to_owned());
//! assert_eq!(reply.to_string(), "PRIVMSG #chan :hi");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod command;
pub mod control;
pub mod error;
pub mod event;

pub use self::command::ChatCommand;
pub use self::control::{authenticate, KeyModifiers, KeySequence};
pub use self::error::{ControlError, ParseError};
pub use self::event::{parse, ChatEvent, DISPLAY_NAME_TAG};
