//! Chat command handling.
//!
//! [`CommandRegistry`] maps `!`-command tokens to what they do;
//! [`Dispatcher`] turns a parsed [`ChatEvent`](nuit_proto::ChatEvent) into
//! the [`Action`]s the orchestrator should carry out.

mod dispatch;
mod registry;

pub use dispatch::{Action, Dispatcher};
pub use registry::{CommandEntry, CommandRegistry};
