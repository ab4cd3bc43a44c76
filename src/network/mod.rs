//! Network module.
//!
//! Contains the websocket [`Link`], per-socket [`RetryPolicy`] and the
//! [`Supervisor`] that ties them into a connect / retry / close lifecycle.

mod link;
mod retry;
mod supervisor;

#[cfg(test)]
pub(crate) mod test_support;

pub use link::{Link, WsStream};
pub use retry::RetryPolicy;
pub use supervisor::{ConnectHook, ConnectOutcome, ConnectionState, Readiness, Supervisor};
