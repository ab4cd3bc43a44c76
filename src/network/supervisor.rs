//! Connection supervision: one socket's connect / retry / close lifecycle.
//!
//! ```text
//! Disconnected --attempt--> Connecting --success--> Open
//!      ^                        |                     |
//!      +-------- failure -------+        peer close / local close
//!      +------------------------- Closing <-----------+
//! ```
//!
//! A [`ConnectHook`] runs on every fresh socket before the supervisor
//! reports it open. A hook error counts as a failed attempt; a hook may also
//! accept the socket in a [`Readiness::Degraded`] state.

use super::link::Link;
use super::retry::RetryPolicy;
use crate::error::BotError;
use crate::shutdown::RunState;
use crate::telemetry::spans;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{Instrument, debug, error, info, warn};

/// Upper bound on a best-effort close handshake.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// How often a backoff sleep checks for shutdown.
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

/// Lifecycle state of a supervised socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Open,
    Closing,
}

/// How usable an open socket is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Fully usable.
    Ready,
    /// Transport works but the post-connect exchange did not succeed.
    Degraded,
}

/// Outcome passed to a [`ConnectHook`].
pub enum ConnectOutcome<'a> {
    /// A socket just opened; the hook may talk on it before it is reported.
    Connected(&'a mut Link),
    /// The attempt budget is spent; this was the last error.
    Failed(&'a BotError),
}

/// Post-connect callback run by a [`Supervisor`].
#[async_trait]
pub trait ConnectHook: Send + Sync {
    /// For [`ConnectOutcome::Failed`] the return value is ignored.
    async fn on_connect(&self, outcome: ConnectOutcome<'_>) -> Result<Readiness, BotError>;
}

/// Owns one websocket target and its retry policy.
pub struct Supervisor {
    name: &'static str,
    url: Option<String>,
    state: ConnectionState,
    readiness: Readiness,
    retry: RetryPolicy,
    link: Option<Link>,
    hook: Option<Box<dyn ConnectHook>>,
    run: Option<RunState>,
}

impl Supervisor {
    pub fn new(name: &'static str, url: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            name,
            url: Some(url.into()),
            state: ConnectionState::Disconnected,
            readiness: Readiness::Ready,
            retry,
            link: None,
            hook: None,
            run: None,
        }
    }

    /// A supervisor that never dials; every operation reports `NotConnected`.
    pub fn disabled(name: &'static str) -> Self {
        Self {
            url: None,
            ..Self::new(name, String::new(), RetryPolicy::new(0, Duration::ZERO))
        }
    }

    pub fn with_hook(mut self, hook: impl ConnectHook + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    /// Abandon backoff sleeps once `run` clears.
    pub fn with_run_state(mut self, run: RunState) -> Self {
        self.run = Some(run);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_enabled(&self) -> bool {
        self.url.is_some()
    }

    #[cfg(test)]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    #[cfg(test)]
    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    #[cfg(test)]
    pub fn is_closed(&self) -> bool {
        matches!(
            self.state,
            ConnectionState::Disconnected | ConnectionState::Closing
        )
    }

    /// Open and fully ready.
    pub fn is_usable(&self) -> bool {
        self.is_open() && self.readiness == Readiness::Ready
    }

    /// Return the open link, connecting (with retries) if necessary.
    pub async fn ensure_connected(&mut self) -> Result<&mut Link, BotError> {
        let Some(url) = self.url.clone() else {
            return Err(BotError::NotConnected(self.name));
        };

        if !(self.is_open() && self.link.is_some()) {
            let span = spans::link(self.name, &url);
            self.connect_with_retry(&url).instrument(span).await?;
        }

        self.link.as_mut().ok_or(BotError::NotConnected(self.name))
    }

    /// Close any current socket, then connect from scratch.
    pub async fn reconnect(&mut self) -> Result<&mut Link, BotError> {
        self.close().await;
        self.ensure_connected().await
    }

    async fn connect_with_retry(&mut self, url: &str) -> Result<(), BotError> {
        loop {
            self.state = ConnectionState::Connecting;
            match Self::attempt(url, self.hook.as_deref()).await {
                Ok((link, readiness)) => {
                    self.retry.reset();
                    self.link = Some(link);
                    self.readiness = readiness;
                    self.state = ConnectionState::Open;
                    info!(?readiness, "Connected");
                    return Ok(());
                }
                Err(e) => {
                    self.state = ConnectionState::Disconnected;
                    match self.retry.record_failure() {
                        Some(delay) => {
                            warn!(
                                attempt = self.retry.attempt(),
                                max_attempts = self.retry.max_attempts(),
                                delay_ms = delay.as_millis() as u64,
                                code = e.error_code(),
                                error = %e,
                                "Connection failed, retrying"
                            );
                            let keep_going = match &self.run {
                                Some(run) => run.sleep(delay, SHUTDOWN_POLL).await,
                                None => {
                                    tokio::time::sleep(delay).await;
                                    true
                                }
                            };
                            if !keep_going {
                                info!("Shutdown requested, abandoning connect");
                                return Err(BotError::ShuttingDown);
                            }
                        }
                        None => {
                            error!(
                                attempts = self.retry.attempt(),
                                code = e.error_code(),
                                error = %e,
                                "Connection failed, giving up"
                            );
                            if let Some(hook) = &self.hook {
                                let _ = hook.on_connect(ConnectOutcome::Failed(&e)).await;
                            }
                            return Err(BotError::Unavailable {
                                target: url.to_string(),
                                attempts: self.retry.attempt(),
                            });
                        }
                    }
                }
            }
        }
    }

    async fn attempt(
        url: &str,
        hook: Option<&dyn ConnectHook>,
    ) -> Result<(Link, Readiness), BotError> {
        let mut link = Link::connect(url).await?;
        let readiness = match hook {
            Some(hook) => match hook.on_connect(ConnectOutcome::Connected(&mut link)).await {
                Ok(readiness) => readiness,
                Err(e) => {
                    link.close().await;
                    return Err(e);
                }
            },
            None => Readiness::Ready,
        };
        Ok((link, readiness))
    }

    /// Send one text frame on the open link.
    pub async fn send_text(&mut self, text: impl Into<String>) -> Result<(), BotError> {
        let link = self.open_link()?;
        let result = link.send_text(text).await;
        self.note_result(result)
    }

    /// Wait for the next text payload on the open link.
    pub async fn recv_text(&mut self) -> Result<String, BotError> {
        let link = self.open_link()?;
        let result = link.recv_text().await;
        self.note_result(result)
    }

    /// Best-effort close; always ends `Disconnected`.
    pub async fn close(&mut self) {
        if let Some(link) = self.link.take() {
            self.state = ConnectionState::Closing;
            debug!(name = self.name, url = link.target(), "Closing link");
            if tokio::time::timeout(CLOSE_TIMEOUT, link.close()).await.is_err() {
                debug!(name = self.name, "Close handshake timed out");
            }
        }
        self.state = ConnectionState::Disconnected;
    }

    fn open_link(&mut self) -> Result<&mut Link, BotError> {
        if !self.is_open() {
            return Err(BotError::NotConnected(self.name));
        }
        self.link.as_mut().ok_or(BotError::NotConnected(self.name))
    }

    /// Drop the socket if an I/O result shows it is gone.
    fn note_result<T>(&mut self, result: Result<T, BotError>) -> Result<T, BotError> {
        if let Err(e) = &result
            && e.is_disconnect()
        {
            warn!(name = self.name, code = e.error_code(), error = %e, "Connection lost");
            self.state = ConnectionState::Closing;
            self.link = None;
            self.state = ConnectionState::Disconnected;
        }
        result
    }
}
