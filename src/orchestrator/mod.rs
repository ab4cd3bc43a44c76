//! The run loop.
//!
//! Drives the chat connection through `Idle -> Joining -> Active -> Draining
//! -> Closed`, hands every parsed event to the [`Dispatcher`] and carries
//! out the resulting [`Action`]s against the chat, control-plane and local
//! sockets.
//!
//! Everything runs on one task. An event's actions (including a whole
//! mentality sequence) finish before the next line is read, so the three
//! supervisors are owned directly and need no locking.
//!
//! Losing the chat connection while still running starts a full re-join
//! (reconnect plus the join handshake) under a second, outer retry policy.
//! Running out of re-joins is the only fatal runtime error.

mod mentality;

use crate::actions::{ExternalActions, ProcessActions};
use crate::config::{ChatConfig, Config, MentalityConfig};
use crate::control::ControlHandshake;
use crate::error::BotError;
use crate::handlers::{Action, CommandRegistry, Dispatcher};
use crate::network::{RetryPolicy, Supervisor};
use crate::shutdown::RunState;
use crate::telemetry::spans;
use nuit_proto::{ChatCommand, ChatEvent, KeySequence, ParseError, parse};
use rand::Rng;
use rand::rngs::StdRng;
use std::time::Duration;
use tokio::time::{Instant, timeout};
use tracing::{Instrument, debug, error, info, warn};

/// Where the chat connection is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Joining,
    Active,
    Draining,
    Closed,
}

/// The three supervised sockets.
pub struct Links {
    pub chat: Supervisor,
    pub control: Supervisor,
    pub local: Supervisor,
}

impl Links {
    /// Build supervisors from configuration. Disabled integrations get a
    /// supervisor that is permanently unavailable.
    pub fn from_config(config: &Config) -> Self {
        let chat = Supervisor::new(
            "chat",
            config.chat.url.clone(),
            RetryPolicy::new(
                config.chat.max_attempts,
                Duration::from_secs(config.chat.backoff_cap_secs),
            ),
        );

        let control = if config.control.enabled {
            Supervisor::new(
                "control",
                config.control.url.clone(),
                RetryPolicy::new(
                    config.control.max_attempts,
                    Duration::from_secs(config.control.backoff_cap_secs),
                ),
            )
            .with_hook(ControlHandshake::new(
                config.control.password.clone(),
                config.control.timeout(),
            ))
        } else {
            Supervisor::disabled("control")
        };

        let local = if config.local.enabled {
            Supervisor::new(
                "local",
                config.local.url.clone(),
                RetryPolicy::new(
                    config.local.max_attempts,
                    Duration::from_secs(config.local.backoff_cap_secs),
                ),
            )
        } else {
            Supervisor::disabled("local")
        };

        Self {
            chat,
            control,
            local,
        }
    }
}

/// Owns every connection and drives the bot until shutdown.
pub struct Orchestrator<R = StdRng, A = ProcessActions> {
    chat: Supervisor,
    control: Supervisor,
    local: Supervisor,
    dispatcher: Dispatcher<R>,
    actions: A,
    run: RunState,
    phase: Phase,
    rejoin: RetryPolicy,
    chat_config: ChatConfig,
    mentality: MentalityConfig,
    hotkey: KeySequence,
    control_timeout: Duration,
}

impl Orchestrator {
    /// Production wiring: real processes, entropy-seeded dispatcher.
    pub fn from_config(config: &Config, run: RunState) -> Self {
        let dispatcher = Dispatcher::new(
            CommandRegistry::from_config(&config.commands),
            &config.commands,
            &config.mentality.trigger_suffix,
        );
        Self::new(
            config,
            Links::from_config(config),
            dispatcher,
            ProcessActions,
            run,
        )
    }
}

impl<R: Rng + Send, A: ExternalActions> Orchestrator<R, A> {
    pub fn new(
        config: &Config,
        links: Links,
        dispatcher: Dispatcher<R>,
        actions: A,
        run: RunState,
    ) -> Self {
        Self {
            chat: links.chat.with_run_state(run.clone()),
            control: links.control.with_run_state(run.clone()),
            local: links.local.with_run_state(run.clone()),
            dispatcher,
            actions,
            run,
            phase: Phase::Idle,
            rejoin: RetryPolicy::new(
                config.chat.max_rejoins,
                Duration::from_secs(config.chat.rejoin_backoff_cap_secs),
            ),
            chat_config: config.chat.clone(),
            mentality: config.mentality.clone(),
            hotkey: config.control.hotkey.to_sequence(),
            control_timeout: config.control.timeout(),
        }
    }

    /// Replace the outer re-join policy.
    pub fn with_rejoin_policy(mut self, policy: RetryPolicy) -> Self {
        self.rejoin = policy;
        self
    }

    #[cfg(test)]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Run until the run flag clears or re-joins are exhausted, then close
    /// every connection.
    pub async fn run(mut self) -> Result<(), BotError> {
        let result = self.run_sessions().await;
        self.enter(Phase::Closed);
        self.close_all().await;
        info!("Bot stopped");
        result
    }

    async fn run_sessions(&mut self) -> Result<(), BotError> {
        while self.run.is_running() {
            let err = match self.session().await {
                Ok(()) => return Ok(()),
                Err(e) => e,
            };
            if !self.run.is_running() {
                break;
            }

            match self.rejoin.record_failure() {
                Some(delay) => {
                    warn!(
                        attempt = self.rejoin.attempt(),
                        max_rejoins = self.rejoin.max_attempts(),
                        delay_secs = delay.as_secs(),
                        code = err.error_code(),
                        error = %err,
                        "Chat session ended, re-joining"
                    );
                    self.run.sleep(delay, self.chat_config.read_timeout()).await;
                }
                None => {
                    error!(
                        max_rejoins = self.rejoin.max_attempts(),
                        error = %err,
                        "Chat could not be re-joined, shutting down"
                    );
                    return Err(BotError::RejoinsExhausted(self.rejoin.max_attempts()));
                }
            }
        }
        Ok(())
    }

    /// One connect / join / read / drain cycle.
    ///
    /// `Ok` only when the run flag cleared; any other end is an error that
    /// feeds the re-join policy.
    async fn session(&mut self) -> Result<(), BotError> {
        self.enter(Phase::Joining);
        self.chat.ensure_connected().await?;
        if let Err(e) = self.join().await {
            self.chat.close().await;
            return Err(e);
        }
        self.connect_auxiliary().await;

        self.enter(Phase::Active);
        let result = self.read_loop().await;

        self.enter(Phase::Draining);
        self.drain().await;
        result
    }

    async fn join(&mut self) -> Result<(), BotError> {
        let chat = &self.chat_config;
        let commands = [
            ChatCommand::CapReq(chat.capabilities.clone()),
            ChatCommand::Pass(chat.token.clone()),
            ChatCommand::Nick(chat.nick.clone()),
            ChatCommand::Join(chat.channel.clone()),
        ];
        for command in commands {
            debug!(command = command.name(), "Sending");
            self.chat.send_text(command.to_string()).await?;
        }
        info!(channel = %chat.channel, nick = %chat.nick, "Joined channel");
        Ok(())
    }

    /// Bring up control and local sockets if they are not open.
    /// Failure only degrades the matching features.
    async fn connect_auxiliary(&mut self) {
        for link in [&mut self.control, &mut self.local] {
            if !self.run.is_running() {
                return;
            }
            if !link.is_enabled() || link.is_open() {
                continue;
            }
            let result = link.ensure_connected().await.map(|_| ());
            if let Err(e) = result {
                warn!(
                    name = link.name(),
                    code = e.error_code(),
                    error = %e,
                    "Auxiliary connection unavailable, related features disabled"
                );
            }
        }
    }

    /// Read until shutdown or a transport error.
    ///
    /// The re-join budget is restored only once the session has stayed up
    /// for a full read interval, so a peer that drops every fresh join
    /// still exhausts it.
    async fn read_loop(&mut self) -> Result<(), BotError> {
        let wait = self.chat_config.read_timeout();
        let settles_at = Instant::now() + wait;
        let mut settled = false;
        while self.run.is_running() {
            if !settled && Instant::now() >= settles_at {
                settled = true;
                if self.rejoin.attempt() > 0 {
                    debug!(attempts = self.rejoin.attempt(), "Chat session settled, re-join budget restored");
                }
                self.rejoin.reset();
            }
            let frame = match timeout(wait, self.chat.recv_text()).await {
                Err(_) => continue,
                Ok(Ok(frame)) => frame,
                Ok(Err(e)) => {
                    warn!(code = e.error_code(), error = %e, "Chat connection lost");
                    return Err(e);
                }
            };
            for line in frame.lines().filter(|line| !line.trim().is_empty()) {
                self.handle_line(line).await;
            }
        }
        Ok(())
    }

    async fn handle_line(&mut self, line: &str) {
        if let Some(pong) = ChatCommand::pong_for(line) {
            debug!("Keepalive");
            if let Err(e) = self.chat.send_text(pong.to_string()).await {
                warn!(code = e.error_code(), error = %e, "Failed to answer PING");
            }
            return;
        }

        match parse(line) {
            Ok(event) => {
                let span = spans::event(event.channel(), event.user());
                self.handle_event(event).instrument(span).await;
            }
            Err(ParseError::NotPrivmsg) => debug!(line, "Skipping non-PRIVMSG line"),
            Err(e) => warn!(code = e.error_code(), error = %e, line, "Skipping malformed line"),
        }
    }

    async fn handle_event(&mut self, event: ChatEvent) {
        info!("{event}");
        for action in self.dispatcher.dispatch(&event) {
            self.execute(action).await;
        }
    }

    async fn execute(&mut self, action: Action) {
        match action {
            Action::Reply { channel, text } => {
                let reply = ChatCommand::Privmsg(channel, text);
                if let Err(e) = self.chat.send_text(reply.to_string()).await {
                    warn!(code = e.error_code(), error = %e, "Failed to send reply");
                }
            }
            Action::LocalForward { payload } => self.forward_local(payload).await,
            Action::Mentality {
                message,
                display_name,
            } => {
                let span = spans::mentality(&display_name);
                self.run_mentality(&message, &display_name)
                    .instrument(span)
                    .await;
            }
        }
    }

    /// Send to the local socket. If it is down or the send fails, force one
    /// reconnect and drop the message.
    async fn forward_local(&mut self, payload: String) {
        if !self.local.is_enabled() {
            debug!("Local plugin socket disabled, dropping forward");
            return;
        }

        if self.local.is_open() {
            match self.local.send_text(payload.as_str()).await {
                Ok(()) => {
                    info!(%payload, "Forwarded to local plugin");
                    return;
                }
                Err(e) => warn!(code = e.error_code(), error = %e, "Local forward failed"),
            }
        }

        match self.local.reconnect().await {
            Ok(_) => info!(%payload, "Local plugin socket reconnected, message dropped"),
            Err(e) => warn!(code = e.error_code(), error = %e, %payload, "Local plugin socket unavailable, message dropped"),
        }
    }

    async fn drain(&mut self) {
        if self.chat.is_open() {
            let part = ChatCommand::Part(self.chat_config.channel.clone());
            match self.chat.send_text(part.to_string()).await {
                Ok(()) => info!(channel = %self.chat_config.channel, "Left channel"),
                Err(e) => debug!(error = %e, "PART not delivered"),
            }
        }
        self.chat.close().await;
    }

    async fn close_all(&mut self) {
        self.chat.close().await;
        self.control.close().await;
        self.local.close().await;
    }

    fn enter(&mut self, phase: Phase) {
        debug!(from = ?self.phase, to = ?phase, "Phase change");
        self.phase = phase;
    }
}
