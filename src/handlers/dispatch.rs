//! Event dispatch.
//!
//! Cases are checked in a fixed order and the first match wins:
//!
//! 0. `!` prefix and the random override fires: the troll reply, nothing else
//! 1. `!` prefix: registry lookup on the lowercased first token
//! 2. `#` prefix: forward to the local plugin socket
//! 3. trigger suffix: the mentality sequence
//!
//! Everything else is plain chat and produces no action.

use super::registry::{CommandEntry, CommandRegistry};
use crate::config::CommandsConfig;
use nuit_proto::ChatEvent;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

/// Something the orchestrator should do in response to an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Send `text` to `channel` on the chat connection.
    Reply { channel: String, text: String },
    /// Send `payload` to the local plugin socket.
    LocalForward { payload: String },
    /// Run the mentality sequence.
    Mentality {
        message: String,
        display_name: String,
    },
}

/// Maps chat events to actions.
///
/// Stateless apart from the random source behind the troll override.
pub struct Dispatcher<R = StdRng> {
    registry: CommandRegistry,
    rng: R,
    troll_odds: u32,
    troll_reply: String,
    reply_prefix: String,
    trigger_suffix: String,
}

impl Dispatcher<StdRng> {
    pub fn new(registry: CommandRegistry, commands: &CommandsConfig, trigger_suffix: &str) -> Self {
        Self::with_rng(registry, commands, trigger_suffix, StdRng::from_entropy())
    }
}

impl<R: Rng> Dispatcher<R> {
    /// Dispatcher drawing the troll override from `rng`.
    pub fn with_rng(
        registry: CommandRegistry,
        commands: &CommandsConfig,
        trigger_suffix: &str,
        rng: R,
    ) -> Self {
        Self {
            registry,
            rng,
            troll_odds: commands.troll_odds,
            troll_reply: commands.troll_reply.clone(),
            reply_prefix: commands.reply_prefix.clone(),
            trigger_suffix: trigger_suffix.to_owned(),
        }
    }

    pub fn dispatch(&mut self, event: &ChatEvent) -> Vec<Action> {
        let message = event.message();

        if message.starts_with('!') {
            return self.command(event).into_iter().collect();
        }
        if message.starts_with('#') {
            return vec![local_forward(event)];
        }
        if !self.trigger_suffix.is_empty() && message.ends_with(&self.trigger_suffix) {
            return vec![mentality(event)];
        }
        Vec::new()
    }

    fn command(&mut self, event: &ChatEvent) -> Option<Action> {
        if self.troll_fires() {
            info!(reply = %self.troll_reply, "Troll override");
            return Some(self.reply(event.channel(), &self.troll_reply));
        }

        let token = event
            .message()
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase();

        match self.registry.lookup(&token) {
            Some(CommandEntry::Reply(template)) => {
                let text = template.replace("{channel}", event.channel());
                info!(command = %token, "Replying");
                Some(self.reply(event.channel(), &text))
            }
            Some(CommandEntry::Stub) => {
                debug!(command = %token, "Command not implemented");
                None
            }
            Some(CommandEntry::LocalForward) => Some(local_forward(event)),
            Some(CommandEntry::MentalitySequence) => Some(mentality(event)),
            None => {
                debug!(command = %token, "Unknown command");
                None
            }
        }
    }

    /// Draw once from `1..=troll_odds`; fires on 1.
    fn troll_fires(&mut self) -> bool {
        self.troll_odds > 0 && self.rng.gen_range(1..=self.troll_odds) == 1
    }

    fn reply(&self, channel: &str, text: &str) -> Action {
        let text = if self.reply_prefix.is_empty() {
            text.to_owned()
        } else {
            format!("{} {text}", self.reply_prefix)
        };
        Action::Reply {
            channel: channel.to_owned(),
            text,
        }
    }
}

fn local_forward(event: &ChatEvent) -> Action {
    Action::LocalForward {
        payload: format!("{} --name {}", event.message(), event.display_name()),
    }
}

fn mentality(event: &ChatEvent) -> Action {
    Action::Mentality {
        message: event.message().to_owned(),
        display_name: event.display_name().to_owned(),
    }
}
