//! Command registry.

use crate::config::CommandsConfig;
use std::collections::HashMap;
use tracing::debug;

/// What a recognised command token does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandEntry {
    /// Reply with this template; `{channel}` is substituted.
    Reply(String),
    /// Recognised but intentionally does nothing.
    Stub,
    /// Forward the message to the local plugin socket.
    LocalForward,
    /// Run the mentality sequence.
    MentalitySequence,
}

/// Lowercase command token (including the leading `!`) to [`CommandEntry`].
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    entries: HashMap<String, CommandEntry>,
}

impl CommandRegistry {
    /// The built-in command surface.
    pub fn builtin() -> Self {
        let mut registry = Self {
            entries: HashMap::new(),
        };

        // Reply templates
        registry.register(
            "!tts",
            CommandEntry::Reply("Use my Text to Speech: https://rhed.rhamzthev.com/donate".into()),
        );
        let minecraft = CommandEntry::Reply("Join our Minecraft Server: minecraft.rhamzthev.com".into());
        registry.register("!minecraft", minecraft.clone());
        registry.register("!mc", minecraft);
        registry.register(
            "!discord",
            CommandEntry::Reply("Join our Discord: https://discord.gg/jFKFhWBMbb".into()),
        );

        // Recognised, not implemented
        registry.register("!watchtime", CommandEntry::Stub);
        registry.register("!followtime", CommandEntry::Stub);
        registry.register("!sr", CommandEntry::Stub);

        registry
    }

    /// Built-ins with the configured `replies`, `forward` and `mentality`
    /// tokens layered on top, in that order.
    ///
    /// An empty template registers a [`CommandEntry::Stub`].
    pub fn from_config(commands: &CommandsConfig) -> Self {
        let mut registry = Self::builtin();
        for (token, template) in &commands.replies {
            let entry = if template.trim().is_empty() {
                CommandEntry::Stub
            } else {
                CommandEntry::Reply(template.clone())
            };
            registry.register(token, entry);
        }
        for token in &commands.forward {
            registry.register(token, CommandEntry::LocalForward);
        }
        for token in &commands.mentality {
            registry.register(token, CommandEntry::MentalitySequence);
        }
        debug!(commands = registry.len(), "Command registry built");
        registry
    }

    /// Add or replace one entry.
    #[cfg(test)]
    pub fn with(mut self, token: &str, entry: CommandEntry) -> Self {
        self.register(token, entry);
        self
    }

    fn register(&mut self, token: &str, entry: CommandEntry) {
        let token = token.trim().to_lowercase();
        let token = if token.starts_with('!') {
            token
        } else {
            format!("!{token}")
        };
        self.entries.insert(token, entry);
    }

    /// Look up an already-lowercased token.
    pub fn lookup(&self, token: &str) -> Option<&CommandEntry> {
        self.entries.get(token)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_surface() {
        let registry = CommandRegistry::builtin();
        assert_eq!(registry.len(), 7);
        assert!(matches!(registry.lookup("!tts"), Some(CommandEntry::Reply(_))));
        assert_eq!(registry.lookup("!mc"), registry.lookup("!minecraft"));
        assert_eq!(registry.lookup("!sr"), Some(&CommandEntry::Stub));
        assert_eq!(registry.lookup("!watchtime"), Some(&CommandEntry::Stub));
        assert_eq!(registry.lookup("!followtime"), Some(&CommandEntry::Stub));
        assert_eq!(registry.lookup("!nope"), None);
    }

    #[test]
    fn config_replies_override_and_extend() {
        let mut commands = CommandsConfig::default();
        commands
            .replies
            .insert("!Discord".into(), "New invite for {channel}".into());
        commands.replies.insert("lurk".into(), "enjoy the lurk".into());
        commands.replies.insert("!tts".into(), String::new());

        let registry = CommandRegistry::from_config(&commands);
        assert_eq!(
            registry.lookup("!discord"),
            Some(&CommandEntry::Reply("New invite for {channel}".into()))
        );
        assert_eq!(
            registry.lookup("!lurk"),
            Some(&CommandEntry::Reply("enjoy the lurk".into()))
        );
        assert_eq!(registry.lookup("!tts"), Some(&CommandEntry::Stub));
    }

    #[test]
    fn config_routes_forward_and_mentality_tokens() {
        let commands = CommandsConfig {
            forward: vec!["Song".into()],
            mentality: vec!["!vibe".into()],
            ..CommandsConfig::default()
        };
        let registry = CommandRegistry::from_config(&commands);
        assert_eq!(registry.lookup("!song"), Some(&CommandEntry::LocalForward));
        assert_eq!(registry.lookup("!vibe"), Some(&CommandEntry::MentalitySequence));
        assert_eq!(registry.len(), 9);
    }

    #[test]
    fn with_registers_markers() {
        let registry = CommandRegistry::builtin()
            .with("!fwd", CommandEntry::LocalForward)
            .with("!vibe", CommandEntry::MentalitySequence);
        assert_eq!(registry.lookup("!fwd"), Some(&CommandEntry::LocalForward));
        assert_eq!(registry.lookup("!vibe"), Some(&CommandEntry::MentalitySequence));
    }
}
