//! Core configuration types and loading.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use nuit_proto::{KeyModifiers, KeySequence};

use super::defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Environment variables that override file values.
pub const ENV_TOKEN: &str = "TWITCH_OAUTH";
pub const ENV_NICK: &str = "TWITCH_NICK";
pub const ENV_CHANNEL: &str = "TWITCH_CHANNEL";
pub const ENV_CONTROL_PASSWORD: &str = "OBS_PASSWORD";

/// Bot configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Primary chat connection.
    #[serde(default)]
    pub chat: ChatConfig,
    /// Control-plane connection (remote hotkeys).
    #[serde(default)]
    pub control: ControlConfig,
    /// Local plugin socket.
    #[serde(default)]
    pub local: LocalConfig,
    /// Chat command surface.
    #[serde(default)]
    pub commands: CommandsConfig,
    /// Mentality sequence artifacts and external processes.
    #[serde(default)]
    pub mentality: MentalityConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.normalize();
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup (the environment in production).
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = present(ENV_TOKEN) {
            self.chat.token = token;
        }
        if let Some(nick) = present(ENV_NICK) {
            self.chat.nick = nick;
        }
        if let Some(channel) = present(ENV_CHANNEL) {
            self.chat.channel = channel;
        }
        if let Some(password) = present(ENV_CONTROL_PASSWORD) {
            self.control.password = password;
        }
        self.normalize();
    }

    /// Canonicalise values that the wire protocol is picky about.
    fn normalize(&mut self) {
        let chat = &mut self.chat;
        chat.token = chat.token.trim().trim_start_matches("oauth:").to_string();
        chat.nick = chat.nick.trim().to_string();
        chat.channel = chat.channel.trim().trim_start_matches('#').to_lowercase();
    }
}

/// Primary chat connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Websocket URL of the chat feed.
    #[serde(default = "default_chat_url")]
    pub url: String,
    /// Login name.
    #[serde(default)]
    pub nick: String,
    /// Channel to join (with or without `#`).
    #[serde(default)]
    pub channel: String,
    /// OAuth token, with or without the `oauth:` prefix.
    #[serde(default)]
    pub token: String,
    /// Capabilities requested before authenticating.
    #[serde(default = "default_capabilities")]
    pub capabilities: Vec<String>,
    /// Bounded wait for the next inbound line; also the shutdown poll interval.
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
    /// Socket-level connect attempts before the link is reported unavailable.
    #[serde(default = "default_chat_max_attempts")]
    pub max_attempts: u32,
    /// Cap for the socket-level backoff.
    #[serde(default = "default_primary_backoff_cap_secs")]
    pub backoff_cap_secs: u64,
    /// Full re-joins allowed after the session drops.
    #[serde(default = "default_max_rejoins")]
    pub max_rejoins: u32,
    /// Cap for the re-join backoff.
    #[serde(default = "default_primary_backoff_cap_secs")]
    pub rejoin_backoff_cap_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            url: default_chat_url(),
            nick: String::new(),
            channel: String::new(),
            token: String::new(),
            capabilities: default_capabilities(),
            read_timeout_ms: default_read_timeout_ms(),
            max_attempts: default_chat_max_attempts(),
            backoff_cap_secs: default_primary_backoff_cap_secs(),
            max_rejoins: default_max_rejoins(),
            rejoin_backoff_cap_secs: default_primary_backoff_cap_secs(),
        }
    }
}

impl ChatConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

/// Control-plane connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ControlConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_control_url")]
    pub url: String,
    /// Shared secret for the challenge/response handshake.
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_aux_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_aux_backoff_cap_secs")]
    pub backoff_cap_secs: u64,
    /// How long to wait for each handshake or request reply.
    #[serde(default = "default_control_timeout_ms")]
    pub timeout_ms: u64,
    /// Key combination pressed around the sound effect.
    #[serde(default)]
    pub hotkey: HotkeyConfig,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: default_control_url(),
            password: String::new(),
            max_attempts: default_aux_max_attempts(),
            backoff_cap_secs: default_aux_backoff_cap_secs(),
            timeout_ms: default_control_timeout_ms(),
            hotkey: HotkeyConfig::default(),
        }
    }
}

impl ControlConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Remote hotkey: key identifier plus modifiers.
///
/// Defaults to alt + scroll lock.
#[derive(Debug, Clone, Deserialize)]
pub struct HotkeyConfig {
    #[serde(default = "default_hotkey_key_id")]
    pub key_id: String,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub control: bool,
    #[serde(default = "default_true")]
    pub alt: bool,
    #[serde(default)]
    pub command: bool,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            key_id: default_hotkey_key_id(),
            shift: false,
            control: false,
            alt: true,
            command: false,
        }
    }
}

impl HotkeyConfig {
    pub fn to_sequence(&self) -> KeySequence {
        KeySequence {
            key_id: self.key_id.clone(),
            key_modifiers: KeyModifiers {
                shift: self.shift,
                control: self.control,
                alt: self.alt,
                command: self.command,
            },
        }
    }
}

/// Local plugin socket configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_local_url")]
    pub url: String,
    #[serde(default = "default_aux_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_aux_backoff_cap_secs")]
    pub backoff_cap_secs: u64,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: default_local_url(),
            max_attempts: default_aux_max_attempts(),
            backoff_cap_secs: default_aux_backoff_cap_secs(),
        }
    }
}

/// Chat command surface configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandsConfig {
    /// One-in-N chance of answering any `!` command with the troll reply.
    /// Zero disables the override.
    #[serde(default = "default_troll_odds")]
    pub troll_odds: u32,
    #[serde(default = "default_troll_reply")]
    pub troll_reply: String,
    /// Prepended (with a space) to every reply; empty for none.
    #[serde(default = "default_reply_prefix")]
    pub reply_prefix: String,
    /// Extra or replacement reply templates keyed by command token
    /// (e.g. `"!tts"`). An empty template registers a recognised stub.
    #[serde(default)]
    pub replies: HashMap<String, String>,
    /// Command tokens whose message is forwarded to the local plugin socket.
    #[serde(default)]
    pub forward: Vec<String>,
    /// Command tokens that run the mentality sequence.
    #[serde(default)]
    pub mentality: Vec<String>,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            troll_odds: default_troll_odds(),
            troll_reply: default_troll_reply(),
            reply_prefix: default_reply_prefix(),
            replies: HashMap::new(),
            forward: Vec::new(),
            mentality: Vec::new(),
        }
    }
}

/// Mentality sequence configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MentalityConfig {
    /// Message suffix that triggers the sequence.
    #[serde(default = "default_trigger_suffix")]
    pub trigger_suffix: String,
    /// Overwritten with the triggering message.
    #[serde(default = "default_message_file")]
    pub message_file: String,
    /// Overwritten with the triggering display name.
    #[serde(default = "default_name_file")]
    pub name_file: String,
    /// Sound passed to the player.
    #[serde(default = "default_sound_file")]
    pub sound_file: String,
    /// Audio player program; receives the sound file as its only argument.
    #[serde(default = "default_player")]
    pub player: String,
    /// Pause between writing artifacts and the first hotkey.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// Local key-simulation command used when the control plane is unavailable,
    /// e.g. `["xdotool", "key", "alt+Scroll_Lock"]`.
    #[serde(default)]
    pub key_command: Option<Vec<String>>,
}

impl Default for MentalityConfig {
    fn default() -> Self {
        Self {
            trigger_suffix: default_trigger_suffix(),
            message_file: default_message_file(),
            name_file: default_name_file(),
            sound_file: default_sound_file(),
            player: default_player(),
            settle_delay_ms: default_settle_delay_ms(),
            key_command: None,
        }
    }
}

impl MentalityConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Defaults
    // ========================================================================

    #[test]
    fn empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.chat.url, "wss://irc-ws.chat.twitch.tv:443");
        assert_eq!(config.chat.capabilities, vec!["twitch.tv/commands", "twitch.tv/tags"]);
        assert_eq!(config.chat.read_timeout(), Duration::from_secs(1));
        assert_eq!(config.chat.max_rejoins, 5);
        assert_eq!(config.chat.rejoin_backoff_cap_secs, 30);
        assert!(config.control.enabled);
        assert_eq!(config.control.url, "ws://localhost:4455");
        assert!(!config.local.enabled);
        assert_eq!(config.local.url, "ws://localhost:8765");
        assert_eq!(config.commands.troll_odds, 100);
        assert_eq!(config.mentality.trigger_suffix, "mentality.");
        assert_eq!(config.mentality.settle_delay(), Duration::from_secs(3));
        assert!(config.mentality.key_command.is_none());
    }

    #[test]
    fn hotkey_defaults_to_alt_scroll_lock() {
        let sequence = HotkeyConfig::default().to_sequence();
        assert_eq!(sequence.key_id, "OBS_KEY_SCROLLLOCK");
        assert!(sequence.key_modifiers.alt);
        assert!(!sequence.key_modifiers.shift);
    }

    #[test]
    fn default_true_helper_returns_true() {
        assert!(default_true());
    }

    // ========================================================================
    // Parsing and normalisation
    // ========================================================================

    #[test]
    fn parses_full_file() {
        let toml = r##"
[chat]
nick = "nuitbot"
channel = "#RhedDev"
token = "oauth:abc123"

[control]
password = "hunter2"
hotkey = { key_id = "OBS_KEY_F13", alt = false, shift = true }

[local]
enabled = true

[commands]
troll_odds = 0
replies = { "!lurk" = "enjoy the lurk", "!sr" = "" }
forward = ["!song"]

[mentality]
key_command = ["xdotool", "key", "alt+Scroll_Lock"]
"##;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.normalize();
        assert_eq!(config.chat.channel, "rheddev");
        assert_eq!(config.chat.token, "abc123");
        assert_eq!(config.control.password, "hunter2");
        assert_eq!(config.control.hotkey.key_id, "OBS_KEY_F13");
        assert!(config.control.hotkey.shift);
        assert!(!config.control.hotkey.alt);
        assert!(config.local.enabled);
        assert_eq!(config.commands.troll_odds, 0);
        assert_eq!(config.commands.replies["!lurk"], "enjoy the lurk");
        assert_eq!(config.commands.forward, vec!["!song".to_string()]);
        assert!(config.commands.mentality.is_empty());
        assert_eq!(config.mentality.key_command.as_ref().map(Vec::len), Some(3));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config: Config = toml::from_str("[chat]\nnick = \"file\"\nchannel = \"file\"").unwrap();
        config.apply_env_from(|key| match key {
            ENV_TOKEN => Some("oauth:fromenv".to_string()),
            ENV_CHANNEL => Some("#EnvChan".to_string()),
            ENV_NICK => Some("   ".to_string()),
            ENV_CONTROL_PASSWORD => Some("pw".to_string()),
            _ => None,
        });
        assert_eq!(config.chat.token, "fromenv");
        assert_eq!(config.chat.channel, "envchan");
        // Blank values do not override
        assert_eq!(config.chat.nick, "file");
        assert_eq!(config.control.password, "pw");
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = Config::load("/nonexistent/nuitbot.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn load_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nuitbot.toml");
        std::fs::write(&path, "[chat\nnick = 1").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
    }
}
