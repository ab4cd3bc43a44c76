//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

// =============================================================================
// Chat Defaults
// =============================================================================

pub fn default_chat_url() -> String {
    "wss://irc-ws.chat.twitch.tv:443".to_string()
}

pub fn default_capabilities() -> Vec<String> {
    vec![
        "twitch.tv/commands".to_string(),
        "twitch.tv/tags".to_string(),
    ]
}

pub fn default_read_timeout_ms() -> u64 {
    1000
}

pub fn default_chat_max_attempts() -> u32 {
    3
}

pub fn default_max_rejoins() -> u32 {
    5
}

pub fn default_primary_backoff_cap_secs() -> u64 {
    30
}

// =============================================================================
// Auxiliary Link Defaults
// =============================================================================

pub fn default_control_url() -> String {
    "ws://localhost:4455".to_string()
}

pub fn default_local_url() -> String {
    "ws://localhost:8765".to_string()
}

pub fn default_aux_max_attempts() -> u32 {
    3
}

pub fn default_aux_backoff_cap_secs() -> u64 {
    8
}

pub fn default_control_timeout_ms() -> u64 {
    5000
}

pub fn default_hotkey_key_id() -> String {
    "OBS_KEY_SCROLLLOCK".to_string()
}

// =============================================================================
// Command Defaults
// =============================================================================

pub fn default_troll_odds() -> u32 {
    100
}

pub fn default_troll_reply() -> String {
    "no.".to_string()
}

pub fn default_reply_prefix() -> String {
    "MrDestructoid".to_string()
}

// =============================================================================
// Mentality Defaults
// =============================================================================

pub fn default_trigger_suffix() -> String {
    "mentality.".to_string()
}

pub fn default_message_file() -> String {
    "text/mentality.txt".to_string()
}

pub fn default_name_file() -> String {
    "text/mentality_name.txt".to_string()
}

pub fn default_sound_file() -> String {
    "sound/mentality.wav".to_string()
}

pub fn default_player() -> String {
    "aplay".to_string()
}

pub fn default_settle_delay_ms() -> u64 {
    3000
}
