//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.
//! Missing credentials are fatal before any socket is opened.

use super::Config;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("chat.token is required (or set TWITCH_OAUTH)")]
    MissingToken,
    #[error("chat.nick is required (or set TWITCH_NICK)")]
    MissingNick,
    #[error("chat.channel is required (or set TWITCH_CHANNEL)")]
    MissingChannel,
    #[error("{section}.url must be a ws:// or wss:// URL, got '{url}'")]
    InvalidUrl { section: &'static str, url: String },
    #[error("chat.read_timeout_ms must be greater than zero")]
    ZeroReadTimeout,
    #[error("mentality.trigger_suffix must not be empty")]
    EmptyTriggerSuffix,
    #[error("mentality.key_command must name a program")]
    EmptyKeyCommand,
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    // Credentials
    if config.chat.token.is_empty() {
        errors.push(ValidationError::MissingToken);
    }
    if config.chat.nick.is_empty() {
        errors.push(ValidationError::MissingNick);
    }
    if config.chat.channel.is_empty() {
        errors.push(ValidationError::MissingChannel);
    }

    // Endpoints (disabled links are never dialled)
    check_url(&mut errors, "chat", &config.chat.url);
    if config.control.enabled {
        check_url(&mut errors, "control", &config.control.url);
    }
    if config.local.enabled {
        check_url(&mut errors, "local", &config.local.url);
    }

    if config.chat.read_timeout_ms == 0 {
        errors.push(ValidationError::ZeroReadTimeout);
    }
    if config.mentality.trigger_suffix.is_empty() {
        errors.push(ValidationError::EmptyTriggerSuffix);
    }
    if let Some(argv) = &config.mentality.key_command
        && argv.first().is_none_or(|program| program.is_empty())
    {
        errors.push(ValidationError::EmptyKeyCommand);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, section: &'static str, url: &str) {
    if !(url.starts_with("ws://") || url.starts_with("wss://")) {
        errors.push(ValidationError::InvalidUrl {
            section,
            url: url.to_string(),
        });
    }
}
