//! nuitbot - Twitch chat bot with OBS and local plugin integrations.
//!
//! Keeps a chat connection alive, answers chat commands and drives the
//! mentality sequence against the control plane and external processes.

mod actions;
mod config;
mod control;
mod error;
mod handlers;
mod network;
mod orchestrator;
mod shutdown;
mod telemetry;

use crate::config::{Config, validate};
use crate::orchestrator::Orchestrator;
use crate::shutdown::RunState;
use std::path::Path;
use tracing::{error, info, warn};

const DEFAULT_CONFIG_PATH: &str = "nuitbot.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();

    // Load configuration
    let explicit_path = std::env::args().nth(1);
    let config_path = explicit_path
        .clone()
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let mut config = if explicit_path.is_none() && !Path::new(&config_path).exists() {
        warn!(path = %config_path, "No config file found, using defaults and environment");
        Config::default()
    } else {
        Config::load(&config_path).map_err(|e| {
            error!(path = %config_path, error = %e, "Failed to load config");
            e
        })?
    };
    config.apply_env();

    if let Err(errors) = validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        return Err(anyhow::anyhow!(
            "Refusing to start with {} configuration error(s). See messages above.",
            errors.len()
        ));
    }

    info!(
        nick = %config.chat.nick,
        channel = %config.chat.channel,
        control = config.control.enabled,
        local = config.local.enabled,
        "Starting nuitbot"
    );

    let (run, handle) = RunState::new();
    tokio::spawn(shutdown::wait_for_signal(handle));

    Orchestrator::from_config(&config, run).run().await?;
    Ok(())
}
