//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Config struct definitions and TOML/environment loading
//! - [`defaults`]: serde default value functions
//! - [`validation`]: startup checks, reporting every problem at once

mod defaults;
mod types;
mod validation;

pub use types::{
    ChatConfig, CommandsConfig, Config, ConfigError, ControlConfig, HotkeyConfig, LocalConfig,
    MentalityConfig,
};
pub use validation::{ValidationError, validate};
