//! Configuration module for the tt-downloader-bot.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Saved server and channel profiles
//! - Configuration validation

pub mod loader;
pub mod modes;
pub mod profiles;
pub mod validation;

pub use loader::{AccountConfig, ChannelEntry, Config, OptionsConfig, ServerConfig};
pub use modes::ChannelMode;
pub use profiles::{ProfileStore, ServerProfile};
pub use validation::validate_config;
