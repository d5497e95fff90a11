//! Configuration structures and loading logic.

use crate::config::modes::ChannelMode;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub account: AccountConfig,

    /// Channel the bot joins and listens in.
    #[serde(default = "default_base_channel")]
    pub base_channel: ChannelEntry,

    #[serde(default)]
    pub options: OptionsConfig,

    /// Channels downloaded in `manual_list` mode, in order.
    #[serde(default)]
    pub channels: Vec<ChannelEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            account: AccountConfig::default(),
            base_channel: default_base_channel(),
            options: OptionsConfig::default(),
            channels: Vec::new(),
        }
    }
}

/// Server connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub host: String,

    #[serde(default = "default_port")]
    pub tcp_port: u16,

    #[serde(default = "default_port")]
    pub udp_port: u16,

    /// Use an encrypted connection.
    #[serde(default)]
    pub encrypted: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            tcp_port: default_port(),
            udp_port: default_port(),
            encrypted: false,
        }
    }
}

/// Account credentials configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Nickname shown to other users on the server.
    #[serde(default = "default_nickname")]
    pub nickname: String,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            nickname: default_nickname(),
        }
    }
}

/// A channel path with an optional password.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelEntry {
    pub path: String,

    #[serde(default)]
    pub password: String,
}

impl ChannelEntry {
    pub fn new(path: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            password: password.into(),
        }
    }

    /// The password, or `None` when it is empty.
    pub fn password(&self) -> Option<&str> {
        if self.password.is_empty() {
            None
        } else {
            Some(&self.password)
        }
    }
}

/// Campaign options configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Channel mode (single, manual_list, auto_all).
    #[serde(default)]
    pub channel_mode: ChannelMode,

    /// Base directory where per-channel folders are created.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Send a running total after every N completed files.
    #[serde(default = "default_notify_every")]
    pub notify_every: u64,

    /// Message that starts a campaign.
    #[serde(default = "default_trigger_phrase")]
    pub trigger_phrase: String,

    /// Replies that skip a password-protected channel.
    #[serde(default = "default_skip_words")]
    pub skip_words: Vec<String>,

    /// Drop repeated channel ids when building the queue.
    #[serde(default)]
    pub dedupe_channels: bool,

    /// Give up on a transfer with no status activity for this many seconds.
    #[serde(default)]
    pub transfer_stall_timeout_secs: Option<u64>,

    /// Whether to show per-transfer progress bars.
    #[serde(default = "default_true")]
    pub show_progress: bool,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            channel_mode: ChannelMode::default(),
            output_dir: None,
            notify_every: default_notify_every(),
            trigger_phrase: default_trigger_phrase(),
            skip_words: default_skip_words(),
            dedupe_channels: false,
            transfer_stall_timeout_secs: None,
            show_progress: true,
        }
    }
}

fn default_port() -> u16 {
    10333
}

fn default_nickname() -> String {
    "TT Downloader Bot".to_string()
}

fn default_base_channel() -> ChannelEntry {
    ChannelEntry::new("/", "")
}

fn default_notify_every() -> u64 {
    10
}

fn default_trigger_phrase() -> String {
    "download files".to_string()
}

fn default_skip_words() -> Vec<String> {
    vec!["skip".to_string(), "next".to_string(), String::new()]
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!(
                    "Configuration file not found: {}. Create one from config.example.toml",
                    path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the effective output directory.
    pub fn output_dir(&self) -> PathBuf {
        self.options
            .output_dir
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    /// Stall timeout for in-flight transfers, if configured.
    pub fn stall_timeout(&self) -> Option<Duration> {
        self.options
            .transfer_stall_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}
