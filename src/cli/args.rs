//! Command-line argument definitions using clap.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::{ChannelEntry, ChannelMode, Config};

/// Chat-triggered channel file downloader.
#[derive(Parser, Debug)]
#[command(
    name = "tt-downloader-bot",
    version,
    about = "Bot that downloads channel files when asked in chat",
    long_about = "Logs into a server, joins a base channel and waits for the trigger phrase.\n\n\
                  When triggered, downloads every file of the configured channels into\n\
                  per-channel folders and reports progress back to whoever asked."
)]
pub struct Args {
    /// Path to configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Server host name or address.
    #[arg(long)]
    pub host: Option<String>,

    /// Server TCP port.
    #[arg(long)]
    pub tcp_port: Option<u16>,

    /// Server UDP port.
    #[arg(long)]
    pub udp_port: Option<u16>,

    /// Login username.
    #[arg(short, long)]
    pub username: Option<String>,

    /// Login password.
    #[arg(long, env = "TT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Nickname shown on the server.
    #[arg(long)]
    pub nickname: Option<String>,

    /// Base channel path, e.g. '/Root/Files'.
    #[arg(long)]
    pub channel_path: Option<String>,

    /// Base channel password.
    #[arg(long, env = "TT_CHANNEL_PASSWORD", hide_env_values = true)]
    pub channel_password: Option<String>,

    /// Use an encrypted connection.
    #[arg(long)]
    pub encrypted: bool,

    /// Directory where per-channel folders are created.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Which channels a request downloads.
    #[arg(long, value_enum)]
    pub mode: Option<ChannelModeArg>,

    /// Channel to download in manual_list mode, as PATH or PATH=PASSWORD.
    /// Can be repeated; implies --mode manual-list unless a mode is given.
    #[arg(long = "channel", value_name = "PATH[=PASSWORD]")]
    pub channels: Vec<String>,

    /// Announce the running total every N files.
    #[arg(long)]
    pub notify_every: Option<u64>,

    /// Give up on a transfer after this many seconds without progress.
    #[arg(long)]
    pub stall_timeout: Option<u64>,

    /// Hide per-transfer progress bars.
    #[arg(long, short)]
    pub quiet: bool,

    /// Load a saved server profile (and its channel profile).
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Save the effective configuration as a server profile.
    #[arg(long, value_name = "NAME")]
    pub save_profile: Option<String>,

    /// Write the effective configuration to a TOML file and exit.
    #[arg(long, value_name = "PATH")]
    pub write_config: Option<PathBuf>,

    /// List saved server profiles and exit.
    #[arg(long)]
    pub list_profiles: bool,

    /// Delete a server profile and its channel profile, then exit.
    #[arg(long, value_name = "NAME")]
    pub delete_profile: Option<String>,

    /// Directory holding saved profiles.
    #[arg(long)]
    pub profiles_dir: Option<PathBuf>,

    /// Serve this local directory as the server instead of connecting.
    #[arg(long, value_name = "DIR")]
    pub mirror: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

/// CLI channel mode argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChannelModeArg {
    /// Only the base channel.
    Single,
    /// The configured channel list, in order.
    #[value(alias = "manual_list")]
    ManualList,
    /// Every channel on the server.
    #[value(alias = "auto_all")]
    AutoAll,
}

impl From<ChannelModeArg> for ChannelMode {
    fn from(arg: ChannelModeArg) -> Self {
        match arg {
            ChannelModeArg::Single => ChannelMode::Single,
            ChannelModeArg::ManualList => ChannelMode::ManualList,
            ChannelModeArg::AutoAll => ChannelMode::AutoAll,
        }
    }
}

/// Parse `PATH` or `PATH=PASSWORD`.
pub fn parse_channel_arg(value: &str) -> ChannelEntry {
    match value.split_once('=') {
        Some((path, password)) => ChannelEntry::new(path.trim(), password),
        None => ChannelEntry::new(value.trim(), ""),
    }
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(self, config: &mut Config) {
        // Server
        if let Some(host) = self.host {
            config.server.host = host;
        }

        if let Some(port) = self.tcp_port {
            config.server.tcp_port = port;
        }

        if let Some(port) = self.udp_port {
            config.server.udp_port = port;
        }

        if self.encrypted {
            config.server.encrypted = true;
        }

        // Account
        if let Some(username) = self.username {
            config.account.username = username;
        }

        if let Some(password) = self.password {
            config.account.password = password;
        }

        if let Some(nickname) = self.nickname {
            config.account.nickname = nickname;
        }

        // Base channel
        if let Some(path) = self.channel_path {
            config.base_channel.path = path;
        }

        if let Some(password) = self.channel_password {
            config.base_channel.password = password;
        }

        // Options
        if !self.channels.is_empty() {
            config.channels = self.channels.iter().map(|c| parse_channel_arg(c)).collect();
            if self.mode.is_none() {
                config.options.channel_mode = ChannelMode::ManualList;
            }
        }

        if let Some(mode) = self.mode {
            config.options.channel_mode = mode.into();
        }

        if let Some(dir) = self.output_dir {
            config.options.output_dir = Some(dir);
        }

        if let Some(every) = self.notify_every {
            config.options.notify_every = every;
        }

        if let Some(secs) = self.stall_timeout {
            config.options.transfer_stall_timeout_secs = Some(secs);
        }

        if self.quiet {
            config.options.show_progress = false;
        }
    }
}
