//! Saved server and channel profiles.
//!
//! A profile directory holds `servers/<name>.json` (connection, account, base
//! channel and output folder) and `channels/<name>.json` (the channel list
//! used with that server).

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::config::loader::{ChannelEntry, Config};
use crate::config::modes::ChannelMode;
use crate::error::{Error, Result};
use crate::fs::sanitize_channel_folder;

const SERVERS_DIR: &str = "servers";
const CHANNELS_DIR: &str = "channels";

/// A saved server connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerProfile {
    pub name: String,
    pub host: String,
    #[serde(default = "default_port")]
    pub tcp_port: u16,
    #[serde(default = "default_port")]
    pub udp_port: u16,
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default = "default_base_path")]
    pub base_channel_path: String,
    #[serde(default)]
    pub base_channel_password: String,
    #[serde(default)]
    pub encrypted: bool,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

fn default_port() -> u16 {
    10333
}

fn default_base_path() -> String {
    "/".to_string()
}

impl ServerProfile {
    /// Capture the connection part of a configuration.
    pub fn from_config(name: &str, config: &Config) -> Self {
        Self {
            name: name.to_string(),
            host: config.server.host.clone(),
            tcp_port: config.server.tcp_port,
            udp_port: config.server.udp_port,
            username: config.account.username.clone(),
            password: config.account.password.clone(),
            nickname: config.account.nickname.clone(),
            base_channel_path: config.base_channel.path.clone(),
            base_channel_password: config.base_channel.password.clone(),
            encrypted: config.server.encrypted,
            output_dir: config.options.output_dir.clone(),
        }
    }

    /// Overlay this profile and its channel list onto `config`.
    ///
    /// A non-empty channel list switches the mode to `manual_list`.
    pub fn apply_to(&self, config: &mut Config, channels: Vec<ChannelEntry>) {
        config.server.host = self.host.clone();
        config.server.tcp_port = self.tcp_port;
        config.server.udp_port = self.udp_port;
        config.server.encrypted = self.encrypted;
        config.account.username = self.username.clone();
        config.account.password = self.password.clone();
        if !self.nickname.trim().is_empty() {
            config.account.nickname = self.nickname.clone();
        }
        config.base_channel = ChannelEntry::new(
            self.base_channel_path.clone(),
            self.base_channel_password.clone(),
        );
        if self.output_dir.is_some() {
            config.options.output_dir = self.output_dir.clone();
        }
        if !channels.is_empty() {
            config.channels = channels;
            config.options.channel_mode = ChannelMode::ManualList;
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ChannelProfile {
    #[serde(default)]
    channels: Vec<ChannelEntry>,
}

/// Profile storage rooted at one directory.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    root: PathBuf,
}

impl ProfileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The per-user profile directory, or `./profiles` when none is known.
    pub fn default_location() -> PathBuf {
        ProjectDirs::from("", "", "tt-downloader-bot")
            .map(|dirs| dirs.config_dir().join("profiles"))
            .unwrap_or_else(|| PathBuf::from("profiles"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names of all saved server profiles, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let dir = self.root.join(SERVERS_DIR);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names: Vec<String> = fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("json"))
            })
            .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        names.sort();
        Ok(names)
    }

    pub fn load_server(&self, name: &str) -> Result<Option<ServerProfile>> {
        let path = self.server_path(name)?;
        if !path.is_file() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let mut profile: ServerProfile = serde_json::from_str(&content)?;
        if profile.name.is_empty() {
            profile.name = name.to_string();
        }
        Ok(Some(profile))
    }

    pub fn save_server(&self, profile: &ServerProfile) -> Result<()> {
        let path = self.server_path(&profile.name)?;
        write_json(&path, profile)?;
        tracing::debug!("Saved server profile to {}", path.display());
        Ok(())
    }

    /// Delete a server profile together with its channel profile.
    pub fn delete_server(&self, name: &str) -> Result<bool> {
        let path = self.server_path(name)?;
        let existed = path.is_file();
        if existed {
            fs::remove_file(&path)?;
        }
        self.delete_channels(name)?;
        Ok(existed)
    }

    /// Channel list for a server profile; empty when none is saved.
    pub fn load_channels(&self, name: &str) -> Result<Vec<ChannelEntry>> {
        let path = self.channels_path(name)?;
        if !path.is_file() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)?;
        let profile: ChannelProfile = serde_json::from_str(&content)?;
        Ok(profile.channels)
    }

    pub fn save_channels(&self, name: &str, channels: &[ChannelEntry]) -> Result<()> {
        let path = self.channels_path(name)?;
        write_json(
            &path,
            &ChannelProfile {
                channels: channels.to_vec(),
            },
        )
    }

    pub fn delete_channels(&self, name: &str) -> Result<()> {
        let path = self.channels_path(name)?;
        if path.is_file() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    fn server_path(&self, name: &str) -> Result<PathBuf> {
        Ok(self
            .root
            .join(SERVERS_DIR)
            .join(format!("{}.json", profile_file_stem(name)?)))
    }

    fn channels_path(&self, name: &str) -> Result<PathBuf> {
        Ok(self
            .root
            .join(CHANNELS_DIR)
            .join(format!("{}.json", profile_file_stem(name)?)))
    }
}

/// Spaces become underscores; characters unsafe in file names are dropped.
fn profile_file_stem(name: &str) -> Result<String> {
    sanitize_channel_folder(&name.replace(' ', "_"))
        .ok_or_else(|| Error::Profile(format!("Invalid profile name: '{}'", name)))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_config() -> Config {
        let mut config = Config::default();
        config.server.host = "tt.example.org".into();
        config.server.tcp_port = 10444;
        config.account.username = "bot".into();
        config.account.password = "secret".into();
        config.base_channel = ChannelEntry::new("/Root", "rootpw");
        config
    }

    #[test]
    fn test_save_load_and_list() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::new(dir.path());
        assert!(store.list().unwrap().is_empty());

        let profile = ServerProfile::from_config("Home Server", &sample_config());
        store.save_server(&profile).unwrap();
        store
            .save_channels("Home Server", &[ChannelEntry::new("/Root/Music", "")])
            .unwrap();

        assert!(dir.path().join("servers/Home_Server.json").is_file());
        assert_eq!(store.list().unwrap(), vec!["Home_Server"]);
        assert_eq!(store.load_server("Home Server").unwrap(), Some(profile));
        assert_eq!(store.load_channels("Home Server").unwrap().len(), 1);
        assert!(store.load_server("missing").unwrap().is_none());
    }

    #[test]
    fn test_delete_removes_channel_profile() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::new(dir.path());
        store
            .save_server(&ServerProfile::from_config("a", &sample_config()))
            .unwrap();
        store
            .save_channels("a", &[ChannelEntry::new("/X", "")])
            .unwrap();

        assert!(store.delete_server("a").unwrap());
        assert!(store.load_channels("a").unwrap().is_empty());
        assert!(!store.delete_server("a").unwrap());
    }

    #[test]
    fn test_reads_flat_json_with_defaults() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::new(dir.path());
        fs::create_dir_all(dir.path().join("servers")).unwrap();
        fs::write(
            dir.path().join("servers/lan.json"),
            r#"{"name": "", "host": "10.0.0.2", "username": "me"}"#,
        )
        .unwrap();

        let profile = store.load_server("lan").unwrap().unwrap();
        assert_eq!(profile.name, "lan");
        assert_eq!(profile.tcp_port, 10333);
        assert_eq!(profile.base_channel_path, "/");
    }

    #[test]
    fn test_apply_selects_manual_list() {
        let profile = ServerProfile::from_config("p", &sample_config());

        let mut config = Config::default();
        profile.apply_to(&mut config, Vec::new());
        assert_eq!(config.server.host, "tt.example.org");
        assert_eq!(config.base_channel.password(), Some("rootpw"));
        assert_eq!(config.options.channel_mode, ChannelMode::Single);

        profile.apply_to(&mut config, vec![ChannelEntry::new("/A", "")]);
        assert_eq!(config.options.channel_mode, ChannelMode::ManualList);
        assert_eq!(config.channels.len(), 1);
    }

    #[test]
    fn test_invalid_profile_name() {
        let store = ProfileStore::new("/nonexistent");
        assert!(matches!(store.load_server("???"), Err(Error::Profile(_))));
    }
}
