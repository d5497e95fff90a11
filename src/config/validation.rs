//! Configuration validation logic.

use crate::config::loader::{ChannelEntry, Config};
use crate::config::modes::ChannelMode;
use crate::error::{Error, Result};
use regex::Regex;

/// Maximum username length accepted by the server.
const MAX_USERNAME_LENGTH: usize = 64;

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_host(&config.server.host)?;
    validate_port("tcp_port", config.server.tcp_port)?;
    validate_port("udp_port", config.server.udp_port)?;
    validate_username(&config.account.username)?;
    validate_channel_path("base_channel.path", &config.base_channel.path)?;
    validate_notify_every(config.options.notify_every)?;
    validate_trigger_phrase(&config.options.trigger_phrase)?;

    if config.options.channel_mode == ChannelMode::ManualList {
        validate_channel_list(&config.channels)?;
    }

    Ok(())
}

/// Validate the server host name or address.
pub fn validate_host(host: &str) -> Result<()> {
    if host.trim().is_empty() {
        return Err(Error::MissingConfig("server.host".to_string()));
    }

    // Host names, IPv4 addresses, or bracket-less IPv6 addresses
    let host_pattern = Regex::new(r"^(?:[A-Za-z0-9](?:[A-Za-z0-9.\-]*[A-Za-z0-9])?|[0-9A-Fa-f:.]+)$")
        .map_err(|e| Error::Config(format!("Invalid host pattern: {}", e)))?;

    if !host_pattern.is_match(host.trim()) {
        return Err(Error::ConfigValidation {
            field: "server.host".to_string(),
            message: format!("'{}' is not a valid host name or address", host),
        });
    }

    Ok(())
}

/// Validate a port number.
pub fn validate_port(field: &str, port: u16) -> Result<()> {
    if port == 0 {
        return Err(Error::ConfigValidation {
            field: format!("server.{}", field),
            message: "Port must be between 1 and 65535".to_string(),
        });
    }
    Ok(())
}

/// Validate the login username.
pub fn validate_username(username: &str) -> Result<()> {
    if username.trim().is_empty() {
        return Err(Error::MissingConfig("account.username".to_string()));
    }

    if username.len() > MAX_USERNAME_LENGTH {
        return Err(Error::ConfigValidation {
            field: "account.username".to_string(),
            message: format!(
                "Username is too long (maximum {} characters)",
                MAX_USERNAME_LENGTH
            ),
        });
    }

    Ok(())
}

/// Validate a channel path such as `/Root/Files`.
pub fn validate_channel_path(field: &str, path: &str) -> Result<()> {
    let path = path.trim();
    if path.is_empty() {
        return Err(Error::MissingConfig(field.to_string()));
    }

    if !path.starts_with('/') {
        return Err(Error::ConfigValidation {
            field: field.to_string(),
            message: format!("Channel path '{}' must start with '/'", path),
        });
    }

    Ok(())
}

/// Validate the channel list used by `manual_list` mode.
///
/// Empty paths are tolerated (they are skipped when the queue is built). A
/// list with no usable entry only warns: the bot still starts and answers a
/// trigger with "No channels configured for download."
pub fn validate_channel_list(channels: &[ChannelEntry]) -> Result<()> {
    let usable: Vec<_> = channels
        .iter()
        .filter(|c| !c.path.trim().is_empty())
        .collect();

    if usable.is_empty() {
        tracing::warn!("manual_list mode has no channel paths configured");
    }

    for entry in usable {
        validate_channel_path("channels.path", &entry.path)?;
    }

    Ok(())
}

/// Validate the running-total notification interval.
pub fn validate_notify_every(notify_every: u64) -> Result<()> {
    if notify_every == 0 {
        return Err(Error::ConfigValidation {
            field: "options.notify_every".to_string(),
            message: "Must be at least 1".to_string(),
        });
    }
    Ok(())
}

/// Validate the trigger phrase.
pub fn validate_trigger_phrase(phrase: &str) -> Result<()> {
    if phrase.trim().is_empty() {
        return Err(Error::MissingConfig("options.trigger_phrase".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.server.host = "tt.example.org".into();
        config.account.username = "downloader".into();
        config
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_hosts() {
        assert!(validate_host("127.0.0.1").is_ok());
        assert!(validate_host("tt.example.org").is_ok());
        assert!(validate_host("::1").is_ok());
        assert!(validate_host("").is_err());
        assert!(validate_host("bad host").is_err());
        assert!(validate_host("-leading.dash").is_err());
    }

    #[test]
    fn test_zero_port_rejected() {
        let mut config = valid_config();
        config.server.udp_port = 0;
        assert!(matches!(
            validate_config(&config),
            Err(Error::ConfigValidation { .. })
        ));
    }

    #[test]
    fn test_channel_paths() {
        assert!(validate_channel_path("base", "/").is_ok());
        assert!(validate_channel_path("base", "/Root/Files").is_ok());
        assert!(validate_channel_path("base", "Root").is_err());
        assert!(validate_channel_path("base", "  ").is_err());
    }

    #[test]
    fn test_manual_list_channels() {
        let mut config = valid_config();
        config.options.channel_mode = ChannelMode::ManualList;
        // an empty list still starts; the trigger reports it
        assert!(validate_config(&config).is_ok());

        config.channels.push(ChannelEntry::new("", ""));
        config.channels.push(ChannelEntry::new("/Root/Files", "pw"));
        assert!(validate_config(&config).is_ok());

        config.channels.push(ChannelEntry::new("Root/NoSlash", ""));
        assert!(matches!(
            validate_config(&config),
            Err(Error::ConfigValidation { .. })
        ));
    }

    #[test]
    fn test_unknown_mode_without_channels_starts() {
        let mut config = valid_config();
        config.options.channel_mode = ChannelMode::from("everything".to_string());
        assert_eq!(config.options.channel_mode, ChannelMode::ManualList);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_notify_every_and_trigger() {
        assert!(validate_notify_every(0).is_err());
        assert!(validate_notify_every(1).is_ok());
        assert!(validate_trigger_phrase("   ").is_err());
        assert!(validate_trigger_phrase("download files").is_ok());
    }
}
