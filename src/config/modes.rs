//! Channel selection mode definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which channels a campaign downloads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChannelMode {
    /// Only the base channel the bot sits in (default).
    #[default]
    Single,
    /// The channels listed in the configuration, in order.
    ManualList,
    /// Every channel on the server.
    AutoAll,
}

impl fmt::Display for ChannelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelMode::Single => write!(f, "single"),
            ChannelMode::ManualList => write!(f, "manual_list"),
            ChannelMode::AutoAll => write!(f, "auto_all"),
        }
    }
}

impl FromStr for ChannelMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single" => Ok(ChannelMode::Single),
            "manual_list" | "manual-list" | "manual" => Ok(ChannelMode::ManualList),
            "auto_all" | "auto-all" | "auto" => Ok(ChannelMode::AutoAll),
            _ => Err(format!("Unknown channel mode: {}", s)),
        }
    }
}

// Unknown modes in a config file behave like the configured channel list.
impl From<String> for ChannelMode {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|e| {
            tracing::warn!("{}, falling back to manual_list", e);
            ChannelMode::ManualList
        })
    }
}

impl From<ChannelMode> for String {
    fn from(mode: ChannelMode) -> Self {
        mode.to_string()
    }
}
