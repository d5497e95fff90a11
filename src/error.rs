//! Error types for the tt-downloader-bot application.

use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    #[error("Profile error: {0}")]
    Profile(String),

    // Session errors
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Login failed: {0}")]
    Login(String),

    #[error("Channel not found for path: {0}")]
    ChannelNotFound(String),

    #[error("Failed to join channel '{path}': {message}")]
    JoinFailed { path: String, message: String },

    #[error("Session error: {0}")]
    Session(String),

    // File system errors
    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl Error {
    /// Whether this error ends the whole session (as opposed to one channel or file).
    pub fn is_session_error(&self) -> bool {
        matches!(
            self,
            Error::Connection(_)
                | Error::Login(_)
                | Error::ChannelNotFound(_)
                | Error::JoinFailed { .. }
                | Error::Session(_)
        )
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Process exit codes.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const SESSION_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    pub const UNEXPECTED_ERROR: i32 = 5;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_error_classification() {
        assert!(Error::Connection("lost".into()).is_session_error());
        assert!(Error::JoinFailed {
            path: "/Root".into(),
            message: "bad password".into()
        }
        .is_session_error());
        assert!(!Error::Config("bad".into()).is_session_error());
        assert!(!Error::InvalidFilename("..".into()).is_session_error());
    }
}
