//! TT Downloader Bot - a chat-triggered channel file downloader
//!
//! The bot logs into a collaboration server, joins a base channel and waits
//! for a trigger phrase. Each accepted request starts a download campaign over
//! one or more channels, with progress reported back to the requester.
//!
//! # Features
//!
//! - Trigger by private or channel message
//! - Single channel, manual channel list, or every channel on the server
//! - Password prompts over chat for protected channels
//! - Per-channel download folders with sanitized names
//! - Saved server and channel profiles
//! - A local directory mirror backend for running without a server
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use tt_downloader_bot::{Bot, Config, LocalSession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(Path::new("config.toml"))?;
//!     let (session, events) = LocalSession::new("./mirror");
//!     let mut bot = Bot::new(session, events, &config);
//!     bot.run().await?;
//!     Ok(())
//! }
//! ```

pub mod bot;
pub mod cli;
pub mod config;
pub mod error;
pub mod fs;
pub mod output;
pub mod session;

// Re-exports for convenience
pub use bot::{Bot, Orchestrator};
pub use config::{ChannelMode, Config};
pub use error::{Error, Result};
pub use session::{LocalSession, SessionClient, SessionEvent};
