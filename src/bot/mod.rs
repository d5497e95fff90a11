//! The download bot.
//!
//! This module provides:
//! - Chat message recognition (trigger phrase, password replies)
//! - Channel queue building for each channel mode
//! - The campaign orchestrator and its transfer accounting
//! - The session lifecycle and event loop

pub mod campaign;
pub mod notices;
pub mod orchestrator;
pub mod queue;
pub mod recognizer;
pub mod reply;
pub mod runner;

pub use campaign::{CampaignStats, ChannelCounters, ChannelTask, DownloadCampaign, TransferKey};
pub use orchestrator::{CampaignSettings, Orchestrator};
pub use queue::{build_queue, QueueBuild};
pub use recognizer::{classify, CampaignView, Command, PasswordReply, RecognizerSettings};
pub use reply::{Origin, ReplySink};
pub use runner::{Bot, ConnectionSettings, CLIENT_NAME};
