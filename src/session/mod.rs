//! Session module.
//!
//! This module provides:
//! - The `SessionClient` capability set the bot drives
//! - Session event and identifier types
//! - A directory-backed local session

pub mod client;
#[cfg(test)]
pub mod fake;
pub mod local;
pub mod types;

pub use client::SessionClient;
pub use local::LocalSession;
pub use types::*;
