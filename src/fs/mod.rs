//! Filesystem module.
//!
//! Provides:
//! - Channel folder and destination path management
//! - Folder and filename sanitization

pub mod naming;
pub mod paths;

pub use naming::{sanitize_channel_folder, sanitize_filename};
pub use paths::{channel_folder, ensure_dir, local_file_path};
