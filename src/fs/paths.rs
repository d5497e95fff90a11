//! Path and directory management.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::fs::naming::{sanitize_channel_folder, sanitize_filename};
use crate::session::{ChannelId, FileId};

/// Get the local folder for a channel's files.
///
/// Falls back to `channel_<id>` when the channel path sanitizes to nothing.
pub fn channel_folder(output_dir: &Path, channel_path: &str, channel_id: ChannelId) -> PathBuf {
    let folder = sanitize_channel_folder(channel_path)
        .unwrap_or_else(|| format!("channel_{}", channel_id));
    output_dir.join(folder)
}

/// Get the local destination for a remote file inside a channel folder.
pub fn local_file_path(target_dir: &Path, remote_name: &str, file_id: FileId) -> PathBuf {
    let filename = match sanitize_filename(remote_name) {
        Ok(name) => name,
        Err(e) => {
            tracing::warn!("{}; saving as file_{}", e, file_id);
            format!("file_{}", file_id)
        }
    };
    target_dir.join(filename)
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;
    Ok(())
}
