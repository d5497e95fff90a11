//! Texts of the chat notices the bot sends to the requester.

pub fn already_running() -> String {
    "Downloads are already running.".to_string()
}

pub fn not_ready() -> String {
    "I'm not in a channel yet. Please try again in a moment.".to_string()
}

pub fn no_channels() -> String {
    "No channels configured for download.".to_string()
}

pub fn channel_not_found(path: &str) -> String {
    format!("Channel not found for path: {}", path)
}

pub fn starting(channels: usize, first: &str) -> String {
    format!(
        "Starting downloads from {} channel(s). First up: '{}'.",
        channels, first
    )
}

pub fn password_needed(path: &str) -> String {
    format!(
        "Channel '{}' likely requires a password. Reply with the password only, or type 'skip' to skip this channel.",
        path
    )
}

pub fn skipping(path: &str) -> String {
    format!("Skipping channel '{}' (no password provided).", path)
}

pub fn password_saved(path: &str) -> String {
    format!("Password saved for channel '{}'.", path)
}

pub fn downloading(path: &str) -> String {
    format!("Downloading files from channel '{}'.", path)
}

pub fn no_files(path: &str) -> String {
    format!("Channel '{}' contains no files. Moving on.", path)
}

pub fn start_failed(path: &str) -> String {
    format!("Failed to start transfers for channel '{}'. Moving on.", path)
}

pub fn folder_failed(path: &str) -> String {
    format!(
        "Could not create a download folder for channel '{}'. Moving on.",
        path
    )
}

pub fn total_progress(total: u64) -> String {
    format!("Downloaded a total of {} files...", total)
}

pub fn channel_finished(path: &str) -> String {
    format!("Finished downloading files from channel '{}'.", path)
}

pub fn all_finished(total: u64) -> String {
    format!(
        "Finished downloading from all channels. Total files downloaded: {}.",
        total
    )
}
