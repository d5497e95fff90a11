//! Output module for console output and progress.
//!
//! Provides:
//! - Colored console output
//! - Per-transfer progress bars
//! - Campaign statistics reporting

pub mod console;
pub mod progress;
pub mod stats;

pub use console::{
    print_banner, print_chat, print_config_summary, print_error, print_info, print_success,
    print_warning,
};
pub use progress::{create_download_bar, TransferBars};
pub use stats::print_campaign_stats;
