//! Progress bar utilities.

use std::collections::HashMap;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::bot::TransferKey;

/// Create a progress bar for downloads.
pub fn create_download_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    bar.set_style(style);
    bar
}

/// One progress bar per in-flight transfer.
pub struct TransferBars {
    multi: MultiProgress,
    bars: HashMap<TransferKey, ProgressBar>,
}

impl TransferBars {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: HashMap::new(),
        }
    }

    /// Bars that track state but never draw.
    pub fn hidden() -> Self {
        Self {
            multi: MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
            bars: HashMap::new(),
        }
    }

    pub fn update(&mut self, key: &TransferKey, transferred: u64, total: u64) {
        let multi = &self.multi;
        let bar = self.bars.entry(key.clone()).or_insert_with(|| {
            let bar = multi.add(create_download_bar(total));
            bar.set_message(key.remote_name.clone());
            bar
        });
        bar.set_length(total);
        bar.set_position(transferred.min(total));
    }

    pub fn finish(&mut self, key: &TransferKey) {
        if let Some(bar) = self.bars.remove(key) {
            bar.finish_and_clear();
        }
    }

    pub fn clear(&mut self) {
        for (_, bar) in self.bars.drain() {
            bar.finish_and_clear();
        }
    }

    pub fn active(&self) -> usize {
        self.bars.len()
    }
}

impl Default for TransferBars {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ChannelId;

    #[test]
    fn test_bars_follow_transfers() {
        let mut bars = TransferBars::hidden();
        let key = TransferKey::new(ChannelId(1), "a.bin");

        bars.update(&key, 10, 100);
        bars.update(&key, 50, 100);
        assert_eq!(bars.active(), 1);

        bars.finish(&key);
        assert_eq!(bars.active(), 0);

        bars.update(&key, 1, 2);
        bars.clear();
        assert_eq!(bars.active(), 0);
    }
}
