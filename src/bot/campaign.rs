//! Campaign state: the channel queue and transfer accounting.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::session::{ChannelId, FileTransfer, TransferStatus};

/// One channel's pending download job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelTask {
    pub channel_id: ChannelId,
    pub display_path: String,
    pub password: Option<String>,
    /// The server reports the channel as password-protected.
    pub requires_password: bool,
}

impl ChannelTask {
    pub fn new(channel_id: ChannelId, display_path: impl Into<String>) -> Self {
        Self {
            channel_id,
            display_path: display_path.into(),
            password: None,
            requires_password: false,
        }
    }

    /// Whether a password has to be asked for before downloading.
    pub fn needs_password(&self) -> bool {
        self.requires_password && self.password.is_none()
    }
}

/// Correlates a requested download with its status events.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransferKey {
    pub channel_id: ChannelId,
    pub remote_name: String,
}

impl TransferKey {
    pub fn new(channel_id: ChannelId, remote_name: impl Into<String>) -> Self {
        Self {
            channel_id,
            remote_name: remote_name.into(),
        }
    }
}

impl From<&FileTransfer> for TransferKey {
    fn from(transfer: &FileTransfer) -> Self {
        Self::new(transfer.channel_id, transfer.remote_name.clone())
    }
}

/// Per-channel transfer counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelCounters {
    /// Transfers that actually started.
    pub pending: u64,
    /// Started transfers that reached a terminal status.
    pub completed: u64,
}

/// Statistics for one campaign, printed when it ends.
#[derive(Debug, Clone)]
pub struct CampaignStats {
    pub started_at: DateTime<Utc>,
    pub channels_queued: usize,
    pub channels_downloaded: u64,
    pub channels_empty: u64,
    pub channels_skipped: u64,
    pub channels_failed: u64,
    pub files_finished: u64,
    pub files_failed: u64,
    pub files_closed: u64,
    pub files_stalled: u64,
    pub failed_starts: u64,
}

impl CampaignStats {
    fn new(channels_queued: usize) -> Self {
        Self {
            started_at: Utc::now(),
            channels_queued,
            channels_downloaded: 0,
            channels_empty: 0,
            channels_skipped: 0,
            channels_failed: 0,
            files_finished: 0,
            files_failed: 0,
            files_closed: 0,
            files_stalled: 0,
            failed_starts: 0,
        }
    }
}

/// Result of recording a terminal transfer status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Campaign-wide completed count, including this transfer.
    pub total_completed: u64,
    /// The running total is due to be announced.
    pub notify_total: bool,
    /// This transfer was the last pending one of its channel.
    pub channel_done: bool,
}

#[derive(Debug, Clone)]
struct ExpectedTransfer {
    local_path: PathBuf,
    last_activity: Instant,
}

/// The single active download campaign.
#[derive(Debug)]
pub struct DownloadCampaign {
    pub queue: VecDeque<ChannelTask>,
    pub current_channel: Option<ChannelId>,
    /// Task popped from the queue and parked until a password reply arrives.
    pub awaiting_password: Option<ChannelTask>,
    pub total_completed: u64,
    pub notify_every: u64,
    pub stats: CampaignStats,
    expected: HashMap<TransferKey, ExpectedTransfer>,
    completed: HashSet<TransferKey>,
    counters: HashMap<ChannelId, ChannelCounters>,
    paths: HashMap<ChannelId, String>,
}

impl DownloadCampaign {
    pub fn new(tasks: Vec<ChannelTask>, notify_every: u64) -> Self {
        let paths = tasks
            .iter()
            .map(|t| (t.channel_id, t.display_path.clone()))
            .collect();

        Self {
            stats: CampaignStats::new(tasks.len()),
            queue: tasks.into(),
            current_channel: None,
            awaiting_password: None,
            total_completed: 0,
            notify_every: notify_every.max(1),
            expected: HashMap::new(),
            completed: HashSet::new(),
            counters: HashMap::new(),
            paths,
        }
    }

    /// Channel the campaign is blocked on, waiting for a password reply.
    pub fn awaiting_password_for(&self) -> Option<ChannelId> {
        self.awaiting_password.as_ref().map(|t| t.channel_id)
    }

    /// Take the next task and make its channel the current one.
    pub fn pop_next(&mut self) -> Option<ChannelTask> {
        let task = self.queue.pop_front()?;
        self.current_channel = Some(task.channel_id);
        Some(task)
    }

    /// Display path of a channel in this campaign.
    pub fn channel_path(&self, channel: ChannelId) -> String {
        self.paths
            .get(&channel)
            .cloned()
            .unwrap_or_else(|| format!("channel_{}", channel))
    }

    /// Register a transfer about to be requested.
    ///
    /// Re-registering a key (the same channel queued twice) starts a fresh
    /// expectation for it.
    pub fn register(&mut self, key: TransferKey, local_path: PathBuf, now: Instant) {
        self.completed.remove(&key);
        self.expected.insert(
            key,
            ExpectedTransfer {
                local_path,
                last_activity: now,
            },
        );
    }

    /// A transfer that could not be started counts as done, with no retry.
    pub fn mark_start_failed(&mut self, key: TransferKey) {
        self.completed.insert(key);
        self.stats.failed_starts += 1;
    }

    /// Fix a channel's pending count once every start attempt was issued.
    pub fn finalize_channel(&mut self, channel: ChannelId, started: u64) {
        self.counters.insert(
            channel,
            ChannelCounters {
                pending: started,
                completed: 0,
            },
        );
    }

    pub fn counters(&self, channel: ChannelId) -> Option<ChannelCounters> {
        self.counters.get(&channel).copied()
    }

    pub fn is_expected(&self, key: &TransferKey) -> bool {
        self.expected.contains_key(key)
    }

    pub fn is_completed(&self, key: &TransferKey) -> bool {
        self.completed.contains(key)
    }

    pub fn local_path(&self, key: &TransferKey) -> Option<&Path> {
        self.expected.get(key).map(|e| e.local_path.as_path())
    }

    /// Note progress on an in-flight transfer.
    pub fn touch(&mut self, key: &TransferKey, now: Instant) {
        if self.completed.contains(key) {
            return;
        }
        if let Some(expected) = self.expected.get_mut(key) {
            expected.last_activity = now;
        }
    }

    /// Record a terminal status. Returns `None` for unknown keys and for keys
    /// already completed, so duplicate terminal events change nothing.
    pub fn record_terminal(&mut self, key: &TransferKey, status: TransferStatus) -> Option<Completion> {
        if !self.expected.contains_key(key) || !self.completed.insert(key.clone()) {
            return None;
        }

        self.total_completed += 1;
        match status {
            TransferStatus::Finished => self.stats.files_finished += 1,
            TransferStatus::Error => self.stats.files_failed += 1,
            TransferStatus::Closed | TransferStatus::Active => self.stats.files_closed += 1,
        }

        let channel_done = match self.counters.get_mut(&key.channel_id) {
            Some(counters) => {
                counters.completed += 1;
                counters.completed == counters.pending
            }
            None => false,
        };

        Some(Completion {
            total_completed: self.total_completed,
            notify_total: self.total_completed % self.notify_every == 0,
            channel_done,
        })
    }

    /// In-flight transfers of `channel` silent for at least `timeout`.
    pub fn stalled(&self, channel: ChannelId, now: Instant, timeout: Duration) -> Vec<TransferKey> {
        let mut keys: Vec<TransferKey> = self
            .expected
            .iter()
            .filter(|(key, _)| key.channel_id == channel && !self.completed.contains(*key))
            .filter(|(_, e)| now.saturating_duration_since(e.last_activity) >= timeout)
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campaign_with_files(channel: ChannelId, names: &[&str]) -> DownloadCampaign {
        let mut campaign = DownloadCampaign::new(vec![ChannelTask::new(channel, "/Root")], 10);
        let now = Instant::now();
        for name in names {
            campaign.register(
                TransferKey::new(channel, *name),
                PathBuf::from(format!("/out/{}", name)),
                now,
            );
        }
        campaign.finalize_channel(channel, names.len() as u64);
        campaign
    }

    #[test]
    fn test_duplicate_terminal_event_is_noop() {
        let channel = ChannelId(3);
        let mut campaign = campaign_with_files(channel, &["a", "b"]);
        let key = TransferKey::new(channel, "a");

        let first = campaign.record_terminal(&key, TransferStatus::Finished).unwrap();
        assert_eq!(first.total_completed, 1);
        assert!(!first.channel_done);

        assert!(campaign
            .record_terminal(&key, TransferStatus::Closed)
            .is_none());
        assert_eq!(campaign.total_completed, 1);
        assert_eq!(
            campaign.counters(channel),
            Some(ChannelCounters {
                pending: 2,
                completed: 1
            })
        );
    }

    #[test]
    fn test_unknown_key_is_ignored() {
        let channel = ChannelId(3);
        let mut campaign = campaign_with_files(channel, &["a"]);
        assert!(campaign
            .record_terminal(&TransferKey::new(channel, "zzz"), TransferStatus::Finished)
            .is_none());
        assert_eq!(campaign.total_completed, 0);
    }

    #[test]
    fn test_channel_done_fires_once_at_pending() {
        let channel = ChannelId(3);
        let mut campaign = campaign_with_files(channel, &["a", "b", "c"]);

        let done: Vec<bool> = ["a", "b", "c"]
            .iter()
            .map(|n| {
                campaign
                    .record_terminal(&TransferKey::new(channel, *n), TransferStatus::Finished)
                    .unwrap()
                    .channel_done
            })
            .collect();
        assert_eq!(done, vec![false, false, true]);

        let counters = campaign.counters(channel).unwrap();
        assert!(counters.completed <= counters.pending);
    }

    #[test]
    fn test_notify_every_tenth_completion() {
        let channel = ChannelId(1);
        let names: Vec<String> = (0..25).map(|i| format!("f{}", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut campaign = campaign_with_files(channel, &refs);

        let notified: Vec<u64> = names
            .iter()
            .filter_map(|n| {
                campaign.record_terminal(&TransferKey::new(channel, n.as_str()), TransferStatus::Error)
            })
            .filter(|c| c.notify_total)
            .map(|c| c.total_completed)
            .collect();
        assert_eq!(notified, vec![10, 20]);
        assert_eq!(campaign.stats.files_failed, 25);
    }

    #[test]
    fn test_failed_start_blocks_later_events() {
        let channel = ChannelId(2);
        let mut campaign = DownloadCampaign::new(vec![ChannelTask::new(channel, "/x")], 10);
        let key = TransferKey::new(channel, "broken.bin");
        campaign.register(key.clone(), PathBuf::from("/out/broken.bin"), Instant::now());
        campaign.mark_start_failed(key.clone());
        campaign.finalize_channel(channel, 0);

        assert!(campaign.is_completed(&key));
        assert!(campaign.record_terminal(&key, TransferStatus::Error).is_none());
        assert_eq!(campaign.total_completed, 0);
        assert_eq!(campaign.stats.failed_starts, 1);
    }

    #[test]
    fn test_stalled_transfers() {
        let channel = ChannelId(5);
        let start = Instant::now();
        let mut campaign = DownloadCampaign::new(vec![ChannelTask::new(channel, "/x")], 10);
        campaign.register(TransferKey::new(channel, "a"), PathBuf::from("a"), start);
        campaign.register(TransferKey::new(channel, "b"), PathBuf::from("b"), start);
        campaign.finalize_channel(channel, 2);

        let later = start + Duration::from_secs(30);
        campaign.touch(&TransferKey::new(channel, "b"), later);

        let stalled = campaign.stalled(channel, later, Duration::from_secs(20));
        assert_eq!(stalled, vec![TransferKey::new(channel, "a")]);
        assert!(campaign
            .stalled(ChannelId(6), later, Duration::from_secs(20))
            .is_empty());
    }

    #[test]
    fn test_pop_next_is_fifo() {
        let mut campaign = DownloadCampaign::new(
            vec![
                ChannelTask::new(ChannelId(1), "/a"),
                ChannelTask::new(ChannelId(2), "/b"),
            ],
            10,
        );
        assert_eq!(campaign.pop_next().unwrap().channel_id, ChannelId(1));
        assert_eq!(campaign.current_channel, Some(ChannelId(1)));
        assert_eq!(campaign.pop_next().unwrap().channel_id, ChannelId(2));
        assert!(campaign.pop_next().is_none());
        assert_eq!(campaign.channel_path(ChannelId(2)), "/b");
        assert_eq!(campaign.channel_path(ChannelId(9)), "channel_9");
    }
}
