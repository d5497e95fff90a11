//! Campaign orchestration.
//!
//! The orchestrator owns the single active [`DownloadCampaign`] and exposes the
//! event-handling operations as its only mutation points. It never blocks:
//! every operation issues session calls and returns, and transfer outcomes
//! come back later through [`Orchestrator::on_transfer_event`].

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::bot::campaign::{ChannelTask, DownloadCampaign, TransferKey};
use crate::bot::notices;
use crate::bot::queue::build_queue;
use crate::bot::recognizer::{CampaignView, PasswordReply};
use crate::bot::reply::{Origin, ReplySink};
use crate::config::{ChannelEntry, ChannelMode, Config};
use crate::fs::{channel_folder, ensure_dir, local_file_path};
use crate::output::{print_campaign_stats, TransferBars};
use crate::session::{ChannelId, DownloadRequest, FileTransfer, SessionClient, TransferStatus};

/// Campaign-relevant slice of the configuration.
#[derive(Debug, Clone)]
pub struct CampaignSettings {
    pub channel_mode: ChannelMode,
    pub base_channel: ChannelEntry,
    pub channels: Vec<ChannelEntry>,
    pub output_dir: PathBuf,
    pub notify_every: u64,
    pub dedupe_channels: bool,
    pub stall_timeout: Option<Duration>,
    pub show_progress: bool,
}

impl CampaignSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            channel_mode: config.options.channel_mode,
            base_channel: config.base_channel.clone(),
            channels: config.channels.clone(),
            output_dir: config.output_dir(),
            notify_every: config.options.notify_every.max(1),
            dedupe_channels: config.options.dedupe_channels,
            stall_timeout: config.stall_timeout(),
            show_progress: config.options.show_progress,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChannelStart {
    Started,
    Empty,
    Failed,
}

pub struct Orchestrator {
    settings: CampaignSettings,
    base_channel: Option<ChannelId>,
    reply: ReplySink,
    campaign: Option<DownloadCampaign>,
    progress: TransferBars,
}

impl Orchestrator {
    pub fn new(settings: CampaignSettings) -> Self {
        let progress = if settings.show_progress {
            TransferBars::new()
        } else {
            TransferBars::hidden()
        };

        Self {
            settings,
            base_channel: None,
            reply: ReplySink::new(),
            campaign: None,
            progress,
        }
    }

    /// Record the joined base channel. Triggers are refused until it is set.
    pub fn set_base_channel(&mut self, channel: Option<ChannelId>) {
        self.base_channel = channel.filter(|id| id.is_valid());
    }

    pub fn base_channel(&self) -> Option<ChannelId> {
        self.base_channel
    }

    pub fn is_active(&self) -> bool {
        self.campaign.is_some()
    }

    pub fn campaign(&self) -> Option<&DownloadCampaign> {
        self.campaign.as_ref()
    }

    pub fn view(&self) -> CampaignView {
        CampaignView {
            awaiting_password: self
                .campaign
                .as_ref()
                .and_then(DownloadCampaign::awaiting_password_for)
                .is_some(),
            origin: self.reply.origin(),
        }
    }

    /// Handle an accepted trigger phrase from `origin`.
    pub fn on_trigger(&mut self, session: &mut dyn SessionClient, origin: Origin) {
        if self.campaign.is_some() {
            ReplySink::send_to(session, origin, &notices::already_running());
            return;
        }

        let Some(base) = self.base_channel else {
            ReplySink::send_to(session, origin, &notices::not_ready());
            return;
        };

        tracing::info!("Download request from {:?}", origin);
        self.progress.clear();
        self.reply.set_origin(origin);

        let build = build_queue(&self.settings, Some(base), session);
        for error in &build.errors {
            self.reply.send(session, error);
        }

        let Some(first) = build.tasks.first() else {
            self.reply.send(session, &notices::no_channels());
            self.reply.clear();
            return;
        };

        self.reply.send(
            session,
            &notices::starting(build.tasks.len(), &first.display_path),
        );
        self.campaign = Some(DownloadCampaign::new(
            build.tasks,
            self.settings.notify_every,
        ));
        self.advance(session);
    }

    /// Move to the next channel that can be started, or finish the campaign.
    pub fn advance(&mut self, session: &mut dyn SessionClient) {
        loop {
            let Some(campaign) = self.campaign.as_mut() else {
                return;
            };
            campaign.awaiting_password = None;

            let Some(task) = campaign.pop_next() else {
                self.finish(session);
                return;
            };

            if task.needs_password() {
                tracing::info!("Waiting for a password for channel '{}'", task.display_path);
                let prompt = notices::password_needed(&task.display_path);
                campaign.awaiting_password = Some(task);
                self.reply.send(session, &prompt);
                return;
            }

            self.reply
                .send(session, &notices::downloading(&task.display_path));
            if self.start_channel_downloads(session, &task) == ChannelStart::Started {
                return;
            }
        }
    }

    fn start_channel_downloads(
        &mut self,
        session: &mut dyn SessionClient,
        task: &ChannelTask,
    ) -> ChannelStart {
        let Some(campaign) = self.campaign.as_mut() else {
            return ChannelStart::Failed;
        };

        let target_dir = channel_folder(
            &self.settings.output_dir,
            &task.display_path,
            task.channel_id,
        );
        if let Err(e) = ensure_dir(&target_dir) {
            tracing::error!(
                "Failed to create folder {}: {}",
                target_dir.display(),
                e
            );
            campaign.stats.channels_failed += 1;
            self.reply
                .send(session, &notices::folder_failed(&task.display_path));
            return ChannelStart::Failed;
        }

        let files = session.channel_files(task.channel_id);
        if files.is_empty() {
            tracing::info!("Channel '{}' contains no files", task.display_path);
            campaign.finalize_channel(task.channel_id, 0);
            campaign.stats.channels_empty += 1;
            self.reply
                .send(session, &notices::no_files(&task.display_path));
            return ChannelStart::Empty;
        }

        tracing::info!(
            "Found {} file(s) in channel '{}'",
            files.len(),
            task.display_path
        );

        let now = Instant::now();
        let mut started = 0u64;
        for file in &files {
            let local_path = local_file_path(&target_dir, &file.name, file.file_id);
            let key = TransferKey::new(file.channel_id, file.name.clone());
            campaign.register(key.clone(), local_path.clone(), now);

            let request = DownloadRequest {
                channel_id: file.channel_id,
                file_id: file.file_id,
                local_path,
                password: task.password.clone(),
            };
            match session.start_download(request) {
                Some(handle) if handle.is_valid() => {
                    tracing::debug!("Started transfer {} for {}", handle, file.name);
                    started += 1;
                }
                _ => {
                    tracing::warn!("Failed to start download for file: {}", file.name);
                    campaign.mark_start_failed(key);
                }
            }
        }

        campaign.finalize_channel(task.channel_id, started);
        if started == 0 {
            campaign.stats.channels_failed += 1;
            self.reply
                .send(session, &notices::start_failed(&task.display_path));
            return ChannelStart::Failed;
        }

        ChannelStart::Started
    }

    /// Account for a transfer status update.
    pub fn on_transfer_event(&mut self, session: &mut dyn SessionClient, transfer: &FileTransfer) {
        let Some(campaign) = self.campaign.as_mut() else {
            return;
        };

        let key = TransferKey::from(transfer);
        if !campaign.is_expected(&key) {
            tracing::trace!("Ignoring transfer event for {}", transfer.remote_name);
            return;
        }

        if transfer.status.is_terminal() {
            self.complete_transfer(session, &key, transfer.status);
        } else if !campaign.is_completed(&key) {
            campaign.touch(&key, Instant::now());
            self.progress
                .update(&key, transfer.transferred, transfer.file_size);
        }
    }

    fn complete_transfer(
        &mut self,
        session: &mut dyn SessionClient,
        key: &TransferKey,
        status: TransferStatus,
    ) {
        let Some(campaign) = self.campaign.as_mut() else {
            return;
        };
        let Some(completion) = campaign.record_terminal(key, status) else {
            return;
        };
        self.progress.finish(key);

        match status {
            TransferStatus::Finished => tracing::info!(
                "Download finished: {} -> {}",
                key.remote_name,
                campaign
                    .local_path(key)
                    .map(|p| p.display().to_string())
                    .unwrap_or_default()
            ),
            TransferStatus::Error => {
                tracing::warn!("Error while downloading file: {}", key.remote_name)
            }
            TransferStatus::Closed | TransferStatus::Active => {
                tracing::warn!("Transfer closed before finishing: {}", key.remote_name)
            }
        }

        if completion.notify_total {
            self.reply
                .send(session, &notices::total_progress(completion.total_completed));
        }

        if !completion.channel_done {
            return;
        }

        campaign.stats.channels_downloaded += 1;
        let path = campaign.channel_path(key.channel_id);
        let is_current = campaign.current_channel == Some(key.channel_id);
        self.reply.send(session, &notices::channel_finished(&path));

        if is_current {
            self.advance(session);
        }
    }

    /// Handle the answer to a password prompt.
    pub fn on_password_reply(&mut self, session: &mut dyn SessionClient, reply: PasswordReply) {
        let Some(campaign) = self.campaign.as_mut() else {
            return;
        };
        let Some(mut task) = campaign.awaiting_password.take() else {
            tracing::debug!("Password reply received but no channel is waiting for one");
            return;
        };

        match reply {
            PasswordReply::Skip => {
                campaign.stats.channels_skipped += 1;
                self.reply
                    .send(session, &notices::skipping(&task.display_path));
                self.advance(session);
            }
            PasswordReply::Password(password) => {
                for queued in campaign
                    .queue
                    .iter_mut()
                    .filter(|t| t.channel_id == task.channel_id && t.password.is_none())
                {
                    queued.password = Some(password.clone());
                }
                task.password = Some(password);

                self.reply
                    .send(session, &notices::password_saved(&task.display_path));
                if self.start_channel_downloads(session, &task) != ChannelStart::Started {
                    self.advance(session);
                }
            }
        }
    }

    /// Give up on transfers of the current channel that went silent.
    pub fn on_tick(&mut self, session: &mut dyn SessionClient, now: Instant) {
        let Some(timeout) = self.settings.stall_timeout else {
            return;
        };
        let stalled = match self.campaign.as_ref() {
            Some(campaign) => match campaign.current_channel {
                Some(channel) => campaign.stalled(channel, now, timeout),
                None => return,
            },
            None => return,
        };

        for key in stalled {
            match self.campaign.as_mut() {
                Some(campaign) if !campaign.is_completed(&key) => {
                    campaign.stats.files_stalled += 1;
                }
                _ => continue,
            }
            tracing::warn!(
                "No progress on '{}' for {}s, giving up on it",
                key.remote_name,
                timeout.as_secs()
            );
            self.complete_transfer(session, &key, TransferStatus::Closed);
        }
    }

    fn finish(&mut self, session: &mut dyn SessionClient) {
        if let Some(campaign) = self.campaign.take() {
            self.reply
                .send(session, &notices::all_finished(campaign.total_completed));
            print_campaign_stats(&campaign.stats);
        }
        self.progress.clear();
        self.reply.clear();
    }
}
