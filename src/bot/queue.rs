//! Builds the ordered channel queue for a campaign.

use std::collections::HashSet;

use crate::bot::campaign::ChannelTask;
use crate::bot::notices;
use crate::bot::orchestrator::CampaignSettings;
use crate::config::{ChannelEntry, ChannelMode};
use crate::session::{ChannelId, SessionClient};

/// Tasks to run, plus per-entry problems to report to the requester.
#[derive(Debug, Default)]
pub struct QueueBuild {
    pub tasks: Vec<ChannelTask>,
    pub errors: Vec<String>,
}

/// Build the queue for the configured channel mode.
pub fn build_queue(
    settings: &CampaignSettings,
    base_channel: Option<ChannelId>,
    session: &dyn SessionClient,
) -> QueueBuild {
    let mut build = match settings.channel_mode {
        ChannelMode::Single => single_queue(&settings.base_channel, base_channel, session),
        ChannelMode::ManualList => manual_queue(&settings.channels, session),
        ChannelMode::AutoAll => auto_queue(session),
    };

    if settings.dedupe_channels {
        let mut seen = HashSet::new();
        build.tasks.retain(|task| seen.insert(task.channel_id));
    }

    tracing::debug!(
        "Built queue of {} channel(s) in {} mode",
        build.tasks.len(),
        settings.channel_mode
    );
    build
}

fn single_queue(
    entry: &ChannelEntry,
    base_channel: Option<ChannelId>,
    session: &dyn SessionClient,
) -> QueueBuild {
    let mut build = QueueBuild::default();
    let Some(id) = base_channel.filter(|id| id.is_valid()) else {
        return build;
    };

    let path = session
        .channel_path(id)
        .unwrap_or_else(|| entry.path.trim().to_string());
    let mut task = ChannelTask::new(id, path);
    task.password = entry.password().map(str::to_string);
    build.tasks.push(task);
    build
}

fn manual_queue(entries: &[ChannelEntry], session: &dyn SessionClient) -> QueueBuild {
    let mut build = QueueBuild::default();

    for entry in entries {
        let path = entry.path.trim();
        if path.is_empty() {
            continue;
        }

        match session.resolve_channel(path).filter(|id| id.is_valid()) {
            Some(id) => {
                let mut task = ChannelTask::new(id, path);
                task.password = entry.password().map(str::to_string);
                build.tasks.push(task);
            }
            None => {
                tracing::warn!("Channel not found for path: {}", path);
                build.errors.push(notices::channel_not_found(path));
            }
        }
    }

    build
}

fn auto_queue(session: &dyn SessionClient) -> QueueBuild {
    let mut build = QueueBuild::default();

    for channel in session.server_channels() {
        if !channel.id.is_valid() {
            continue;
        }

        let path = session
            .channel_path(channel.id)
            .filter(|p| !p.is_empty())
            .or_else(|| Some(channel.name.clone()).filter(|n| !n.is_empty()))
            .unwrap_or_else(|| format!("channel_{}", channel.id));

        let mut task = ChannelTask::new(channel.id, path);
        task.requires_password = channel.password_protected;
        build.tasks.push(task);
    }

    build
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::session::fake::FakeSession;
    use crate::session::UserId;

    fn settings(mode: ChannelMode, channels: Vec<ChannelEntry>) -> CampaignSettings {
        let mut config = Config::default();
        config.options.channel_mode = mode;
        config.channels = channels;
        CampaignSettings::from_config(&config)
    }

    #[test]
    fn test_single_mode() {
        let session = FakeSession::new(UserId(1)).with_channel(5, "/Root");
        let mut s = settings(ChannelMode::Single, vec![]);
        s.base_channel = ChannelEntry::new("/Root", "pw");

        let build = build_queue(&s, Some(ChannelId(5)), &session);
        assert_eq!(build.tasks.len(), 1);
        assert_eq!(build.tasks[0].display_path, "/Root");
        assert_eq!(build.tasks[0].password.as_deref(), Some("pw"));

        assert!(build_queue(&s, None, &session).tasks.is_empty());
    }

    #[test]
    fn test_manual_mode_reports_unresolved() {
        let session = FakeSession::new(UserId(1)).with_channel(3, "/A");
        let s = settings(
            ChannelMode::ManualList,
            vec![
                ChannelEntry::new("/A", ""),
                ChannelEntry::new("/Missing", ""),
                ChannelEntry::new("   ", ""),
            ],
        );

        let build = build_queue(&s, Some(ChannelId(1)), &session);
        assert_eq!(build.tasks.len(), 1);
        assert_eq!(build.tasks[0].channel_id, ChannelId(3));
        assert_eq!(build.tasks[0].password, None);
        assert_eq!(build.errors, vec!["Channel not found for path: /Missing"]);
    }

    #[test]
    fn test_auto_all_mode() {
        let session = FakeSession::new(UserId(1))
            .with_channel(0, "/Ghost")
            .with_channel(1, "/")
            .with_protected_channel(2, "/Secret");
        let s = settings(ChannelMode::AutoAll, vec![]);

        let build = build_queue(&s, Some(ChannelId(1)), &session);
        let ids: Vec<ChannelId> = build.tasks.iter().map(|t| t.channel_id).collect();
        assert_eq!(ids, vec![ChannelId(1), ChannelId(2)]);
        assert!(!build.tasks[0].requires_password);
        assert!(build.tasks[1].requires_password);
        assert!(build.tasks[1].needs_password());
    }

    #[test]
    fn test_duplicates_kept_unless_deduped() {
        let session = FakeSession::new(UserId(1)).with_channel(3, "/A");
        let entries = vec![ChannelEntry::new("/A", ""), ChannelEntry::new("/A", "")];

        let mut s = settings(ChannelMode::ManualList, entries);
        assert_eq!(build_queue(&s, None, &session).tasks.len(), 2);

        s.dedupe_channels = true;
        assert_eq!(build_queue(&s, None, &session).tasks.len(), 1);
    }
}
