//! In-memory session used by unit tests.

use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::session::client::SessionClient;
use crate::session::types::*;

/// A scripted server: channels and files are declared up front, outgoing
/// messages and download requests are recorded for assertions.
#[derive(Debug, Default)]
pub struct FakeSession {
    pub me: UserId,
    pub paths: Vec<(String, ChannelId)>,
    pub protected: HashSet<ChannelId>,
    pub files: HashMap<ChannelId, Vec<RemoteFile>>,
    pub failing_files: HashSet<String>,
    pub sent: Vec<OutgoingMessage>,
    pub downloads: Vec<DownloadRequest>,
    pub joins: Vec<(ChannelId, Option<String>)>,
    next_id: i32,
    next_file: i32,
}

impl FakeSession {
    pub fn new(me: UserId) -> Self {
        Self {
            me,
            ..Default::default()
        }
    }

    pub fn with_channel(mut self, id: i32, path: &str) -> Self {
        self.paths.push((path.to_string(), ChannelId(id)));
        self
    }

    pub fn with_protected_channel(mut self, id: i32, path: &str) -> Self {
        self.protected.insert(ChannelId(id));
        self.with_channel(id, path)
    }

    pub fn with_files(mut self, id: i32, names: &[&str]) -> Self {
        let channel_id = ChannelId(id);
        for name in names {
            self.next_file += 1;
            self.files.entry(channel_id).or_default().push(RemoteFile {
                channel_id,
                file_id: FileId(self.next_file),
                name: name.to_string(),
                size: 1024,
            });
        }
        self
    }

    pub fn failing(mut self, name: &str) -> Self {
        self.failing_files.insert(name.to_string());
        self
    }

    /// Sent messages containing `needle`.
    pub fn count_sent(&self, needle: &str) -> usize {
        self.sent.iter().filter(|m| m.text().contains(needle)).count()
    }

    /// Channels that received download requests, in request order, deduplicated
    /// over consecutive repeats.
    pub fn download_channels(&self) -> Vec<ChannelId> {
        let mut order: Vec<ChannelId> = Vec::new();
        for request in &self.downloads {
            if order.last() != Some(&request.channel_id) {
                order.push(request.channel_id);
            }
        }
        order
    }

    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn file_name(&self, channel: ChannelId, file: FileId) -> Option<&str> {
        self.files
            .get(&channel)?
            .iter()
            .find(|f| f.file_id == file)
            .map(|f| f.name.as_str())
    }
}

impl SessionClient for FakeSession {
    fn connect(&mut self, _host: &str, _tcp: u16, _udp: u16, _encrypted: bool) -> Result<()> {
        Ok(())
    }

    fn login(&mut self, _nick: &str, _user: &str, _pass: &str, _client: &str) -> Result<CommandId> {
        Ok(CommandId(self.next_id()))
    }

    fn my_user_id(&self) -> UserId {
        self.me
    }

    fn resolve_channel(&self, path: &str) -> Option<ChannelId> {
        self.paths.iter().find(|(p, _)| p == path).map(|(_, id)| *id)
    }

    fn channel_path(&self, id: ChannelId) -> Option<String> {
        self.paths
            .iter()
            .find(|(_, cid)| *cid == id)
            .map(|(p, _)| p.clone())
    }

    fn join_channel(&mut self, id: ChannelId, password: Option<&str>) -> Result<CommandId> {
        if self.channel_path(id).is_none() {
            return Err(Error::Session(format!("unknown channel {}", id)));
        }
        self.joins.push((id, password.map(str::to_string)));
        Ok(CommandId(self.next_id()))
    }

    fn server_channels(&self) -> Vec<ServerChannel> {
        self.paths
            .iter()
            .map(|(path, id)| ServerChannel {
                id: *id,
                name: path.rsplit('/').next().unwrap_or_default().to_string(),
                password_protected: self.protected.contains(id),
            })
            .collect()
    }

    fn channel_files(&self, id: ChannelId) -> Vec<RemoteFile> {
        self.files.get(&id).cloned().unwrap_or_default()
    }

    fn start_download(&mut self, request: DownloadRequest) -> Option<TransferId> {
        let failing = self
            .file_name(request.channel_id, request.file_id)
            .map(|name| self.failing_files.contains(name))
            .unwrap_or(true);
        self.downloads.push(request);
        if failing {
            None
        } else {
            Some(TransferId(self.next_id()))
        }
    }

    fn send_message(&mut self, message: OutgoingMessage) -> Result<()> {
        self.sent.push(message);
        Ok(())
    }

    fn disconnect(&mut self) {}
}
