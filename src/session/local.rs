//! A session backed by a local directory tree.
//!
//! The directory plays the server: it is the root channel `/`, every
//! subdirectory is a channel, and regular files are the channel's files. A
//! `.password` file inside a directory marks that channel as protected and
//! holds its password. Chat input is read from stdin, one private message per
//! line, as if sent by a console user.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::error::{Error, Result};
use crate::output::print_chat;
use crate::session::client::SessionClient;
use crate::session::types::*;

/// User id the bot gets after login.
pub const BOT_USER_ID: UserId = UserId(1);

/// User id of the person typing on stdin.
pub const CONSOLE_USER_ID: UserId = UserId(2);

/// Name of the per-directory password marker.
const PASSWORD_FILE: &str = ".password";

/// Copy buffer size for simulated transfers.
const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone)]
struct LocalChannel {
    id: ChannelId,
    path: String,
    dir: PathBuf,
    password: Option<String>,
}

/// A file as it was when its channel was listed.
#[derive(Debug, Clone)]
struct ListedFile {
    channel_id: ChannelId,
    name: String,
    source: PathBuf,
}

/// Directory-backed session.
pub struct LocalSession {
    root: PathBuf,
    events: UnboundedSender<SessionEvent>,
    channels: Vec<LocalChannel>,
    my_user_id: UserId,
    next_command: i32,
    next_transfer: i32,
    console_input: bool,
    // Listing happens through `&self`, so file ids are handed out here.
    listed: RefCell<HashMap<FileId, ListedFile>>,
    next_file: Cell<i32>,
}

impl LocalSession {
    /// Create a session serving `root`, plus the receiver for its events.
    pub fn new(root: impl Into<PathBuf>) -> (Self, UnboundedReceiver<SessionEvent>) {
        let (events, rx) = unbounded_channel();
        let session = Self {
            root: root.into(),
            events,
            channels: Vec::new(),
            my_user_id: UserId(0),
            next_command: 0,
            next_transfer: 0,
            console_input: true,
            listed: RefCell::new(HashMap::new()),
            next_file: Cell::new(0),
        };
        (session, rx)
    }

    /// Do not read chat input from stdin.
    pub fn without_console_input(mut self) -> Self {
        self.console_input = false;
        self
    }

    fn emit(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("Session event dropped, receiver is gone");
        }
    }

    fn next_command(&mut self) -> CommandId {
        self.next_command += 1;
        CommandId(self.next_command)
    }

    fn channel(&self, id: ChannelId) -> Option<&LocalChannel> {
        self.channels.iter().find(|c| c.id == id)
    }

    /// Refuse an output directory that lies inside the served tree.
    ///
    /// Downloads would otherwise land next to (or on top of) the files being
    /// served. `output_dir` must already exist.
    pub fn check_output_dir(&self, output_dir: &Path) -> Result<()> {
        let root = self.root.canonicalize()?;
        let output = output_dir.canonicalize()?;
        if output.starts_with(&root) {
            return Err(Error::ConfigValidation {
                field: "options.output_dir".to_string(),
                message: format!(
                    "'{}' is inside the mirror directory '{}'",
                    output.display(),
                    root.display()
                ),
            });
        }
        Ok(())
    }

    fn file_id_for(&self, channel_id: ChannelId, name: &str, source: &Path) -> FileId {
        let mut listed = self.listed.borrow_mut();
        if let Some((id, _)) = listed
            .iter()
            .find(|(_, f)| f.channel_id == channel_id && f.name == name)
        {
            return *id;
        }

        let id = FileId(self.next_file.get() + 1);
        self.next_file.set(id.0);
        listed.insert(
            id,
            ListedFile {
                channel_id,
                name: name.to_string(),
                source: source.to_path_buf(),
            },
        );
        id
    }

    // A plain thread: a blocked stdin read must not hold up runtime shutdown.
    fn spawn_console_reader(&self) -> Result<()> {
        let tx = self.events.clone();
        std::thread::Builder::new()
            .name("console-input".to_string())
            .spawn(move || {
                for line in std::io::stdin().lock().lines() {
                    let Ok(text) = line else { break };
                    let message = TextMessage {
                        kind: MessageKind::Private,
                        from_user: CONSOLE_USER_ID,
                        to_user: BOT_USER_ID,
                        channel_id: ChannelId(0),
                        text,
                    };
                    if tx.send(SessionEvent::TextMessage(message)).is_err() {
                        break;
                    }
                }
            })?;
        Ok(())
    }
}

/// Walk `root` and assign channel ids in sorted depth-first order.
fn scan_channels(root: &Path) -> Result<Vec<LocalChannel>> {
    let mut channels = Vec::new();
    let mut next_id = 0;
    scan_dir(root, "/".to_string(), &mut next_id, &mut channels)?;
    Ok(channels)
}

fn scan_dir(
    dir: &Path,
    path: String,
    next_id: &mut i32,
    channels: &mut Vec<LocalChannel>,
) -> Result<()> {
    *next_id += 1;
    let password = fs::read_to_string(dir.join(PASSWORD_FILE))
        .ok()
        .map(|p| p.trim().to_string());
    channels.push(LocalChannel {
        id: ChannelId(*next_id),
        path: path.clone(),
        dir: dir.to_path_buf(),
        password,
    });

    let mut subdirs: Vec<(String, PathBuf)> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| {
            let name = entry.file_name().to_str()?.to_string();
            (!name.starts_with('.')).then(|| (name, entry.path()))
        })
        .collect();
    subdirs.sort();

    for (name, subdir) in subdirs {
        let child_path = if path == "/" {
            format!("/{}", name)
        } else {
            format!("{}/{}", path, name)
        };
        scan_dir(&subdir, child_path, next_id, channels)?;
    }

    Ok(())
}

/// Regular files of a channel directory, sorted by name.
fn list_files(dir: &Path) -> Vec<(String, PathBuf, u64)> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut files: Vec<(String, PathBuf, u64)> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let metadata = entry.metadata().ok()?;
            if !metadata.is_file() {
                return None;
            }
            let name = entry.file_name().to_str()?.to_string();
            (name != PASSWORD_FILE).then(|| (name, entry.path(), metadata.len()))
        })
        .collect();
    files.sort();
    files
}

/// Whether writing `destination` would overwrite `source`.
fn same_file(source: &Path, destination: &Path) -> bool {
    let Ok(source) = source.canonicalize() else {
        return false;
    };
    if let Ok(existing) = destination.canonicalize() {
        return existing == source;
    }

    let parent = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    match (parent.canonicalize(), destination.file_name()) {
        (Ok(parent), Some(name)) => parent.join(name) == source,
        _ => false,
    }
}

fn normalize_path(path: &str) -> &str {
    let path = path.trim();
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}

impl SessionClient for LocalSession {
    fn connect(&mut self, host: &str, tcp_port: u16, _udp_port: u16, _encrypted: bool) -> Result<()> {
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(Error::Session(
                "local session must run inside a tokio runtime".to_string(),
            ));
        }

        tracing::debug!(
            "Serving {} as {}:{}",
            self.root.display(),
            host,
            tcp_port
        );

        if !self.root.is_dir() {
            tracing::error!("Mirror directory not found: {}", self.root.display());
            self.emit(SessionEvent::ConnectFailed);
            return Ok(());
        }

        self.channels = scan_channels(&self.root)?;
        if self.console_input {
            self.spawn_console_reader()?;
        }
        self.emit(SessionEvent::Connected);
        Ok(())
    }

    fn login(
        &mut self,
        nickname: &str,
        username: &str,
        _password: &str,
        _client_name: &str,
    ) -> Result<CommandId> {
        let command = self.next_command();
        tracing::debug!("Local login as {} ({})", nickname, username);
        self.my_user_id = BOT_USER_ID;
        self.emit(SessionEvent::LoggedIn {
            user_id: BOT_USER_ID,
        });
        self.emit(SessionEvent::CommandSucceeded { id: command });
        Ok(command)
    }

    fn my_user_id(&self) -> UserId {
        self.my_user_id
    }

    fn resolve_channel(&self, path: &str) -> Option<ChannelId> {
        let path = normalize_path(path);
        self.channels.iter().find(|c| c.path == path).map(|c| c.id)
    }

    fn channel_path(&self, id: ChannelId) -> Option<String> {
        self.channel(id).map(|c| c.path.clone())
    }

    fn join_channel(&mut self, id: ChannelId, password: Option<&str>) -> Result<CommandId> {
        let command = self.next_command();
        let event = match self.channel(id) {
            None => SessionEvent::CommandFailed {
                id: command,
                message: format!("channel {} does not exist", id),
            },
            Some(channel) if channel.password.as_deref().is_some_and(|p| Some(p) != password) => {
                SessionEvent::CommandFailed {
                    id: command,
                    message: "incorrect channel password".to_string(),
                }
            }
            Some(_) => SessionEvent::CommandSucceeded { id: command },
        };
        self.emit(event);
        Ok(command)
    }

    fn server_channels(&self) -> Vec<ServerChannel> {
        self.channels
            .iter()
            .map(|c| ServerChannel {
                id: c.id,
                name: c.path.rsplit('/').next().unwrap_or_default().to_string(),
                password_protected: c.password.is_some(),
            })
            .collect()
    }

    fn channel_files(&self, id: ChannelId) -> Vec<RemoteFile> {
        let Some(channel) = self.channel(id) else {
            return Vec::new();
        };

        list_files(&channel.dir)
            .into_iter()
            .map(|(name, source, size)| RemoteFile {
                channel_id: id,
                file_id: self.file_id_for(id, &name, &source),
                name,
                size,
            })
            .collect()
    }

    fn start_download(&mut self, request: DownloadRequest) -> Option<TransferId> {
        let channel = self.channel(request.channel_id)?.clone();

        if let Some(expected) = &channel.password {
            if request.password.as_deref() != Some(expected.as_str()) {
                tracing::warn!("Download refused: wrong password for '{}'", channel.path);
                return None;
            }
        }

        let file = self
            .listed
            .borrow()
            .get(&request.file_id)
            .filter(|f| f.channel_id == request.channel_id)
            .cloned()?;

        if same_file(&file.source, &request.local_path) {
            tracing::warn!(
                "Download refused: {} would overwrite its own source",
                request.local_path.display()
            );
            return None;
        }
        let size = fs::metadata(&file.source).map(|m| m.len()).unwrap_or(0);

        self.next_transfer += 1;
        let transfer = FileTransfer {
            transfer_id: TransferId(self.next_transfer),
            channel_id: request.channel_id,
            remote_name: file.name,
            local_path: request.local_path,
            transferred: 0,
            file_size: size,
            status: TransferStatus::Active,
        };
        let transfer_id = transfer.transfer_id;

        tokio::spawn(copy_file(file.source, transfer, self.events.clone()));
        Some(transfer_id)
    }

    fn send_message(&mut self, message: OutgoingMessage) -> Result<()> {
        print_chat(&message);
        Ok(())
    }

    fn disconnect(&mut self) {
        self.my_user_id = UserId(0);
    }
}

/// Copy `source` to the transfer's local path, reporting progress as events.
async fn copy_file(source: PathBuf, mut transfer: FileTransfer, tx: UnboundedSender<SessionEvent>) {
    transfer.status = match copy_with_progress(&source, &mut transfer, &tx).await {
        Ok(()) => TransferStatus::Finished,
        Err(e) => {
            tracing::debug!("Local transfer of {} failed: {}", source.display(), e);
            TransferStatus::Error
        }
    };
    let _ = tx.send(SessionEvent::FileTransfer(transfer));
}

async fn copy_with_progress(
    source: &Path,
    transfer: &mut FileTransfer,
    tx: &UnboundedSender<SessionEvent>,
) -> std::io::Result<()> {
    let mut input = tokio::fs::File::open(source).await?;
    let mut output = tokio::fs::File::create(&transfer.local_path).await?;
    let mut buf = vec![0u8; CHUNK_SIZE];

    loop {
        let read = input.read(&mut buf).await?;
        if read == 0 {
            break;
        }
        output.write_all(&buf[..read]).await?;
        transfer.transferred += read as u64;
        let _ = tx.send(SessionEvent::FileTransfer(transfer.clone()));
    }

    output.flush().await?;
    Ok(())
}
