//! Session types shared between the client and the bot.

use std::fmt;
use std::path::PathBuf;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub i32);

        impl $name {
            /// Server ids are positive; zero or negative means "none" or failure.
            pub fn is_valid(self) -> bool {
                self.0 > 0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Server-assigned user id.
    UserId
);
id_type!(
    /// Server-assigned channel id.
    ChannelId
);
id_type!(
    /// Id of a file stored in a channel.
    FileId
);
id_type!(
    /// Handle of a started file transfer.
    TransferId
);
id_type!(
    /// Id of an issued command, echoed back in success/failure events.
    CommandId
);

/// How a text message was addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// User-to-user message.
    Private,
    /// Broadcast to everyone in a channel.
    Channel,
    /// Anything else (server broadcasts, custom messages).
    Other,
}

/// An inbound text message.
#[derive(Debug, Clone)]
pub struct TextMessage {
    pub kind: MessageKind,
    pub from_user: UserId,
    pub to_user: UserId,
    pub channel_id: ChannelId,
    pub text: String,
}

/// An outbound text message sent from the bot's identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutgoingMessage {
    Private { to: UserId, text: String },
    Channel { channel: ChannelId, text: String },
}

impl OutgoingMessage {
    pub fn text(&self) -> &str {
        match self {
            OutgoingMessage::Private { text, .. } | OutgoingMessage::Channel { text, .. } => text,
        }
    }
}

/// A channel as reported by the server's channel list.
#[derive(Debug, Clone)]
pub struct ServerChannel {
    pub id: ChannelId,
    pub name: String,
    /// Whether joining the channel requires a password.
    pub password_protected: bool,
}

/// A file stored in a channel.
#[derive(Debug, Clone)]
pub struct RemoteFile {
    pub channel_id: ChannelId,
    pub file_id: FileId,
    pub name: String,
    pub size: u64,
}

/// A request to download one remote file to a local path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub channel_id: ChannelId,
    pub file_id: FileId,
    pub local_path: PathBuf,
    /// Channel password, for password-protected channels.
    pub password: Option<String>,
}

/// Status of a file transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    /// Bytes are moving.
    Active,
    Finished,
    Error,
    Closed,
}

impl TransferStatus {
    /// Whether no further events will follow for the transfer.
    pub fn is_terminal(self) -> bool {
        !matches!(self, TransferStatus::Active)
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferStatus::Active => write!(f, "active"),
            TransferStatus::Finished => write!(f, "finished"),
            TransferStatus::Error => write!(f, "error"),
            TransferStatus::Closed => write!(f, "closed"),
        }
    }
}

/// A transfer status update.
#[derive(Debug, Clone)]
pub struct FileTransfer {
    pub transfer_id: TransferId,
    pub channel_id: ChannelId,
    pub remote_name: String,
    pub local_path: PathBuf,
    pub transferred: u64,
    pub file_size: u64,
    pub status: TransferStatus,
}

/// Events emitted by a session.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Connected,
    ConnectFailed,
    ConnectionLost,
    LoggedIn { user_id: UserId },
    LoggedOut,
    CommandSucceeded { id: CommandId },
    CommandFailed { id: CommandId, message: String },
    TextMessage(TextMessage),
    FileTransfer(FileTransfer),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_validity() {
        assert!(ChannelId(1).is_valid());
        assert!(!ChannelId(0).is_valid());
        assert!(!TransferId(-1).is_valid());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!TransferStatus::Active.is_terminal());
        assert!(TransferStatus::Finished.is_terminal());
        assert!(TransferStatus::Error.is_terminal());
        assert!(TransferStatus::Closed.is_terminal());
    }
}
