//! The session client capability set consumed by the bot.

use crate::error::Result;
use crate::session::types::{
    ChannelId, CommandId, DownloadRequest, OutgoingMessage, RemoteFile, ServerChannel, TransferId,
    UserId,
};

/// A logged-in (or logging-in) connection to a collaboration server.
///
/// Calls return immediately; outcomes of connect, login, join and transfers
/// arrive later as [`SessionEvent`](crate::session::SessionEvent)s on the
/// receiver handed out when the session was created.
pub trait SessionClient {
    /// Start connecting. A `Connected` or `ConnectFailed` event follows.
    fn connect(&mut self, host: &str, tcp_port: u16, udp_port: u16, encrypted: bool)
        -> Result<()>;

    /// Start logging in. `LoggedIn` or `CommandFailed` follows.
    fn login(
        &mut self,
        nickname: &str,
        username: &str,
        password: &str,
        client_name: &str,
    ) -> Result<CommandId>;

    /// The bot's own user id, or an invalid id before login.
    fn my_user_id(&self) -> UserId;

    /// Resolve a channel path like `/Root/Files` to its id.
    fn resolve_channel(&self, path: &str) -> Option<ChannelId>;

    /// The full path of a channel.
    fn channel_path(&self, id: ChannelId) -> Option<String>;

    /// Start joining a channel. `CommandSucceeded` or `CommandFailed` follows.
    fn join_channel(&mut self, id: ChannelId, password: Option<&str>) -> Result<CommandId>;

    /// Every channel on the server.
    fn server_channels(&self) -> Vec<ServerChannel>;

    /// Files stored in a channel, in server order.
    fn channel_files(&self, id: ChannelId) -> Vec<RemoteFile>;

    /// Start a download. Returns `None` when the transfer could not be started.
    fn start_download(&mut self, request: DownloadRequest) -> Option<TransferId>;

    /// Send a text message from the bot's identity.
    fn send_message(&mut self, message: OutgoingMessage) -> Result<()>;

    fn disconnect(&mut self);
}
