//! Session lifecycle and the event loop.

use std::time::{Duration, Instant};

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::MissedTickBehavior;

use crate::bot::orchestrator::{CampaignSettings, Orchestrator};
use crate::bot::recognizer::{classify, Command, RecognizerSettings};
use crate::config::{ChannelEntry, Config};
use crate::error::{Error, Result};
use crate::output::{print_info, print_success, print_warning};
use crate::session::{ChannelId, CommandId, SessionClient, SessionEvent, TextMessage};

/// Client name reported to the server at login.
pub const CLIENT_NAME: &str = "TTDownloaderBot";

/// How often stalled transfers are checked for.
const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Connection and login parameters.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub host: String,
    pub tcp_port: u16,
    pub udp_port: u16,
    pub encrypted: bool,
    pub nickname: String,
    pub username: String,
    pub password: String,
    pub base_channel: ChannelEntry,
}

impl ConnectionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            host: config.server.host.clone(),
            tcp_port: config.server.tcp_port,
            udp_port: config.server.udp_port,
            encrypted: config.server.encrypted,
            nickname: config.account.nickname.clone(),
            username: config.account.username.clone(),
            password: config.account.password.clone(),
            base_channel: config.base_channel.clone(),
        }
    }
}

/// The bot: one session, one orchestrator, one event loop.
pub struct Bot<S: SessionClient> {
    session: S,
    events: UnboundedReceiver<SessionEvent>,
    connection: ConnectionSettings,
    recognizer: RecognizerSettings,
    orchestrator: Orchestrator,
    login_command: Option<CommandId>,
    join_command: Option<CommandId>,
    joining: Option<ChannelId>,
}

impl<S: SessionClient> Bot<S> {
    pub fn new(session: S, events: UnboundedReceiver<SessionEvent>, config: &Config) -> Self {
        Self {
            session,
            events,
            connection: ConnectionSettings::from_config(config),
            recognizer: RecognizerSettings::from_config(config),
            orchestrator: Orchestrator::new(CampaignSettings::from_config(config)),
            login_command: None,
            join_command: None,
            joining: None,
        }
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Connect and service events until a fatal session error or Ctrl+C.
    pub async fn run(&mut self) -> Result<()> {
        print_info(&format!(
            "Connecting to {}:{}...",
            self.connection.host, self.connection.tcp_port
        ));
        self.session.connect(
            &self.connection.host,
            self.connection.tcp_port,
            self.connection.udp_port,
            self.connection.encrypted,
        )?;

        let result = self.event_loop().await;
        self.session.disconnect();
        tracing::info!("Disconnected");
        result
    }

    async fn event_loop(&mut self) -> Result<()> {
        let mut ticker = tokio::time::interval(TICK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                event = self.events.recv() => {
                    let Some(event) = event else {
                        return Err(Error::Session("session event stream closed".to_string()));
                    };
                    self.handle_event(event)?;
                }
                _ = tokio::signal::ctrl_c() => {
                    print_warning("Interrupted by user (Ctrl+C). Exiting...");
                    return Ok(());
                }
                _ = ticker.tick() => {
                    self.orchestrator.on_tick(&mut self.session, Instant::now());
                }
            }
        }
    }

    fn handle_event(&mut self, event: SessionEvent) -> Result<()> {
        match event {
            SessionEvent::Connected => {
                print_success("Connected. Logging in...");
                let command = self.session.login(
                    &self.connection.nickname,
                    &self.connection.username,
                    &self.connection.password,
                    CLIENT_NAME,
                )?;
                if !command.is_valid() {
                    return Err(Error::Login("login could not be started".to_string()));
                }
                self.login_command = Some(command);
            }
            SessionEvent::ConnectFailed => {
                return Err(Error::Connection(format!(
                    "could not connect to {}:{}",
                    self.connection.host, self.connection.tcp_port
                )));
            }
            SessionEvent::ConnectionLost => {
                return Err(Error::Connection("connection to the server lost".to_string()));
            }
            SessionEvent::LoggedIn { user_id } => {
                self.login_command = None;
                print_success(&format!("Logged in (user id {}).", user_id));
                self.join_base_channel()?;
            }
            SessionEvent::LoggedOut => {
                return Err(Error::Session("logged out by the server".to_string()));
            }
            SessionEvent::CommandSucceeded { id } => {
                if self.join_command == Some(id) {
                    self.join_command = None;
                    self.orchestrator.set_base_channel(self.joining.take());
                    print_success(&format!(
                        "Joined '{}'. Waiting for the message '{}' (private or channel).",
                        self.connection.base_channel.path.trim(),
                        self.recognizer.trigger_phrase()
                    ));
                }
            }
            SessionEvent::CommandFailed { id, message } => {
                if self.login_command == Some(id) {
                    return Err(Error::Login(message));
                }
                if self.join_command == Some(id) {
                    return Err(Error::JoinFailed {
                        path: self.connection.base_channel.path.trim().to_string(),
                        message,
                    });
                }
                tracing::warn!("Command error (id={}): {}", id, message);
            }
            SessionEvent::TextMessage(message) => self.handle_text(&message),
            SessionEvent::FileTransfer(transfer) => {
                self.orchestrator
                    .on_transfer_event(&mut self.session, &transfer);
            }
        }
        Ok(())
    }

    fn join_base_channel(&mut self) -> Result<()> {
        let path = self.connection.base_channel.path.trim().to_string();
        if path.is_empty() {
            return Err(Error::MissingConfig("base_channel.path".to_string()));
        }

        let channel = self
            .session
            .resolve_channel(&path)
            .filter(|id| id.is_valid())
            .ok_or_else(|| Error::ChannelNotFound(path.clone()))?;

        tracing::info!("Joining base channel '{}' (id {})", path, channel);
        let command = self
            .session
            .join_channel(channel, self.connection.base_channel.password())?;
        if !command.is_valid() {
            return Err(Error::JoinFailed {
                path,
                message: "join could not be started".to_string(),
            });
        }

        self.join_command = Some(command);
        self.joining = Some(channel);
        Ok(())
    }

    fn handle_text(&mut self, message: &TextMessage) {
        tracing::debug!(
            "Text message from user {} ({:?}): {}",
            message.from_user,
            message.kind,
            message.text
        );

        let command = classify(
            message,
            self.session.my_user_id(),
            &self.recognizer,
            self.orchestrator.view(),
        );
        match command {
            Command::Trigger(origin) => self.orchestrator.on_trigger(&mut self.session, origin),
            Command::PasswordReply(reply) => {
                self.orchestrator.on_password_reply(&mut self.session, reply)
            }
            Command::Ignore => {}
        }
    }
}
