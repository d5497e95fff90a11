//! Routing of notices back to whoever started the campaign.

use crate::session::{ChannelId, OutgoingMessage, SessionClient, UserId};

/// Where a trigger came from, and where notices go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Private { user_id: UserId },
    Channel { channel_id: ChannelId },
}

impl Origin {
    pub fn message(self, text: impl Into<String>) -> OutgoingMessage {
        let text = text.into();
        match self {
            Origin::Private { user_id } => OutgoingMessage::Private { to: user_id, text },
            Origin::Channel { channel_id } => OutgoingMessage::Channel {
                channel: channel_id,
                text,
            },
        }
    }
}

/// Sends notices to the stored origin. Every notice is also logged; a missing
/// origin or a failed send never propagates.
#[derive(Debug, Default)]
pub struct ReplySink {
    origin: Option<Origin>,
}

impl ReplySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn origin(&self) -> Option<Origin> {
        self.origin
    }

    pub fn set_origin(&mut self, origin: Origin) {
        self.origin = Some(origin);
    }

    pub fn clear(&mut self) {
        self.origin = None;
    }

    pub fn send(&self, session: &mut dyn SessionClient, text: &str) {
        match self.origin {
            Some(origin) => Self::send_to(session, origin, text),
            None => tracing::info!("{}", text),
        }
    }

    /// Send to an explicit origin without touching the stored one.
    pub fn send_to(session: &mut dyn SessionClient, origin: Origin, text: &str) {
        tracing::info!("{}", text);
        if let Err(e) = session.send_message(origin.message(text)) {
            tracing::warn!("Failed to send reply: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::fake::FakeSession;

    #[test]
    fn test_send_without_origin_is_noop() {
        let mut session = FakeSession::new(UserId(1));
        let sink = ReplySink::new();
        sink.send(&mut session, "hello");
        assert!(session.sent.is_empty());
    }

    #[test]
    fn test_send_routes_to_origin() {
        let mut session = FakeSession::new(UserId(1));
        let mut sink = ReplySink::new();

        sink.set_origin(Origin::Private { user_id: UserId(7) });
        sink.send(&mut session, "one");
        sink.set_origin(Origin::Channel {
            channel_id: ChannelId(3),
        });
        sink.send(&mut session, "two");
        sink.clear();
        sink.send(&mut session, "three");

        assert_eq!(
            session.sent,
            vec![
                OutgoingMessage::Private {
                    to: UserId(7),
                    text: "one".to_string()
                },
                OutgoingMessage::Channel {
                    channel: ChannelId(3),
                    text: "two".to_string()
                },
            ]
        );
    }
}
