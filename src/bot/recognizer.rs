//! Classification of inbound chat messages.

use crate::bot::reply::Origin;
use crate::config::Config;
use crate::session::{MessageKind, TextMessage, UserId};

/// Normalized trigger phrase and skip words.
#[derive(Debug, Clone)]
pub struct RecognizerSettings {
    trigger_phrase: String,
    skip_words: Vec<String>,
}

impl RecognizerSettings {
    pub fn new(trigger_phrase: &str, skip_words: &[String]) -> Self {
        Self {
            trigger_phrase: normalize(trigger_phrase),
            skip_words: skip_words.iter().map(|w| normalize(w)).collect(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.options.trigger_phrase, &config.options.skip_words)
    }

    pub fn trigger_phrase(&self) -> &str {
        &self.trigger_phrase
    }

    fn password_reply(&self, text: &str) -> PasswordReply {
        let trimmed = text.trim();
        // A blank reply always skips, whatever the configured words are.
        if trimmed.is_empty() || self.skip_words.iter().any(|w| *w == normalize(trimmed)) {
            PasswordReply::Skip
        } else {
            PasswordReply::Password(trimmed.to_string())
        }
    }
}

impl Default for RecognizerSettings {
    fn default() -> Self {
        let skip_words: Vec<String> = ["skip", "next", ""].iter().map(|s| s.to_string()).collect();
        Self::new("download files", &skip_words)
    }
}

/// Answer to a password prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordReply {
    Skip,
    Password(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Trigger(Origin),
    PasswordReply(PasswordReply),
    Ignore,
}

/// What the recognizer needs to know about the running campaign.
#[derive(Debug, Clone, Copy, Default)]
pub struct CampaignView {
    pub awaiting_password: bool,
    pub origin: Option<Origin>,
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

fn message_origin(message: &TextMessage, me: UserId) -> Option<Origin> {
    match message.kind {
        MessageKind::Private if message.to_user == me => Some(Origin::Private {
            user_id: message.from_user,
        }),
        MessageKind::Channel if message.channel_id.is_valid() => Some(Origin::Channel {
            channel_id: message.channel_id,
        }),
        _ => None,
    }
}

/// Classify an inbound message.
///
/// While a password is awaited, every message from the requesting origin is a
/// password reply and everything else is ignored.
pub fn classify(
    message: &TextMessage,
    me: UserId,
    settings: &RecognizerSettings,
    view: CampaignView,
) -> Command {
    if message.from_user == me {
        return Command::Ignore;
    }
    let origin = message_origin(message, me);

    if view.awaiting_password {
        return match (origin, view.origin) {
            (Some(origin), Some(requester)) if origin == requester => {
                Command::PasswordReply(settings.password_reply(&message.text))
            }
            _ => Command::Ignore,
        };
    }

    match origin {
        Some(origin) if normalize(&message.text) == settings.trigger_phrase => {
            Command::Trigger(origin)
        }
        _ => Command::Ignore,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ChannelId;

    const ME: UserId = UserId(1);

    fn private(from: i32, text: &str) -> TextMessage {
        TextMessage {
            kind: MessageKind::Private,
            from_user: UserId(from),
            to_user: ME,
            channel_id: ChannelId(0),
            text: text.to_string(),
        }
    }

    fn channel(from: i32, channel: i32, text: &str) -> TextMessage {
        TextMessage {
            kind: MessageKind::Channel,
            from_user: UserId(from),
            to_user: UserId(0),
            channel_id: ChannelId(channel),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_trigger_is_case_and_space_insensitive() {
        let settings = RecognizerSettings::default();
        let view = CampaignView::default();

        assert_eq!(
            classify(&private(7, "  Download FILES \n"), ME, &settings, view),
            Command::Trigger(Origin::Private { user_id: UserId(7) })
        );
        assert_eq!(
            classify(&channel(7, 4, "download files"), ME, &settings, view),
            Command::Trigger(Origin::Channel {
                channel_id: ChannelId(4)
            })
        );
        assert_eq!(
            classify(&private(7, "download files now"), ME, &settings, view),
            Command::Ignore
        );
    }

    #[test]
    fn test_own_and_misaddressed_messages_ignored() {
        let settings = RecognizerSettings::default();
        let view = CampaignView::default();

        assert_eq!(
            classify(&private(1, "download files"), ME, &settings, view),
            Command::Ignore
        );

        let mut other = private(7, "download files");
        other.to_user = UserId(9);
        assert_eq!(classify(&other, ME, &settings, view), Command::Ignore);

        let mut broadcast = private(7, "download files");
        broadcast.kind = MessageKind::Other;
        assert_eq!(classify(&broadcast, ME, &settings, view), Command::Ignore);

        assert_eq!(
            classify(&channel(7, 0, "download files"), ME, &settings, view),
            Command::Ignore
        );
    }

    #[test]
    fn test_password_replies() {
        let settings = RecognizerSettings::default();
        let view = CampaignView {
            awaiting_password: true,
            origin: Some(Origin::Private { user_id: UserId(7) }),
        };

        assert_eq!(
            classify(&private(7, " hunter2 "), ME, &settings, view),
            Command::PasswordReply(PasswordReply::Password("hunter2".to_string()))
        );
        for text in ["skip", "NEXT", "   "] {
            assert_eq!(
                classify(&private(7, text), ME, &settings, view),
                Command::PasswordReply(PasswordReply::Skip)
            );
        }
        // the trigger phrase is a password while one is awaited
        assert_eq!(
            classify(&private(7, "download files"), ME, &settings, view),
            Command::PasswordReply(PasswordReply::Password("download files".to_string()))
        );

        let custom = RecognizerSettings::new("download files", &["pass".to_string()]);
        for text in ["pass", "", "   "] {
            assert_eq!(
                classify(&private(7, text), ME, &custom, view),
                Command::PasswordReply(PasswordReply::Skip)
            );
        }
        assert_eq!(
            classify(&private(7, "skip"), ME, &custom, view),
            Command::PasswordReply(PasswordReply::Password("skip".to_string()))
        );
    }

    #[test]
    fn test_password_reply_from_other_origin_ignored() {
        let settings = RecognizerSettings::default();
        let view = CampaignView {
            awaiting_password: true,
            origin: Some(Origin::Channel {
                channel_id: ChannelId(4),
            }),
        };

        assert_eq!(
            classify(&private(7, "secret"), ME, &settings, view),
            Command::Ignore
        );
        assert_eq!(
            classify(&channel(8, 4, "secret"), ME, &settings, view),
            Command::PasswordReply(PasswordReply::Password("secret".to_string()))
        );
    }

    #[test]
    fn test_trigger_while_running_is_still_classified() {
        let settings = RecognizerSettings::default();
        let view = CampaignView {
            awaiting_password: false,
            origin: Some(Origin::Private { user_id: UserId(7) }),
        };
        assert_eq!(
            classify(&private(8, "download files"), ME, &settings, view),
            Command::Trigger(Origin::Private { user_id: UserId(8) })
        );
    }

    #[test]
    fn test_custom_phrase() {
        let settings = RecognizerSettings::new("  Grab It ", &["pass".to_string()]);
        assert_eq!(settings.trigger_phrase(), "grab it");
        let view = CampaignView::default();
        assert!(matches!(
            classify(&private(7, "grab it"), ME, &settings, view),
            Command::Trigger(_)
        ));
    }
}
