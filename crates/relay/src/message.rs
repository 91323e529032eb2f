use serde::{Deserialize, Serialize};

/// Transport-assigned user identity. Users are never pre-registered; any
/// id the transport hands us is a valid participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

/// Transport-assigned chat identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub i64);

/// Transport-assigned message identity. Unique only within the owning
/// chat's message stream — always pair it with the chat or user that
/// produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub i32);

impl UserId {
    /// The user's direct chat. Telegram DM chats share the user's id.
    #[must_use]
    pub fn direct_chat(self) -> ChatId {
        ChatId(self.0)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who authored an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub id: UserId,
    /// Display name as reported by the transport. Untrusted: escape before
    /// embedding in rich text.
    pub display_name: String,
    /// Public handle (`@username`), when the sender has one.
    pub handle: Option<String>,
}

/// Opaque transport media reference (a Telegram `file_id`). The relay never
/// downloads media; it hands the reference back to the transport unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef(pub String);

/// The five supported content kinds, each carrying its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Photo {
        file: MediaRef,
        caption: Option<String>,
    },
    Video {
        file: MediaRef,
        caption: Option<String>,
    },
    Animation {
        file: MediaRef,
        caption: Option<String>,
    },
    Document {
        file: MediaRef,
        caption: Option<String>,
    },
}

impl Content {
    /// Kind name for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Photo { .. } => "photo",
            Self::Video { .. } => "video",
            Self::Animation { .. } => "animation",
            Self::Document { .. } => "document",
        }
    }

    /// The free-text part of the content: message body or media caption.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Photo { caption, .. }
            | Self::Video { caption, .. }
            | Self::Animation { caption, .. }
            | Self::Document { caption, .. } => caption.as_deref(),
        }
    }

    /// Rebuild the content with its text/caption replaced.
    #[must_use]
    pub fn with_text(&self, text: String) -> Self {
        let caption = if text.is_empty() { None } else { Some(text) };
        match self {
            Self::Text(_) => Self::Text(caption.unwrap_or_default()),
            Self::Photo { file, .. } => Self::Photo {
                file: file.clone(),
                caption,
            },
            Self::Video { file, .. } => Self::Video {
                file: file.clone(),
                caption,
            },
            Self::Animation { file, .. } => Self::Animation {
                file: file.clone(),
                caption,
            },
            Self::Document { file, .. } => Self::Document {
                file: file.clone(),
                caption,
            },
        }
    }
}

/// One inbound message as the transport describes it to the router.
///
/// `content` is `None` when the transport saw a kind the relay does not
/// support (sticker, poll, voice note, ...). The router still owes the
/// sender a rejection notice in that case.
#[derive(Debug, Clone)]
pub struct Inbound {
    pub sender: Sender,
    pub chat: ChatId,
    pub message_id: MessageId,
    /// Identity of the quoted message, when this message is a reply.
    pub reply_to: Option<MessageId>,
    pub content: Option<Content>,
}
