//! Conversion from teloxide messages to the relay core's inbound descriptor.

use teloxide::types::{MediaKind, Message, MessageKind};

use courier_relay::{ChatId, Content, Inbound, MediaRef, MessageId, Sender, UserId};

/// Build the core descriptor for one Telegram message.
///
/// Returns `None` for messages without a sender (channel posts, service
/// messages) — those are not relay traffic at all. Messages *with* a
/// sender but an unsupported media kind map to `content: None` so the
/// router can send the rejection notice.
pub fn to_inbound(msg: &Message) -> Option<Inbound> {
    let from = msg.from.as_ref()?;

    let display_name = {
        let last = from.last_name.as_deref().unwrap_or("");
        let name = format!("{} {last}", from.first_name).trim().to_owned();
        if name.is_empty() {
            from.username.clone().unwrap_or_else(|| from.id.0.to_string())
        } else {
            name
        }
    };

    Some(Inbound {
        sender: Sender {
            id: UserId(from.id.0 as i64),
            display_name,
            handle: from.username.clone(),
        },
        chat: ChatId(msg.chat.id.0),
        message_id: MessageId(msg.id.0),
        reply_to: msg.reply_to_message().map(|quoted| MessageId(quoted.id.0)),
        content: extract_content(msg),
    })
}

/// Map the Bot API media kind onto the five supported content variants.
fn extract_content(msg: &Message) -> Option<Content> {
    match &msg.kind {
        MessageKind::Common(common) => match &common.media_kind {
            MediaKind::Text(t) => Some(Content::Text(t.text.clone())),
            MediaKind::Photo(p) => {
                // Largest size is last in the array.
                p.photo.last().map(|size| Content::Photo {
                    file: MediaRef(size.file.id.clone()),
                    caption: p.caption.clone(),
                })
            },
            MediaKind::Video(v) => Some(Content::Video {
                file: MediaRef(v.video.file.id.clone()),
                caption: v.caption.clone(),
            }),
            MediaKind::Animation(a) => Some(Content::Animation {
                file: MediaRef(a.animation.file.id.clone()),
                caption: a.caption.clone(),
            }),
            MediaKind::Document(d) => Some(Content::Document {
                file: MediaRef(d.document.file.id.clone()),
                caption: d.caption.clone(),
            }),
            _ => None,
        },
        _ => None,
    }
}

/// Describe an unsupported media kind for logging.
pub fn describe_media_kind(msg: &Message) -> Option<&'static str> {
    match &msg.kind {
        MessageKind::Common(common) => match &common.media_kind {
            MediaKind::Text(_)
            | MediaKind::Photo(_)
            | MediaKind::Video(_)
            | MediaKind::Animation(_)
            | MediaKind::Document(_) => None,
            MediaKind::Audio(_) => Some("audio"),
            MediaKind::Contact(_) => Some("contact"),
            MediaKind::Game(_) => Some("game"),
            MediaKind::Location(_) => Some("location"),
            MediaKind::Poll(_) => Some("poll"),
            MediaKind::Sticker(_) => Some("sticker"),
            MediaKind::Venue(_) => Some("venue"),
            MediaKind::VideoNote(_) => Some("video note"),
            MediaKind::Voice(_) => Some("voice"),
            _ => Some("unknown media"),
        },
        _ => Some("service message"),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    /// Deserialize a raw Bot API message object, as `getUpdates` returns it.
    fn message(json: serde_json::Value) -> Message {
        serde_json::from_value(json).unwrap()
    }

    fn text_message_json(user_id: i64, message_id: i32, text: &str) -> serde_json::Value {
        serde_json::json!({
            "message_id": message_id,
            "date": 1700000000,
            "chat": {"id": user_id, "type": "private", "first_name": "Ann"},
            "from": {"id": user_id, "is_bot": false, "first_name": "Ann", "last_name": "Lee",
                     "username": "ann_lee"},
            "text": text
        })
    }

    #[test]
    fn text_message_maps_to_text_content() {
        let msg = message(text_message_json(111, 1, "Hello"));
        let inbound = to_inbound(&msg).unwrap();

        assert_eq!(inbound.sender.id, UserId(111));
        assert_eq!(inbound.sender.display_name, "Ann Lee");
        assert_eq!(inbound.sender.handle.as_deref(), Some("ann_lee"));
        assert_eq!(inbound.chat, ChatId(111));
        assert_eq!(inbound.message_id, MessageId(1));
        assert_eq!(inbound.reply_to, None);
        assert_eq!(inbound.content, Some(Content::Text("Hello".into())));
    }

    #[test]
    fn reply_exposes_quoted_message_id() {
        let mut json = text_message_json(111, 2, "Thanks!");
        json["reply_to_message"] = text_message_json(111, 40, "Hi there");
        let msg = message(json);
        let inbound = to_inbound(&msg).unwrap();

        assert_eq!(inbound.reply_to, Some(MessageId(40)));
    }

    #[test]
    fn photo_picks_largest_size_and_keeps_caption() {
        let msg = message(serde_json::json!({
            "message_id": 4,
            "date": 1700000000,
            "chat": {"id": 333, "type": "private", "first_name": "B"},
            "from": {"id": 333, "is_bot": false, "first_name": "B"},
            "photo": [
                {"file_id": "small", "file_unique_id": "u1", "width": 90, "height": 90},
                {"file_id": "large", "file_unique_id": "u2", "width": 800, "height": 800}
            ],
            "caption": "check this"
        }));
        let inbound = to_inbound(&msg).unwrap();

        let Some(Content::Photo { file, caption }) = inbound.content else {
            panic!("expected photo content");
        };
        assert_eq!(file.0, "large");
        assert_eq!(caption.as_deref(), Some("check this"));
    }

    #[test]
    fn document_maps_to_document_content() {
        let msg = message(serde_json::json!({
            "message_id": 5,
            "date": 1700000000,
            "chat": {"id": 111, "type": "private", "first_name": "Ann"},
            "from": {"id": 111, "is_bot": false, "first_name": "Ann"},
            "document": {"file_id": "doc-1", "file_unique_id": "u3", "file_name": "form.pdf"}
        }));
        let inbound = to_inbound(&msg).unwrap();

        let Some(Content::Document { file, caption }) = inbound.content else {
            panic!("expected document content");
        };
        assert_eq!(file.0, "doc-1");
        assert_eq!(caption, None);
    }

    #[test]
    fn sticker_is_unsupported_but_still_described() {
        let msg = message(serde_json::json!({
            "message_id": 6,
            "date": 1700000000,
            "chat": {"id": 111, "type": "private", "first_name": "Ann"},
            "from": {"id": 111, "is_bot": false, "first_name": "Ann"},
            "sticker": {
                "file_id": "st-1", "file_unique_id": "u4", "width": 512, "height": 512,
                "is_animated": false, "is_video": false, "type": "regular"
            }
        }));
        let inbound = to_inbound(&msg).unwrap();

        assert_eq!(inbound.content, None);
        assert_eq!(describe_media_kind(&msg), Some("sticker"));
    }

    #[test]
    fn display_name_falls_back_to_username() {
        let msg = message(serde_json::json!({
            "message_id": 7,
            "date": 1700000000,
            "chat": {"id": 111, "type": "private"},
            "from": {"id": 111, "is_bot": false, "first_name": "", "username": "ghost"},
            "text": "boo"
        }));
        let inbound = to_inbound(&msg).unwrap();
        assert_eq!(inbound.sender.display_name, "ghost");
    }
}
