//! Telegram-HTML helpers for text the relay composes.
//!
//! Everything user- or admin-authored is escaped before it is embedded in
//! the rich-text payload, so a display name like `<b>admin</b>` cannot
//! inject markup into the forwarded copy.

use crate::message::Sender;

/// Telegram message size limit.
pub const MAX_MESSAGE_LEN: usize = 4096;

/// Telegram caption size limit for media messages.
pub const MAX_CAPTION_LEN: usize = 1024;

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Build the sender label prefixed to every forward: escaped display name
/// as a clickable profile reference, plus the numeric id so the
/// administrator can tell users with identical names apart.
///
/// Public handles get a `t.me` link; everyone else gets a direct
/// `tg://user` reference, which works without a handle.
#[must_use]
pub fn sender_label(sender: &Sender) -> String {
    let name = escape_html(&sender.display_name);
    let link = match sender.handle.as_deref() {
        Some(handle) => format!("https://t.me/{handle}"),
        None => format!("tg://user?id={}", sender.id),
    };
    format!(
        "\u{1F4E9} From <a href=\"{link}\">{name}</a> (ID: {})",
        sender.id
    )
}

/// Truncate to `max_len` bytes without splitting a UTF-8 sequence.
#[must_use]
pub fn truncate_at_char_boundary(text: &str, max_len: usize) -> &str {
    if text.len() <= max_len {
        return text;
    }
    let mut end = max_len;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
