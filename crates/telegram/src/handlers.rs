use {
    teloxide::{prelude::*, types::ChatKind},
    tracing::{debug, info},
};

use courier_relay::Outcome;

use crate::{error::Result, inbound, state::RelayState};

/// Handle a single inbound Telegram message (called from the polling loop).
pub async fn handle_message(msg: Message, state: &RelayState) -> Result<()> {
    // The relay only speaks in DMs. A bot dragged into a group ignores it.
    if !matches!(msg.chat.kind, ChatKind::Private(_)) {
        debug!(chat_id = msg.chat.id.0, "ignoring non-private chat message");
        return Ok(());
    }

    if let Some(command) = command_of(&msg, state.bot_username.as_deref()) {
        return handle_command(command, &msg, state).await;
    }

    let Some(relay_msg) = inbound::to_inbound(&msg) else {
        debug!(chat_id = msg.chat.id.0, "ignoring message without a sender");
        return Ok(());
    };

    if relay_msg.content.is_none()
        && let Some(kind) = inbound::describe_media_kind(&msg)
    {
        info!(
            user = %relay_msg.sender.id,
            media_kind = kind,
            "received unsupported attachment type"
        );
    }

    let outcome = state.router.handle(&relay_msg).await?;
    match outcome {
        Outcome::Forwarded { user, forwarded } => {
            debug!(%user, %forwarded, "message relayed to admin");
        },
        Outcome::Replied { user, delivered } => {
            debug!(%user, %delivered, "admin reply relayed to user");
        },
        Outcome::Rejected(reason) => {
            debug!(?reason, chat_id = msg.chat.id.0, "message rejected");
        },
    }
    Ok(())
}

/// Extract a leading slash command, tolerating the `/cmd@botname` form.
fn command_of(msg: &Message, bot_username: Option<&str>) -> Option<&'static str> {
    let text = msg.text()?;
    let first = text.split_whitespace().next()?;
    let command = first.strip_prefix('/')?;
    let command = match command.split_once('@') {
        // A command addressed to some other bot is not ours to answer.
        Some((cmd, addressee)) => {
            if bot_username.is_some_and(|me| me.eq_ignore_ascii_case(addressee)) {
                cmd
            } else {
                return None;
            }
        },
        None => command,
    };
    match command {
        "start" => Some("start"),
        "help" => Some("help"),
        _ => None,
    }
}

async fn handle_command(command: &str, msg: &Message, state: &RelayState) -> Result<()> {
    debug!(command, chat_id = msg.chat.id.0, "answering command");
    state
        .bot
        .send_message(msg.chat.id, state.config.greeting.clone())
        .await?;
    Ok(())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn text_message(text: &str) -> Message {
        serde_json::from_value(serde_json::json!({
            "message_id": 1,
            "date": 1700000000,
            "chat": {"id": 111, "type": "private", "first_name": "Ann"},
            "from": {"id": 111, "is_bot": false, "first_name": "Ann"},
            "text": text
        }))
        .unwrap()
    }

    #[rstest]
    #[case("/start", Some("start"))]
    #[case("/help", Some("help"))]
    #[case("/start extra words", Some("start"))]
    #[case("/start@courier_bot", Some("start"))]
    #[case("/start@other_bot", None)]
    #[case("/unknown", None)]
    #[case("hello", None)]
    #[case("not /start", None)]
    fn command_parsing(#[case] text: &str, #[case] expected: Option<&'static str>) {
        let msg = text_message(text);
        assert_eq!(command_of(&msg, Some("courier_bot")), expected);
    }

    #[test]
    fn addressed_command_without_known_username_is_ignored() {
        let msg = text_message("/start@courier_bot");
        assert_eq!(command_of(&msg, None), None);
    }
}
