//! Outbound side of the relay: the core's `Transport` trait over teloxide.

use {
    async_trait::async_trait,
    teloxide::{
        ApiError, RequestError,
        payloads::{
            SendAnimationSetters, SendDocumentSetters, SendMessageSetters, SendPhotoSetters,
            SendVideoSetters,
        },
        prelude::*,
        types::{InputFile, ParseMode, ReplyParameters},
    },
    tracing::warn,
};

use courier_relay::{ChatId, Content, MessageId, Transport, TransportError};

/// Sends relay traffic through the Telegram Bot API.
///
/// All composed text is Telegram HTML (the router escapes every
/// user-authored fragment); text sends fall back to plain mode if the
/// API rejects the markup, so a bad entity can never drop a forward.
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    #[must_use]
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    async fn send_text_with_fallback(
        &self,
        chat: teloxide::types::ChatId,
        text: &str,
        reply_params: Option<&ReplyParameters>,
    ) -> Result<Message, RequestError> {
        let mut html_req = self
            .bot
            .send_message(chat, text)
            .parse_mode(ParseMode::Html);
        if let Some(rp) = reply_params {
            html_req = html_req.reply_parameters(rp.clone());
        }
        match html_req.await {
            Ok(message) => Ok(message),
            Err(e) => {
                warn!(
                    chat_id = chat.0,
                    error = %e,
                    "HTML send failed, retrying as plain text"
                );
                let mut plain_req = self.bot.send_message(chat, text);
                if let Some(rp) = reply_params {
                    plain_req = plain_req.reply_parameters(rp.clone());
                }
                plain_req.await
            },
        }
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn deliver(
        &self,
        chat: ChatId,
        content: &Content,
        reply_to: Option<MessageId>,
    ) -> Result<MessageId, TransportError> {
        let chat = teloxide::types::ChatId(chat.0);
        let rp = reply_params(reply_to);

        let sent = match content {
            Content::Text(text) => self
                .send_text_with_fallback(chat, text, rp.as_ref())
                .await
                .map_err(map_request_error)?,
            Content::Photo { file, caption } => {
                let mut req = self.bot.send_photo(chat, InputFile::file_id(file.0.clone()));
                if let Some(caption) = caption {
                    req = req.caption(caption).parse_mode(ParseMode::Html);
                }
                if let Some(rp) = &rp {
                    req = req.reply_parameters(rp.clone());
                }
                req.await.map_err(map_request_error)?
            },
            Content::Video { file, caption } => {
                let mut req = self.bot.send_video(chat, InputFile::file_id(file.0.clone()));
                if let Some(caption) = caption {
                    req = req.caption(caption).parse_mode(ParseMode::Html);
                }
                if let Some(rp) = &rp {
                    req = req.reply_parameters(rp.clone());
                }
                req.await.map_err(map_request_error)?
            },
            Content::Animation { file, caption } => {
                let mut req = self
                    .bot
                    .send_animation(chat, InputFile::file_id(file.0.clone()));
                if let Some(caption) = caption {
                    req = req.caption(caption).parse_mode(ParseMode::Html);
                }
                if let Some(rp) = &rp {
                    req = req.reply_parameters(rp.clone());
                }
                req.await.map_err(map_request_error)?
            },
            Content::Document { file, caption } => {
                let mut req = self
                    .bot
                    .send_document(chat, InputFile::file_id(file.0.clone()));
                if let Some(caption) = caption {
                    req = req.caption(caption).parse_mode(ParseMode::Html);
                }
                if let Some(rp) = &rp {
                    req = req.reply_parameters(rp.clone());
                }
                req.await.map_err(map_request_error)?
            },
        };

        Ok(MessageId(sent.id.0))
    }

    async fn notify(
        &self,
        chat: ChatId,
        text: &str,
        reply_to: Option<MessageId>,
    ) -> Result<(), TransportError> {
        // Notices are bot-authored plain text; no parse mode needed.
        let mut req = self.bot.send_message(teloxide::types::ChatId(chat.0), text);
        if let Some(rp) = reply_params(reply_to) {
            req = req.reply_parameters(rp);
        }
        req.await.map_err(map_request_error)?;
        Ok(())
    }
}

/// Thread onto an earlier message, tolerating its deletion.
fn reply_params(reply_to: Option<MessageId>) -> Option<ReplyParameters> {
    reply_to.map(|id| {
        ReplyParameters::new(teloxide::types::MessageId(id.0)).allow_sending_without_reply()
    })
}

fn map_request_error(err: RequestError) -> TransportError {
    match &err {
        RequestError::Api(
            ApiError::BotBlocked | ApiError::UserDeactivated | ApiError::ChatNotFound,
        ) => TransportError::RecipientUnavailable(err.to_string()),
        _ => TransportError::Request(err.to_string()),
    }
}
