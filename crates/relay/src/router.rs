use std::sync::Arc;

use {
    async_trait::async_trait,
    tracing::{debug, error, info, warn},
};

use crate::{
    error::TransportError,
    markup::{self, MAX_CAPTION_LEN, MAX_MESSAGE_LEN},
    message::{ChatId, Content, Inbound, MessageId, UserId},
    store::CorrelationStore,
};

/// Minimum contract the router needs from the chat transport.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver content to a chat, optionally threaded as a reply to an
    /// earlier message in that chat. Returns the transport-assigned id of
    /// the delivered copy.
    async fn deliver(
        &self,
        chat: ChatId,
        content: &Content,
        reply_to: Option<MessageId>,
    ) -> Result<MessageId, TransportError>;

    /// Send a short service notice to a chat. Notices are local
    /// acknowledgments; they are never recorded in the store.
    async fn notify(
        &self,
        chat: ChatId,
        text: &str,
        reply_to: Option<MessageId>,
    ) -> Result<(), TransportError>;
}

/// The single configured administrator: their user identity plus the chat
/// all forwards land in.
#[derive(Debug, Clone, Copy)]
pub struct AdminIdentity {
    pub user: UserId,
    pub chat: ChatId,
}

/// What the router did with one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A user message was forwarded into the admin chat.
    Forwarded {
        user: UserId,
        forwarded: MessageId,
    },
    /// An administrator reply was delivered to its user.
    Replied {
        user: UserId,
        delivered: MessageId,
    },
    /// Nothing was relayed; the sender got a local notice instead.
    Rejected(RejectReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Content outside the five supported kinds.
    UnsupportedContent,
    /// The administrator quoted a message the store does not recognize.
    UnresolvedReply,
    /// The administrator sent a message without quoting a forward.
    NoReplyTarget,
    /// The outbound send failed at the transport boundary.
    DeliveryFailed,
    /// The store already held an entry for the forwarded id.
    CorrelationConflict,
}

pub const NOTICE_FORWARDED: &str = "\u{2705} Your message has been sent to the administrator.";
pub const NOTICE_FORWARD_FAILED: &str =
    "\u{274C} Could not deliver your message. Please try again later.";
pub const NOTICE_UNSUPPORTED: &str =
    "Sorry, only text, photos, videos, GIFs and documents are supported.";
pub const NOTICE_UNRESOLVED: &str =
    "That is not a message I forwarded. Reply to a forwarded message to reach its sender.";
pub const NOTICE_NO_REPLY_TARGET: &str =
    "Reply to a forwarded message to answer its sender.";
pub const NOTICE_REPLY_DELIVERED: &str = "\u{2705} Reply delivered.";
pub const NOTICE_REPLY_FAILED: &str =
    "\u{274C} Could not deliver the reply. The user may have blocked the bot.";

enum Role {
    /// The administrator quoting an earlier message.
    AdminReply(MessageId),
    /// Anything else, including the administrator sending without a quote.
    FromUser,
}

/// Classifies each inbound message and drives the store plus exactly one
/// outbound delivery. Stateless across messages except through the store.
pub struct Router<T> {
    transport: T,
    store: Arc<CorrelationStore>,
    admin: AdminIdentity,
}

impl<T: Transport> Router<T> {
    pub fn new(transport: T, store: Arc<CorrelationStore>, admin: AdminIdentity) -> Self {
        Self {
            transport,
            store,
            admin,
        }
    }

    #[must_use]
    pub fn store(&self) -> &CorrelationStore {
        &self.store
    }

    /// Process one inbound message end to end.
    ///
    /// Every failure mode local to the message (unsupported content,
    /// unresolved quote, delivery failure) is converted into a notice to
    /// the sender and reported as a [`Outcome::Rejected`]. The returned
    /// `Err` only means the notice itself could not be sent.
    pub async fn handle(&self, inbound: &Inbound) -> Result<Outcome, TransportError> {
        match self.classify(inbound) {
            Role::AdminReply(quoted) => self.deliver_admin_reply(inbound, quoted).await,
            Role::FromUser if inbound.sender.id == self.admin.user => {
                debug!(
                    message_id = %inbound.message_id,
                    "admin message without a reply target rejected"
                );
                self.transport
                    .notify(self.admin.chat, NOTICE_NO_REPLY_TARGET, Some(inbound.message_id))
                    .await?;
                Ok(Outcome::Rejected(RejectReason::NoReplyTarget))
            },
            Role::FromUser => self.forward_user_message(inbound).await,
        }
    }

    fn classify(&self, inbound: &Inbound) -> Role {
        if inbound.sender.id == self.admin.user {
            if let Some(quoted) = inbound.reply_to {
                return Role::AdminReply(quoted);
            }
        }
        Role::FromUser
    }

    async fn forward_user_message(&self, inbound: &Inbound) -> Result<Outcome, TransportError> {
        let user = inbound.sender.id;

        let Some(content) = &inbound.content else {
            debug!(%user, "rejecting unsupported content kind");
            self.transport
                .notify(inbound.chat, NOTICE_UNSUPPORTED, Some(inbound.message_id))
                .await?;
            return Ok(Outcome::Rejected(RejectReason::UnsupportedContent));
        };

        let outbound = labelled_forward(inbound, content);

        // A user quoting an admin reply threads the forward onto the
        // admin-chat message that reply came from.
        let thread = inbound
            .reply_to
            .and_then(|quoted| self.store.reply_vector(user, quoted));

        let forwarded = match self.transport.deliver(self.admin.chat, &outbound, thread).await {
            Ok(id) => id,
            Err(e) => {
                warn!(
                    %user,
                    target = %self.admin.chat,
                    kind = content.kind(),
                    error = %e,
                    "forward to admin failed"
                );
                self.transport
                    .notify(inbound.chat, NOTICE_FORWARD_FAILED, Some(inbound.message_id))
                    .await?;
                return Ok(Outcome::Rejected(RejectReason::DeliveryFailed));
            },
        };

        if let Err(e) = self.store.record(forwarded, user, inbound.message_id) {
            // Transport-level id reuse. The forwarded copy is orphaned on
            // purpose: linking it would misroute a future admin reply.
            error!(%user, %forwarded, error = %e, "correlation conflict on forward");
            self.transport
                .notify(inbound.chat, NOTICE_FORWARD_FAILED, Some(inbound.message_id))
                .await?;
            return Ok(Outcome::Rejected(RejectReason::CorrelationConflict));
        }

        info!(
            %user,
            message_id = %inbound.message_id,
            %forwarded,
            kind = content.kind(),
            threaded = thread.is_some(),
            "forwarded user message to admin"
        );
        self.transport
            .notify(inbound.chat, NOTICE_FORWARDED, Some(inbound.message_id))
            .await?;
        Ok(Outcome::Forwarded { user, forwarded })
    }

    async fn deliver_admin_reply(
        &self,
        inbound: &Inbound,
        quoted: MessageId,
    ) -> Result<Outcome, TransportError> {
        let Some(entry) = self.store.resolve(quoted) else {
            // Quoted message predates this process or was never ours
            // (service messages, the admin's own notices, ...).
            debug!(%quoted, "admin reply does not resolve to a forwarded message");
            self.transport
                .notify(self.admin.chat, NOTICE_UNRESOLVED, Some(inbound.message_id))
                .await?;
            return Ok(Outcome::Rejected(RejectReason::UnresolvedReply));
        };

        let Some(content) = &inbound.content else {
            debug!(%quoted, "rejecting unsupported admin reply content");
            self.transport
                .notify(self.admin.chat, NOTICE_UNSUPPORTED, Some(inbound.message_id))
                .await?;
            return Ok(Outcome::Rejected(RejectReason::UnsupportedContent));
        };

        let outbound = escaped_reply(content);
        let target = entry.user.direct_chat();

        let delivered = match self
            .transport
            .deliver(target, &outbound, Some(entry.message))
            .await
        {
            Ok(id) => id,
            Err(e) => {
                warn!(
                    user = %entry.user,
                    target = %target,
                    kind = content.kind(),
                    error = %e,
                    "admin reply delivery failed"
                );
                self.transport
                    .notify(self.admin.chat, NOTICE_REPLY_FAILED, Some(inbound.message_id))
                    .await?;
                return Ok(Outcome::Rejected(RejectReason::DeliveryFailed));
            },
        };

        // Let the user quote this delivery later and still land in the
        // right admin-chat thread.
        self.store
            .record_reply_vector(entry.user, delivered, inbound.message_id);

        info!(
            user = %entry.user,
            %quoted,
            %delivered,
            kind = content.kind(),
            "delivered admin reply"
        );
        self.transport
            .notify(self.admin.chat, NOTICE_REPLY_DELIVERED, Some(inbound.message_id))
            .await?;
        Ok(Outcome::Replied {
            user: entry.user,
            delivered,
        })
    }
}

/// Compose the admin-chat copy of a user message: sender label on top,
/// escaped body underneath, truncated to the transport limit for the kind.
fn labelled_forward(inbound: &Inbound, content: &Content) -> Content {
    let label = markup::sender_label(&inbound.sender);
    let body = content.text().map(markup::escape_html).unwrap_or_default();
    let combined = if body.is_empty() {
        label
    } else {
        format!("{label}\n\n{body}")
    };
    let limit = match content {
        Content::Text(_) => MAX_MESSAGE_LEN,
        _ => MAX_CAPTION_LEN,
    };
    content.with_text(markup::truncate_at_char_boundary(&combined, limit).to_owned())
}

/// Mirror an admin reply for the user's chat: same kind, escaped text so
/// the HTML send mode cannot be abused, no label.
fn escaped_reply(content: &Content) -> Content {
    let text = content.text().map(markup::escape_html).unwrap_or_default();
    content.with_text(text)
}
