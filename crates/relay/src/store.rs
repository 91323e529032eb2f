use dashmap::{DashMap, mapref::entry::Entry};

use crate::{
    error::StoreError,
    message::{MessageId, UserId},
};

/// The origin of a forwarded message: which user sent it, and the id of
/// their original message in their own chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationEntry {
    pub user: UserId,
    pub message: MessageId,
}

/// In-memory bidirectional index between forwarded-message identity and
/// original-message identity.
///
/// The forward direction keys on the administrator-chat copy of a user
/// message: for every message the relay ever placed in the admin chat, it
/// knows which user and which original message it came from. The reverse
/// direction keys on `(user, delivered message)` pairs so a user quoting an
/// administrator reply can be threaded back onto the admin-chat message
/// that produced it.
///
/// Entries are immutable once written and never deleted; the store grows
/// for the life of the process. Both maps accept concurrent `record` and
/// `resolve` calls — inserts are atomic (key and value land together) and
/// a lookup never observes a half-written entry.
#[derive(Debug, Default)]
pub struct CorrelationStore {
    /// admin-chat message id -> (user, user message id)
    forwarded: DashMap<MessageId, CorrelationEntry>,
    /// (user, message id delivered into the user's chat) -> admin-chat
    /// message id of the administrator reply that produced it
    reply_vectors: DashMap<(UserId, MessageId), MessageId>,
}

impl CorrelationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Link a freshly forwarded admin-chat message back to its origin.
    ///
    /// Fails with [`StoreError::DuplicateKey`] if the forwarded id is
    /// already linked. That only happens if the transport reuses message
    /// ids; overwriting would silently misroute replies, so the conflict
    /// is surfaced instead.
    pub fn record(
        &self,
        forwarded: MessageId,
        user: UserId,
        message: MessageId,
    ) -> Result<(), StoreError> {
        match self.forwarded.entry(forwarded) {
            Entry::Occupied(_) => Err(StoreError::DuplicateKey(forwarded)),
            Entry::Vacant(slot) => {
                slot.insert(CorrelationEntry { user, message });
                Ok(())
            },
        }
    }

    /// Look up the origin of a forwarded admin-chat message. Pure read.
    #[must_use]
    pub fn resolve(&self, forwarded: MessageId) -> Option<CorrelationEntry> {
        self.forwarded.get(&forwarded).map(|entry| *entry)
    }

    /// Remember that `delivered` (a message the relay placed in `user`'s
    /// chat) carries the administrator reply `admin_message`.
    pub fn record_reply_vector(
        &self,
        user: UserId,
        delivered: MessageId,
        admin_message: MessageId,
    ) {
        self.reply_vectors
            .insert((user, delivered), admin_message);
    }

    /// Was `quoted` previously delivered into this exact user's chat as an
    /// administrator reply? Returns the admin-chat message to thread onto.
    #[must_use]
    pub fn reply_vector(&self, user: UserId, quoted: MessageId) -> Option<MessageId> {
        self.reply_vectors.get(&(user, quoted)).map(|id| *id)
    }

    /// Number of forwarded-message links held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.forwarded.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forwarded.is_empty()
    }
}
