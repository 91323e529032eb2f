//! Relay core for courier.
//!
//! Holds the two stateful pieces of the bot: the [`store::CorrelationStore`]
//! mapping forwarded-message identities back to their original senders, and
//! the [`router::Router`] that classifies each inbound message and drives
//! exactly one outbound delivery through a [`router::Transport`].
//!
//! This crate knows nothing about teloxide; the Telegram adapter lives in
//! `courier-telegram` and implements the transport trait.

pub mod error;
pub mod markup;
pub mod message;
pub mod router;
pub mod store;

pub use {
    error::{StoreError, TransportError},
    message::{ChatId, Content, Inbound, MediaRef, MessageId, Sender, UserId},
    router::{AdminIdentity, Outcome, RejectReason, Router, Transport},
    store::{CorrelationEntry, CorrelationStore},
};
