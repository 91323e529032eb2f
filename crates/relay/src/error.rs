use thiserror::Error;

use crate::message::MessageId;

/// Correlation store failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The forwarded-message id is already linked to a different origin.
    /// Honoring the insert would misroute a future reply, so the caller
    /// must reject the forward instead.
    #[error("correlation entry already recorded for forwarded message {0}")]
    DuplicateKey(MessageId),
}

/// Failure at the single outbound-call boundary.
///
/// The split between variants exists for diagnostics only; the router
/// treats every transport failure the same way (log, notify the sender,
/// never retry).
#[derive(Debug, Error)]
pub enum TransportError {
    /// The target cannot receive messages: blocked the bot, deactivated
    /// account, unknown chat id.
    #[error("recipient unavailable: {0}")]
    RecipientUnavailable(String),

    /// Any other delivery failure (network fault, malformed payload, ...).
    #[error("transport request failed: {0}")]
    Request(String),
}
