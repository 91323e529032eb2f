//! Telegram transport adapter for courier.
//!
//! Implements the relay core's `Transport` trait with the teloxide library,
//! converts inbound Bot API messages into the core's descriptor, and runs
//! the long-polling loop that feeds the router.

pub mod bot;
pub mod config;
pub mod error;
pub mod handlers;
pub mod inbound;
pub mod state;
pub mod transport;

pub use {config::RelayConfig, transport::TelegramTransport};
