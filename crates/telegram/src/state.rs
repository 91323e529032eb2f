use courier_relay::Router;

use crate::{config::RelayConfig, transport::TelegramTransport};

/// Shared runtime state: one bot, one router, one store for the life of
/// the process.
pub struct RelayState {
    pub bot: teloxide::Bot,
    pub bot_username: Option<String>,
    pub config: RelayConfig,
    pub router: Router<TelegramTransport>,
}
