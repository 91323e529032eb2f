use std::sync::Arc;

use {
    secrecy::ExposeSecret,
    teloxide::{
        ApiError, RequestError,
        prelude::*,
        types::{AllowedUpdate, BotCommand, UpdateKind},
    },
    tokio_util::sync::CancellationToken,
    tracing::{debug, error, info, warn},
};

use courier_relay::{CorrelationStore, Router};

use crate::{config::RelayConfig, handlers, state::RelayState, transport::TelegramTransport};

/// Start the relay.
///
/// Verifies credentials, then spawns a long-polling loop that feeds every
/// update through the router until the returned `CancellationToken` is
/// cancelled.
pub async fn start_polling(config: RelayConfig) -> anyhow::Result<CancellationToken> {
    // Client timeout longer than the long-polling timeout so the HTTP
    // client doesn't abort the request before Telegram responds.
    let client = teloxide::net::default_reqwest_settings()
        .timeout(std::time::Duration::from_secs(
            u64::from(config.poll_timeout_secs) + 15,
        ))
        .build()?;
    let bot = Bot::with_client(config.token.expose_secret(), client);

    // Verify credentials and get the bot username.
    let me = bot.get_me().await?;
    let bot_username = me.username.clone();

    // Delete any existing webhook so long polling works.
    bot.delete_webhook().send().await?;

    // Register slash commands for autocomplete in Telegram clients.
    let commands = vec![
        BotCommand::new("start", "What this bot does"),
        BotCommand::new("help", "How to reach the administrator"),
    ];
    if let Err(e) = bot.set_my_commands(commands).await {
        warn!("failed to register bot commands: {e}");
    }

    info!(
        username = ?bot_username,
        admin_chat_id = config.admin_chat_id,
        "relay bot connected (webhook cleared)"
    );

    let cancel = CancellationToken::new();
    let poll_timeout = config.poll_timeout_secs;

    let state = Arc::new(RelayState {
        bot: bot.clone(),
        bot_username,
        router: Router::new(
            TelegramTransport::new(bot.clone()),
            Arc::new(CorrelationStore::new()),
            config.admin(),
        ),
        config,
    });

    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        info!("starting telegram polling loop");
        let mut offset: i32 = 0;

        loop {
            if cancel_clone.is_cancelled() {
                info!("telegram polling stopped");
                break;
            }

            let result = bot
                .get_updates()
                .offset(offset)
                .timeout(poll_timeout)
                .allowed_updates(vec![AllowedUpdate::Message])
                .await;

            match result {
                Ok(updates) => {
                    debug!(count = updates.len(), "got telegram updates");
                    for update in updates {
                        offset = update.id.as_offset();
                        match update.kind {
                            UpdateKind::Message(msg) => {
                                debug!(chat_id = msg.chat.id.0, "received telegram message");
                                let state = Arc::clone(&state);
                                // Handle concurrently; ordering within a
                                // thread comes from reply linkage, not
                                // processing order.
                                tokio::spawn(async move {
                                    if let Err(e) = handlers::handle_message(msg, &state).await {
                                        error!(error = %e, "error handling telegram message");
                                    }
                                });
                            },
                            other => {
                                debug!("ignoring non-message update: {other:?}");
                            },
                        }
                    }
                },
                Err(e) => {
                    // Another instance is polling with the same token; keeping
                    // both alive would split the update stream between them.
                    let is_conflict =
                        matches!(&e, RequestError::Api(ApiError::TerminatedByOtherGetUpdates));
                    if is_conflict {
                        error!(
                            "relay stopped: another bot instance is already running with this token"
                        );
                        cancel_clone.cancel();
                        break;
                    }

                    warn!(error = %e, "telegram getUpdates failed");
                    tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                },
            }
        }
    });

    Ok(cancel)
}
