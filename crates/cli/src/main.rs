use {
    clap::Parser,
    secrecy::Secret,
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use courier_telegram::{RelayConfig, bot};

#[derive(Parser)]
#[command(name = "courier", about = "Courier — Telegram feedback relay bot")]
struct Cli {
    /// Bot token from @BotFather.
    #[arg(long, env = "BOT_TOKEN", hide_env_values = true)]
    token: String,

    /// Chat id of the administrator who receives all forwarded messages.
    #[arg(long, env = "ADMIN_CHAT_ID")]
    admin_chat_id: i64,

    /// Greeting sent for /start and /help (overrides the built-in text).
    #[arg(long, env = "COURIER_GREETING")]
    greeting: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, default_value_t = false)]
    json_logs: bool,
}

fn init_tracing(log_level: &str, json_logs: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before clap reads the environment.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs);

    let mut config = RelayConfig {
        token: Secret::new(cli.token),
        admin_chat_id: cli.admin_chat_id,
        ..Default::default()
    };
    if let Some(greeting) = cli.greeting {
        config.greeting = greeting;
    }

    let cancel = bot::start_polling(config).await?;
    info!("courier running; press Ctrl-C to stop");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown requested");
            cancel.cancel();
        },
        _ = cancel.cancelled() => {
            // The polling loop bailed out on its own (e.g. token conflict).
        },
    }

    Ok(())
}
