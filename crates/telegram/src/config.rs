use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

use courier_relay::{AdminIdentity, ChatId, UserId};

/// Greeting sent for `/start` and `/help`.
pub const DEFAULT_GREETING: &str = "Hi! This is a feedback bot. Send me a message and it will be \
     forwarded to the administrator; replies come back here.";

/// Configuration for the relay bot.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Bot token from @BotFather.
    #[serde(serialize_with = "serialize_secret")]
    pub token: Secret<String>,

    /// Chat id of the administrator. All user messages are forwarded here,
    /// and only replies authored by this identity are routed back.
    pub admin_chat_id: i64,

    /// Reply to `/start` and `/help`.
    pub greeting: String,

    /// Long-polling timeout passed to `getUpdates`, in seconds.
    pub poll_timeout_secs: u32,
}

impl RelayConfig {
    /// The administrator as the relay core sees them. The admin's DM chat
    /// with the bot shares the admin's user id.
    #[must_use]
    pub fn admin(&self) -> AdminIdentity {
        AdminIdentity {
            user: UserId(self.admin_chat_id),
            chat: ChatId(self.admin_chat_id),
        }
    }
}

impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("token", &"[REDACTED]")
            .field("admin_chat_id", &self.admin_chat_id)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .finish_non_exhaustive()
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            token: Secret::new(String::new()),
            admin_chat_id: 0,
            greeting: DEFAULT_GREETING.to_owned(),
            poll_timeout_secs: 30,
        }
    }
}
