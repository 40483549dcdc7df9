//! Thin wrapper over the Telegram Bot HTTP API.

use reqwest::Client;
use serde_json::json;

use crate::Error;

const API_BASE: &str = "https://api.telegram.org";

/// A Telegram bot that can send messages.
///
/// Only the `sendMessage` method is wrapped; the bot is send-only.
#[derive(Debug, Clone)]
pub struct Telegram {
    token: String,
    client: Client,
}

impl Telegram {
    /// Create a client for the bot identified by `token`.
    pub fn new(token: String) -> Self {
        Self {
            token,
            client: Client::new(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{API_BASE}/bot{}/{method}", self.token)
    }

    /// Send a plain-text message to `chat_id`.
    ///
    /// # Errors
    /// This function will return an [Error::Notify] if the request fails or
    /// the Bot API rejects it.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), Error> {
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&json!({ "chat_id": chat_id, "text": text }))
            .send()
            .await
            .map_err(|error| Error::Notify(error.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Notify(format!("telegram responded {status}: {body}")));
        }

        Ok(())
    }
}

#[cfg(test)]
mod telegram_tests {
    use super::Telegram;

    #[test]
    fn method_url_embeds_the_bot_token() {
        let telegram = Telegram::new("123456:ABCDEF".to_owned());

        assert_eq!(
            telegram.method_url("sendMessage"),
            "https://api.telegram.org/bot123456:ABCDEF/sendMessage"
        );
    }
}
