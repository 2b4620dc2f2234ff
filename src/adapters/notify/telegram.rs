//! Telegram Notifier - Bot API `sendMessage`
//!
//! Sends one plain-text message per value bet, in ranking order. The
//! first failed send aborts the rest of the batch; the scanner logs
//! the failure and does not replay it.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::domain::detector::ValueBet;
use crate::ports::notifier::AlertNotifier;

use super::format::format_alert;

/// Default Telegram Bot API base URL.
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Bot credentials. Never read from the config file.
#[derive(Clone)]
pub struct TelegramCredentials {
    /// Bot token.
    pub token: String,
    /// Destination chat.
    pub chat_id: String,
}

impl std::fmt::Debug for TelegramCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramCredentials")
            .field("token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

impl TelegramCredentials {
    /// Read `TELEGRAM_TOKEN` and `TELEGRAM_CHAT_ID`; `None` unless both are set.
    pub fn from_env() -> Option<Self> {
        let token = std::env::var("TELEGRAM_TOKEN").ok().filter(|t| !t.trim().is_empty())?;
        let chat_id = std::env::var("TELEGRAM_CHAT_ID")
            .ok()
            .filter(|c| !c.trim().is_empty())?;
        Some(Self { token, chat_id })
    }
}

/// Telegram Bot API sink.
pub struct TelegramNotifier {
    http: Client,
    credentials: TelegramCredentials,
    api_url: String,
}

impl TelegramNotifier {
    /// Create a notifier against the public Bot API.
    pub fn new(credentials: TelegramCredentials, timeout: Duration) -> Result<Self> {
        Self::with_api_url(credentials, TELEGRAM_API_URL, timeout)
    }

    /// Create a notifier against a custom Bot API base URL.
    pub fn with_api_url(
        credentials: TelegramCredentials,
        api_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            credentials,
            api_url: api_url.into(),
        })
    }

    async fn send_message(&self, text: &str) -> Result<()> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.api_url.trim_end_matches('/'),
            self.credentials.token
        );
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({
                "chat_id": self.credentials.chat_id,
                "text": text,
            }))
            .send()
            .await
            .context("Telegram request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Telegram sendMessage returned {status}: {body}");
        }
        Ok(())
    }
}

#[async_trait]
impl AlertNotifier for TelegramNotifier {
    #[instrument(skip(self, bets), fields(bets = bets.len()))]
    async fn notify(&self, bets: &[ValueBet]) -> Result<()> {
        for bet in bets {
            self.send_message(&format_alert(bet))
                .await
                .with_context(|| format!("Failed to deliver alert for {}", bet.match_label))?;
            debug!(match_label = %bet.match_label, "Alert delivered");
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "telegram"
    }
}
