//! Telegram Bot API delivery.

use async_trait::async_trait;
use finalert_core::{Messenger, SendError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default Bot API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Environment variable holding the bot token.
pub const DEFAULT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

/// Telegram bot configuration.
#[derive(Clone)]
pub struct TelegramConfig {
    pub token: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl TelegramConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Load the token from the environment variable `token_env`.
    pub fn from_env(token_env: &str) -> Result<Self, SendError> {
        let token = std::env::var(token_env)
            .map_err(|_| SendError::Configuration(format!("{} not set", token_env)))?;
        if token.trim().is_empty() {
            return Err(SendError::Configuration(format!("{} is empty", token_env)));
        }
        Ok(Self::new(token.trim()))
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            self.token
        )
    }
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends messages through the Telegram Bot API.
#[derive(Debug, Clone)]
pub struct TelegramMessenger {
    config: TelegramConfig,
    client: Client,
}

impl TelegramMessenger {
    pub fn new(config: TelegramConfig) -> Result<Self, SendError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SendError::Configuration(e.to_string()))?;
        Ok(Self { config, client })
    }

    /// Create from the environment.
    pub fn from_env(token_env: &str) -> Result<Self, SendError> {
        Self::new(TelegramConfig::from_env(token_env)?)
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), SendError> {
        let body = SendMessage {
            chat_id,
            text,
            disable_web_page_preview: true,
        };

        let resp = self
            .client
            .post(self.config.send_message_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| SendError::Transport(e.without_url().to_string()))?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        let parsed: Option<ApiResponse> = serde_json::from_str(&text).ok();

        match parsed {
            Some(api) if status.is_success() && api.ok => {
                debug!(chat_id, "Message delivered");
                Ok(())
            }
            Some(api) => Err(SendError::Rejected {
                status: status.as_u16(),
                message: api.description.unwrap_or_else(|| status.to_string()),
            }),
            None => Err(SendError::Rejected {
                status: status.as_u16(),
                message: format!("unexpected response: {}", status),
            }),
        }
    }

    fn name(&self) -> &str {
        "telegram"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_message_url() {
        let config = TelegramConfig::new("123:abc").with_api_base("https://bot.example/");
        assert_eq!(config.send_message_url(), "https://bot.example/bot123:abc/sendMessage");
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = TelegramConfig::new("123:secret");
        assert!(!format!("{:?}", config).contains("secret"));
    }

    #[test]
    fn test_missing_token_env() {
        let err = TelegramConfig::from_env("FINALERT_TEST_TOKEN_THAT_IS_NOT_SET").unwrap_err();
        assert!(matches!(err, SendError::Configuration(_)));
    }

    #[test]
    fn test_api_response_parsing() {
        let rejected: ApiResponse =
            serde_json::from_str(r#"{"ok": false, "error_code": 403, "description": "Forbidden: bot was blocked by the user"}"#)
                .unwrap();
        assert!(!rejected.ok);
        assert_eq!(
            rejected.description.as_deref(),
            Some("Forbidden: bot was blocked by the user")
        );
    }
}
