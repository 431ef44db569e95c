use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tokio::time::Duration;
use tracing::{debug, error};

use crate::delivery::ChatTransport;
use crate::environment::TelegramConfig;
use crate::{HeraldError, Result, TARGET_TELEGRAM};

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Telegram `parse_mode` values the bots use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Markdown,
}

impl ParseMode {
    fn as_str(&self) -> &'static str {
        match self {
            ParseMode::Markdown => "Markdown",
        }
    }
}

/// Posts messages through the Telegram Bot API `sendMessage` method.
pub struct TelegramClient {
    http: Client,
    token: String,
    chat_id: String,
    parse_mode: Option<ParseMode>,
    disable_web_page_preview: bool,
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HeraldError::Fetch(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            token: config.token.clone(),
            chat_id: config.chat_id.clone(),
            parse_mode: None,
            disable_web_page_preview: true,
        })
    }

    pub fn with_parse_mode(mut self, parse_mode: ParseMode) -> Self {
        self.parse_mode = Some(parse_mode);
        self
    }

    fn payload(&self, text: &str) -> serde_json::Value {
        let mut payload = json!({
            "chat_id": self.chat_id,
            "text": text,
            "disable_web_page_preview": self.disable_web_page_preview,
        });
        if let Some(parse_mode) = self.parse_mode {
            payload["parse_mode"] = json!(parse_mode.as_str());
        }
        payload
    }
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn send(&self, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", TELEGRAM_API_BASE, self.token);
        let payload = self.payload(text);

        debug!(target: TARGET_TELEGRAM, "Sending Telegram message (length = {})", text.chars().count());
        let response = self.http.post(&url).json(&payload).send().await;

        match response {
            Ok(response) if response.status().is_success() => Ok(()),
            Ok(response) => {
                let status = response.status().as_u16();
                let error_text = response.text().await.unwrap_or_default();
                error!(target: TARGET_TELEGRAM, " !! Error sending Telegram message: {} {}", status, error_text);
                Err(HeraldError::Delivery {
                    status,
                    message: error_text,
                })
            }
            Err(err) => {
                error!(target: TARGET_TELEGRAM, " !! Error sending Telegram message: {:?}", err);
                Err(HeraldError::Delivery {
                    status: err.status().map(|s| s.as_u16()).unwrap_or(0),
                    message: err.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> TelegramClient {
        let config = TelegramConfig {
            token: "123:abc".to_string(),
            chat_id: "-100200300".to_string(),
        };
        TelegramClient::new(&config, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_payload_plain_text() {
        let payload = client().payload("hello");
        assert_eq!(payload["chat_id"], "-100200300");
        assert_eq!(payload["text"], "hello");
        assert_eq!(payload["disable_web_page_preview"], true);
        assert!(payload.get("parse_mode").is_none());
    }

    #[test]
    fn test_payload_markdown() {
        let payload = client().with_parse_mode(ParseMode::Markdown).payload("*bold*");
        assert_eq!(payload["parse_mode"], "Markdown");
    }
}
