use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use crate::error::NotifyError;

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Adapter for sending the end-of-run message.
#[async_trait]
pub trait NotifyAdapter: Send + Sync {
    async fn notify(&self, message: &str) -> Result<(), NotifyError>;
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Sends messages through the Telegram Bot API.
#[derive(Clone, Debug)]
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_base: String,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(
        api_base: impl Into<String>,
        token: impl Into<String>,
        chat_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_base: api_base.into(),
            token: token.into(),
            chat_id: chat_id.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            self.token
        )
    }
}

#[async_trait]
impl NotifyAdapter for TelegramNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(self.endpoint())
            .json(&SendMessage {
                chat_id: &self.chat_id,
                text: message,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Status {
                status: status.as_u16(),
                body,
            });
        }
        info!(chat_id = %self.chat_id, "telegram notification sent");
        Ok(())
    }
}
