//! Telegram Bot API adapter for admin notifications.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::domain::ports::{AdminNotifier, NotificationAction, NotifyError};

/// Sends admin notifications through `sendMessage` with an inline keyboard.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    http: Client,
    api_url: String,
    bot_token: String,
}

impl TelegramNotifier {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        api_url: impl Into<String>,
        bot_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: Client::builder().timeout(timeout).build()?,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
        })
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_url, self.bot_token)
    }
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboardMarkup<'a>>,
}

#[derive(Debug, Serialize)]
struct InlineKeyboardMarkup<'a> {
    inline_keyboard: Vec<Vec<InlineKeyboardButton<'a>>>,
}

#[derive(Debug, Serialize)]
struct InlineKeyboardButton<'a> {
    text: &'a str,
    callback_data: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

fn keyboard(actions: &[NotificationAction]) -> Option<InlineKeyboardMarkup<'_>> {
    if actions.is_empty() {
        return None;
    }
    // All buttons on a single row.
    Some(InlineKeyboardMarkup {
        inline_keyboard: vec![actions
            .iter()
            .map(|a| InlineKeyboardButton {
                text: &a.label,
                callback_data: &a.callback_data,
            })
            .collect()],
    })
}

#[async_trait]
impl AdminNotifier for TelegramNotifier {
    async fn send_admin_notification(
        &self,
        admin_telegram_id: i64,
        text: &str,
        actions: &[NotificationAction],
    ) -> Result<(), NotifyError> {
        let body = SendMessage {
            chat_id: admin_telegram_id,
            text,
            reply_markup: keyboard(actions),
        };

        let response = self
            .http
            .post(self.send_message_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        let parsed: Option<ApiResponse> = response.json().await.ok();
        match parsed {
            Some(ApiResponse { ok: true, .. }) if status.is_success() => {
                log::debug!("Notified admin {admin_telegram_id}");
                Ok(())
            }
            Some(ApiResponse { description, .. }) => Err(NotifyError::Rejected(format!(
                "status {status}: {}",
                description.unwrap_or_default()
            ))),
            None => Err(NotifyError::Rejected(format!("status {status}"))),
        }
    }
}

/// Stand-in used when no bot token is configured; logs and drops every message.
#[derive(Debug, Clone, Default)]
pub struct DisabledNotifier;

#[async_trait]
impl AdminNotifier for DisabledNotifier {
    async fn send_admin_notification(
        &self,
        admin_telegram_id: i64,
        _text: &str,
        _actions: &[NotificationAction],
    ) -> Result<(), NotifyError> {
        log::info!("BOT_TOKEN not set, skipping notification to admin {admin_telegram_id}");
        Err(NotifyError::Disabled)
    }
}
