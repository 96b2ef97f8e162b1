//! Bot API payloads for launching the game from a chat.
//!
//! Only the handful of fields the launcher reads or writes are modelled, unknown
//! fields in incoming updates are ignored.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const API_BASE: &str = "https://api.telegram.org";
const START_COMMAND: &str = "/start";
const GREETING: &str = "Играй в сапера!";
const PLAY_BUTTON: &str = "🎮 Играть";

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Malformed update payload")]
    MalformedUpdate(#[from] serde_json::Error),
    #[error("Bot token is empty")]
    MissingToken,
}

/// Where the launcher listens and where it points players.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebhookConfig {
    bot_token: String,
    webapp_url: String,
}

impl WebhookConfig {
    pub fn new(bot_token: impl Into<String>, webapp_url: impl Into<String>) -> Result<Self, ProtocolError> {
        let bot_token = bot_token.into();
        if bot_token.trim().is_empty() {
            return Err(ProtocolError::MissingToken);
        }
        Ok(Self {
            bot_token,
            webapp_url: webapp_url.into(),
        })
    }

    pub fn webapp_url(&self) -> &str {
        &self.webapp_url
    }

    /// Path the chat platform posts updates to.
    pub fn webhook_path(&self) -> String {
        format!("/webhook/{}", self.bot_token)
    }

    pub fn send_message_url(&self) -> String {
        format!("{API_BASE}/bot{}/sendMessage", self.bot_token)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub text: Option<String>,
    pub chat: Chat,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SendMessage {
    pub chat_id: i64,
    pub text: String,
    pub reply_markup: InlineKeyboardMarkup,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub web_app: WebAppInfo,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WebAppInfo {
    pub url: String,
}

pub fn parse_update(raw: &str) -> Result<Update, ProtocolError> {
    Ok(serde_json::from_str(raw)?)
}

/// `/start`, `/start@somebot` and `/start payload` all count.
fn is_start_command(text: &str) -> bool {
    let command = text.split_whitespace().next().unwrap_or_default();
    let command = command.split_once('@').map_or(command, |(name, _)| name);
    command == START_COMMAND
}

/// Reply to send for an incoming update, if it warrants one.
pub fn handle_update(config: &WebhookConfig, update: &Update) -> Option<SendMessage> {
    let message = update.message.as_ref()?;
    let text = message.text.as_deref()?;
    if !is_start_command(text) {
        log::trace!("Ignoring message in chat {}", message.chat.id);
        return None;
    }

    log::debug!("Sending launcher to chat {}", message.chat.id);
    Some(SendMessage {
        chat_id: message.chat.id,
        text: GREETING.to_string(),
        reply_markup: InlineKeyboardMarkup {
            inline_keyboard: vec![vec![InlineKeyboardButton {
                text: PLAY_BUTTON.to_string(),
                web_app: WebAppInfo {
                    url: config.webapp_url.clone(),
                },
            }]],
        },
    })
}
