//! Telegram Channel
//!
//! Bot API client for the poll bot: long polling for updates plus the
//! message calls the round engine renders through. Only the handful of
//! methods the bot needs are wrapped.

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

use super::{ChannelError, ChannelResult, ChatTransport};
use crate::rounds::{AnchorId, Choice, RoomId};

/// Default Bot API host.
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Prefix of the callback payload carried by the vote buttons.
pub const VOTE_CALLBACK_PREFIX: &str = "vote:";

/// Long-poll duration for getUpdates.
const LONG_POLL_SECONDS: u64 = 30;

/// Telegram channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TelegramConfig {
    /// Bot token from BotFather.
    pub bot_token: String,
    /// Base URL of the Bot API (override for tests or a local server).
    pub api_base: String,
    /// Allowed chat ids (empty = all allowed).
    pub allowed_chats: Vec<i64>,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            allowed_chats: Vec::new(),
        }
    }
}

/// Telegram transport implementation.
pub struct TelegramTransport {
    config: TelegramConfig,
    base: Url,
    http: Client,
}

impl TelegramTransport {
    /// Create a transport from a validated configuration.
    pub fn new(config: TelegramConfig) -> ChannelResult<Self> {
        if config.bot_token.is_empty() {
            return Err(ChannelError::InvalidConfig(
                "bot token is required".to_string(),
            ));
        }
        let base = Url::parse(&config.api_base)
            .map_err(|e| ChannelError::InvalidConfig(format!("invalid api base: {e}")))?;
        let http = Client::builder()
            .timeout(Duration::from_secs(LONG_POLL_SECONDS + 10))
            .build()?;
        Ok(Self { config, base, http })
    }

    /// Check if a chat id is allowed.
    pub fn is_chat_allowed(&self, chat_id: i64) -> bool {
        self.config.allowed_chats.is_empty() || self.config.allowed_chats.contains(&chat_id)
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}bot{}/{}", self.base, self.config.bot_token, method)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, payload: Value) -> ChannelResult<T> {
        let response = self
            .http
            .post(self.method_url(method))
            .json(&payload)
            .send()
            .await?;
        let body: ApiResponse<T> = response.json().await?;
        if !body.ok {
            return Err(ChannelError::Api(
                body.description
                    .unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        body.result
            .ok_or_else(|| ChannelError::Api("response carried no result".to_string()))
    }

    /// Identify the bot. Doubles as the startup credentials check.
    pub async fn get_me(&self) -> ChannelResult<TelegramUser> {
        self.call("getMe", json!({})).await
    }

    /// Long-poll for updates past `offset`.
    pub async fn get_updates(&self, offset: i64) -> ChannelResult<Vec<Update>> {
        self.call(
            "getUpdates",
            json!({
                "offset": offset,
                "timeout": LONG_POLL_SECONDS,
                "allowed_updates": ["message", "callback_query", "inline_query"],
            }),
        )
        .await
    }

    /// Send a plain text message without buttons.
    pub async fn send_text(&self, chat_id: i64, text: &str) -> ChannelResult<AnchorId> {
        let message: SentMessage = self
            .call("sendMessage", json!({ "chat_id": chat_id, "text": text }))
            .await?;
        Ok(message.message_id)
    }

    /// Delete a message. Used for the inline start marker.
    pub async fn delete_message(&self, chat_id: i64, message_id: i64) -> ChannelResult<()> {
        let _: bool = self
            .call(
                "deleteMessage",
                json!({ "chat_id": chat_id, "message_id": message_id }),
            )
            .await?;
        Ok(())
    }

    /// Answer an inline query with prebuilt result articles.
    pub async fn answer_inline_query(
        &self,
        inline_query_id: &str,
        results: Value,
    ) -> ChannelResult<()> {
        let _: bool = self
            .call(
                "answerInlineQuery",
                json!({
                    "inline_query_id": inline_query_id,
                    "results": results,
                    "cache_time": 10,
                }),
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn post_poll(&self, room_id: RoomId, text: &str) -> ChannelResult<AnchorId> {
        let message: SentMessage = self
            .call(
                "sendMessage",
                json!({
                    "chat_id": room_id,
                    "text": text,
                    "reply_markup": vote_keyboard(),
                }),
            )
            .await?;
        Ok(message.message_id)
    }

    async fn update_poll(
        &self,
        room_id: RoomId,
        anchor_id: AnchorId,
        text: &str,
    ) -> ChannelResult<()> {
        let _: Value = self
            .call(
                "editMessageText",
                json!({
                    "chat_id": room_id,
                    "message_id": anchor_id,
                    "text": text,
                    "reply_markup": vote_keyboard(),
                }),
            )
            .await?;
        Ok(())
    }

    async fn close_poll(
        &self,
        room_id: RoomId,
        anchor_id: AnchorId,
        text: &str,
    ) -> ChannelResult<()> {
        let _: Value = self
            .call(
                "editMessageText",
                json!({
                    "chat_id": room_id,
                    "message_id": anchor_id,
                    "text": text,
                }),
            )
            .await?;
        Ok(())
    }

    async fn ack_vote(&self, interaction_id: &str, text: &str, alert: bool) -> ChannelResult<()> {
        let _: bool = self
            .call(
                "answerCallbackQuery",
                json!({
                    "callback_query_id": interaction_id,
                    "text": text,
                    "show_alert": alert,
                }),
            )
            .await?;
        Ok(())
    }
}

/// The two vote buttons, one row.
fn vote_keyboard() -> Value {
    json!({
        "inline_keyboard": [[
            {
                "text": "🔵 Option 1",
                "callback_data": format!("{VOTE_CALLBACK_PREFIX}{}", Choice::FIRST_PAYLOAD),
            },
            {
                "text": "🔴 Option 2",
                "callback_data": format!("{VOTE_CALLBACK_PREFIX}{}", Choice::SECOND_PAYLOAD),
            },
        ]]
    })
}

/// Bot API response envelope.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

/// Result of sendMessage; only the id matters here.
#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

/// One long-poll update.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    /// Monotonic update id; the next poll offset is the max seen plus one.
    pub update_id: i64,
    /// A posted message (commands, the inline start marker).
    #[serde(default)]
    pub message: Option<TelegramMessage>,
    /// A vote button press.
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
    /// An inline query typed at the bot's name.
    #[serde(default)]
    pub inline_query: Option<InlineQuery>,
}

/// An incoming chat message.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramMessage {
    pub message_id: i64,
    pub chat: TelegramChat,
    #[serde(default)]
    pub from: Option<TelegramUser>,
    #[serde(default)]
    pub text: Option<String>,
}

/// The chat a message belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

impl TelegramChat {
    /// Whether this chat is a (super)group, where rounds may run.
    pub fn is_group(&self) -> bool {
        matches!(self.kind.as_str(), "group" | "supergroup")
    }
}

/// A Telegram user, reduced to the fields the bot reads.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// A vote button press.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: TelegramUser,
    #[serde(default)]
    pub message: Option<TelegramMessage>,
    #[serde(default)]
    pub data: Option<String>,
}

/// An inline query; only the id is needed to answer it.
#[derive(Debug, Clone, Deserialize)]
pub struct InlineQuery {
    pub id: String,
}
