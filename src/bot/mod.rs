//! Bot Runtime
//!
//! Long-poll loop and update routing: commands start rounds, callback
//! queries vote, inline queries offer a start card. Per-event failures are
//! logged and never take the loop down.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde_json::json;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::channels::telegram::{
    CallbackQuery, InlineQuery, TelegramMessage, TelegramTransport, Update, VOTE_CALLBACK_PREFIX,
};
use crate::channels::{ChannelError, ChatTransport};
use crate::messages;
use crate::questions::{QuestionPicker, QuestionPool};
use crate::rounds::{RoomId, RoundEngine, RoundRegistry, VoteEvent};

/// Marker text posted by the inline start card; seeing it starts a round.
const START_MARKER: &str = "🎲 /wyr_inline_start";

/// Commands that start a round in a group chat.
const START_COMMANDS: &[&str] = &["/would_you_rather", "/wyr"];

/// Backoff after a failed getUpdates call.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(2);

const PRIVATE_HELP: &str = "I run would-you-rather polls. Add me to a group, allow me to \
send messages, and use /would_you_rather (or /wyr) to start a round.";
const GROUP_HELP: &str = "Ready to play! Use /would_you_rather or /wyr to start a round.";
const GROUP_HINT: &str = "Add me to a group and use /would_you_rather there.";

/// Errors that can stop the bot from starting.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("question bank error: {0}")]
    Questions(#[from] crate::questions::QuestionError),

    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("logging error: {0}")]
    Logging(#[from] crate::logging::LoggingError),
}

/// The assembled bot: engine, transport, and the update router.
pub struct Bot {
    engine: RoundEngine,
    telegram: Arc<TelegramTransport>,
    pool: Arc<QuestionPool>,
}

impl Bot {
    /// Wire up a bot from its parts.
    pub fn new(
        telegram: Arc<TelegramTransport>,
        picker: Arc<QuestionPicker>,
        countdown: Duration,
    ) -> Self {
        let pool = picker.pool().clone();
        let engine = RoundEngine::new(
            Arc::new(RoundRegistry::new()),
            picker,
            telegram.clone(),
            countdown,
        );
        Self {
            engine,
            telegram,
            pool,
        }
    }

    /// The round engine, exposed for inspection.
    pub fn engine(&self) -> &RoundEngine {
        &self.engine
    }

    /// Run the long-poll loop until shutdown is signalled.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut offset = 0i64;
        info!("update loop started");
        loop {
            let updates = tokio::select! {
                result = self.telegram.get_updates(offset) => result,
                _ = shutdown.changed() => break,
            };
            if *shutdown.borrow() {
                break;
            }
            match updates {
                Ok(updates) => {
                    for update in updates {
                        offset = offset.max(update.update_id + 1);
                        self.dispatch(update).await;
                    }
                }
                Err(error) => {
                    warn!(error = %error, "getUpdates failed, backing off");
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                }
            }
        }
        info!("update loop stopped");
    }

    async fn dispatch(&self, update: Update) {
        if let Some(callback) = update.callback_query {
            self.handle_callback(callback).await;
        } else if let Some(message) = update.message {
            self.handle_message(message).await;
        } else if let Some(inline) = update.inline_query {
            self.handle_inline(inline).await;
        }
    }

    async fn handle_message(&self, message: TelegramMessage) {
        let Some(text) = message.text.as_deref() else {
            return;
        };
        if !self.telegram.is_chat_allowed(message.chat.id) {
            debug!(chat_id = message.chat.id, "ignoring disallowed chat");
            return;
        }

        if text.trim() == START_MARKER {
            if !message.chat.is_group() {
                self.reply(message.chat.id, GROUP_HINT).await;
                return;
            }
            // Drop the marker so only the poll remains visible.
            if let Err(error) = self
                .telegram
                .delete_message(message.chat.id, message.message_id)
                .await
            {
                debug!(error = %error, "could not delete the start marker");
            }
            self.start_round(message.chat.id).await;
            return;
        }

        let Some(command) = command_name(text) else {
            return;
        };
        if command == "/start" {
            let help = if message.chat.is_group() {
                GROUP_HELP
            } else {
                PRIVATE_HELP
            };
            self.reply(message.chat.id, help).await;
        } else if START_COMMANDS.contains(&command) {
            if message.chat.is_group() {
                self.start_round(message.chat.id).await;
            } else {
                self.reply(message.chat.id, GROUP_HINT).await;
            }
        }
    }

    async fn handle_callback(&self, callback: CallbackQuery) {
        let payload = callback
            .data
            .as_deref()
            .and_then(|data| data.strip_prefix(VOTE_CALLBACK_PREFIX));
        let (Some(payload), Some(message)) = (payload, callback.message) else {
            // Nothing actionable; just dismiss the client's spinner.
            if let Err(error) = self.telegram.ack_vote(&callback.id, "", false).await {
                debug!(error = %error, "failed to dismiss a callback");
            }
            return;
        };

        let from = callback.from;
        let event = VoteEvent {
            room_id: message.chat.id,
            anchor_id: message.message_id,
            participant_id: from.id,
            display_name: messages::display_name(
                from.username.as_deref(),
                from.first_name.as_deref(),
                from.last_name.as_deref(),
                from.id,
            ),
            payload: payload.to_string(),
            interaction_id: callback.id,
        };
        self.engine.submit_vote(event).await;
    }

    async fn handle_inline(&self, inline: InlineQuery) {
        // Preview a random question in the card description.
        let preview_index = rand::rng().random_range(0..self.pool.len());
        let description = match self.pool.get(preview_index) {
            Some(question) => format!(
                "{} / {}",
                truncate(&question.option_a, 30),
                truncate(&question.option_b, 30)
            ),
            None => String::new(),
        };
        let results = json!([{
            "type": "article",
            "id": "wyr-start",
            "title": "Ask a would-you-rather question",
            "description": description,
            "input_message_content": { "message_text": START_MARKER },
        }]);
        if let Err(error) = self.telegram.answer_inline_query(&inline.id, results).await {
            warn!(error = %error, "failed to answer an inline query");
        }
    }

    async fn start_round(&self, room_id: RoomId) {
        if let Err(error) = self.engine.start_round(room_id).await {
            warn!(room_id, error = %error, "failed to start a round");
        }
    }

    async fn reply(&self, chat_id: RoomId, text: &str) {
        if let Err(error) = self.telegram.send_text(chat_id, text).await {
            warn!(chat_id, error = %error, "failed to send a reply");
        }
    }
}

/// Extract the leading `/command`, stripping any `@botname` suffix.
fn command_name(text: &str) -> Option<&str> {
    let first = text.split_whitespace().next()?;
    if !first.starts_with('/') {
        return None;
    }
    first.split('@').next()
}

/// Shorten a label for the inline card description.
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let short: String = text.chars().take(max_chars).collect();
        format!("{short}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_name() {
        assert_eq!(command_name("/wyr"), Some("/wyr"));
        assert_eq!(command_name("/wyr@pollbot extra words"), Some("/wyr"));
        assert_eq!(command_name("  /start  "), Some("/start"));
        assert_eq!(command_name("hello"), None);
        assert_eq!(command_name(""), None);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 30), "short");
        let long = "a".repeat(40);
        let short = truncate(&long, 30);
        assert_eq!(short.chars().count(), 31);
        assert!(short.ends_with('…'));
    }

    #[test]
    fn test_start_commands_are_commands() {
        for command in START_COMMANDS {
            assert_eq!(command_name(command), Some(*command));
        }
    }
}
