//! Chat Transport
//!
//! Defines the interface the round engine renders through, plus the shared
//! error type for channel implementations. The engine only ever talks to a
//! [`ChatTransport`]; the Telegram client lives in [`telegram`].

pub mod telegram;

use async_trait::async_trait;
use std::sync::Arc;

use crate::rounds::{AnchorId, RoomId};

/// Result type for channel operations.
pub type ChannelResult<T> = Result<T, ChannelError>;

/// Errors that can occur in channel operations.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("bot api rejected the call: {0}")]
    Api(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Outbound surface of the chat transport.
///
/// Edits and acks are best-effort: callers log failures and keep the round's
/// logical state authoritative.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Post a new poll message with the two vote buttons; the returned
    /// message id becomes the round's anchor.
    async fn post_poll(&self, room_id: RoomId, text: &str) -> ChannelResult<AnchorId>;

    /// Edit an open poll's text, keeping the vote buttons.
    async fn update_poll(
        &self,
        room_id: RoomId,
        anchor_id: AnchorId,
        text: &str,
    ) -> ChannelResult<()>;

    /// Replace the poll with its final text and strip the buttons.
    async fn close_poll(
        &self,
        room_id: RoomId,
        anchor_id: AnchorId,
        text: &str,
    ) -> ChannelResult<()>;

    /// Show a short feedback toast for a vote interaction.
    async fn ack_vote(&self, interaction_id: &str, text: &str, alert: bool) -> ChannelResult<()>;
}

/// Type-erased transport handed to the engine and countdown tasks.
pub type DynTransport = Arc<dyn ChatTransport>;
