//! Round orchestration.
//!
//! Ties the pieces together: picks a question and posts the poll, routes
//! vote outcomes to the transport, and arms the countdown exactly once.
//! All per-room work runs while holding that room's guard; the guard is
//! released before the countdown's sleep ever starts.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::countdown;
use super::registry::RoundRegistry;
use super::round::{AnchorId, ParticipantId, RoomId, RoundKey};
use super::votes::{self, VoteError, VoteOutcome, VoteUpdate};
use crate::channels::{ChannelResult, DynTransport};
use crate::messages;
use crate::questions::QuestionPicker;

/// A participant's vote interaction, as delivered by the transport.
#[derive(Debug, Clone)]
pub struct VoteEvent {
    /// Room the vote was cast in.
    pub room_id: RoomId,
    /// Message the poll is anchored to.
    pub anchor_id: AnchorId,
    /// The voter.
    pub participant_id: ParticipantId,
    /// Name shown in voter lists.
    pub display_name: String,
    /// Raw button payload ("1" or "2").
    pub payload: String,
    /// Interaction id to acknowledge.
    pub interaction_id: String,
}

/// Drives the lifecycle of rounds against a chat transport.
pub struct RoundEngine {
    registry: Arc<RoundRegistry>,
    picker: Arc<QuestionPicker>,
    transport: DynTransport,
    countdown: Duration,
}

impl RoundEngine {
    /// Create an engine.
    pub fn new(
        registry: Arc<RoundRegistry>,
        picker: Arc<QuestionPicker>,
        transport: DynTransport,
        countdown: Duration,
    ) -> Self {
        Self {
            registry,
            picker,
            transport,
            countdown,
        }
    }

    /// The registry of live rounds.
    pub fn registry(&self) -> &Arc<RoundRegistry> {
        &self.registry
    }

    /// Start a new round in a room: pick a question, post the poll message,
    /// and store the round under (room, posted message).
    pub async fn start_round(&self, room_id: RoomId) -> ChannelResult<RoundKey> {
        let guard = self.registry.room_guard(room_id);
        let _room = guard.lock().await;

        let question = self.picker.pick(room_id);
        let text = messages::open_poll_text(&question.option_a, &question.option_b, &[], None);
        let anchor_id = self.transport.post_poll(room_id, &text).await?;

        let key = RoundKey::new(room_id, anchor_id);
        self.registry.create(key, &question);
        info!(
            room_id,
            anchor_id,
            question_index = question.index,
            "round started"
        );
        Ok(key)
    }

    /// Apply one vote event: acknowledge the voter, re-render the poll, and
    /// arm the countdown when this vote crosses the threshold.
    pub async fn submit_vote(&self, event: VoteEvent) {
        let key = RoundKey::new(event.room_id, event.anchor_id);
        let guard = self.registry.room_guard(event.room_id);
        let _room = guard.lock().await;

        let outcome = votes::apply_vote(
            &self.registry,
            key,
            event.participant_id,
            &event.display_name,
            &event.payload,
        );
        match outcome {
            Err(VoteError::RoundNotFound) => {
                self.ack(&event, "This round has already ended.", true).await;
            }
            Err(VoteError::InvalidChoice) => {
                self.ack(&event, "That is not one of the options.", false).await;
            }
            Ok(VoteOutcome::Unchanged) => {
                self.ack(&event, "You already picked that option.", false).await;
            }
            Ok(VoteOutcome::Recorded(update)) => {
                self.ack(&event, "Vote counted!", false).await;
                self.after_vote(key, update).await;
            }
            Ok(VoteOutcome::Changed(update)) => {
                self.ack(&event, "Vote updated.", false).await;
                self.after_vote(key, update).await;
            }
        }
    }

    /// Re-render the poll after a recorded or changed vote and arm the
    /// countdown if this vote crossed the threshold. Runs under the room
    /// guard held by `submit_vote`, so arming can happen at most once.
    async fn after_vote(&self, key: RoundKey, update: VoteUpdate) {
        let timer_seconds = update.timer_running.then(|| self.countdown.as_secs());
        self.render_open(key, &update.voters, timer_seconds).await;

        if update.arm_timer {
            let handle = countdown::schedule(
                self.registry.clone(),
                self.transport.clone(),
                key,
                self.countdown,
            );
            self.registry
                .with_round(key, |round| round.countdown_handle = Some(handle));
            info!(
                room_id = key.room_id,
                anchor_id = key.anchor_id,
                seconds = self.countdown.as_secs(),
                "countdown armed"
            );
            self.render_open(key, &update.voters, Some(self.countdown.as_secs()))
                .await;
        }
    }

    async fn render_open(&self, key: RoundKey, voters: &[String], timer_seconds: Option<u64>) {
        let options = self
            .registry
            .with_round(key, |round| (round.option_a.clone(), round.option_b.clone()));
        let Some((option_a, option_b)) = options else {
            return;
        };
        let text = messages::open_poll_text(&option_a, &option_b, voters, timer_seconds);
        if let Err(error) = self
            .transport
            .update_poll(key.room_id, key.anchor_id, &text)
            .await
        {
            warn!(
                room_id = key.room_id,
                anchor_id = key.anchor_id,
                error = %error,
                "failed to update the poll message"
            );
        }
    }

    async fn ack(&self, event: &VoteEvent, text: &str, alert: bool) {
        if let Err(error) = self
            .transport
            .ack_vote(&event.interaction_id, text, alert)
            .await
        {
            warn!(
                interaction_id = %event.interaction_id,
                error = %error,
                "failed to acknowledge a vote"
            );
        }
    }
}
