//! Vote application.
//!
//! Applies one participant's vote to a round and decides whether the
//! countdown must be armed. The vote insert, the threshold check, and the
//! `timer_armed` flip all happen inside one registry critical section, so two
//! racing voters can never both observe "not yet armed".

use super::registry::RoundRegistry;
use super::round::{Choice, ParticipantId, RoundKey, Vote};

/// Distinct participants required before the countdown is armed.
pub const ARM_THRESHOLD: usize = 2;

/// Errors surfaced to the voter; neither mutates any state.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum VoteError {
    #[error("that is not one of the round's options")]
    InvalidChoice,

    #[error("the round is no longer open")]
    RoundNotFound,
}

/// Render data accompanying a recorded or changed vote.
#[derive(Debug, Clone)]
pub struct VoteUpdate {
    /// Voter display names in arrival order, after this vote.
    pub voters: Vec<String>,
    /// True exactly once per round: this vote crossed the threshold and the
    /// caller must start the countdown.
    pub arm_timer: bool,
    /// True when the countdown was already running before this vote.
    pub timer_running: bool,
}

/// Result of applying a vote.
#[derive(Debug, Clone)]
pub enum VoteOutcome {
    /// First vote by this participant.
    Recorded(VoteUpdate),
    /// The participant switched options.
    Changed(VoteUpdate),
    /// Re-vote for the already-chosen option; nothing changed and no
    /// re-render is needed.
    Unchanged,
}

/// Apply one vote to the round identified by `key`.
///
/// Callers must hold the room's guard for the whole vote interaction,
/// including any countdown arming triggered by the returned outcome.
pub fn apply_vote(
    registry: &RoundRegistry,
    key: RoundKey,
    participant_id: ParticipantId,
    display_name: &str,
    payload: &str,
) -> Result<VoteOutcome, VoteError> {
    let choice = Choice::from_payload(payload).ok_or(VoteError::InvalidChoice)?;

    registry
        .with_round(key, |round| {
            let previous = round.votes.get(&participant_id).map(|vote| vote.choice);
            if previous == Some(choice) {
                return VoteOutcome::Unchanged;
            }

            let was_armed = round.timer_armed;
            round.votes.insert(
                participant_id,
                Vote {
                    choice,
                    display_name: display_name.to_string(),
                },
            );

            let arm_timer = !was_armed && round.votes.len() >= ARM_THRESHOLD;
            if arm_timer {
                round.timer_armed = true;
            }

            let update = VoteUpdate {
                voters: round.voter_names(),
                arm_timer,
                timer_running: was_armed,
            };
            if previous.is_some() {
                VoteOutcome::Changed(update)
            } else {
                VoteOutcome::Recorded(update)
            }
        })
        .ok_or(VoteError::RoundNotFound)
}
