//! Round entity and its identity types.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tokio::task::JoinHandle;

use crate::questions::PickedQuestion;

/// Identifier of a chat room (Telegram chat id).
pub type RoomId = i64;

/// Identifier of the message a round is anchored to.
pub type AnchorId = i64;

/// Identifier of a voting participant.
pub type ParticipantId = i64;

/// Unique key of a round: the room plus the posted poll message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoundKey {
    /// Room the round runs in.
    pub room_id: RoomId,
    /// Message the round is anchored to.
    pub anchor_id: AnchorId,
}

impl RoundKey {
    /// Build a key from its parts.
    pub fn new(room_id: RoomId, anchor_id: AnchorId) -> Self {
        Self { room_id, anchor_id }
    }
}

/// One of the round's two options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// The first (left) option.
    First,
    /// The second (right) option.
    Second,
}

impl Choice {
    /// Callback payload carried by the first option's button.
    pub const FIRST_PAYLOAD: &'static str = "1";
    /// Callback payload carried by the second option's button.
    pub const SECOND_PAYLOAD: &'static str = "2";

    /// Parse a button payload into a choice.
    pub fn from_payload(payload: &str) -> Option<Self> {
        match payload {
            Self::FIRST_PAYLOAD => Some(Self::First),
            Self::SECOND_PAYLOAD => Some(Self::Second),
            _ => None,
        }
    }
}

/// A participant's current vote.
#[derive(Debug, Clone)]
pub struct Vote {
    /// The chosen option.
    pub choice: Choice,
    /// Name shown in voter lists and the closing tally.
    pub display_name: String,
}

/// One open poll: question, votes, and timer status.
///
/// Owned by the registry from creation until finalization removes it; all
/// access goes through the owning room's guard.
#[derive(Debug)]
pub struct Round {
    /// Identity of this round.
    pub key: RoundKey,
    /// Index of the source question, used to avoid an immediate repeat.
    pub question_index: usize,
    /// Text of the first option, fixed at creation.
    pub option_a: String,
    /// Text of the second option, fixed at creation.
    pub option_b: String,
    /// When the round was created.
    pub created_at: DateTime<Utc>,
    /// Current votes, one per participant, in arrival order. Re-voting
    /// overwrites in place and keeps the participant's position.
    pub(crate) votes: IndexMap<ParticipantId, Vote>,
    /// True once the countdown has been scheduled. Monotonic.
    pub(crate) timer_armed: bool,
    /// Handle of the scheduled countdown task. Written once, at arming;
    /// never used for cancellation.
    pub(crate) countdown_handle: Option<JoinHandle<()>>,
}

impl Round {
    /// Create a fresh round for a picked question.
    pub fn new(key: RoundKey, question: &PickedQuestion) -> Self {
        Self {
            key,
            question_index: question.index,
            option_a: question.option_a.clone(),
            option_b: question.option_b.clone(),
            created_at: Utc::now(),
            votes: IndexMap::new(),
            timer_armed: false,
            countdown_handle: None,
        }
    }

    /// Number of distinct participants that have voted.
    pub fn vote_count(&self) -> usize {
        self.votes.len()
    }

    /// Voter display names in arrival order.
    pub fn voter_names(&self) -> Vec<String> {
        self.votes.values().map(|v| v.display_name.clone()).collect()
    }

    /// Text of the given option.
    pub fn option_text(&self, choice: Choice) -> &str {
        match choice {
            Choice::First => &self.option_a,
            Choice::Second => &self.option_b,
        }
    }

    /// Whether the countdown has been armed.
    pub fn timer_armed(&self) -> bool {
        self.timer_armed
    }
}
