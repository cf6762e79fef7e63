//! Round Lifecycle
//!
//! The poll round state machine: registry of active rounds keyed by
//! (room, anchor message), vote application under per-room guards, the
//! one-shot countdown after the participation threshold is met, and the
//! closing tally.
//!
//! A round moves Open → Armed → Closed. Voting drives the first transition,
//! the countdown task drives the second, and nothing reopens a closed round.

pub mod countdown;
pub mod engine;
pub mod registry;
pub mod results;
pub mod round;
pub mod votes;

pub use engine::{RoundEngine, VoteEvent};
pub use registry::RoundRegistry;
pub use results::{summarize, OptionTally, RoundSummary};
pub use round::{AnchorId, Choice, RoomId, Round, RoundKey, Vote};
pub use votes::{apply_vote, VoteError, VoteOutcome, VoteUpdate};
