//! Round registry and the per-room guard table.
//!
//! The registry is the only owner of live rounds. Every state transition for
//! rounds in a room (vote application, arming, finalization) must run while
//! holding that room's guard; unrelated rooms never contend.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;

use super::round::{RoomId, Round, RoundKey};
use crate::questions::PickedQuestion;

/// Keyed storage of active rounds plus one guard per room.
#[derive(Debug, Default)]
pub struct RoundRegistry {
    rounds: Mutex<HashMap<RoundKey, Round>>,
    room_guards: Mutex<HashMap<RoomId, Arc<AsyncMutex<()>>>>,
}

impl RoundRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the guard for a room, creating it on first access.
    ///
    /// The get-or-insert runs under the table lock, so two rooms created
    /// concurrently each end up with exactly one guard.
    pub fn room_guard(&self, room_id: RoomId) -> Arc<AsyncMutex<()>> {
        self.room_guards
            .lock()
            .entry(room_id)
            .or_default()
            .clone()
    }

    /// Allocate a fresh round for a picked question and insert it.
    ///
    /// Callers must hold the room's guard.
    pub fn create(&self, key: RoundKey, question: &PickedQuestion) {
        self.rounds.lock().insert(key, Round::new(key, question));
    }

    /// Run a closure against the live round, if any.
    ///
    /// This is the accessor for reads and mutations; rounds never leave the
    /// registry lock while alive. Callers must hold the room's guard.
    pub fn with_round<T>(&self, key: RoundKey, f: impl FnOnce(&mut Round) -> T) -> Option<T> {
        self.rounds.lock().get_mut(&key).map(f)
    }

    /// Remove a round, returning it for finalization.
    ///
    /// Removing an absent key is a no-op. Callers must hold the room's guard.
    pub fn remove(&self, key: RoundKey) -> Option<Round> {
        self.rounds.lock().remove(&key)
    }

    /// Whether a round is live.
    pub fn contains(&self, key: RoundKey) -> bool {
        self.rounds.lock().contains_key(&key)
    }

    /// Number of live rounds across all rooms.
    pub fn active_count(&self) -> usize {
        self.rounds.lock().len()
    }
}
