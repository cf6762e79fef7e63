//! Countdown scheduling and finalization.
//!
//! Once a round is armed, a detached task sleeps for the configured duration
//! and then attempts a single finalize: re-acquire the room guard, remove the
//! round, publish the tally. A round that is already gone makes the finalize
//! a silent no-op, which is what makes the close idempotent without any
//! cancellation machinery.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::registry::RoundRegistry;
use super::results;
use super::round::RoundKey;
use crate::channels::DynTransport;
use crate::messages;

/// Schedule the countdown for an armed round.
///
/// The sleep holds no guard, so votes keep flowing while the clock runs.
pub fn schedule(
    registry: Arc<RoundRegistry>,
    transport: DynTransport,
    key: RoundKey,
    delay: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        finalize(&registry, &transport, key).await;
    })
}

/// Close the round: remove it from the registry and publish the tally.
async fn finalize(registry: &RoundRegistry, transport: &DynTransport, key: RoundKey) {
    let guard = registry.room_guard(key.room_id);
    let round = {
        let _room = guard.lock().await;
        match registry.remove(key) {
            Some(round) => round,
            None => {
                debug!(
                    room_id = key.room_id,
                    anchor_id = key.anchor_id,
                    "round already closed, countdown exits"
                );
                return;
            }
        }
    };

    // The round is out of the registry; its votes are frozen from here on.
    let summary = results::summarize(&round);
    let age_seconds = (chrono::Utc::now() - round.created_at).num_seconds();
    info!(
        room_id = key.room_id,
        anchor_id = key.anchor_id,
        votes = summary.total_votes,
        age_seconds,
        "round finalized"
    );

    let text = messages::closing_text(&summary);
    if let Err(error) = transport.close_poll(key.room_id, key.anchor_id, &text).await {
        warn!(
            room_id = key.room_id,
            anchor_id = key.anchor_id,
            error = %error,
            "failed to publish the closing tally"
        );
    }
}
