//! End-to-end round lifecycle tests against a recording transport.
//!
//! Time is paused, so the 20-second countdown elapses instantly once every
//! task is idle and the tests stay deterministic.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use dilemma::channels::{ChannelResult, ChatTransport};
use dilemma::questions::{QuestionPicker, QuestionPool};
use dilemma::rounds::{AnchorId, RoomId, RoundEngine, RoundRegistry, VoteEvent};

#[derive(Default)]
struct RecordingTransport {
    next_anchor: AtomicI64,
    posts: Mutex<Vec<(RoomId, String)>>,
    updates: Mutex<Vec<(AnchorId, String)>>,
    closes: Mutex<Vec<(AnchorId, String)>>,
    acks: Mutex<Vec<(String, String, bool)>>,
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn post_poll(&self, room_id: RoomId, text: &str) -> ChannelResult<AnchorId> {
        let anchor = self.next_anchor.fetch_add(1, Ordering::SeqCst) + 1;
        self.posts.lock().push((room_id, text.to_string()));
        Ok(anchor)
    }

    async fn update_poll(
        &self,
        _room_id: RoomId,
        anchor_id: AnchorId,
        text: &str,
    ) -> ChannelResult<()> {
        self.updates.lock().push((anchor_id, text.to_string()));
        Ok(())
    }

    async fn close_poll(
        &self,
        _room_id: RoomId,
        anchor_id: AnchorId,
        text: &str,
    ) -> ChannelResult<()> {
        self.closes.lock().push((anchor_id, text.to_string()));
        Ok(())
    }

    async fn ack_vote(&self, interaction_id: &str, text: &str, alert: bool) -> ChannelResult<()> {
        self.acks
            .lock()
            .push((interaction_id.to_string(), text.to_string(), alert));
        Ok(())
    }
}

fn create_engine(questions: &str) -> (Arc<RoundEngine>, Arc<RecordingTransport>) {
    let pool = Arc::new(QuestionPool::parse(questions).unwrap());
    let transport = Arc::new(RecordingTransport::default());
    let engine = Arc::new(RoundEngine::new(
        Arc::new(RoundRegistry::new()),
        Arc::new(QuestionPicker::new(pool)),
        transport.clone(),
        Duration::from_secs(20),
    ));
    (engine, transport)
}

fn vote(
    room_id: RoomId,
    anchor_id: AnchorId,
    participant_id: i64,
    name: &str,
    payload: &str,
) -> VoteEvent {
    VoteEvent {
        room_id,
        anchor_id,
        participant_id,
        display_name: name.to_string(),
        payload: payload.to_string(),
        interaction_id: format!("cb-{participant_id}"),
    }
}

#[tokio::test(start_paused = true)]
async fn full_round_lifecycle() {
    let (engine, transport) = create_engine("grow wings / breathe underwater\n");
    let key = engine.start_round(42).await.unwrap();

    engine.submit_vote(vote(42, key.anchor_id, 1, "@u1", "1")).await;
    engine.submit_vote(vote(42, key.anchor_id, 2, "@u2", "2")).await;

    // Let the countdown elapse.
    tokio::time::sleep(Duration::from_secs(21)).await;

    assert!(!engine.registry().contains(key));
    let closes = transport.closes.lock();
    assert_eq!(closes.len(), 1);
    let text = &closes[0].1;
    assert!(text.contains("grow wings"));
    assert!(text.contains("breathe underwater"));
    assert_eq!(text.matches("50% (1 vote)").count(), 2);
    assert!(text.contains("@u1"));
    assert!(text.contains("@u2"));
}

#[tokio::test(start_paused = true)]
async fn revote_overwrites_and_keeps_arrival_order() {
    let (engine, transport) = create_engine("a / b\n");
    let key = engine.start_round(1).await.unwrap();

    engine.submit_vote(vote(1, key.anchor_id, 1, "@u1", "1")).await;
    engine.submit_vote(vote(1, key.anchor_id, 2, "@u2", "1")).await;
    engine.submit_vote(vote(1, key.anchor_id, 1, "@u1", "2")).await;

    let names = engine
        .registry()
        .with_round(key, |round| round.voter_names())
        .unwrap();
    assert_eq!(names, vec!["@u1", "@u2"]);
    let count = engine
        .registry()
        .with_round(key, |round| round.vote_count())
        .unwrap();
    assert_eq!(count, 2);

    tokio::time::sleep(Duration::from_secs(21)).await;

    let closes = transport.closes.lock();
    assert_eq!(closes.len(), 1);
    // u1 switched sides, so both options end up with one vote each.
    assert_eq!(closes[0].1.matches("50% (1 vote)").count(), 2);
}

#[tokio::test(start_paused = true)]
async fn racing_voters_schedule_exactly_one_countdown() {
    let (engine, transport) = create_engine("a / b\n");
    let key = engine.start_round(1).await.unwrap();

    let mut tasks = Vec::new();
    for participant in 1..=8i64 {
        let engine = engine.clone();
        let payload = if participant % 2 == 0 { "2" } else { "1" };
        let event = vote(1, key.anchor_id, participant, &format!("@u{participant}"), payload);
        tasks.push(tokio::spawn(async move {
            engine.submit_vote(event).await;
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    tokio::time::sleep(Duration::from_secs(25)).await;

    assert!(!engine.registry().contains(key));
    let closes = transport.closes.lock();
    assert_eq!(closes.len(), 1, "countdown must finalize exactly once");
    assert_eq!(closes[0].1.matches("50% (4 votes)").count(), 2);
}

#[tokio::test(start_paused = true)]
async fn rooms_run_independently() {
    let (engine, transport) = create_engine("a / b\n");
    let key_one = engine.start_round(1).await.unwrap();
    let key_two = engine.start_round(2).await.unwrap();

    engine.submit_vote(vote(1, key_one.anchor_id, 1, "@u1", "1")).await;
    engine.submit_vote(vote(1, key_one.anchor_id, 2, "@u2", "2")).await;
    engine.submit_vote(vote(2, key_two.anchor_id, 3, "@u3", "1")).await;
    engine.submit_vote(vote(2, key_two.anchor_id, 4, "@u4", "1")).await;

    tokio::time::sleep(Duration::from_secs(21)).await;

    assert!(!engine.registry().contains(key_one));
    assert!(!engine.registry().contains(key_two));
    assert_eq!(transport.closes.lock().len(), 2);
    assert_eq!(engine.registry().active_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn vote_after_close_is_politely_rejected() {
    let (engine, transport) = create_engine("a / b\n");
    let key = engine.start_round(1).await.unwrap();

    engine.submit_vote(vote(1, key.anchor_id, 1, "@u1", "1")).await;
    engine.submit_vote(vote(1, key.anchor_id, 2, "@u2", "2")).await;
    tokio::time::sleep(Duration::from_secs(21)).await;
    assert!(!engine.registry().contains(key));

    engine.submit_vote(vote(1, key.anchor_id, 3, "@u3", "1")).await;

    let acks = transport.acks.lock();
    let last = acks.last().unwrap();
    assert!(last.1.contains("already ended"));
    assert!(last.2, "late votes warrant an alert");
    assert_eq!(transport.closes.lock().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn single_voter_never_triggers_finalize() {
    let (engine, transport) = create_engine("a / b\n");
    let key = engine.start_round(1).await.unwrap();

    engine.submit_vote(vote(1, key.anchor_id, 1, "@u1", "1")).await;
    tokio::time::sleep(Duration::from_secs(120)).await;

    // One distinct voter: the countdown was never armed.
    assert!(engine.registry().contains(key));
    assert!(transport.closes.lock().is_empty());
    let armed = engine
        .registry()
        .with_round(key, |round| round.timer_armed())
        .unwrap();
    assert!(!armed);
}
