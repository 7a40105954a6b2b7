//! Integration tests for the room actors and the room registry.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use typerace_protocol::{ConnectionId, Envelope, GameState, Role, RoomId, ServerEvent};
use typerace_room::{
    FixedSentence, RoomAction, RoomConfig, RoomError, RoomHandle, RoomRegistry, Subscriber,
};

const SENTENCE: &str = "abc";

type Inbox = mpsc::UnboundedReceiver<Arc<Envelope>>;

fn registry(config: RoomConfig) -> RoomRegistry {
    RoomRegistry::new(config, Arc::new(FixedSentence::new(SENTENCE)))
}

fn lobby() -> RoomId {
    RoomId::new("lobby")
}

fn inbox() -> (Subscriber, Inbox) {
    mpsc::unbounded_channel()
}

async fn next(rx: &mut Inbox) -> Arc<Envelope> {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("subscriber queue closed")
}

/// Waits until the actor has handled everything queued before this call,
/// then asserts nothing else arrived.
async fn assert_quiet(handle: &RoomHandle, rx: &mut Inbox) {
    handle.snapshot().await.unwrap();
    assert!(rx.try_recv().is_err(), "unexpected event");
}

struct Member {
    conn: ConnectionId,
    nickname: &'static str,
    rx: Inbox,
}

async fn join(
    reg: &RoomRegistry,
    id: u64,
    nickname: &'static str,
    role: Role,
) -> (RoomHandle, Member) {
    let conn = ConnectionId::new(id);
    let (tx, rx) = inbox();
    let handle = reg
        .join(&lobby(), conn, nickname, role, tx)
        .await
        .expect("join should succeed");
    (handle, Member { conn, nickname, rx })
}

impl Member {
    async fn act(&self, handle: &RoomHandle, action: RoomAction) {
        handle
            .act(self.conn, self.nickname.to_string(), action)
            .await
            .unwrap();
    }
}

// =========================================================================
// Membership
// =========================================================================

#[tokio::test]
async fn test_first_join_creates_room_and_sends_joined_then_update() {
    let reg = registry(RoomConfig::default());
    assert_eq!(reg.room_count(), 0);

    let (_handle, mut alice) = join(&reg, 1, "alice", Role::Player).await;
    assert_eq!(reg.room_count(), 1);
    assert_eq!(reg.room_ids(), vec![lobby()]);

    let joined = next(&mut alice.rx).await;
    assert_eq!(joined.seq, 1);
    let ServerEvent::Joined {
        nickname,
        role,
        room_info,
    } = &joined.payload
    else {
        panic!("expected joined, got {:?}", joined.payload);
    };
    assert_eq!(nickname, "alice");
    assert_eq!(*role, Role::Player);
    assert_eq!(room_info.state, GameState::Waiting);
    assert_eq!(room_info.players.len(), 1);

    let update = next(&mut alice.rx).await;
    assert_eq!(update.seq, 2);
    assert!(matches!(update.payload, ServerEvent::RoomUpdate { .. }));

    let announced = next(&mut alice.rx).await;
    assert_eq!(announced.seq, 3);
    assert_eq!(
        announced.payload,
        ServerEvent::PlayerJoined {
            nickname: "alice".into(),
            role: Role::Player,
        }
    );
}

#[tokio::test]
async fn test_existing_members_see_room_update_on_join() {
    let reg = registry(RoomConfig::default());
    let (_h, mut alice) = join(&reg, 1, "alice", Role::Player).await;
    for _ in 0..3 {
        next(&mut alice.rx).await;
    }

    let (_h, _bob) = join(&reg, 2, "bob", Role::Player).await;
    let update = next(&mut alice.rx).await;
    let ServerEvent::RoomUpdate { players } = &update.payload else {
        panic!("expected room_update, got {:?}", update.payload);
    };
    let names: Vec<_> = players.iter().map(|p| p.nickname.as_str()).collect();
    assert_eq!(names, ["alice", "bob"]);

    let announced = next(&mut alice.rx).await;
    assert_eq!(
        announced.payload,
        ServerEvent::PlayerJoined {
            nickname: "bob".into(),
            role: Role::Player,
        }
    );
}

#[tokio::test]
async fn test_duplicate_nickname_is_rejected_without_subscribing() {
    let reg = registry(RoomConfig::default());
    let (handle, _alice) = join(&reg, 1, "alice", Role::Player).await;

    let (tx, mut rx) = inbox();
    let err = reg
        .join(&lobby(), ConnectionId::new(2), "alice", Role::Spectator, tx)
        .await
        .unwrap_err();
    assert_eq!(err, RoomError::DuplicateNickname("alice".into()));

    assert_quiet(&handle, &mut rx).await;
    assert_eq!(handle.snapshot().await.unwrap().players.len(), 1);
}

#[tokio::test]
async fn test_room_full_counts_only_players() {
    let reg = registry(RoomConfig {
        max_players: 1,
        ..RoomConfig::default()
    });
    let (handle, _alice) = join(&reg, 1, "alice", Role::Player).await;

    let (tx, _rx) = inbox();
    let err = reg
        .join(&lobby(), ConnectionId::new(2), "bob", Role::Player, tx)
        .await
        .unwrap_err();
    assert!(matches!(err, RoomError::RoomFull(_)));

    join(&reg, 3, "eve", Role::Spectator).await;
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.players.len(), 1);
    assert_eq!(snapshot.spectator_count, 1);
}

#[tokio::test]
async fn test_leave_broadcasts_update_to_remaining_members() {
    let reg = registry(RoomConfig::default());
    let (_h, mut alice) = join(&reg, 1, "alice", Role::Player).await;
    let (_h, bob) = join(&reg, 2, "bob", Role::Player).await;
    // Own joined, room_update and player_joined, then bob's two broadcasts.
    for _ in 0..5 {
        next(&mut alice.rx).await;
    }

    let remaining = reg.leave(&lobby(), bob.conn, "bob").await.unwrap();
    assert_eq!(remaining, 1);

    let update = next(&mut alice.rx).await;
    let ServerEvent::RoomUpdate { players } = &update.payload else {
        panic!("expected room_update, got {:?}", update.payload);
    };
    assert_eq!(players.len(), 1);
    assert_eq!(players[0].nickname, "alice");
}

// =========================================================================
// Game flow through the actor
// =========================================================================

#[tokio::test]
async fn test_full_race_through_actor() {
    let reg = registry(RoomConfig::default());
    let (handle, mut root) = join(&reg, 1, "root", Role::Admin).await;
    let (_h, mut alice) = join(&reg, 2, "alice", Role::Player).await;
    let (_h, mut bob) = join(&reg, 3, "bob", Role::Player).await;
    // Drain join traffic.
    while root.rx.try_recv().is_ok() {}
    handle.snapshot().await.unwrap();
    while root.rx.try_recv().is_ok() {}
    while alice.rx.try_recv().is_ok() {}
    while bob.rx.try_recv().is_ok() {}

    root.act(&handle, RoomAction::Start { language: None }).await;
    for m in [&mut root, &mut alice, &mut bob] {
        let started = next(&mut m.rx).await;
        let ServerEvent::GameStarted { sentence, .. } = &started.payload else {
            panic!("expected game_started, got {:?}", started.payload);
        };
        assert_eq!(sentence, SENTENCE);
    }

    alice
        .act(&handle, RoomAction::Typing { text: "ab".into() })
        .await;
    let progress = next(&mut bob.rx).await;
    assert!(matches!(progress.payload, ServerEvent::TypingBroadcast { .. }));

    alice
        .act(&handle, RoomAction::Typing { text: SENTENCE.into() })
        .await;
    bob.act(&handle, RoomAction::Typing { text: SENTENCE.into() })
        .await;

    for m in [&mut root, &mut alice, &mut bob] {
        // root and alice still hold the earlier typing broadcast.
        let mut event = next(&mut m.rx).await;
        if matches!(event.payload, ServerEvent::TypingBroadcast { .. }) {
            event = next(&mut m.rx).await;
        }
        let ServerEvent::GameOver { winner, .. } = &event.payload else {
            panic!("expected game_over, got {:?}", event.payload);
        };
        assert_eq!(winner, "alice");
    }

    // Bob's late finish is reported to him alone.
    let err = next(&mut bob.rx).await;
    assert!(matches!(err.payload, ServerEvent::Error { .. }));
    assert_quiet(&handle, &mut alice.rx).await;
    assert_quiet(&handle, &mut root.rx).await;

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.state, GameState::Finished);
    assert_eq!(snapshot.winner.as_deref(), Some("alice"));
}

#[tokio::test]
async fn test_non_admin_start_errors_only_to_initiator() {
    let reg = registry(RoomConfig::default());
    let (handle, mut alice) = join(&reg, 1, "alice", Role::Player).await;
    let (_h, mut bob) = join(&reg, 2, "bob", Role::Player).await;
    handle.snapshot().await.unwrap();
    while alice.rx.try_recv().is_ok() {}
    while bob.rx.try_recv().is_ok() {}

    alice.act(&handle, RoomAction::Start { language: None }).await;
    let err = next(&mut alice.rx).await;
    let ServerEvent::Error { message } = &err.payload else {
        panic!("expected error, got {:?}", err.payload);
    };
    assert!(message.contains("admin"));
    assert_quiet(&handle, &mut bob.rx).await;
    assert_eq!(handle.snapshot().await.unwrap().state, GameState::Waiting);
}

#[tokio::test]
async fn test_info_action_is_unicast() {
    let reg = registry(RoomConfig::default());
    let (handle, mut alice) = join(&reg, 1, "alice", Role::Player).await;
    let (_h, mut bob) = join(&reg, 2, "bob", Role::Spectator).await;
    handle.snapshot().await.unwrap();
    while alice.rx.try_recv().is_ok() {}
    while bob.rx.try_recv().is_ok() {}

    bob.act(&handle, RoomAction::Info).await;
    let info = next(&mut bob.rx).await;
    let ServerEvent::RoomInfo { room_info } = &info.payload else {
        panic!("expected room_info, got {:?}", info.payload);
    };
    assert_eq!(room_info.spectator_count, 1);
    assert_quiet(&handle, &mut alice.rx).await;
}

#[tokio::test]
async fn test_seq_is_strictly_increasing_per_subscriber() {
    let reg = registry(RoomConfig::default());
    let (handle, mut root) = join(&reg, 1, "root", Role::Admin).await;
    let (_h, alice) = join(&reg, 2, "alice", Role::Player).await;

    root.act(&handle, RoomAction::Start { language: None }).await;
    for text in ["a", "ax", "ab"] {
        alice
            .act(&handle, RoomAction::Typing { text: text.into() })
            .await;
    }
    handle.snapshot().await.unwrap();

    let mut last = 0;
    while let Ok(envelope) = root.rx.try_recv() {
        assert!(envelope.seq > last, "{} after {last}", envelope.seq);
        last = envelope.seq;
    }
    assert!(last >= 5);
}

// =========================================================================
// Room independence and eviction
// =========================================================================

#[tokio::test]
async fn test_rooms_are_independent() {
    let reg = registry(RoomConfig::default());
    let (tx_a, mut rx_a) = inbox();
    let (tx_b, mut rx_b) = inbox();
    let room_a = reg
        .join(&RoomId::new("a"), ConnectionId::new(1), "root", Role::Admin, tx_a)
        .await
        .unwrap();
    let room_b = reg
        .join(&RoomId::new("b"), ConnectionId::new(2), "root", Role::Admin, tx_b)
        .await
        .unwrap();
    assert_eq!(reg.room_count(), 2);
    room_b.snapshot().await.unwrap();
    while rx_a.try_recv().is_ok() {}
    while rx_b.try_recv().is_ok() {}

    room_a
        .act(ConnectionId::new(1), "root".into(), RoomAction::Start { language: None })
        .await
        .unwrap();
    assert!(matches!(
        next(&mut rx_a).await.payload,
        ServerEvent::GameStarted { .. }
    ));
    assert_quiet(&room_b, &mut rx_b).await;
    assert_eq!(room_b.snapshot().await.unwrap().state, GameState::Waiting);
    assert_eq!(reg.list_rooms().await.len(), 2);
}

#[tokio::test]
async fn test_last_leave_evicts_room_with_zero_ttl() {
    let reg = registry(RoomConfig::default());
    let (handle, alice) = join(&reg, 1, "alice", Role::Admin).await;
    handle
        .act(alice.conn, "alice".into(), RoomAction::Start { language: None })
        .await
        .unwrap();

    let remaining = reg.leave(&lobby(), alice.conn, "alice").await.unwrap();
    assert_eq!(remaining, 0);
    assert_eq!(reg.room_count(), 0);
    assert!(matches!(
        reg.room_info(&lobby()).await,
        Err(RoomError::NotFound(_))
    ));

    // The next join starts from scratch.
    let (handle, _bob) = join(&reg, 2, "bob", Role::Player).await;
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.state, GameState::Waiting);
    assert!(snapshot.target_sentence.is_none());
}

#[tokio::test]
async fn test_leave_unknown_room_is_noop() {
    let reg = registry(RoomConfig::default());
    let remaining = reg
        .leave(&RoomId::new("nowhere"), ConnectionId::new(1), "ghost")
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

async fn wait_closed(handle: &RoomHandle) {
    for _ in 0..100 {
        if handle.is_closed() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("room actor did not stop");
}

#[tokio::test(start_paused = true)]
async fn test_empty_room_expires_after_ttl() {
    let reg = registry(RoomConfig {
        empty_room_ttl: Duration::from_secs(30),
        ..RoomConfig::default()
    });
    let (handle, alice) = join(&reg, 1, "alice", Role::Player).await;
    reg.leave(&lobby(), alice.conn, "alice").await.unwrap();

    tokio::time::advance(Duration::from_secs(29)).await;
    assert!(!handle.is_closed());
    assert_eq!(reg.room_count(), 1);

    tokio::time::advance(Duration::from_secs(2)).await;
    wait_closed(&handle).await;
    assert_eq!(reg.room_count(), 0);
    assert_eq!(reg.prune_closed(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_expired_rooms_are_pruned_on_next_join() {
    let reg = registry(RoomConfig {
        empty_room_ttl: Duration::from_secs(30),
        ..RoomConfig::default()
    });
    let mut handles = Vec::new();
    for (id, room) in [(1, "a"), (2, "b")] {
        let (tx, _rx) = inbox();
        let room = RoomId::new(room);
        let conn = ConnectionId::new(id);
        handles.push(reg.join(&room, conn, "alice", Role::Player, tx).await.unwrap());
        reg.leave(&room, conn, "alice").await.unwrap();
    }
    tokio::time::advance(Duration::from_secs(31)).await;
    for handle in &handles {
        wait_closed(handle).await;
    }
    assert_eq!(reg.room_count(), 0);
    assert_eq!(reg.tracked_rooms(), 2);

    join(&reg, 3, "bob", Role::Player).await;
    assert_eq!(reg.tracked_rooms(), 1);
    assert_eq!(reg.room_ids(), vec![lobby()]);
}

#[tokio::test(start_paused = true)]
async fn test_join_before_expiry_cancels_eviction() {
    let reg = registry(RoomConfig {
        empty_room_ttl: Duration::from_secs(30),
        ..RoomConfig::default()
    });
    let (handle, alice) = join(&reg, 1, "alice", Role::Player).await;
    reg.leave(&lobby(), alice.conn, "alice").await.unwrap();

    tokio::time::advance(Duration::from_secs(10)).await;
    let (same, _bob) = join(&reg, 2, "bob", Role::Player).await;
    tokio::time::advance(Duration::from_secs(60)).await;

    assert!(!handle.is_closed());
    assert_eq!(same.snapshot().await.unwrap().players[0].nickname, "bob");
}

#[tokio::test]
async fn test_join_after_shutdown_starts_fresh_room() {
    let reg = registry(RoomConfig::default());
    let (handle, _alice) = join(&reg, 1, "alice", Role::Player).await;
    handle.shutdown().await.unwrap();
    wait_closed(&handle).await;

    let (fresh, _bob) = join(&reg, 2, "bob", Role::Player).await;
    assert!(!fresh.is_closed());
    let snapshot = fresh.snapshot().await.unwrap();
    assert_eq!(snapshot.players.len(), 1);
    assert_eq!(snapshot.players[0].nickname, "bob");
}

#[tokio::test]
async fn test_destroy_room() {
    let reg = registry(RoomConfig::default());
    join(&reg, 1, "alice", Role::Player).await;
    reg.destroy_room(&lobby()).await.unwrap();
    assert_eq!(reg.room_count(), 0);
    assert!(matches!(
        reg.destroy_room(&lobby()).await,
        Err(RoomError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_registry_is_shared_across_tasks() {
    let reg = Arc::new(registry(RoomConfig::default()));
    let mut tasks = Vec::new();
    for id in 0..8u64 {
        let reg = Arc::clone(&reg);
        tasks.push(tokio::spawn(async move {
            let (tx, rx) = inbox();
            let room = RoomId::new(format!("room-{}", id % 2));
            let nickname = format!("watcher-{id}");
            reg.join(&room, ConnectionId::new(id), &nickname, Role::Spectator, tx)
                .await
                .map(|_| rx)
        }));
    }
    let mut inboxes = Vec::new();
    for task in tasks {
        inboxes.push(task.await.unwrap().expect("join should succeed"));
    }

    assert_eq!(reg.room_count(), 2);
    for info in reg.list_rooms().await {
        assert_eq!(info.spectator_count, 4, "{}", info.room_id);
    }
}
