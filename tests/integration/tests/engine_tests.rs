//! Engine integration tests
//!
//! End-to-end scenarios through the `RoomEngine` facade over in-memory
//! stores. No external services required.
//!
//! Run with: cargo test -p integration-tests

use std::time::Duration;

use watch_core::events::RoomEvent;
use watch_core::sync::SYNC_TOLERANCE_SECS;
use watch_engine::commands::{DeleteRoomRequest, LeaveRoomRequest, UpdateProfileRequest};
use watch_engine::EngineConfig;

use integration_tests::{
    beat, join_request, pause, play, private_room_request, seek, TestEngine,
};

/// Assert that `expected` appears within `actual` in order (gaps allowed)
fn assert_subsequence(actual: &[&'static str], expected: &[&'static str]) {
    let mut remaining = actual.iter();
    for want in expected {
        assert!(
            remaining.any(|got| got == want),
            "event stream missing {want:?} in order; saw {actual:?}"
        );
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn test_watch_party_lifecycle() {
    let harness = TestEngine::new();
    let engine = &harness.engine;

    // Host opens a private room with a chosen secret
    let created = engine
        .create_room(private_room_request("host", Some("775533")))
        .await
        .unwrap();
    assert_eq!(created.access_secret.as_deref(), Some("775533"));
    let room_id = created.room.room_id.clone();
    let host = created.host.member_id;

    let mut events = engine.subscribe(&room_id);

    // Two viewers join with the secret
    let alice = engine
        .join_room(join_request(&room_id, "alice", Some("775533")))
        .await
        .unwrap();
    let bob = engine
        .join_room(join_request(&room_id, "bob", Some("775533")))
        .await
        .unwrap();
    assert_eq!(engine.room_snapshot(&room_id).await.unwrap().member_count, 3);

    // Host starts playback at 10s; alice follows closely, bob lags far
    engine.heartbeat(beat(&room_id, host, 10.0, true)).await.unwrap();
    let alice_ack = engine
        .heartbeat(beat(&room_id, alice.member_id, 9.0, true))
        .await
        .unwrap();
    assert!(alice_ack.synced);
    let bob_ack = engine
        .heartbeat(beat(&room_id, bob.member_id, 50.0, true))
        .await
        .unwrap();
    assert!(!bob_ack.synced);
    assert_eq!(bob_ack.host_position_secs, 10.0);

    let bob_view = engine.get_host_state(&room_id, bob.member_id).await.unwrap();
    assert!(!bob_view.caller_synced);
    assert_eq!(bob_view.caller_drift_secs, 40.0);

    // Host seeks ahead; everyone must re-report before counting as synced
    engine
        .control_playback(seek(&room_id, host, 600.0))
        .await
        .unwrap();
    assert!(!harness.member(alice.member_id).await.unwrap().synced);
    assert!(!harness.member(bob.member_id).await.unwrap().synced);

    let alice_ack = engine
        .heartbeat(beat(&room_id, alice.member_id, 600.0, true))
        .await
        .unwrap();
    assert!(alice_ack.synced);

    // Host departs; alice joined before bob, so alice takes over
    let outcome = engine
        .leave_room(LeaveRoomRequest { room_id: room_id.clone(), member_id: host })
        .await
        .unwrap();
    assert!(outcome.was_host);
    assert_eq!(outcome.new_host, Some(alice.member_id));

    // The new host has authority
    let snapshot = engine
        .control_playback(pause(&room_id, alice.member_id))
        .await
        .unwrap();
    assert!(!snapshot.playing);

    // Everyone leaves; the room lingers empty instead of vanishing
    engine
        .leave_room(LeaveRoomRequest { room_id: room_id.clone(), member_id: bob.member_id })
        .await
        .unwrap();
    let outcome = engine
        .leave_room(LeaveRoomRequest { room_id: room_id.clone(), member_id: alice.member_id })
        .await
        .unwrap();
    assert!(outcome.was_host);
    assert_eq!(outcome.new_host, None);

    let room = harness.room(&room_id).await.unwrap();
    assert_eq!(room.member_count, 0);
    assert!(room.empty_since.is_some());

    // Grace elapsed: the sweeper reclaims it
    harness.backdate_empty_since(&room_id, 3700).await.unwrap();
    let report = harness.sweeper().sweep().await.unwrap();
    assert_eq!(report.rooms_expired, 1);
    assert!(harness.room(&room_id).await.is_err());

    // The whole session produced a gapless, strictly increasing sequence
    let mut collected = Vec::new();
    while let Ok(envelope) = events.try_recv() {
        collected.push((envelope.seq, envelope.event.event_type()));
    }
    assert!(collected.windows(2).all(|w| w[1].0 == w[0].0 + 1));

    let types: Vec<&'static str> = collected.iter().map(|(_, t)| *t).collect();
    assert_subsequence(
        &types,
        &[
            "MEMBER_JOINED",       // alice
            "MEMBER_JOINED",       // bob
            "ROOM_STATE_CHANGED",  // seek
            "MEMBER_LEFT",         // host
            "HOST_CHANGED",        // alice promoted
            "ROOM_STATE_CHANGED",  // pause
            "MEMBER_LEFT",         // bob
            "MEMBER_LEFT",         // alice
            "HOST_CHANGED",        // roster empty
        ],
    );
}

#[tokio::test]
async fn test_private_room_requires_secret() {
    let harness = TestEngine::new();
    let engine = &harness.engine;

    // No secret supplied: the engine generates one
    let created = engine
        .create_room(private_room_request("host", None))
        .await
        .unwrap();
    let secret = created.access_secret.clone().expect("generated secret");
    let room_id = created.room.room_id.clone();

    let err = engine
        .join_room(join_request(&room_id, "alice", None))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ACCESS_DENIED");

    let err = engine
        .join_room(join_request(&room_id, "alice", Some("000000")))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ACCESS_DENIED");

    engine
        .join_room(join_request(&room_id, "alice", Some(&secret)))
        .await
        .unwrap();

    // The snapshot read side never leaks it
    let listed = engine.list_public_rooms().await.unwrap();
    assert!(!listed.iter().any(|r| r.room_id == room_id));
}

#[tokio::test]
async fn test_profile_update_visible_in_membership() {
    let harness = TestEngine::new();
    let engine = &harness.engine;

    let created = harness.host_room("host").await.unwrap();
    let room_id = created.room.room_id.clone();

    let updated = engine
        .update_member_profile(UpdateProfileRequest {
            room_id: room_id.clone(),
            member_id: created.host.member_id,
            display_name: Some("Movie Captain".to_string()),
            avatar: Some("avatars/captain.png".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(updated.display_name, "Movie Captain");

    let member = harness.member(created.host.member_id).await.unwrap();
    assert_eq!(member.display_name, "Movie Captain");
    assert_eq!(member.avatar.as_deref(), Some("avatars/captain.png"));
}

// ============================================================================
// Host failover
// ============================================================================

#[tokio::test]
async fn test_host_failover_follows_join_order() {
    let harness = TestEngine::new();
    let engine = &harness.engine;

    let created = harness.host_room("ana").await.unwrap();
    let room_id = created.room.room_id.clone();
    let ana = created.host.member_id;
    let ben = harness.join(&room_id, "ben").await.unwrap().member_id;
    let cho = harness.join(&room_id, "cho").await.unwrap().member_id;

    let outcome = engine
        .leave_room(LeaveRoomRequest { room_id: room_id.clone(), member_id: ana })
        .await
        .unwrap();
    assert_eq!(outcome.new_host, Some(ben));
    assert!(harness.member(ben).await.unwrap().is_host);

    let outcome = engine
        .leave_room(LeaveRoomRequest { room_id: room_id.clone(), member_id: ben })
        .await
        .unwrap();
    assert_eq!(outcome.new_host, Some(cho));

    let outcome = engine
        .leave_room(LeaveRoomRequest { room_id: room_id.clone(), member_id: cho })
        .await
        .unwrap();
    assert!(outcome.was_host);
    assert_eq!(outcome.new_host, None);

    let room = harness.room(&room_id).await.unwrap();
    assert!(room.host_id.is_none());
    assert!(room.empty_since.is_some());
}

#[tokio::test]
async fn test_concurrent_leaves_keep_exactly_one_host() {
    let harness = TestEngine::new();
    let engine = &harness.engine;

    let created = harness.host_room("host").await.unwrap();
    let room_id = created.room.room_id.clone();

    let mut viewers = Vec::new();
    for i in 0..5 {
        let member = harness.join(&room_id, &format!("viewer-{i}")).await.unwrap();
        viewers.push(member.member_id);
    }
    let survivor = viewers.pop().unwrap();

    // Host and four viewers bail out at once
    let mut leavers = vec![created.host.member_id];
    leavers.extend(viewers);

    let mut handles = Vec::new();
    for member_id in leavers {
        let engine = engine.clone();
        let room_id = room_id.clone();
        handles.push(tokio::spawn(async move {
            engine
                .leave_room(LeaveRoomRequest { room_id, member_id })
                .await
        }));
    }
    for result in futures::future::join_all(handles).await {
        result.unwrap().unwrap();
    }

    let room = harness.room(&room_id).await.unwrap();
    assert_eq!(room.member_count, 1);
    assert_eq!(room.host_id, Some(survivor));

    let roster = harness
        .ctx()
        .member_repo()
        .list_by_room(&room_id)
        .await
        .unwrap();
    assert_eq!(roster.len(), 1);
    assert!(roster[0].is_host);
}

// ============================================================================
// Sync classification
// ============================================================================

#[tokio::test]
async fn test_drift_boundary_classification() {
    let harness = TestEngine::new();
    let engine = &harness.engine;

    let created = harness.host_room("host").await.unwrap();
    let room_id = created.room.room_id.clone();
    let viewer = harness.join(&room_id, "viewer").await.unwrap();

    engine
        .heartbeat(beat(&room_id, created.host.member_id, 100.0, true))
        .await
        .unwrap();

    // Exactly at tolerance, both sides: synced
    let ack = engine
        .heartbeat(beat(&room_id, viewer.member_id, 98.0, true))
        .await
        .unwrap();
    assert_eq!(ack.drift_secs, SYNC_TOLERANCE_SECS);
    assert!(ack.synced);

    let ack = engine
        .heartbeat(beat(&room_id, viewer.member_id, 102.0, true))
        .await
        .unwrap();
    assert_eq!(ack.drift_secs, SYNC_TOLERANCE_SECS);
    assert!(ack.synced);

    // Just past tolerance: unsynced
    let ack = engine
        .heartbeat(beat(&room_id, viewer.member_id, 97.9, true))
        .await
        .unwrap();
    assert!(ack.drift_secs > SYNC_TOLERANCE_SECS);
    assert!(!ack.synced);
}

#[tokio::test]
async fn test_seek_desyncs_everyone_until_they_report() {
    let harness = TestEngine::new();
    let engine = &harness.engine;

    let created = harness.host_room("host").await.unwrap();
    let room_id = created.room.room_id.clone();
    let host = created.host.member_id;
    let viewers = [
        harness.join(&room_id, "viewer-a").await.unwrap().member_id,
        harness.join(&room_id, "viewer-b").await.unwrap().member_id,
    ];

    // Everyone settles at 100s
    engine.heartbeat(beat(&room_id, host, 100.0, true)).await.unwrap();
    for viewer in viewers {
        let ack = engine
            .heartbeat(beat(&room_id, viewer, 100.0, true))
            .await
            .unwrap();
        assert!(ack.synced);
    }

    let mut events = engine.subscribe(&room_id);
    engine.control_playback(seek(&room_id, host, 400.0)).await.unwrap();

    // All three were synced before the jump, so all three flip
    let mut desynced = 0;
    while let Ok(envelope) = events.try_recv() {
        if let RoomEvent::MemberSyncStatusChanged(e) = envelope.event {
            assert!(!e.synced);
            desynced += 1;
        }
    }
    assert_eq!(desynced, 3);
    for viewer in viewers {
        assert!(!harness.member(viewer).await.unwrap().synced);
    }

    // Reports at the new position restore them one by one
    for viewer in viewers {
        let ack = engine
            .heartbeat(beat(&room_id, viewer, 400.0, true))
            .await
            .unwrap();
        assert!(ack.synced);
    }
    engine.heartbeat(beat(&room_id, host, 400.0, true)).await.unwrap();
    for viewer in viewers {
        assert!(harness.member(viewer).await.unwrap().synced);
    }
}

// ============================================================================
// Eviction
// ============================================================================

#[tokio::test]
async fn test_eviction_boundary_around_member_timeout() {
    let harness = TestEngine::new();
    let engine = &harness.engine;

    let created = harness.host_room("host").await.unwrap();
    let room_id = created.room.room_id.clone();
    let silent = harness.join(&room_id, "silent").await.unwrap();
    let barely = harness.join(&room_id, "barely").await.unwrap();

    harness.backdate_heartbeat(silent.member_id, 31).await.unwrap();
    harness.backdate_heartbeat(barely.member_id, 29).await.unwrap();

    let report = harness.sweeper().sweep().await.unwrap();
    assert_eq!(report.members_evicted, 1);

    assert!(harness.member(silent.member_id).await.is_err());
    assert!(harness.member(barely.member_id).await.is_ok());
    assert_eq!(engine.room_snapshot(&room_id).await.unwrap().member_count, 2);
}

#[tokio::test]
async fn test_evicted_host_hands_over_like_a_leave() {
    let harness = TestEngine::new();
    let created = harness.host_room("host").await.unwrap();
    let room_id = created.room.room_id.clone();
    let viewer = harness.join(&room_id, "viewer").await.unwrap();

    let mut events = harness.engine.subscribe(&room_id);
    harness
        .backdate_heartbeat(created.host.member_id, 45)
        .await
        .unwrap();
    harness.sweeper().sweep().await.unwrap();

    let room = harness.room(&room_id).await.unwrap();
    assert_eq!(room.host_id, Some(viewer.member_id));

    // Same event shape as an explicit host leave
    let mut types = Vec::new();
    while let Ok(envelope) = events.try_recv() {
        types.push(envelope.event.event_type());
    }
    assert_eq!(types, vec!["MEMBER_LEFT", "HOST_CHANGED"]);
}

// ============================================================================
// Concurrency across rooms
// ============================================================================

#[tokio::test]
async fn test_two_rooms_interleave_with_independent_sequences() {
    let harness = TestEngine::new();
    let engine = &harness.engine;

    let first = harness.host_room("host-a").await.unwrap();
    let second = harness.host_room("host-b").await.unwrap();
    let room_a = first.room.room_id.clone();
    let room_b = second.room.room_id.clone();

    let mut events_a = engine.subscribe(&room_a);
    let mut events_b = engine.subscribe(&room_b);

    // Interleave commands for both rooms concurrently
    let task_a = {
        let engine = engine.clone();
        let room_a = room_a.clone();
        let host = first.host.member_id;
        tokio::spawn(async move {
            engine.control_playback(seek(&room_a, host, 10.0)).await?;
            engine.control_playback(pause(&room_a, host)).await
        })
    };
    let task_b = {
        let engine = engine.clone();
        let room_b = room_b.clone();
        let host = second.host.member_id;
        tokio::spawn(async move {
            engine.control_playback(seek(&room_b, host, 20.0)).await?;
            engine.control_playback(play(&room_b, host)).await
        })
    };
    task_a.await.unwrap().unwrap();
    task_b.await.unwrap().unwrap();

    assert_eq!(engine.room_snapshot(&room_a).await.unwrap().position_secs, 10.0);
    assert_eq!(engine.room_snapshot(&room_b).await.unwrap().position_secs, 20.0);

    // Each room's stream is gapless and only carries its own events
    for (events, room_id) in [(&mut events_a, &room_a), (&mut events_b, &room_b)] {
        let mut seqs = Vec::new();
        while let Ok(envelope) = events.try_recv() {
            assert_eq!(&envelope.room_id, room_id);
            seqs.push(envelope.seq);
        }
        assert!(!seqs.is_empty());
        assert!(seqs.windows(2).all(|w| w[1] == w[0] + 1));
    }
}

#[tokio::test]
async fn test_blocked_room_does_not_block_others() {
    let harness = TestEngine::with_config(EngineConfig {
        command_timeout: Duration::from_millis(100),
        ..EngineConfig::default()
    });
    let engine = &harness.engine;

    let first = harness.host_room("host-a").await.unwrap();
    let second = harness.host_room("host-b").await.unwrap();
    let room_a = first.room.room_id.clone();
    let room_b = second.room.room_id.clone();

    // Wedge room A
    let lock_a = harness.ctx().room_lock(&room_a);
    let guard_a = lock_a.lock().await;

    // Room B proceeds while A is held
    engine
        .control_playback(seek(&room_b, second.host.member_id, 5.0))
        .await
        .unwrap();

    let err = engine
        .control_playback(seek(&room_a, first.host.member_id, 5.0))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "TIMEOUT");
    drop(guard_a);
}

// ============================================================================
// Rate limiting and timeouts
// ============================================================================

#[tokio::test]
async fn test_rate_limit_exhaustion_then_fail_open() {
    let harness = TestEngine::new();
    let engine = &harness.engine;

    let created = harness.host_room("host").await.unwrap();
    let room_id = created.room.room_id.clone();
    let host = created.host.member_id;

    // Two playback commands per second; the third is denied
    engine.control_playback(play(&room_id, host)).await.unwrap();
    engine.control_playback(pause(&room_id, host)).await.unwrap();
    let err = engine
        .control_playback(play(&room_id, host))
        .await
        .unwrap_err();
    assert!(err.is_rate_limited());

    // With the limit store down the same command goes through
    harness.set_rate_store_failing(true);
    engine.control_playback(play(&room_id, host)).await.unwrap();
    harness.set_rate_store_failing(false);
}

#[tokio::test]
async fn test_timed_out_command_leaves_state_untouched() {
    let harness = TestEngine::with_config(EngineConfig {
        command_timeout: Duration::from_millis(50),
        ..EngineConfig::default()
    });
    let engine = &harness.engine;

    let created = harness.host_room("host").await.unwrap();
    let room_id = created.room.room_id.clone();
    let host = created.host.member_id;

    let lock = harness.ctx().room_lock(&room_id);
    let guard = lock.lock().await;
    let err = engine
        .control_playback(seek(&room_id, host, 250.0))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "TIMEOUT");
    drop(guard);

    // Nothing moved, and the same command succeeds once the lock frees up
    let room = harness.room(&room_id).await.unwrap();
    assert_eq!(room.position_secs, 0.0);

    let snapshot = engine
        .control_playback(seek(&room_id, host, 250.0))
        .await
        .unwrap();
    assert_eq!(snapshot.position_secs, 250.0);
}

#[tokio::test]
async fn test_deleted_room_rejects_stragglers() {
    let harness = TestEngine::new();
    let engine = &harness.engine;

    let created = harness.host_room("host").await.unwrap();
    let room_id = created.room.room_id.clone();
    let viewer = harness.join(&room_id, "viewer").await.unwrap();

    engine
        .delete_room(DeleteRoomRequest {
            room_id: room_id.clone(),
            member_id: created.host.member_id,
        })
        .await
        .unwrap();

    let err = engine
        .heartbeat(beat(&room_id, viewer.member_id, 1.0, true))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = engine
        .join_room(join_request(&room_id, "late", None))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ROOM_NOT_FOUND");
}
