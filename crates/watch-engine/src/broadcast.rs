//! Per-room event fan-out
//!
//! Every room gets its own broadcast channel plus a sequence counter.
//! Events are published while the caller still holds the room lock, so
//! subscribers observe sequence numbers in state-transition order. Slow
//! subscribers see `RecvError::Lagged` and are expected to resynchronize
//! from a fresh room snapshot.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::trace;

use watch_core::events::{EventEnvelope, RoomEvent};
use watch_core::value_objects::RoomId;

/// One room's broadcast channel and sequence counter
struct RoomChannel {
    seq: AtomicU64,
    tx: broadcast::Sender<EventEnvelope>,
}

impl RoomChannel {
    fn new(buffer: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer);
        Self {
            seq: AtomicU64::new(0),
            tx,
        }
    }

    /// Get the next sequence number (first event is 1)
    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Routes room events to per-room broadcast channels
pub struct Broadcaster {
    buffer: usize,
    channels: DashMap<RoomId, RoomChannel>,
}

impl Broadcaster {
    /// Create a broadcaster with the given per-room channel capacity
    #[must_use]
    pub fn new(buffer: usize) -> Self {
        Self {
            buffer,
            channels: DashMap::new(),
        }
    }

    /// Publish an event to a room, assigning its sequence number.
    /// Returns the assigned sequence. A room without subscribers still
    /// advances its sequence; the send result is ignored.
    pub fn publish(&self, room_id: &RoomId, event: RoomEvent) -> u64 {
        let channel = self
            .channels
            .entry(room_id.clone())
            .or_insert_with(|| RoomChannel::new(self.buffer));

        let seq = channel.next_seq();
        trace!(
            room_id = %room_id,
            seq = seq,
            event_type = event.event_type(),
            "Publishing room event"
        );

        let envelope = EventEnvelope::new(seq, room_id.clone(), event);
        let _ = channel.tx.send(envelope);
        seq
    }

    /// Subscribe to a room's events
    pub fn subscribe(&self, room_id: &RoomId) -> broadcast::Receiver<EventEnvelope> {
        self.channels
            .entry(room_id.clone())
            .or_insert_with(|| RoomChannel::new(self.buffer))
            .tx
            .subscribe()
    }

    /// Drop a room's channel. Subscribers observe `RecvError::Closed`.
    pub fn close_room(&self, room_id: &RoomId) {
        self.channels.remove(room_id);
    }

    /// Number of live subscribers for a room
    #[must_use]
    pub fn subscriber_count(&self, room_id: &RoomId) -> usize {
        self.channels
            .get(room_id)
            .map_or(0, |c| c.tx.receiver_count())
    }
}
