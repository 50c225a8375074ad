//! Domain events

mod room_event;

pub use room_event::{
    EventEnvelope, HostChangedEvent, MemberJoinedEvent, MemberLeftEvent,
    MemberSyncStatusChangedEvent, RoomEvent, RoomStateChangedEvent,
};
