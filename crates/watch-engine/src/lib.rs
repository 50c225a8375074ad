//! # watch-engine
//!
//! Application layer of the room synchronization engine: the command
//! facade, per-room locking, playback and presence services, the event
//! broadcaster, rate limiting, and the background sweeper. Transport
//! adapters (HTTP, WebSocket, embedded) sit on top of [`RoomEngine`];
//! storage sits below, behind the `watch-core` repository traits.

pub mod broadcast;
pub mod commands;
pub mod config;
pub mod context;
pub mod engine;
pub mod eviction;
pub mod limiter;
pub mod services;

pub use broadcast::Broadcaster;
pub use config::{EngineConfig, RateRule};
pub use context::{EngineContext, EngineContextBuilder};
pub use engine::RoomEngine;
pub use eviction::{EvictionScheduler, SweepReport};
pub use limiter::{ActionKind, RateLimiter};

/// Result type for engine operations
pub type EngineResult<T> = Result<T, watch_core::error::DomainError>;
