//! In-memory repository implementations
//!
//! Same contracts as the PostgreSQL repositories, backed by `DashMap`.
//! The integration suite runs the engine entirely on these, and embedded
//! deployments can use them to run without a database.

mod member;
mod rate_limit;
mod room;
mod sample;

pub use member::MemoryMemberRepository;
pub use rate_limit::MemoryRateLimitStore;
pub use room::MemoryRoomRepository;
pub use sample::MemorySampleRepository;
