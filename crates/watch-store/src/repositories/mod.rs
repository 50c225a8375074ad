//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in watch-core.
//! Each repository handles database operations for a specific domain concern.

mod error;
mod member;
mod rate_limit;
mod room;
mod sample;

pub use member::PgMemberRepository;
pub use rate_limit::PgRateLimitStore;
pub use room::PgRoomRepository;
pub use sample::PgSampleRepository;
