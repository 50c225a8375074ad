//! # watch-store
//!
//! Storage layer implementing the repository traits from `watch-core`.
//!
//! ## Overview
//!
//! Two families of implementations ship here:
//!
//! - PostgreSQL via SQLx: connection pool management, `FromRow` models,
//!   entity ↔ model mappers, and repository implementations.
//! - In-memory over `DashMap`: the same contracts without a database, used
//!   by the integration suite and embeddable deployments.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use watch_store::pool::{create_pool, DatabaseConfig};
//! use watch_store::repositories::PgRoomRepository;
//! use watch_core::traits::RoomRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env();
//!     let pool = create_pool(&config).await?;
//!     let room_repo = PgRoomRepository::new(pool);
//!
//!     // Use the repository...
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::{
    MemoryMemberRepository, MemoryRateLimitStore, MemoryRoomRepository, MemorySampleRepository,
};
pub use pool::{DatabaseConfig, PgPool, create_pool, create_pool_from_env};
pub use repositories::{
    PgMemberRepository, PgRateLimitStore, PgRoomRepository, PgSampleRepository,
};
