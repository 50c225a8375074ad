//! Database connection pool management

mod postgres;

pub use postgres::{DatabaseConfig, create_pool, create_pool_from_env};

// Re-export PgPool for convenience
pub use sqlx::postgres::PgPool;
