//! Entity ↔ model mappers
//!
//! Model → entity conversions are fallible: IDs, visibility, and sample
//! kinds live as strings in PostgreSQL and must parse back. A row that no
//! longer parses surfaces as `DomainError::Storage` rather than a panic.

mod member;
mod room;
mod sample;

pub use member::member_from_model;
pub use room::room_from_model;
pub use sample::sample_from_model;
