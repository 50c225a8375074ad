//! Integration test utilities for the room synchronization engine
//!
//! This crate wires a full [`watch_engine::RoomEngine`] over the in-memory
//! stores so engine-level scenarios run without a database or any other
//! external service.

pub mod fixtures;
pub mod harness;

pub use fixtures::*;
pub use harness::*;
