//! cellwar engine library.
//!
//! Exposes the entity model, distance graph, planner, protocol glue, and the
//! self-play arena for use by integration tests and the binaries.

pub mod arena;
pub mod board;
pub mod config;
pub mod engine;
pub mod plan;
pub mod protocol;
