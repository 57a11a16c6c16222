//! Command orchestration layer.
//!
//! Provides high-level command functions that coordinate between
//! core domain logic and persistence layer.

pub mod alias;
pub mod engine_command;
pub mod publish;
pub mod versions;
