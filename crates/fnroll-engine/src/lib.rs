//! fnroll Engine - Orchestration layer
//!
//! Wires the function loader and the local version store into the rollback
//! core, and adds the local-store commands around it (listing, publishing,
//! alias updates).

pub mod commands;

pub use commands::engine_command::{apply_engine_command, EngineCommand, EngineCommandResult};
