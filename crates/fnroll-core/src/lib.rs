//! fnroll Core - alias rollback for versioned serverless functions
//!
//! This crate holds everything that decides *what* a rollback does:
//! - Version and function identity models with boundary parsing
//! - The `VersionStore` / `AliasRepointer` / `FunctionLoader` seams
//! - Previous-version resolution over a store with gaps
//! - The deletion guard that waits for alias detachment before deleting
//! - The rollback orchestrator with dry-run and delete-version modes
//!
//! Concrete stores and loaders live in `fnroll-store`.

pub mod deletion_guard;
pub mod errors;
pub mod loader;
pub mod logging_facility;
pub mod model;
pub mod resolver;
pub mod rollback;
pub mod store;

pub use fnroll_core_types::schema;

#[doc(hidden)]
pub use tracing as __tracing;

// Re-export commonly used types
pub use deletion_guard::{ensure_deleted, PollPolicy};
pub use errors::{ExError, ExErrorKind, Result, RollbackError, StoreError, StoreErrorKind};
pub use loader::FunctionLoader;
pub use model::{FunctionDefinition, FunctionName, FunctionVersion, Version};
pub use resolver::{resolve_previous_version, ResolveStrategy};
pub use rollback::{
    rollback, rollback_function, RollbackOptions, RollbackOutcome, RollbackRequest,
    RollbackSettings,
};
pub use store::{AliasRepointer, StoreAliasRepointer, VersionStore, CURRENT_ALIAS_NAME};
