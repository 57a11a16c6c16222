//! fnroll Store - local version store and function definition loading
//!
//! Provides:
//! - A SQLite-backed `VersionStore` with embedded, checksummed migrations
//! - Function definition files (JSON or YAML) with environment templating

pub mod db;
pub mod errors;
pub mod function_def;
pub mod migrations;
pub mod version_store;

// Re-export key types
pub use errors::Result;
pub use function_def::{compute_definition_digest, FileFunctionLoader, FunctionFileFormat};
pub use version_store::SqliteVersionStore;
