//! Error handling for fnroll-store
//!
//! Store-level helpers return `ExError`; the `VersionStore` implementation
//! reports `StoreError` so the core can tell not-found from other failures.

use fnroll_core::errors::{ExError, ExErrorKind, StoreError, StoreErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create a function definition error
pub fn definition_error(reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::ConfigLoad)
        .with_op("load_function")
        .with_message(reason)
}

/// Map a rusqlite failure inside a store call
pub fn store_persistence(op: &str, err: rusqlite::Error) -> StoreError {
    StoreError::new(StoreErrorKind::Persistence, op, err.to_string())
}
