//! Canonical schema constants for structured logging and events
//!
//! These constants keep log fields consistent between the core, the store
//! and the CLI.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";

// Function and version identifiers
pub const FIELD_FUNCTION_NAME: &str = "function_name";
pub const FIELD_ALIAS: &str = "alias";
pub const FIELD_CURRENT_VERSION: &str = "current_version";
pub const FIELD_PREVIOUS_VERSION: &str = "previous_version";
pub const FIELD_CANDIDATE_VERSION: &str = "candidate_version";
pub const FIELD_DRY_RUN: &str = "dry_run";
pub const FIELD_POLL_ATTEMPT: &str = "poll_attempt";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
pub const EVENT_TRANSITION: &str = "transition";
