//! Core types shared across fnroll facilities
//!
//! This crate provides foundational types used by the error handling and
//! logging facilities as well as every version store call:
//!
//! - **Correlation types**: RequestId
//! - **Call context**: CallContext with cancellation and deadline
//! - **Schema constants**: Canonical field keys and event names

pub mod context;
pub mod correlation;
pub mod schema;

pub use context::{CallContext, CancellationToken, Interrupt};
pub use correlation::RequestId;
