//! Call context threaded through every version store call
//!
//! The context carries the request id plus the ambient cancellation and
//! deadline. Store implementations and the deletion guard call
//! [`CallContext::check`] before doing work so a cancelled invocation fails
//! promptly instead of waiting on its own timeout.

use crate::correlation::RequestId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared cancellation flag
///
/// Clones observe the same flag, so a signal handler or supervising thread
/// can hold one clone while the rollback holds another.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of every call sharing this token
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Why a call context refused further work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    Cancelled,
    DeadlineExceeded,
}

impl std::fmt::Display for Interrupt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Interrupt::Cancelled => f.write_str("operation cancelled"),
            Interrupt::DeadlineExceeded => f.write_str("deadline exceeded"),
        }
    }
}

/// Context carried through operation boundaries
#[derive(Debug, Clone)]
pub struct CallContext {
    pub request_id: RequestId,
    deadline: Option<Instant>,
    cancellation: CancellationToken,
}

impl CallContext {
    /// Create a context with a fresh RequestId, no deadline and its own token
    pub fn new() -> Self {
        Self {
            request_id: RequestId::new(),
            deadline: None,
            cancellation: CancellationToken::new(),
        }
    }

    /// Fail calls made after `timeout` from now
    ///
    /// A timeout too large to represent as an `Instant` leaves the context
    /// without a deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Instant::now().checked_add(timeout);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Share an externally owned cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, `None` when unbounded
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Check whether work may continue under this context
    ///
    /// # Errors
    ///
    /// Returns the [`Interrupt`] reason if the context was cancelled or its
    /// deadline has passed.
    pub fn check(&self) -> Result<(), Interrupt> {
        if self.cancellation.is_cancelled() {
            return Err(Interrupt::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(Interrupt::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}

impl Default for CallContext {
    fn default() -> Self {
        Self::new()
    }
}
