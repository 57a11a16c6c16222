//! Version deletion guard.
//!
//! The store may refuse to delete a version an alias still references, and
//! alias updates can take a moment to become visible. The guard therefore
//! waits until the alias no longer reports the version before deleting it.

use crate::errors::RollbackError;
use crate::model::{FunctionName, Version};
use crate::store::{VersionStore, CURRENT_ALIAS_NAME};
use backon::{BackoffBuilder, ExponentialBackoff, ExponentialBuilder};
use fnroll_core_types::CallContext;
use std::time::Duration;

/// Largest growth factor applied between checks
const MAX_BACKOFF_FACTOR: f32 = 64.0;

/// Wait schedule for the detachment check
///
/// The default polls every second with no attempt limit. Setting
/// `max_attempts` bounds the wait; `backoff` above 1.0 grows the interval
/// geometrically up to `max_interval`.
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub backoff: f32,
    pub max_interval: Duration,
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            backoff: 1.0,
            max_interval: Duration::from_secs(30),
            max_attempts: None,
        }
    }
}

impl PollPolicy {
    /// Fixed interval, unbounded
    pub fn fixed(interval: Duration) -> Self {
        Self {
            interval,
            ..Self::default()
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn with_backoff(mut self, backoff: f32, max_interval: Duration) -> Self {
        self.backoff = backoff;
        self.max_interval = max_interval;
        self
    }

    /// Sleeps between consecutive checks.
    ///
    /// A bounded policy of `n` attempts yields `n - 1` delays; the guard
    /// gives up once the sequence is exhausted. Factors below 1.0 or not
    /// finite poll at a fixed interval.
    pub fn delays(&self) -> ExponentialBackoff {
        let factor = if self.backoff.is_finite() {
            self.backoff.clamp(1.0, MAX_BACKOFF_FACTOR)
        } else {
            1.0
        };
        let builder = ExponentialBuilder::default()
            .with_min_delay(self.interval)
            .with_max_delay(self.max_interval.max(self.interval))
            .with_factor(factor);
        match self.max_attempts {
            Some(max) => builder.with_max_times(max.saturating_sub(1) as usize),
            None => builder.without_max_times(),
        }
        .build()
    }
}

/// Delete `version` once the current alias no longer points at it.
///
/// # Errors
///
/// - `DeletionGuardRead` if reading the alias fails (not retried).
/// - `DeletionGuardTimeout` if `policy.max_attempts` checks all still saw
///   the version attached; nothing is deleted.
/// - `DeletionGuardDelete` if the delete call fails after detachment.
/// - `Interrupted` if the call context is cancelled while waiting.
pub fn ensure_deleted(
    store: &dyn VersionStore,
    ctx: &CallContext,
    function: &FunctionName,
    version: Version,
    policy: &PollPolicy,
) -> Result<(), RollbackError> {
    let target = version.to_string();
    let mut delays = policy.delays();
    let mut attempt: u32 = 0;

    loop {
        ctx.check().map_err(|reason| RollbackError::Interrupted {
            op: "ensure_deleted".to_string(),
            reason,
        })?;
        attempt += 1;

        tracing::debug!(
            function_name = function.as_str(),
            poll_attempt = attempt,
            "checking aliased version"
        );
        let aliased = store
            .get_alias_target(ctx, function, CURRENT_ALIAS_NAME)
            .map_err(|source| RollbackError::DeletionGuardRead {
                function_name: function.to_string(),
                alias: CURRENT_ALIAS_NAME.to_string(),
                version,
                source,
            })?;

        let attached = aliased == target || Version::parse(&aliased) == Ok(version);
        if !attached {
            break;
        }

        let Some(mut delay) = delays.next() else {
            return Err(RollbackError::DeletionGuardTimeout {
                function_name: function.to_string(),
                version,
                attempts: attempt,
            });
        };

        tracing::debug!(
            function_name = function.as_str(),
            version = %version,
            alias = CURRENT_ALIAS_NAME,
            "version still has alias, retrying"
        );
        if let Some(remaining) = ctx.remaining() {
            delay = delay.min(remaining);
        }
        std::thread::sleep(delay);
    }

    tracing::info!(
        function_name = function.as_str(),
        version = %version,
        "deleting function version"
    );
    store
        .delete_function_version(ctx, function, &target)
        .map_err(|source| RollbackError::DeletionGuardDelete {
            function_name: function.to_string(),
            version,
            source,
        })
}
