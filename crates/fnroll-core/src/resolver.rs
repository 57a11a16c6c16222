//! Previous-version resolution.
//!
//! Finds the nearest existing version strictly below the current one in a
//! store where version numbers may have gaps (deleted or never published).

use crate::errors::{RollbackError, StoreErrorKind};
use crate::model::{FunctionName, Version};
use crate::store::VersionStore;
use fnroll_core_types::CallContext;

/// How candidate versions are enumerated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolveStrategy {
    /// Probe `current-1, current-2, …, 1` one lookup at a time.
    #[default]
    Scan,
    /// Ask the store for its published versions and probe only those below
    /// current, highest first. Falls back to `Scan` when the store has no
    /// listing endpoint.
    Listing,
}

impl ResolveStrategy {
    /// Parse from string; unknown values are rejected.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "scan" => Some(ResolveStrategy::Scan),
            "listing" => Some(ResolveStrategy::Listing),
            _ => None,
        }
    }
}

/// Resolve the version a rollback from `current` should land on.
///
/// Each candidate is confirmed with a metadata lookup. A `NotFound` answer
/// moves on to the next lower candidate; any other failure aborts the whole
/// resolution. Version 0 and below are never queried.
///
/// # Errors
///
/// - `NoPreviousVersion` when no candidate below `current` exists.
/// - `VersionLookup` / `VersionList` for store failures other than not-found.
/// - `Interrupted` if the call context is cancelled between lookups.
pub fn resolve_previous_version(
    store: &dyn VersionStore,
    ctx: &CallContext,
    function: &FunctionName,
    current: Version,
    strategy: ResolveStrategy,
) -> Result<Version, RollbackError> {
    match strategy {
        ResolveStrategy::Scan => probe(store, ctx, function, current, current.predecessors()),
        ResolveStrategy::Listing => match listed_candidates(store, ctx, function, current)? {
            Some(candidates) => probe(store, ctx, function, current, candidates),
            None => probe(store, ctx, function, current, current.predecessors()),
        },
    }
}

fn probe(
    store: &dyn VersionStore,
    ctx: &CallContext,
    function: &FunctionName,
    current: Version,
    candidates: impl IntoIterator<Item = Version>,
) -> Result<Version, RollbackError> {
    for candidate in candidates {
        ctx.check().map_err(|reason| RollbackError::Interrupted {
            op: "resolve_previous_version".to_string(),
            reason,
        })?;

        let qualifier = candidate.to_string();
        tracing::debug!(
            function_name = function.as_str(),
            candidate_version = %candidate,
            "get function version"
        );
        match store.get_function_version(ctx, function, &qualifier) {
            Ok(_) => return Ok(candidate),
            Err(err) if err.is_not_found() => {
                tracing::debug!(
                    function_name = function.as_str(),
                    candidate_version = %candidate,
                    "version not found"
                );
            }
            Err(source) => {
                return Err(RollbackError::VersionLookup {
                    function_name: function.to_string(),
                    version: qualifier,
                    source,
                })
            }
        }
    }

    Err(RollbackError::NoPreviousVersion {
        function_name: function.to_string(),
        current,
    })
}

/// Listed versions below `current`, highest first; `None` if unsupported
fn listed_candidates(
    store: &dyn VersionStore,
    ctx: &CallContext,
    function: &FunctionName,
    current: Version,
) -> Result<Option<Vec<Version>>, RollbackError> {
    let listed = match store.list_versions(ctx, function) {
        Ok(listed) => listed,
        Err(err) if err.kind() == StoreErrorKind::Unsupported => {
            tracing::debug!(
                function_name = function.as_str(),
                "store cannot list versions, scanning instead"
            );
            return Ok(None);
        }
        Err(source) => {
            return Err(RollbackError::VersionList {
                function_name: function.to_string(),
                source,
            })
        }
    };

    let mut candidates: Vec<Version> = listed
        .iter()
        .filter_map(|s| match Version::parse(s) {
            Ok(v) => Some(v),
            Err(_) => {
                // "$LATEST" and similar qualifiers are not rollback targets
                tracing::debug!(function_name = function.as_str(), qualifier = %s, "skipping");
                None
            }
        })
        .filter(|v| *v < current)
        .collect();
    candidates.sort_unstable_by(|a, b| b.cmp(a));
    candidates.dedup();
    Ok(Some(candidates))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parse() {
        assert_eq!(ResolveStrategy::parse("scan"), Some(ResolveStrategy::Scan));
        assert_eq!(
            ResolveStrategy::parse("listing"),
            Some(ResolveStrategy::Listing)
        );
        assert_eq!(ResolveStrategy::parse("binary"), None);
        assert_eq!(ResolveStrategy::default(), ResolveStrategy::Scan);
    }
}
