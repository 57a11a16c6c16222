//! Published version listing with the current alias marker.

#![allow(clippy::result_large_err)]

use chrono::{DateTime, Utc};
use fnroll_core::errors::ExError;
use fnroll_core::{FunctionName, Version, VersionStore, CURRENT_ALIAS_NAME};
use fnroll_core_types::CallContext;
use fnroll_store::errors::Result;
use serde::Serialize;

/// One published version as shown by `versions`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionEntry {
    pub version: Version,
    /// Whether the current alias points at this version
    pub current: bool,
    pub description: Option<String>,
    pub runtime: Option<String>,
    pub code_sha256: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Versions of one function, oldest first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionListing {
    pub function_name: String,
    /// Target of the current alias, if the alias exists
    pub current: Option<String>,
    pub versions: Vec<VersionEntry>,
}

fn annotate(err: impl Into<ExError>, function: &FunctionName) -> ExError {
    err.into().with_function_name(function.as_str())
}

/// List the published versions of `function`.
///
/// Entries the store reports that are not numeric versions are skipped.
/// A missing current alias is not an error.
///
/// # Errors
///
/// Returns the store failure if listing or a metadata lookup fails.
pub fn list_versions(
    function: &FunctionName,
    store: &dyn VersionStore,
    ctx: &CallContext,
) -> Result<VersionListing> {
    let current = match store.get_alias_target(ctx, function, CURRENT_ALIAS_NAME) {
        Ok(target) => Some(target),
        Err(e) if e.is_not_found() => None,
        Err(e) => return Err(annotate(e, function)),
    };
    let current_version = current.as_deref().and_then(|t| Version::parse(t).ok());

    let mut published: Vec<Version> = store
        .list_versions(ctx, function)
        .map_err(|e| annotate(e, function))?
        .iter()
        .filter_map(|v| Version::parse(v).ok())
        .collect();
    published.sort();
    published.dedup();

    let mut versions = Vec::with_capacity(published.len());
    for version in published {
        let meta = store
            .get_function_version(ctx, function, &version.to_string())
            .map_err(|e| annotate(e, function))?;
        versions.push(VersionEntry {
            version,
            current: current_version == Some(version),
            description: meta.description,
            runtime: meta.runtime,
            code_sha256: meta.code_sha256,
            last_modified: meta.last_modified,
        });
    }

    tracing::debug!(
        function_name = function.as_str(),
        count = versions.len(),
        "listed function versions"
    );
    Ok(VersionListing {
        function_name: function.to_string(),
        current,
        versions,
    })
}
