//! Pointing an alias at an explicit version.

#![allow(clippy::result_large_err)]

use crate::commands::publish::interrupted;
use fnroll_core::errors::ExError;
use fnroll_core::{
    log_op_end, log_op_error, log_op_start, AliasRepointer, FunctionName, Version, VersionStore,
};
use fnroll_core_types::CallContext;
use fnroll_store::errors::Result;
use serde::Serialize;
use std::time::Instant;

/// Result of an alias update
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AliasSetResult {
    pub function_name: String,
    pub alias: String,
    /// Target before the update; `None` if the alias was created
    pub previous: Option<String>,
    pub version: Version,
}

/// Point `alias` of `function` at `version` through `repointer`.
///
/// # Errors
///
/// Returns `NotFound` if the version does not exist, or the store failure.
pub fn set_alias(
    function: &FunctionName,
    alias: &str,
    version: Version,
    store: &dyn VersionStore,
    repointer: &dyn AliasRepointer,
    ctx: &CallContext,
) -> Result<AliasSetResult> {
    let started = Instant::now();
    log_op_start!(
        "set_alias",
        request_id = %ctx.request_id,
        function_name = function.as_str(),
        alias = alias,
        version = %version
    );

    let result = (|| -> Result<AliasSetResult> {
        ctx.check().map_err(|reason| interrupted("set_alias", reason))?;
        let previous = match store.get_alias_target(ctx, function, alias) {
            Ok(target) => Some(target),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(ExError::from(e).with_function_name(function.as_str())),
        };
        repointer
            .repoint_alias(ctx, function, alias, version)
            .map_err(|e| {
                ExError::from(e)
                    .with_function_name(function.as_str())
                    .with_version(version.to_string())
            })?;
        Ok(AliasSetResult {
            function_name: function.to_string(),
            alias: alias.to_string(),
            previous,
            version,
        })
    })();

    let duration_ms = started.elapsed().as_millis() as u64;
    match &result {
        Ok(_) => {
            log_op_end!(
                "set_alias",
                duration_ms = duration_ms,
                request_id = %ctx.request_id
            );
        }
        Err(err) => {
            log_op_error!(
                "set_alias",
                err.clone(),
                duration_ms = duration_ms,
                request_id = %ctx.request_id
            );
        }
    }
    result
}
