//! Publishing a definition file as a new version of the local store.

#![allow(clippy::result_large_err)]

use fnroll_core::errors::{ExError, ExErrorKind};
use fnroll_core::{
    log_op_end, log_op_error, log_op_start, AliasRepointer, FunctionLoader, FunctionVersion,
    StoreAliasRepointer, Version, CURRENT_ALIAS_NAME,
};
use fnroll_core_types::{CallContext, Interrupt};
use fnroll_store::errors::Result;
use fnroll_store::{compute_definition_digest, SqliteVersionStore};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;

/// Result of a publish
#[derive(Debug, Clone, Serialize)]
pub struct PublishResult {
    pub published: FunctionVersion,
    /// Whether the current alias now points at the new version
    pub aliased: bool,
}

/// Load `function_file`, publish it, and optionally point the current alias at it.
///
/// The recorded digest is the SHA256 of the definition's canonical JSON, so
/// formatting changes in the file do not change it.
///
/// # Errors
///
/// Returns `ConfigLoad` for an unreadable definition, or the store failure.
pub fn publish(
    function_file: &Path,
    point_alias: bool,
    store: &SqliteVersionStore,
    loader: &dyn FunctionLoader,
    ctx: &CallContext,
) -> Result<PublishResult> {
    let started = Instant::now();
    log_op_start!(
        "publish",
        request_id = %ctx.request_id,
        function_file = %function_file.display(),
        point_alias = point_alias
    );

    let result = publish_inner(function_file, point_alias, store, loader, ctx);

    let duration_ms = started.elapsed().as_millis() as u64;
    match &result {
        Ok(r) => {
            log_op_end!(
                "publish",
                duration_ms = duration_ms,
                request_id = %ctx.request_id,
                function_name = r.published.function_name.as_str(),
                version = r.published.version.as_str()
            );
        }
        Err(err) => {
            log_op_error!(
                "publish",
                err.clone(),
                duration_ms = duration_ms,
                request_id = %ctx.request_id
            );
        }
    }
    result
}

pub(crate) fn interrupted(op: &str, reason: Interrupt) -> ExError {
    let kind = match reason {
        Interrupt::Cancelled => ExErrorKind::Cancelled,
        Interrupt::DeadlineExceeded => ExErrorKind::Timeout,
    };
    ExError::new(kind).with_op(op).with_message(reason.to_string())
}

fn publish_inner(
    function_file: &Path,
    point_alias: bool,
    store: &SqliteVersionStore,
    loader: &dyn FunctionLoader,
    ctx: &CallContext,
) -> Result<PublishResult> {
    ctx.check().map_err(|reason| interrupted("publish", reason))?;

    let definition = loader.load_function(function_file)?;
    let digest = compute_definition_digest(&serde_json::to_vec(&definition)?);
    let published = store.publish_version(&definition, Some(&digest))?;

    if point_alias {
        let version = Version::parse(&published.version).map_err(|e| {
            ExError::new(ExErrorKind::Internal)
                .with_op("publish")
                .with_message(e.to_string())
        })?;
        StoreAliasRepointer::new(store)
            .repoint_alias(ctx, &definition.function_name, CURRENT_ALIAS_NAME, version)
            .map_err(|e| {
                ExError::from(e)
                    .with_function_name(definition.function_name.as_str())
                    .with_version(published.version.clone())
            })?;
    }

    Ok(PublishResult {
        published,
        aliased: point_alias,
    })
}
