//! Rollback orchestrator.
//!
//! Sequences alias read, version parse, previous-version resolution, the
//! alias repoint and the optional deletion of the version rolled back from.
//! Every step depends on the previous one; nothing is retried here except
//! the deletion guard's designed wait.

use crate::deletion_guard::{ensure_deleted, PollPolicy};
use crate::errors::RollbackError;
use crate::loader::FunctionLoader;
use crate::model::{FunctionName, Version};
use crate::resolver::{resolve_previous_version, ResolveStrategy};
use crate::schema::EVENT_TRANSITION;
use crate::store::{AliasRepointer, VersionStore, CURRENT_ALIAS_NAME};
use crate::{log_op_end, log_op_error, log_op_start};
use fnroll_core_types::CallContext;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

/// Marker appended to transition lines that made no change
pub const DRY_RUN_LABEL: &str = "**DRY RUN**";

/// Rollback as requested from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbackOptions {
    /// Function definition file to take the function name from
    pub function_file: PathBuf,
    pub dry_run: bool,
    /// Delete the version rolled back from once the alias has moved
    pub delete_version: bool,
}

/// Rollback of an already identified function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbackRequest {
    pub function_name: FunctionName,
    pub dry_run: bool,
    pub delete_version: bool,
}

/// Tunables that do not change what a rollback means
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RollbackSettings {
    pub poll: PollPolicy,
    pub strategy: ResolveStrategy,
}

/// What a rollback decided and did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RollbackOutcome {
    pub function_name: String,
    pub current_version: Version,
    pub previous_version: Version,
    pub dry_run: bool,
    /// Set when the rolled-back-from version was deleted
    pub deleted_version: Option<Version>,
}

impl RollbackOutcome {
    pub fn label(&self) -> &'static str {
        if self.dry_run {
            DRY_RUN_LABEL
        } else {
            ""
        }
    }
}

impl std::fmt::Display for RollbackOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "rolling back function {} from version {} to {}",
            self.function_name, self.current_version, self.previous_version
        )?;
        if self.dry_run {
            write!(f, " {}", DRY_RUN_LABEL)?;
        }
        Ok(())
    }
}

/// Load the function definition and roll its current alias back.
///
/// # Errors
///
/// `ConfigLoad` if the definition cannot be loaded, otherwise whatever
/// [`rollback_function`] reports.
pub fn rollback(
    options: &RollbackOptions,
    loader: &dyn FunctionLoader,
    store: &dyn VersionStore,
    repointer: &dyn AliasRepointer,
    ctx: &CallContext,
    settings: &RollbackSettings,
) -> Result<RollbackOutcome, RollbackError> {
    let started = Instant::now();
    log_op_start!(
        "rollback",
        request_id = %ctx.request_id,
        function_file = %options.function_file.display(),
        dry_run = options.dry_run
    );

    let result = loader
        .load_function(&options.function_file)
        .map_err(|e| RollbackError::ConfigLoad {
            path: options.function_file.display().to_string(),
            message: e.to_string(),
        })
        .and_then(|definition| {
            let request = RollbackRequest {
                function_name: definition.function_name,
                dry_run: options.dry_run,
                delete_version: options.delete_version,
            };
            rollback_function(&request, store, repointer, ctx, settings)
        });

    let duration_ms = started.elapsed().as_millis() as u64;
    match &result {
        Ok(outcome) => {
            log_op_end!(
                "rollback",
                duration_ms = duration_ms,
                request_id = %ctx.request_id,
                function_name = outcome.function_name.as_str()
            );
        }
        Err(err) => {
            log_op_error!(
                "rollback",
                err.clone(),
                duration_ms = duration_ms,
                request_id = %ctx.request_id
            );
        }
    }
    result
}

/// Roll `request.function_name`'s current alias back one existing version.
///
/// The transition is logged before any mutation. Dry runs stop there.
///
/// # Errors
///
/// `AliasRead`, `VersionParse`, `NoPreviousVersion`, `VersionLookup`,
/// `AliasUpdate`, or any deletion guard error when `delete_version` is set.
pub fn rollback_function(
    request: &RollbackRequest,
    store: &dyn VersionStore,
    repointer: &dyn AliasRepointer,
    ctx: &CallContext,
    settings: &RollbackSettings,
) -> Result<RollbackOutcome, RollbackError> {
    let function = &request.function_name;
    tracing::info!(function_name = function.as_str(), "starting rollback function");

    let aliased = store
        .get_alias_target(ctx, function, CURRENT_ALIAS_NAME)
        .map_err(|source| RollbackError::AliasRead {
            function_name: function.to_string(),
            alias: CURRENT_ALIAS_NAME.to_string(),
            source,
        })?;

    let current = Version::parse(&aliased).map_err(|source| RollbackError::VersionParse {
        value: aliased.clone(),
        source,
    })?;

    let previous = resolve_previous_version(store, ctx, function, current, settings.strategy)?;

    let mut outcome = RollbackOutcome {
        function_name: function.to_string(),
        current_version: current,
        previous_version: previous,
        dry_run: request.dry_run,
        deleted_version: None,
    };

    tracing::info!(
        function_name = function.as_str(),
        event = EVENT_TRANSITION,
        current_version = %current,
        previous_version = %previous,
        dry_run = request.dry_run,
        "{}",
        outcome
    );
    if request.dry_run {
        return Ok(outcome);
    }

    repointer
        .repoint_alias(ctx, function, CURRENT_ALIAS_NAME, previous)
        .map_err(|source| RollbackError::AliasUpdate {
            function_name: function.to_string(),
            alias: CURRENT_ALIAS_NAME.to_string(),
            version: previous,
            source,
        })?;

    if !request.delete_version {
        return Ok(outcome);
    }

    ensure_deleted(store, ctx, function, current, &settings.poll)?;
    outcome.deleted_version = Some(current);
    Ok(outcome)
}
