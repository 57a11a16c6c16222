//! Engine-level commands against the local version store.

#![allow(clippy::result_large_err)]

use crate::commands::alias::{set_alias, AliasSetResult};
use crate::commands::publish::{publish, PublishResult};
use crate::commands::versions::{list_versions, VersionListing};
use fnroll_core::errors::ExError;
use fnroll_core::{
    rollback, FunctionLoader, FunctionName, RollbackOptions, RollbackOutcome, RollbackSettings,
    StoreAliasRepointer, Version,
};
use fnroll_core_types::CallContext;
use fnroll_store::errors::Result;
use fnroll_store::SqliteVersionStore;
use std::path::{Path, PathBuf};

/// Engine-level commands that require I/O (definition file, database).
///
/// Every command identifies its function through a definition file.
#[derive(Debug, Clone)]
pub enum EngineCommand {
    /// Roll the current alias back to the previous existing version.
    Rollback {
        options: RollbackOptions,
        settings: RollbackSettings,
    },
    /// List published versions with the current alias marker.
    ListVersions { function_file: PathBuf },
    /// Publish the definition as a new version.
    Publish {
        function_file: PathBuf,
        /// Point the current alias at the new version
        point_alias: bool,
    },
    /// Point an alias at an explicit version.
    SetAlias {
        function_file: PathBuf,
        alias: String,
        version: Version,
    },
}

/// Result of applying an engine command.
#[derive(Debug, Clone)]
pub enum EngineCommandResult {
    Rollback(RollbackOutcome),
    Versions(VersionListing),
    Published(PublishResult),
    AliasSet(AliasSetResult),
}

fn load_name(loader: &dyn FunctionLoader, function_file: &Path) -> Result<FunctionName> {
    Ok(loader.load_function(function_file)?.function_name)
}

/// Apply an engine command against `store`, loading definitions via `loader`.
///
/// # Errors
///
/// Returns the command's failure as an `ExError` tagged with the context's
/// request id; rollback failures keep their `RollbackError` kind and code.
pub fn apply_engine_command(
    cmd: EngineCommand,
    store: &SqliteVersionStore,
    loader: &dyn FunctionLoader,
    ctx: &CallContext,
) -> Result<EngineCommandResult> {
    dispatch(cmd, store, loader, ctx).map_err(|e| e.with_request_id(ctx.request_id.clone()))
}

fn dispatch(
    cmd: EngineCommand,
    store: &SqliteVersionStore,
    loader: &dyn FunctionLoader,
    ctx: &CallContext,
) -> Result<EngineCommandResult> {
    let repointer = StoreAliasRepointer::new(store);
    match cmd {
        EngineCommand::Rollback { options, settings } => {
            rollback(&options, loader, store, &repointer, ctx, &settings)
                .map(EngineCommandResult::Rollback)
                .map_err(ExError::from)
        }
        EngineCommand::ListVersions { function_file } => {
            let function = load_name(loader, &function_file)?;
            list_versions(&function, store, ctx).map(EngineCommandResult::Versions)
        }
        EngineCommand::Publish {
            function_file,
            point_alias,
        } => publish(&function_file, point_alias, store, loader, ctx)
            .map(EngineCommandResult::Published),
        EngineCommand::SetAlias {
            function_file,
            alias,
            version,
        } => {
            let function = load_name(loader, &function_file)?;
            set_alias(&function, &alias, version, store, &repointer, ctx)
                .map(EngineCommandResult::AliasSet)
        }
    }
}
