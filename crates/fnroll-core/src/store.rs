//! Version store and alias repointer interfaces
//!
//! The rollback core talks to the versioned-function store only through
//! these traits, so it runs unchanged against the local SQLite store, a
//! remote provider client, or a test fake.

use crate::errors::StoreError;
use crate::model::{FunctionName, FunctionVersion, Version};
use fnroll_core_types::CallContext;

/// Name of the alias that tracks the deployed version
pub const CURRENT_ALIAS_NAME: &str = "current";

/// Versioned-function store
///
/// Versions and qualifiers are exchanged in their decimal wire form. A
/// version is either present with full metadata or absent; absence is
/// reported as a `StoreErrorKind::NotFound` error.
pub trait VersionStore {
    /// Read the version an alias points to.
    ///
    /// # Errors
    ///
    /// `NotFound` if the function or alias does not exist; any other kind
    /// for transport or backend failures.
    fn get_alias_target(
        &self,
        ctx: &CallContext,
        function: &FunctionName,
        alias: &str,
    ) -> Result<String, StoreError>;

    /// Fetch metadata for one exact version.
    ///
    /// # Errors
    ///
    /// `NotFound` when no such version exists.
    fn get_function_version(
        &self,
        ctx: &CallContext,
        function: &FunctionName,
        qualifier: &str,
    ) -> Result<FunctionVersion, StoreError>;

    /// Atomically point an alias at a version.
    ///
    /// # Errors
    ///
    /// `NotFound` if the function or target version does not exist.
    fn update_alias_target(
        &self,
        ctx: &CallContext,
        function: &FunctionName,
        alias: &str,
        qualifier: &str,
    ) -> Result<(), StoreError>;

    /// Delete one published version.
    ///
    /// # Errors
    ///
    /// `Conflict` if an alias still references the version.
    fn delete_function_version(
        &self,
        ctx: &CallContext,
        function: &FunctionName,
        qualifier: &str,
    ) -> Result<(), StoreError>;

    /// List published versions in any order.
    ///
    /// # Errors
    ///
    /// `Unsupported` unless the store offers a listing endpoint.
    fn list_versions(
        &self,
        _ctx: &CallContext,
        _function: &FunctionName,
    ) -> Result<Vec<String>, StoreError> {
        Err(StoreError::unsupported("list_versions"))
    }
}

impl<S: VersionStore + ?Sized> VersionStore for &S {
    fn get_alias_target(
        &self,
        ctx: &CallContext,
        function: &FunctionName,
        alias: &str,
    ) -> Result<String, StoreError> {
        (**self).get_alias_target(ctx, function, alias)
    }

    fn get_function_version(
        &self,
        ctx: &CallContext,
        function: &FunctionName,
        qualifier: &str,
    ) -> Result<FunctionVersion, StoreError> {
        (**self).get_function_version(ctx, function, qualifier)
    }

    fn update_alias_target(
        &self,
        ctx: &CallContext,
        function: &FunctionName,
        alias: &str,
        qualifier: &str,
    ) -> Result<(), StoreError> {
        (**self).update_alias_target(ctx, function, alias, qualifier)
    }

    fn delete_function_version(
        &self,
        ctx: &CallContext,
        function: &FunctionName,
        qualifier: &str,
    ) -> Result<(), StoreError> {
        (**self).delete_function_version(ctx, function, qualifier)
    }

    fn list_versions(
        &self,
        ctx: &CallContext,
        function: &FunctionName,
    ) -> Result<Vec<String>, StoreError> {
        (**self).list_versions(ctx, function)
    }
}

/// Moves an alias to a new target version
///
/// Rollback uses it for its single repoint; the same capability serves the
/// general "set alias" flow.
pub trait AliasRepointer {
    /// # Errors
    ///
    /// Propagates the store's failure unchanged.
    fn repoint_alias(
        &self,
        ctx: &CallContext,
        function: &FunctionName,
        alias: &str,
        version: Version,
    ) -> Result<(), StoreError>;
}

/// Repointer that issues a plain alias update against a store
pub struct StoreAliasRepointer<'a> {
    store: &'a dyn VersionStore,
}

impl<'a> StoreAliasRepointer<'a> {
    pub fn new(store: &'a dyn VersionStore) -> Self {
        Self { store }
    }
}

impl AliasRepointer for StoreAliasRepointer<'_> {
    fn repoint_alias(
        &self,
        ctx: &CallContext,
        function: &FunctionName,
        alias: &str,
        version: Version,
    ) -> Result<(), StoreError> {
        tracing::info!(
            function_name = function.as_str(),
            alias,
            version = %version,
            "updating alias"
        );
        self.store
            .update_alias_target(ctx, function, alias, &version.to_string())
    }
}
