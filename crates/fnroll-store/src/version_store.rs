//! SQLite-backed version store
//!
//! A local stand-in for the remote versioned-function service: versions are
//! allocated monotonically per function and never reused, aliases point at
//! exactly one existing version, and a version referenced by an alias cannot
//! be deleted.
//!
//! `with_alias_lag` makes alias reads return the previous target for a few
//! reads after each update, reproducing the propagation delay of the remote
//! service.

#![allow(clippy::result_large_err)]

use crate::db;
use crate::errors::{from_rusqlite, store_persistence, Result};
use crate::migrations::apply_migrations;
use chrono::{TimeZone, Utc};
use fnroll_core::errors::{ExError, ExErrorKind, StoreError, StoreErrorKind};
use fnroll_core::{FunctionDefinition, FunctionName, FunctionVersion, Version, VersionStore};
use fnroll_core_types::CallContext;
use rusqlite::{Connection, OptionalExtension};
use std::cell::RefCell;
use std::path::Path;

struct LaggingAlias {
    function: String,
    alias: String,
    stale_target: String,
    reads_left: u32,
}

/// Version store persisted in a SQLite database
pub struct SqliteVersionStore {
    conn: Connection,
    alias_lag_reads: u32,
    lagging: RefCell<Option<LaggingAlias>>,
}

impl SqliteVersionStore {
    /// Open (creating if needed) and migrate the database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_connection(db::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(db::open_in_memory()?)
    }

    /// Configure and migrate an existing connection
    pub fn from_connection(mut conn: Connection) -> Result<Self> {
        db::configure(&conn)?;
        apply_migrations(&mut conn)?;
        Ok(Self {
            conn,
            alias_lag_reads: 0,
            lagging: RefCell::new(None),
        })
    }

    /// Serve the previous alias target for `reads` reads after each update
    pub fn with_alias_lag(mut self, reads: u32) -> Self {
        self.alias_lag_reads = reads;
        self
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Publish a new version of `definition`'s function.
    ///
    /// The function is registered on first publish. The new version number
    /// is one above the highest ever allocated, even if that one was deleted.
    pub fn publish_version(
        &self,
        definition: &FunctionDefinition,
        code_sha256: Option<&str>,
    ) -> Result<FunctionVersion> {
        let name = definition.function_name.as_str();
        let now = Utc::now();
        let definition_json = serde_json::to_string(definition)?;

        let tx = self.conn.unchecked_transaction().map_err(from_rusqlite)?;
        tx.execute(
            "INSERT OR IGNORE INTO functions (name, next_version, created_at) VALUES (?1, 1, ?2)",
            rusqlite::params![name, now.timestamp_millis()],
        )
        .map_err(from_rusqlite)?;
        let version: i64 = tx
            .query_row(
                "SELECT next_version FROM functions WHERE name = ?1",
                [name],
                |row| row.get(0),
            )
            .map_err(from_rusqlite)?;
        tx.execute(
            "INSERT INTO function_versions
                (function_name, version, description, runtime, code_sha256, definition_json, published_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                name,
                version,
                definition.description,
                definition.runtime,
                code_sha256,
                definition_json,
                now.timestamp_millis()
            ],
        )
        .map_err(from_rusqlite)?;
        tx.execute(
            "UPDATE functions SET next_version = next_version + 1 WHERE name = ?1",
            [name],
        )
        .map_err(from_rusqlite)?;
        tx.commit().map_err(from_rusqlite)?;

        tracing::info!(function_name = name, version, "published function version");
        Ok(FunctionVersion {
            function_name: name.to_string(),
            version: version.to_string(),
            description: definition.description.clone(),
            runtime: definition.runtime.clone(),
            code_sha256: code_sha256.map(str::to_string),
            last_modified: Utc.timestamp_millis_opt(now.timestamp_millis()).single(),
        })
    }

    /// Stored definition of one version, as published
    pub fn load_definition(
        &self,
        function: &FunctionName,
        version: Version,
    ) -> Result<FunctionDefinition> {
        let json: String = self
            .conn
            .query_row(
                "SELECT definition_json FROM function_versions WHERE function_name = ?1 AND version = ?2",
                rusqlite::params![function.as_str(), version.get() as i64],
                |row| row.get(0),
            )
            .optional()
            .map_err(from_rusqlite)?
            .ok_or_else(|| {
                ExError::new(ExErrorKind::NotFound)
                    .with_op("load_definition")
                    .with_function_name(function.as_str())
                    .with_version(version.to_string())
                    .with_message("version not found")
            })?;
        Ok(serde_json::from_str(&json)?)
    }

    fn stale_alias(&self, function: &str, alias: &str) -> Option<String> {
        let mut lagging = self.lagging.borrow_mut();
        let entry = lagging.as_mut()?;
        if entry.function != function || entry.alias != alias || entry.reads_left == 0 {
            return None;
        }
        entry.reads_left -= 1;
        Some(entry.stale_target.clone())
    }
}

fn check(ctx: &CallContext, op: &str) -> std::result::Result<(), StoreError> {
    ctx.check().map_err(|reason| StoreError::interrupted(op, reason))
}

fn parse_qualifier(op: &str, qualifier: &str) -> std::result::Result<i64, StoreError> {
    Version::parse(qualifier)
        .ok()
        .and_then(|v| i64::try_from(v.get()).ok())
        .ok_or_else(|| {
            StoreError::new(
                StoreErrorKind::InvalidInput,
                op,
                format!("unsupported qualifier {:?}", qualifier),
            )
        })
}

impl VersionStore for SqliteVersionStore {
    fn get_alias_target(
        &self,
        ctx: &CallContext,
        function: &FunctionName,
        alias: &str,
    ) -> std::result::Result<String, StoreError> {
        const OP: &str = "get_alias";
        check(ctx, OP)?;
        if let Some(stale) = self.stale_alias(function.as_str(), alias) {
            return Ok(stale);
        }
        let version: Option<i64> = self
            .conn
            .query_row(
                "SELECT version FROM aliases WHERE function_name = ?1 AND name = ?2",
                rusqlite::params![function.as_str(), alias],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| store_persistence(OP, e))?;
        version.map(|v| v.to_string()).ok_or_else(|| {
            StoreError::not_found(
                OP,
                format!("alias {} of function {} not found", alias, function),
            )
        })
    }

    fn get_function_version(
        &self,
        ctx: &CallContext,
        function: &FunctionName,
        qualifier: &str,
    ) -> std::result::Result<FunctionVersion, StoreError> {
        const OP: &str = "get_function";
        check(ctx, OP)?;
        let version = parse_qualifier(OP, qualifier)?;
        let row = self
            .conn
            .query_row(
                "SELECT description, runtime, code_sha256, published_at
                 FROM function_versions WHERE function_name = ?1 AND version = ?2",
                rusqlite::params![function.as_str(), version],
                |row| {
                    Ok((
                        row.get::<_, Option<String>>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                },
            )
            .optional()
            .map_err(|e| store_persistence(OP, e))?;
        let (description, runtime, code_sha256, published_at) = row.ok_or_else(|| {
            StoreError::not_found(
                OP,
                format!("function {} version {} not found", function, qualifier),
            )
        })?;
        Ok(FunctionVersion {
            function_name: function.to_string(),
            version: version.to_string(),
            description,
            runtime,
            code_sha256,
            last_modified: Utc.timestamp_millis_opt(published_at).single(),
        })
    }

    fn update_alias_target(
        &self,
        ctx: &CallContext,
        function: &FunctionName,
        alias: &str,
        qualifier: &str,
    ) -> std::result::Result<(), StoreError> {
        const OP: &str = "update_alias";
        check(ctx, OP)?;
        let version = parse_qualifier(OP, qualifier)?;

        let exists = self
            .conn
            .query_row(
                "SELECT 1 FROM function_versions WHERE function_name = ?1 AND version = ?2",
                rusqlite::params![function.as_str(), version],
                |_| Ok(()),
            )
            .optional()
            .map_err(|e| store_persistence(OP, e))?
            .is_some();
        if !exists {
            return Err(StoreError::not_found(
                OP,
                format!("function {} version {} not found", function, qualifier),
            ));
        }

        let previous: Option<i64> = self
            .conn
            .query_row(
                "SELECT version FROM aliases WHERE function_name = ?1 AND name = ?2",
                rusqlite::params![function.as_str(), alias],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| store_persistence(OP, e))?;

        self.conn
            .execute(
                "INSERT INTO aliases (function_name, name, version, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(function_name, name)
                 DO UPDATE SET version = excluded.version, updated_at = excluded.updated_at",
                rusqlite::params![
                    function.as_str(),
                    alias,
                    version,
                    Utc::now().timestamp_millis()
                ],
            )
            .map_err(|e| store_persistence(OP, e))?;

        if let (Some(previous), true) = (previous, self.alias_lag_reads > 0) {
            *self.lagging.borrow_mut() = Some(LaggingAlias {
                function: function.to_string(),
                alias: alias.to_string(),
                stale_target: previous.to_string(),
                reads_left: self.alias_lag_reads,
            });
        }
        Ok(())
    }

    fn delete_function_version(
        &self,
        ctx: &CallContext,
        function: &FunctionName,
        qualifier: &str,
    ) -> std::result::Result<(), StoreError> {
        const OP: &str = "delete_function";
        check(ctx, OP)?;
        let version = parse_qualifier(OP, qualifier)?;

        let referenced_by: Option<String> = self
            .conn
            .query_row(
                "SELECT name FROM aliases WHERE function_name = ?1 AND version = ?2 LIMIT 1",
                rusqlite::params![function.as_str(), version],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| store_persistence(OP, e))?;
        if let Some(alias) = referenced_by {
            return Err(StoreError::new(
                StoreErrorKind::Conflict,
                OP,
                format!(
                    "version {} of function {} is referenced by alias {}",
                    qualifier, function, alias
                ),
            ));
        }

        let deleted = self
            .conn
            .execute(
                "DELETE FROM function_versions WHERE function_name = ?1 AND version = ?2",
                rusqlite::params![function.as_str(), version],
            )
            .map_err(|e| store_persistence(OP, e))?;
        if deleted == 0 {
            return Err(StoreError::not_found(
                OP,
                format!("function {} version {} not found", function, qualifier),
            ));
        }
        Ok(())
    }

    fn list_versions(
        &self,
        ctx: &CallContext,
        function: &FunctionName,
    ) -> std::result::Result<Vec<String>, StoreError> {
        const OP: &str = "list_versions";
        check(ctx, OP)?;
        let mut stmt = self
            .conn
            .prepare(
                "SELECT version FROM function_versions WHERE function_name = ?1 ORDER BY version",
            )
            .map_err(|e| store_persistence(OP, e))?;
        let versions = stmt
            .query_map([function.as_str()], |row| row.get::<_, i64>(0))
            .map_err(|e| store_persistence(OP, e))?
            .map(|r| r.map(|v| v.to_string()))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| store_persistence(OP, e))?;
        Ok(versions)
    }
}
