//! In-memory version store fake shared by the core integration tests

#![allow(dead_code)]

use fnroll_core::errors::{ExError, ExErrorKind, StoreError, StoreErrorKind};
use fnroll_core::{FunctionDefinition, FunctionLoader, FunctionName, FunctionVersion, VersionStore};
use fnroll_core_types::CallContext;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

/// One recorded store call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetAlias,
    GetVersion(String),
    UpdateAlias(String),
    Delete(String),
    List,
}

/// Which store call a scripted failure applies to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FailOn {
    GetVersion(String),
    /// The n-th alias read (1-based) and every later one
    GetAliasFrom(usize),
    UpdateAlias,
    Delete,
    List,
}

pub struct FakeVersionStore {
    function: String,
    versions: RefCell<BTreeSet<u64>>,
    alias: RefCell<String>,
    alias_lag: Cell<u32>,
    stale_reads_left: Cell<u32>,
    stale_target: RefCell<Option<String>>,
    listing: Cell<bool>,
    failures: RefCell<HashMap<FailOn, StoreError>>,
    calls: RefCell<Vec<Call>>,
}

impl FakeVersionStore {
    pub fn new(function: &str, alias: &str, versions: &[u64]) -> Self {
        Self {
            function: function.to_string(),
            versions: RefCell::new(versions.iter().copied().collect()),
            alias: RefCell::new(alias.to_string()),
            alias_lag: Cell::new(0),
            stale_reads_left: Cell::new(0),
            stale_target: RefCell::new(None),
            listing: Cell::new(false),
            failures: RefCell::new(HashMap::new()),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// After an alias update, the next `reads` alias reads still see the old target
    pub fn with_alias_lag(self, reads: u32) -> Self {
        self.alias_lag.set(reads);
        self
    }

    pub fn with_listing(self) -> Self {
        self.listing.set(true);
        self
    }

    pub fn fail(self, on: FailOn, kind: StoreErrorKind, message: &str) -> Self {
        self.failures
            .borrow_mut()
            .insert(on, StoreError::new(kind, "fake", message));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    pub fn alias(&self) -> String {
        self.alias.borrow().clone()
    }

    pub fn versions(&self) -> Vec<u64> {
        self.versions.borrow().iter().copied().collect()
    }

    /// Every version number passed to `get_function_version`
    pub fn probed(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::GetVersion(q) => Some(q.clone()),
                _ => None,
            })
            .collect()
    }

    fn scripted(&self, on: &FailOn) -> Option<StoreError> {
        self.failures.borrow().get(on).cloned()
    }

    fn check(&self, ctx: &CallContext, op: &str, function: &FunctionName) -> Result<(), StoreError> {
        ctx.check().map_err(|r| StoreError::interrupted(op, r))?;
        if function.as_str() != self.function {
            return Err(StoreError::not_found(op, "function not found"));
        }
        Ok(())
    }
}

impl VersionStore for FakeVersionStore {
    fn get_alias_target(
        &self,
        ctx: &CallContext,
        function: &FunctionName,
        _alias: &str,
    ) -> Result<String, StoreError> {
        self.calls.borrow_mut().push(Call::GetAlias);
        self.check(ctx, "get_alias", function)?;
        let reads = self.count(|c| *c == Call::GetAlias);
        let failing = self
            .failures
            .borrow()
            .iter()
            .find_map(|(on, err)| match on {
                FailOn::GetAliasFrom(n) if reads >= *n => Some(err.clone()),
                _ => None,
            });
        if let Some(err) = failing {
            return Err(err);
        }
        if self.stale_reads_left.get() > 0 {
            self.stale_reads_left.set(self.stale_reads_left.get() - 1);
            if let Some(stale) = self.stale_target.borrow().clone() {
                return Ok(stale);
            }
        }
        Ok(self.alias.borrow().clone())
    }

    fn get_function_version(
        &self,
        ctx: &CallContext,
        function: &FunctionName,
        qualifier: &str,
    ) -> Result<FunctionVersion, StoreError> {
        self.calls
            .borrow_mut()
            .push(Call::GetVersion(qualifier.to_string()));
        self.check(ctx, "get_function", function)?;
        if let Some(err) = self.scripted(&FailOn::GetVersion(qualifier.to_string())) {
            return Err(err);
        }
        let n: u64 = qualifier
            .parse()
            .map_err(|_| StoreError::new(StoreErrorKind::InvalidInput, "get_function", "bad qualifier"))?;
        if !self.versions.borrow().contains(&n) {
            return Err(StoreError::not_found("get_function", "version not found"));
        }
        Ok(FunctionVersion {
            function_name: self.function.clone(),
            version: qualifier.to_string(),
            description: None,
            runtime: None,
            code_sha256: None,
            last_modified: None,
        })
    }

    fn update_alias_target(
        &self,
        ctx: &CallContext,
        function: &FunctionName,
        _alias: &str,
        qualifier: &str,
    ) -> Result<(), StoreError> {
        self.calls
            .borrow_mut()
            .push(Call::UpdateAlias(qualifier.to_string()));
        self.check(ctx, "update_alias", function)?;
        if let Some(err) = self.scripted(&FailOn::UpdateAlias) {
            return Err(err);
        }
        let old = self.alias.replace(qualifier.to_string());
        if self.alias_lag.get() > 0 {
            *self.stale_target.borrow_mut() = Some(old);
            self.stale_reads_left.set(self.alias_lag.get());
        }
        Ok(())
    }

    fn delete_function_version(
        &self,
        ctx: &CallContext,
        function: &FunctionName,
        qualifier: &str,
    ) -> Result<(), StoreError> {
        self.calls
            .borrow_mut()
            .push(Call::Delete(qualifier.to_string()));
        self.check(ctx, "delete_function", function)?;
        if let Some(err) = self.scripted(&FailOn::Delete) {
            return Err(err);
        }
        if *self.alias.borrow() == qualifier {
            return Err(StoreError::new(
                StoreErrorKind::Conflict,
                "delete_function",
                "version is referenced by an alias",
            ));
        }
        let n: u64 = qualifier
            .parse()
            .map_err(|_| StoreError::new(StoreErrorKind::InvalidInput, "delete_function", "bad qualifier"))?;
        if !self.versions.borrow_mut().remove(&n) {
            return Err(StoreError::not_found("delete_function", "version not found"));
        }
        Ok(())
    }

    fn list_versions(
        &self,
        ctx: &CallContext,
        function: &FunctionName,
    ) -> Result<Vec<String>, StoreError> {
        self.calls.borrow_mut().push(Call::List);
        self.check(ctx, "list_versions", function)?;
        if !self.listing.get() {
            return Err(StoreError::unsupported("list_versions"));
        }
        if let Some(err) = self.scripted(&FailOn::List) {
            return Err(err);
        }
        let mut listed = vec!["$LATEST".to_string()];
        listed.extend(self.versions.borrow().iter().map(|v| v.to_string()));
        Ok(listed)
    }
}

/// Loader returning a fixed definition regardless of path
pub struct StaticLoader(pub Option<FunctionDefinition>);

impl StaticLoader {
    pub fn named(name: &str) -> Self {
        Self(Some(FunctionDefinition {
            function_name: FunctionName::new(name).unwrap(),
            description: None,
            runtime: None,
            handler: None,
            role: None,
            memory_size: None,
            timeout: None,
            extra: BTreeMap::new(),
        }))
    }

    pub fn failing() -> Self {
        Self(None)
    }
}

impl FunctionLoader for StaticLoader {
    fn load_function(&self, path: &Path) -> Result<FunctionDefinition, ExError> {
        self.0.clone().ok_or_else(|| {
            ExError::new(ExErrorKind::Io)
                .with_op("load_function")
                .with_message(format!("cannot read {}", path.display()))
        })
    }
}

pub fn name(s: &str) -> FunctionName {
    FunctionName::new(s).unwrap()
}
