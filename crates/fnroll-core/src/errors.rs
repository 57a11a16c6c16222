use crate::model::Version;
use fnroll_core_types::{Interrupt, RequestId};
use thiserror::Error;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code usable for programmatic handling,
/// test assertions and the CLI's exit message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Input/configuration
    InvalidInput,
    ConfigLoad,
    NotFound,

    // Rollback
    AliasRead,
    VersionParse,
    NoPreviousVersion,
    AliasUpdate,

    // Deletion guard
    DeletionGuardRead,
    DeletionGuardDelete,

    // Store/IO
    Conflict,
    Unsupported,
    Io,
    Serialization,
    Persistence,
    ExternalService,
    Timeout,
    Cancelled,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::ConfigLoad => "ERR_CONFIG_LOAD",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AliasRead => "ERR_ALIAS_READ",
            ExErrorKind::VersionParse => "ERR_VERSION_PARSE",
            ExErrorKind::NoPreviousVersion => "ERR_NO_PREVIOUS_VERSION",
            ExErrorKind::AliasUpdate => "ERR_ALIAS_UPDATE",
            ExErrorKind::DeletionGuardRead => "ERR_DELETION_GUARD_READ",
            ExErrorKind::DeletionGuardDelete => "ERR_DELETION_GUARD_DELETE",
            ExErrorKind::Conflict => "ERR_CONFLICT",
            ExErrorKind::Unsupported => "ERR_UNSUPPORTED",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::ExternalService => "ERR_EXTERNAL_SERVICE",
            ExErrorKind::Timeout => "ERR_TIMEOUT",
            ExErrorKind::Cancelled => "ERR_CANCELLED",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification kind plus the function/version context needed to
/// tell which remote call failed.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    function_name: Option<String>,
    version: Option<String>,
    request_id: Option<RequestId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            function_name: None,
            version: None,
            request_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add function name context
    pub fn with_function_name(mut self, name: impl Into<String>) -> Self {
        self.function_name = Some(name.into());
        self
    }

    /// Add version context (kept as the wire string, it may be malformed)
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn function_name(&self) -> Option<&str> {
        self.function_name.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(function_name) = &self.function_name {
            write!(f, " (function: {})", function_name)?;
        }
        if let Some(version) = &self.version {
            write!(f, " (version: {})", version)?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " (request: {})", request_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Classification of a version store failure
///
/// `NotFound` is the one signal the resolver treats as "try the next
/// candidate"; every other kind is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// The function, version or alias does not exist
    NotFound,
    /// The store refused the mutation in its current state
    Conflict,
    /// The store does not offer this operation
    Unsupported,
    /// The request was malformed for this store
    InvalidInput,
    /// Storage backend failure
    Persistence,
    /// Transport/auth/throttling failure talking to a remote store
    Unavailable,
    Cancelled,
    Timeout,
}

/// Error returned by a [`crate::store::VersionStore`] call
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{op}: {message}")]
pub struct StoreError {
    kind: StoreErrorKind,
    op: String,
    message: String,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, op: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            op: op.into(),
            message: message.into(),
        }
    }

    pub fn not_found(op: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::NotFound, op, message)
    }

    pub fn unsupported(op: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Unsupported, op, "operation not supported by this store")
    }

    /// Map a refused call context into the matching store error
    pub fn interrupted(op: impl Into<String>, reason: Interrupt) -> Self {
        let kind = match reason {
            Interrupt::Cancelled => StoreErrorKind::Cancelled,
            Interrupt::DeadlineExceeded => StoreErrorKind::Timeout,
        };
        Self::new(kind, op, reason.to_string())
    }

    pub fn kind(&self) -> StoreErrorKind {
        self.kind
    }

    pub fn op(&self) -> &str {
        &self.op
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == StoreErrorKind::NotFound
    }
}

impl From<StoreError> for ExError {
    fn from(err: StoreError) -> Self {
        let kind = match err.kind {
            StoreErrorKind::NotFound => ExErrorKind::NotFound,
            StoreErrorKind::Conflict => ExErrorKind::Conflict,
            StoreErrorKind::Unsupported => ExErrorKind::Unsupported,
            StoreErrorKind::InvalidInput => ExErrorKind::InvalidInput,
            StoreErrorKind::Persistence => ExErrorKind::Persistence,
            StoreErrorKind::Unavailable => ExErrorKind::ExternalService,
            StoreErrorKind::Cancelled => ExErrorKind::Cancelled,
            StoreErrorKind::Timeout => ExErrorKind::Timeout,
        };
        ExError::new(kind).with_op(err.op).with_message(err.message)
    }
}

/// Why a string could not be used as a published version
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionParseError {
    #[error("version string is empty")]
    Empty,

    #[error("{value:?} is not a base-10 version number")]
    InvalidDigit { value: String },

    #[error("version 0 is never published")]
    Zero,

    #[error("{value:?} is out of range for a version number")]
    Overflow { value: String },
}

/// Failure taxonomy of a rollback invocation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RollbackError {
    /// The function definition could not be loaded
    #[error("failed to load function from {path}: {message}")]
    ConfigLoad { path: String, message: String },

    /// Reading the alias target failed before any decision was made
    #[error("failed to get alias {alias} of function {function_name}: {source}")]
    AliasRead {
        function_name: String,
        alias: String,
        source: StoreError,
    },

    /// The alias target is not a published version number
    #[error("failed to parse {value:?} as a version: {source}")]
    VersionParse {
        value: String,
        source: VersionParseError,
    },

    /// No existing version below the current one
    #[error("unable to detect previous version of function {function_name} (current version {current})")]
    NoPreviousVersion {
        function_name: String,
        current: Version,
    },

    /// A non-not-found failure while probing candidate versions
    #[error("failed to get function {function_name} version {version}: {source}")]
    VersionLookup {
        function_name: String,
        version: String,
        source: StoreError,
    },

    /// Listing versions failed for a reason other than lack of support
    #[error("failed to list versions of function {function_name}: {source}")]
    VersionList {
        function_name: String,
        source: StoreError,
    },

    /// Moving the alias to the previous version failed
    #[error("failed to update alias {alias} of function {function_name} to version {version}: {source}")]
    AliasUpdate {
        function_name: String,
        alias: String,
        version: Version,
        source: StoreError,
    },

    /// Reading the alias while waiting for detachment failed
    #[error("failed to get alias {alias} of function {function_name} while waiting to delete version {version}: {source}")]
    DeletionGuardRead {
        function_name: String,
        alias: String,
        version: Version,
        source: StoreError,
    },

    /// The delete call failed after detachment was confirmed
    #[error("failed to delete version {version} of function {function_name}: {source}")]
    DeletionGuardDelete {
        function_name: String,
        version: Version,
        source: StoreError,
    },

    /// The alias still referenced the version after the poll budget ran out
    #[error("version {version} of function {function_name} is still aliased after {attempts} checks")]
    DeletionGuardTimeout {
        function_name: String,
        version: Version,
        attempts: u32,
    },

    /// The ambient call context was cancelled or passed its deadline
    #[error("{op} interrupted: {reason}")]
    Interrupted { op: String, reason: Interrupt },
}

impl RollbackError {
    /// True when the function simply has no earlier version to go back to
    pub fn is_no_previous_version(&self) -> bool {
        matches!(self, RollbackError::NoPreviousVersion { .. })
    }
}

/// Conversion from RollbackError to ExError
impl From<RollbackError> for ExError {
    fn from(err: RollbackError) -> Self {
        let message = err.to_string();
        match err {
            RollbackError::ConfigLoad { .. } => ExError::new(ExErrorKind::ConfigLoad)
                .with_op("load_function")
                .with_message(message),

            RollbackError::AliasRead {
                function_name,
                source,
                ..
            } => ExError::new(ExErrorKind::AliasRead)
                .with_op("get_alias")
                .with_function_name(function_name)
                .with_message(message)
                .with_source(source.into()),

            RollbackError::VersionParse { value, .. } => ExError::new(ExErrorKind::VersionParse)
                .with_op("parse_version")
                .with_version(value)
                .with_message(message),

            RollbackError::NoPreviousVersion {
                function_name,
                current,
            } => ExError::new(ExErrorKind::NoPreviousVersion)
                .with_op("resolve_previous_version")
                .with_function_name(function_name)
                .with_version(current.to_string())
                .with_message(message),

            RollbackError::VersionLookup {
                function_name,
                version,
                source,
            } => ExError::new(ExErrorKind::ExternalService)
                .with_op("get_function")
                .with_function_name(function_name)
                .with_version(version)
                .with_message(message)
                .with_source(source.into()),

            RollbackError::VersionList {
                function_name,
                source,
            } => ExError::new(ExErrorKind::ExternalService)
                .with_op("list_versions")
                .with_function_name(function_name)
                .with_message(message)
                .with_source(source.into()),

            RollbackError::AliasUpdate {
                function_name,
                version,
                source,
                ..
            } => ExError::new(ExErrorKind::AliasUpdate)
                .with_op("update_alias")
                .with_function_name(function_name)
                .with_version(version.to_string())
                .with_message(message)
                .with_source(source.into()),

            RollbackError::DeletionGuardRead {
                function_name,
                version,
                source,
                ..
            } => ExError::new(ExErrorKind::DeletionGuardRead)
                .with_op("ensure_deleted")
                .with_function_name(function_name)
                .with_version(version.to_string())
                .with_message(message)
                .with_source(source.into()),

            RollbackError::DeletionGuardDelete {
                function_name,
                version,
                source,
            } => ExError::new(ExErrorKind::DeletionGuardDelete)
                .with_op("delete_function_version")
                .with_function_name(function_name)
                .with_version(version.to_string())
                .with_message(message)
                .with_source(source.into()),

            RollbackError::DeletionGuardTimeout {
                function_name,
                version,
                ..
            } => ExError::new(ExErrorKind::Timeout)
                .with_op("ensure_deleted")
                .with_function_name(function_name)
                .with_version(version.to_string())
                .with_message(message),

            RollbackError::Interrupted { op, reason } => {
                let kind = match reason {
                    Interrupt::Cancelled => ExErrorKind::Cancelled,
                    Interrupt::DeadlineExceeded => ExErrorKind::Timeout,
                };
                ExError::new(kind).with_op(op).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to ExError
impl From<serde_json::Error> for ExError {
    fn from(err: serde_json::Error) -> Self {
        ExError::new(ExErrorKind::Serialization).with_message(err.to_string())
    }
}
