//! Database diagnostic probe
//!
//! Reports whether an optional database backend can be resolved and listed,
//! plus whether the database environment variables are present. The probe
//! never fails: every outcome, including errors, is part of the report.
//!
//! ## Outcomes
//! - resolver reports the backend as absent → [`DatabaseStatus::ModuleAbsent`]
//! - resolver returns the uninitialized handle → [`DatabaseStatus::Uninitialized`]
//! - collections listed → [`DatabaseStatus::Connected`]
//! - listing failed → [`DatabaseStatus::ConnectedWithError`]
//! - resolver failed otherwise → [`DatabaseStatus::Error`]

use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Environment variable holding the connection string
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
/// Environment variable holding the database name
pub const DATABASE_NAME_VAR: &str = "DATABASE_NAME";

/// Error raised by a database backend
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct DatabaseError(pub String);

/// Why a database handle could not be resolved
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// No database backend is part of this deployment
    #[error("database backend not installed")]
    ModuleAbsent,
    /// Resolution failed for any other reason
    #[error("{0}")]
    Other(String),
}

/// A live database connection
pub trait Database: Send + Sync {
    /// Names of the collections (or tables), in the order the backend returns them
    fn list_collection_names(&self) -> Result<Vec<String>, DatabaseError>;
}

/// Result of resolving the database
#[derive(Clone)]
pub enum DatabaseHandle {
    /// Backend exists but has not been initialized
    Uninitialized,
    /// Backend ready for queries
    Ready(Arc<dyn Database>),
}

impl std::fmt::Debug for DatabaseHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseHandle::Uninitialized => f.write_str("Uninitialized"),
            DatabaseHandle::Ready(_) => f.write_str("Ready(..)"),
        }
    }
}

/// Best-effort lookup of the database handle
pub trait DatabaseResolver: Send + Sync {
    fn resolve(&self) -> Result<DatabaseHandle, ResolveError>;
}

/// Resolver for deployments without a database backend
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDatabase;

impl DatabaseResolver for NoDatabase {
    fn resolve(&self) -> Result<DatabaseHandle, ResolveError> {
        Err(ResolveError::ModuleAbsent)
    }
}

/// Source of environment variables
pub trait EnvSource: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Set and non-empty
    fn is_set(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_empty())
    }
}

/// The process environment, read on every call
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var_os(key).map(|v| v.to_string_lossy().into_owned())
    }
}

impl EnvSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// Display limits applied to the report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeLimits {
    /// Maximum number of collection names reported
    pub max_collections: usize,
    /// Maximum number of characters kept from an error message
    pub max_error_chars: usize,
}

impl Default for ProbeLimits {
    fn default() -> Self {
        Self {
            max_collections: 10,
            max_error_chars: 50,
        }
    }
}

/// Classified database state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseStatus {
    NotAvailable,
    Uninitialized,
    Connected,
    /// Handle resolved, listing failed (truncated message)
    ConnectedWithError(String),
    ModuleAbsent,
    /// Resolution failed (truncated message)
    Error(String),
}

impl DatabaseStatus {
    /// Whether a handle was obtained
    pub fn is_connected(&self) -> bool {
        matches!(self, DatabaseStatus::Connected | DatabaseStatus::ConnectedWithError(_))
    }
}

impl std::fmt::Display for DatabaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseStatus::NotAvailable => f.write_str("❌ Not Available"),
            DatabaseStatus::Uninitialized => f.write_str("⚠️  Available but not initialized"),
            DatabaseStatus::Connected => f.write_str("✅ Connected & Working"),
            DatabaseStatus::ConnectedWithError(msg) => {
                write!(f, "⚠️  Connected but Error: {}", msg)
            }
            DatabaseStatus::ModuleAbsent => {
                f.write_str("❌ Database module not found (run enable-database first)")
            }
            DatabaseStatus::Error(msg) => write!(f, "❌ Error: {}", msg),
        }
    }
}

impl Serialize for DatabaseStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Response body of `/test`
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticReport {
    pub backend: &'static str,
    pub database: DatabaseStatus,
    pub database_url: bool,
    pub database_name: bool,
    pub connection_status: &'static str,
    pub collections: Vec<String>,
}

/// Read-only database self-check
#[derive(Clone)]
pub struct Probe {
    resolver: Arc<dyn DatabaseResolver>,
    env: Arc<dyn EnvSource>,
    limits: ProbeLimits,
}

impl Probe {
    pub fn new(resolver: Arc<dyn DatabaseResolver>, env: Arc<dyn EnvSource>) -> Self {
        Self {
            resolver,
            env,
            limits: ProbeLimits::default(),
        }
    }

    pub fn limits(mut self, limits: ProbeLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Run the check
    pub fn run(&self) -> DiagnosticReport {
        let (database, collections) = self.inspect();
        let connection_status = if database.is_connected() {
            "Connected"
        } else {
            "Not Connected"
        };

        tracing::debug!(%database, collections = collections.len(), "database probe finished");

        DiagnosticReport {
            backend: "✅ Running",
            database,
            database_url: self.env.is_set(DATABASE_URL_VAR),
            database_name: self.env.is_set(DATABASE_NAME_VAR),
            connection_status,
            collections,
        }
    }

    fn inspect(&self) -> (DatabaseStatus, Vec<String>) {
        let db = match self.resolver.resolve() {
            Ok(DatabaseHandle::Ready(db)) => db,
            Ok(DatabaseHandle::Uninitialized) => return (DatabaseStatus::Uninitialized, Vec::new()),
            Err(ResolveError::ModuleAbsent) => return (DatabaseStatus::ModuleAbsent, Vec::new()),
            Err(ResolveError::Other(msg)) => {
                tracing::warn!(error = %msg, "database resolution failed");
                return (DatabaseStatus::Error(self.truncate(&msg)), Vec::new());
            }
        };

        match db.list_collection_names() {
            Ok(mut names) => {
                names.truncate(self.limits.max_collections);
                (DatabaseStatus::Connected, names)
            }
            Err(err) => {
                tracing::warn!(error = %err, "listing collections failed");
                (DatabaseStatus::ConnectedWithError(self.truncate(&err.0)), Vec::new())
            }
        }
    }

    fn truncate(&self, msg: &str) -> String {
        msg.chars().take(self.limits.max_error_chars).collect()
    }
}

impl Default for Probe {
    fn default() -> Self {
        Self::new(Arc::new(NoDatabase), Arc::new(ProcessEnv))
    }
}

impl std::fmt::Debug for Probe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Probe").field("limits", &self.limits).finish_non_exhaustive()
    }
}
