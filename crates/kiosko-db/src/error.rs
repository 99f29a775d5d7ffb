//! # Store Error Types
//!
//! Two layers: [`DbError`] says what went wrong in SQLite, [`StoreError`] is
//! what every service call returns and what the UI branches on.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  sqlx::Error ──► DbError ───────┐                                      │
//! │                                 ├──► StoreError ──► ErrorKind (UI)     │
//! │  kiosko_core::CoreError ────────┘                                      │
//! │                                                                         │
//! │  StoreError has exactly four kinds:                                    │
//! │    Validation         field, cost/price, variant, in-use               │
//! │    InsufficientStock  quantity above product/variant stock             │
//! │    NotFound           unknown id                                       │
//! │    Transient          pool, timeout, I/O: may succeed on retry         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use kiosko_core::{CoreError, ValidationError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// DbError
// =============================================================================

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Component referencing a missing product or material
    /// - Deleting a material that components still use
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// CHECK constraint violation (negative stock, cost >= price...).
    #[error("Constraint violation: {message}")]
    CheckViolation { message: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// The operation did not finish within the configured timeout.
    #[error("Operation timed out after {0} ms")]
    Timeout(u64),

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Whether retrying the same operation may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DbError::ConnectionFailed(_)
                | DbError::PoolExhausted
                | DbError::Timeout(_)
                | DbError::Internal(_)
        )
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → constraint kind from the SQLite message
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// sqlx::Error::Io             → DbError::ConnectionFailed
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite messages:
                // "UNIQUE constraint failed: <table>.<column>"
                // "FOREIGN KEY constraint failed"
                // "CHECK constraint failed: <expr>"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("CHECK constraint failed") {
                    DbError::CheckViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("database is locked") || msg.contains("database is busy") {
                    DbError::ConnectionFailed(msg.to_string())
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::Io(e) => DbError::ConnectionFailed(e.to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// StoreError
// =============================================================================

/// Error returned by every [`crate::service`] operation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("insufficient stock for {item}: {available} available, {requested} requested")]
    InsufficientStock {
        item: String,
        available: i64,
        requested: i64,
    },

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Storage failed in a way that may succeed on retry. Nothing was written.
    #[error("temporarily unavailable: {0}")]
    Transient(String),
}

/// Serializable error kind for the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    ValidationError,
    InsufficientStock,
    NotFound,
    Transient,
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Validation(_) => ErrorKind::ValidationError,
            StoreError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            StoreError::NotFound { .. } => ErrorKind::NotFound,
            StoreError::Transient(_) => ErrorKind::Transient,
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Transient(_))
    }
}

impl From<CoreError> for StoreError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => StoreError::Validation(e),
            CoreError::InsufficientStock {
                item,
                available,
                requested,
            } => StoreError::InsufficientStock {
                item,
                available,
                requested,
            },
            CoreError::NotFound { entity, id } => StoreError::NotFound { entity, id },
            CoreError::PendingSaleFull { max } => StoreError::Validation(
                ValidationError::InvalidFormat {
                    field: "lines".to_string(),
                    reason: format!("at most {} lines per sale", max),
                },
            ),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => StoreError::NotFound { entity, id },
            DbError::UniqueViolation { field, .. } => {
                StoreError::Validation(ValidationError::InvalidFormat {
                    field,
                    reason: "already exists".to_string(),
                })
            }
            DbError::ForeignKeyViolation { message } | DbError::CheckViolation { message } => {
                StoreError::Validation(ValidationError::InvalidFormat {
                    field: "record".to_string(),
                    reason: message,
                })
            }
            DbError::QueryFailed(msg) | DbError::MigrationFailed(msg) => StoreError::Transient(msg),
            other => StoreError::Transient(other.to_string()),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        DbError::from(err).into()
    }
}

/// Result type for service operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// ConfigError
// =============================================================================

/// Invalid environment configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

// =============================================================================
// Unit Tests
// =============================================================================
