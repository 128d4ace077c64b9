//! # Storage Error Types
//!
//! Error types shared by both storage backends.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite error (sqlx::Error)      KV error (io / serde_json)           │
//! │       │                               │                                 │
//! │       └───────────────┬───────────────┘                                 │
//! │                       ▼                                                 │
//! │  StoreError (this module) ← Adds context and categorization            │
//! │                       │                                                 │
//! │                       ▼                                                 │
//! │  EngineError (factura-engine) ← What callers see                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both backends surface the same integrity guards (`Finalized`, `Converted`,
//! `InvalidState`, `UniqueViolation`), so the engine behaves identically no
//! matter which one it runs on.

use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity not found.
    ///
    /// ## When This Occurs
    /// - ID doesn't exist
    /// - A status-guarded UPDATE matched no row
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Content mutation attempted on a finalized invoice.
    #[error("Invoice {id} is finalized and cannot be modified")]
    Finalized { id: String },

    /// Content mutation or second conversion attempted on a converted quote.
    #[error("Quote {id} has already been converted")]
    Converted { id: String },

    /// Document is not in the state the operation requires.
    ///
    /// ## When This Occurs
    /// - Converting a quote that is not `accepted`
    /// - A guarded UPDATE raced with a concurrent status change
    #[error("{entity} {id} is {state}, operation not allowed")]
    InvalidState {
        entity: String,
        id: String,
        state: String,
    },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Duplicate invoice or quote number
    /// - Duplicate primary key
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Document references a missing client
    /// - Hard-deleting a client that documents still reference
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Backend connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction begin or commit failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// A stored value could not be parsed into its domain type.
    ///
    /// ## When This Occurs
    /// - Corrupt decimal or date TEXT in a column
    /// - Hand-edited KV file with bad content
    #[error("Failed to decode column {column}: {message}")]
    Decode { column: String, message: String },

    /// KV file (de)serialization failed.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// KV file I/O failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal storage error.
    #[error("Internal storage error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a Decode error for a given column.
    pub fn decode(column: impl Into<String>, message: impl std::fmt::Display) -> Self {
        StoreError::Decode {
            column: column.into(),
            message: message.to_string(),
        }
    }

    /// Creates an InvalidState error.
    pub fn invalid_state(
        entity: impl Into<String>,
        id: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        StoreError::InvalidState {
            entity: entity.into(),
            id: id.into(),
            state: state.into(),
        }
    }
}

/// Convert sqlx errors to StoreError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → StoreError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → StoreError::PoolExhausted
/// Other                       → StoreError::Internal
/// ```
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>"
                // FK constraint: "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    StoreError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    StoreError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    StoreError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => StoreError::PoolExhausted,

            sqlx::Error::PoolClosed => StoreError::ConnectionFailed("Pool is closed".to_string()),

            _ => StoreError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrationFailed(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = StoreError::not_found("Invoice", "inv-42");
        assert_eq!(err.to_string(), "Invoice not found: inv-42");

        let err = StoreError::Finalized {
            id: "inv-42".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invoice inv-42 is finalized and cannot be modified"
        );

        let err = StoreError::invalid_state("Quote", "q-1", "draft");
        assert_eq!(err.to_string(), "Quote q-1 is draft, operation not allowed");
    }

    #[test]
    fn test_decode_helper() {
        let err = StoreError::decode("total_ht", "invalid decimal");
        assert!(err.to_string().contains("total_ht"));
    }
}
