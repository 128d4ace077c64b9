//! # Engine Error Types
//!
//! Errors raised by the business operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  factura-core errors                                                   │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  factura-store errors                                                  │
//! │  └── StoreError       - Persistence failures and constraint hits       │
//! │                                                                         │
//! │  factura-engine errors (this file)                                     │
//! │  └── EngineError      - Workflow rule violations, wraps the above      │
//! │                                                                         │
//! │  Flow: ValidationError ─┐                                              │
//! │                         ├─► EngineError ─► caller                      │
//! │        StoreError ──────┘                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (document ID, status, action)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use factura_core::ValidationError;
use factura_store::StoreError;
use thiserror::Error;

// =============================================================================
// Engine Error
// =============================================================================

/// Workflow-level errors.
///
/// These cover everything the engine can refuse to do on top of what the
/// store already enforces. They should be caught and translated to
/// user-friendly messages.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Input validation failed before any storage work started.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The storage layer rejected or failed the operation.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// No settings row has been saved yet.
    ///
    /// ## When This Occurs
    /// - Creating a document before the issuer profile was filled in
    /// - A fresh store that never saw `save_settings`
    ///
    /// Documents snapshot the issuer identity at creation time, so there is
    /// nothing sensible to emit without settings.
    #[error("Settings have not been configured yet")]
    SettingsMissing,

    /// A referenced record does not exist.
    ///
    /// ## When This Occurs
    /// - Document creation pointing at an unknown client ID
    /// - Lifecycle action on a document ID that was never created
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The invoice has been finalized and its content is frozen.
    ///
    /// ## When This Occurs
    /// - Editing lines, dates, or notes after finalization
    /// - Any content update once `finalized_at` is set
    #[error("Invoice {id} is finalized and cannot be modified")]
    FinalizedDocument { id: String },

    /// The quote has already been converted into an invoice.
    #[error("Quote {id} has been converted and cannot be modified")]
    ConvertedQuote { id: String },

    /// The quote is not in a state that allows conversion.
    ///
    /// ## When This Occurs
    /// - Converting a quote that was never accepted
    /// - Converting a quote a second time
    #[error("Quote {quote_id} cannot be converted: {reason}")]
    ConversionIneligible { quote_id: String, reason: String },

    /// The document is not in a state that allows the requested action.
    ///
    /// ## When This Occurs
    /// - Marking a draft invoice as paid (it was never sent)
    /// - Cancelling a paid invoice
    /// - Accepting a quote that is still a draft
    #[error("{entity} {id} is {status}, cannot {action}")]
    InvalidTransition {
        entity: &'static str,
        id: String,
        status: String,
        action: &'static str,
    },

    /// A computed date fell outside the supported calendar range.
    #[error("Date out of range: {0}")]
    DateOutOfRange(String),

    /// A backup payload could not be parsed or carries an unknown version.
    #[error("Invalid backup: {0}")]
    InvalidBackup(String),
}

impl EngineError {
    /// Shorthand for the `NotFound` variant.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        EngineError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Shorthand for the `InvalidTransition` variant.
    pub fn invalid_transition(
        entity: &'static str,
        id: impl Into<String>,
        status: impl Into<String>,
        action: &'static str,
    ) -> Self {
        EngineError::InvalidTransition {
            entity,
            id: id.into(),
            status: status.into(),
            action,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = EngineError::invalid_transition("Invoice", "inv-1", "draft", "mark as paid");
        assert_eq!(
            err.to_string(),
            "Invoice inv-1 is draft, cannot mark as paid"
        );

        let err = EngineError::not_found("Client", "c-404");
        assert_eq!(err.to_string(), "Client not found: c-404");
    }

    #[test]
    fn test_validation_converts_to_engine_error() {
        let validation_err = ValidationError::Required {
            field: "address".to_string(),
        };
        let engine_err: EngineError = validation_err.into();
        assert!(matches!(engine_err, EngineError::Validation(_)));
    }

    #[test]
    fn test_store_converts_to_engine_error() {
        let store_err = StoreError::not_found("Invoice", "inv-1");
        let engine_err: EngineError = store_err.into();
        assert!(matches!(engine_err, EngineError::Store(_)));
    }
}
