//! # Error Types
//!
//! Domain-specific error types for factura-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  factura-core errors (this file)                                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  factura-store errors (separate crate)                                 │
//! │  └── StoreError       - Persistence operation failures                 │
//! │                                                                         │
//! │  factura-engine errors (separate crate)                                │
//! │  └── EngineError      - Lifecycle rule violations, wraps the above     │
//! │                                                                         │
//! │  Flow: ValidationError → EngineError → caller                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field name, allowed values)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before a document is built or persisted.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be zero or positive.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., malformed SIRET, invalid date arithmetic).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in the allowed set (e.g., unknown VAT rate).
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for validation results.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ValidationError::Required {
            field: "address".to_string(),
        };
        assert_eq!(err.to_string(), "address is required");

        let err = ValidationError::OutOfRange {
            field: "paymentTermsDays".to_string(),
            min: 0,
            max: 3650,
        };
        assert_eq!(
            err.to_string(),
            "paymentTermsDays must be between 0 and 3650"
        );
    }

    #[test]
    fn test_not_allowed_lists_values() {
        let err = ValidationError::NotAllowed {
            field: "vatRate".to_string(),
            allowed: vec!["0".to_string(), "20".to_string()],
        };
        assert!(err.to_string().contains("vatRate must be one of"));
        assert!(err.to_string().contains("20"));
    }
}
