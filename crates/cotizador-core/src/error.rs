//! # Error Types
//!
//! Domain-specific error types for cotizador-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  cotizador-core errors (this file)                                     │
//! │  ├── CoreError        - Engine/builder domain errors                   │
//! │  └── ValidationError  - Field-level validation failures                │
//! │                                                                         │
//! │  cotizador-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  cotizador-session errors (app layer)                                  │
//! │  ├── GatewayError     - Collaborator boundary failures                 │
//! │  └── ApiError         - What the frontend sees (serialized)            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Frontend     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, id, range)
//! 3. Errors are enum variants, never bare Strings
//! 4. Step validation failures are DATA (`Vec<String>`), not errors; only
//!    the submission boundary converts them into `CoreError::NotSubmittable`

use thiserror::Error;

use crate::types::QuoteStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent engine misuse or business rule violations.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed numeric input into the totals engine.
    ///
    /// ## When This Occurs
    /// - Non-positive quantity
    /// - Negative unit price
    /// - Discount outside 0-100%
    ///
    /// Edit handlers typically clamp the input instead of surfacing this
    /// as a hard failure.
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// The totals computation produced an impossible value.
    ///
    /// ## When This Occurs
    /// - A negative aggregate (discount, tax, grand total) from valid inputs
    ///
    /// This is a programming defect, not a user error. It is logged, never
    /// shown as an actionable message, and must fail loudly in tests.
    #[error("Totals invariant violated: {0}")]
    InvariantViolation(String),

    /// The quote draft cannot be submitted.
    ///
    /// Carries the aggregated step validation messages (client + products)
    /// so the host UI can surface them inline.
    #[error("Quote is not ready to submit: {}", messages.join("; "))]
    NotSubmittable { messages: Vec<String> },

    /// Requested status change is not allowed from the current status.
    ///
    /// ## When This Occurs
    /// - Accepting a quote that was never sent
    /// - Re-sending an accepted quote
    ///
    /// Transitions are one-directional; duplication is the only way back
    /// to Draft.
    #[error("Quote {quote_id} is {from:?}, cannot move to {to:?}")]
    InvalidStatusTransition {
        quote_id: String,
        from: QuoteStatus,
        to: QuoteStatus,
    },

    /// Quote has exceeded the maximum allowed line items.
    #[error("Quote cannot have more than {max} line items")]
    QuoteTooLarge { max: usize },

    /// Line item quantity exceeds the maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an InvalidInput error.
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Field-level validation errors.
///
/// These occur when user input doesn't meet requirements. Step predicates
/// render them to message lists; they are returned as data, never thrown
/// across the UI boundary.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, malformed tax id).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A collection that must not be empty is empty.
    #[error("{field} must contain at least one entry")]
    Empty { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::NotSubmittable {
            messages: vec![
                "legal name is required".to_string(),
                "line items must contain at least one entry".to_string(),
            ],
        };
        assert_eq!(
            err.to_string(),
            "Quote is not ready to submit: legal name is required; line items must contain at least one entry"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "legal name".to_string(),
        };
        assert_eq!(err.to_string(), "legal name is required");

        let err = ValidationError::OutOfRange {
            field: "validity days".to_string(),
            min: 1,
            max: 365,
        };
        assert_eq!(err.to_string(), "validity days must be between 1 and 365");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Empty {
            field: "line items".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
