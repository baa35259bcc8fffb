//! # API Error Type
//!
//! Unified error type for session commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Cotizador                          │
//! │                                                                         │
//! │  Frontend                    Rust Backend                               │
//! │  ────────                    ────────────                               │
//! │                                                                         │
//! │  invoke('submit_quote')                                                 │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Session method: Result<T, ApiError>                             │  │
//! │  │         │                                                        │  │
//! │  │  DbError::NotFound ──────────────────────┐                      │  │
//! │  │  CoreError::NotSubmittable ───────────── ApiError ─────────────►│  │
//! │  │  GatewayError::Unavailable ──────────────┘                      │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  try {                                                                  │
//! │    await invoke('submit_quote')                                         │
//! │  } catch (e) {                                                          │
//! │    // e.code = "NOT_SUBMITTABLE"                                        │
//! │    // e.message = "legal name is required; ..."                         │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Step validation failures during editing never reach this type; they are
//! plain message lists on the builder. Only hard failures become ApiError.

use serde::Serialize;
use ts_rs::TS;

use crate::gateway::GatewayError;
use cotizador_core::CoreError;
use cotizador_db::DbError;

/// API error returned from session commands.
///
/// ## Serialization
/// What the frontend receives when a command fails:
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Quote not found: abc-123"
/// }
/// ```
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
///
/// ## Usage in Frontend
/// ```typescript
/// try {
///   await invoke('submit_quote', { status });
/// } catch (e) {
///   switch (e.code) {
///     case 'NOT_SUBMITTABLE':
///       showStepErrors(e.message);
///       break;
///     case 'SUBMISSION_IN_PROGRESS':
///       // ignore: the first click is still being processed
///       break;
///     default:
///       showError('An error occurred');
///   }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Database operation failed (500)
    DatabaseError,

    /// Business rule rejected the operation (422)
    BusinessLogic,

    /// The draft failed summary validation on submit
    NotSubmittable,

    /// A submission is already in flight for this session
    SubmissionInProgress,

    /// The signed-in user may not perform this operation
    PermissionDenied,

    /// A collaborator (geocoder, exporter) is unavailable
    GatewayUnavailable,

    /// Internal error (500)
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a permission error.
    pub fn denied(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::PermissionDenied, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotSubmittable { messages } => {
                ApiError::new(ErrorCode::NotSubmittable, messages.join("; "))
            }
            CoreError::InvalidStatusTransition { .. } => {
                ApiError::new(ErrorCode::BusinessLogic, err.to_string())
            }
            CoreError::InvariantViolation(detail) => {
                // Programming defect: log the detail, show a generic message
                tracing::error!("Totals invariant violated: {}", detail);
                ApiError::internal("Totals computation failed")
            }
            CoreError::InvalidInput { .. }
            | CoreError::QuoteTooLarge { .. }
            | CoreError::QuantityTooLarge { .. }
            | CoreError::Validation(_) => ApiError::validation(err.to_string()),
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::Domain(core) => ApiError::from(core),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::Serialization(e) => {
                tracing::error!("Snapshot serialization failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts gateway errors to API errors.
impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            GatewayError::Rejected(message) => ApiError::new(ErrorCode::BusinessLogic, message),
            GatewayError::Unavailable(message) => {
                tracing::warn!("Collaborator unavailable: {}", message);
                ApiError::new(ErrorCode::GatewayUnavailable, message)
            }
            GatewayError::Persistence(db) => ApiError::from(db),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_submittable_keeps_messages() {
        let err = CoreError::NotSubmittable {
            messages: vec![
                "legal name is required".to_string(),
                "line items must contain at least one entry".to_string(),
            ],
        };
        let api: ApiError = err.into();
        assert_eq!(api.code, ErrorCode::NotSubmittable);
        assert!(api.message.contains("legal name is required"));
        assert!(api.message.contains("; "));
    }

    #[test]
    fn test_db_not_found_maps_to_not_found() {
        let api: ApiError = DbError::not_found("Quote", "q-1").into();
        assert_eq!(api.code, ErrorCode::NotFound);
        assert_eq!(api.message, "Quote not found: q-1");
    }

    #[test]
    fn test_domain_transition_maps_to_business_logic() {
        use cotizador_core::QuoteStatus;
        let api: ApiError = DbError::Domain(CoreError::InvalidStatusTransition {
            quote_id: "q-1".to_string(),
            from: QuoteStatus::Accepted,
            to: QuoteStatus::Sent,
        })
        .into();
        assert_eq!(api.code, ErrorCode::BusinessLogic);
    }
}
