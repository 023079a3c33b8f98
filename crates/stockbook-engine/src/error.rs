//! # API Error Type
//!
//! Unified error type for engine commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Stockbook                              │
//! │                                                                         │
//! │  Caller (HTTP handler, desktop shell, CLI)                             │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Engine command                                                  │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Database Error? ─── DbError::Conflict(..) ────────┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Business Error? ─── CoreError::InsufficientStock ─ ApiError ──►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "INSUFFICIENT_STOCK",                                        │
//! │    "message": "Insufficient stock for item ...: available 1500, ..." }  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Business failures carry their own message. Database failures are logged
//! in full and reported with a generic message and code `INTERNAL`.

use serde::Serialize;
use stockbook_core::{CoreError, ErrorKind};
use stockbook_db::DbError;
use tracing::{error, warn};

/// API error returned from engine commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Item not found: 1b4e28ba-2fa1-11d2-883f-0016d3cca427"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Item, store, ledger entry or sale not found (404)
    NotFound,

    /// A removal or an edit would take stock below zero (409)
    InsufficientStock,

    /// Request could not be interpreted (400)
    InvalidInput,

    /// Computed sale figures are inconsistent (422)
    InvalidState,

    /// Store configuration cannot be interpreted (500)
    InvalidConfig,

    /// Internal error (500)
    Internal,
}

impl From<ErrorKind> for ErrorCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NotFound => ErrorCode::NotFound,
            ErrorKind::InsufficientStock => ErrorCode::InsufficientStock,
            ErrorKind::InvalidInput => ErrorCode::InvalidInput,
            ErrorKind::InvalidState => ErrorCode::InvalidState,
            ErrorKind::InvalidConfig => ErrorCode::InvalidConfig,
            ErrorKind::Internal => ErrorCode::Internal,
        }
    }
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

    /// Creates an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::InvalidInput, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Logs a failed command: `warn!` for rejected requests, `error!` for
    /// internal failures.
    pub fn log(&self, operation: &str) {
        match self.code {
            ErrorCode::Internal | ErrorCode::InvalidConfig => {
                error!(operation, code = ?self.code, message = %self.message, "Command failed")
            }
            _ => warn!(operation, code = ?self.code, message = %self.message, "Command rejected"),
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::Invalid { source, .. } => source.into(),
            DbError::Conflict { entity, id } => {
                error!(%entity, %id, "Versioned update lost");
                ApiError::internal("Stock was modified concurrently, please retry")
            }
            DbError::Corrupt { entity, reason } => {
                error!(%entity, %reason, "Corrupt row");
                ApiError::internal("Stored data could not be read")
            }
            DbError::ConnectionFailed(_) => ApiError::internal("Database connection failed"),
            DbError::MigrationFailed(_) => ApiError::internal("Database migration failed"),
            DbError::PoolExhausted => ApiError::internal("Database pool exhausted"),
            other => {
                // Log the actual error but return a generic message
                error!(error = %other, "Database operation failed");
                ApiError::internal("Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        if let CoreError::InvoiceSequenceExhausted { day } = &err {
            error!(%day, "Invoice sequence exhausted");
        }
        ApiError::new(err.kind().into(), err.to_string())
    }
}

impl From<stockbook_core::ValidationError> for ApiError {
    fn from(err: stockbook_core::ValidationError) -> Self {
        CoreError::from(err).into()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

pub type ApiResult<T> = Result<T, ApiError>;
