//! # API Error Type
//!
//! Unified error type for backend commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Namaa POS                              │
//! │                                                                         │
//! │  UI                          Rust Backend                               │
//! │  ──                          ────────────                               │
//! │                                                                         │
//! │  completeSale(draft)                                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │  Rule broken? ─── CoreError::InsufficientStock ───┐              │  │
//! │  │         │                                         ▼              │  │
//! │  │  Store failed? ── DbError::WriteFailed ────────► ApiError ──────►│  │
//! │  │         │                                         ▲              │  │
//! │  │  Sale saved, stock write failed ─ PartialSale ────┘              │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "PARTIAL_SALE",                                              │
//! │    "message": "Sale 0007 recorded but stock update stopped at p3",      │
//! │    "partialSale": { "saleId": "0007", "applied": ["p1"], ... } }        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use ts_rs::TS;

use namaa_core::CoreError;
use namaa_db::DbError;

/// Error returned from every command.
///
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found: p-42"
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

    /// Present only for [`ErrorCode::PartialSale`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_sale: Option<PartialSale>,
}

/// Error codes for command responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ErrorCode {
    NotFound,

    /// Input rejected before touching the store
    ValidationError,

    /// The store could not be opened or migrated. Fatal for the session.
    StorageUnavailable,

    /// A single read or write failed
    StorageError,

    /// Sale recorded, stock only partly decremented
    PartialSale,

    /// Backup document is malformed
    FormatError,

    /// Operator lacks the role, or tried to delete themselves
    Forbidden,

    /// Record changed concurrently and retries ran out
    Conflict,

    /// Restore called without the operator's confirmation
    ConfirmationRequired,

    InsufficientStock,

    PaymentError,

    /// First-run setup attempted on a shop that already has settings
    AlreadySetUp,

    InvalidCredentials,

    Internal,
}

/// What a sale that stopped half-way actually did to stock.
///
/// ```text
/// items:  p1 ── p2 ── p3 ── p4
///         ok    ok    ✗     never tried
///         └─applied─┘ failed  pending
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PartialSale {
    pub sale_id: String,

    /// Products whose stock was decremented.
    pub applied: Vec<String>,

    pub failed_product_id: String,
    pub reason: String,

    /// Products that were never attempted.
    pub pending: Vec<String>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            partial_sale: None,
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Forbidden, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    pub fn partial_sale(report: PartialSale) -> Self {
        let message = format!(
            "Sale {} recorded but stock update stopped at {}: {}",
            report.sale_id, report.failed_product_id, report.reason
        );
        ApiError {
            code: ErrorCode::PartialSale,
            message,
            partial_sale: Some(report),
        }
    }
}

/// Converts store errors to API errors.
///
/// ```text
/// ConnectionFailed / MigrationFailed  → STORAGE_UNAVAILABLE
/// ReadFailed / WriteFailed            → STORAGE_ERROR
/// VersionConflict                     → CONFLICT
/// InvalidSnapshot                     → FORMAT_ERROR
/// NotFound                            → NOT_FOUND
/// Serialization / Internal            → INTERNAL
/// ```
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::ConnectionFailed(e) => {
                tracing::error!("Store unavailable: {}", e);
                ApiError::new(ErrorCode::StorageUnavailable, "Cannot load data")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Store migration failed: {}", e);
                ApiError::new(ErrorCode::StorageUnavailable, "Cannot load data")
            }
            e @ (DbError::ReadFailed { .. } | DbError::WriteFailed { .. }) => {
                tracing::error!("{}", e);
                ApiError::new(ErrorCode::StorageError, e.to_string())
            }
            e @ DbError::VersionConflict { .. } => ApiError::new(ErrorCode::Conflict, e.to_string()),
            DbError::InvalidSnapshot(reason) => ApiError::new(
                ErrorCode::FormatError,
                format!("Not a valid backup file: {}", reason),
            ),
            DbError::Serialization(e) => {
                tracing::error!("Serialization failed: {}", e);
                ApiError::internal("Stored data could not be read")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal store error: {}", e);
                ApiError::internal("Database operation failed")
            }
        }
    }
}

/// Converts business rule errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            e @ CoreError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, e.to_string())
            }
            e @ CoreError::InsufficientPayment { .. } => {
                ApiError::new(ErrorCode::PaymentError, e.to_string())
            }
            e @ CoreError::EmptyCart => ApiError::validation(e.to_string()),
            e @ CoreError::SelfDeletion => ApiError::forbidden(e.to_string()),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<namaa_core::ValidationError> for ApiError {
    fn from(err: namaa_core::ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
