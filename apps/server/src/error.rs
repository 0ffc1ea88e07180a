//! # API Error Types
//!
//! The error shape the frontend sees.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Error Response Mapping                              │
//! │                                                                         │
//! │  LedgerError ──► ApiError { code, message } ──► HTTP status + JSON      │
//! │                                                                         │
//! │  VALIDATION_ERROR      400      domain input rejected                   │
//! │  PIN_INVALID           401      failed PIN verification                 │
//! │  NOT_FOUND             404      unknown entity id                       │
//! │  ALREADY_VOIDED        409      second void attempt                     │
//! │  CONFLICT              409      invalid transition / concurrent write   │
//! │  INSUFFICIENT_STOCK    422      withdrawal beyond live stock            │
//! │  CAPACITY_EXCEEDED     422      inflow beyond physical capacity         │
//! │  DATABASE_ERROR        500      infrastructure failure                  │
//! │  INTERNAL              500      anything unexpected                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Messages come from the underlying thiserror Display impls, so the client
//! sees the same wording the server logs.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use fuel_core::CoreError;
use fuel_db::{DbError, LedgerError};

/// Machine-readable error codes, serialized SCREAMING_SNAKE_CASE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    PinInvalid,
    NotFound,
    AlreadyVoided,
    Conflict,
    InsufficientStock,
    CapacityExceeded,
    DatabaseError,
    Internal,
}

impl ErrorCode {
    /// HTTP status this code maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::PinInvalid => StatusCode::UNAUTHORIZED,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::AlreadyVoided | ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::InsufficientStock | ErrorCode::CapacityExceeded => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// What an endpoint returns on failure.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::NotFound, message)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::Validation(_) | CoreError::LineTotalMismatch { .. } => {
                ErrorCode::ValidationError
            }
            CoreError::PinInvalid { .. } => ErrorCode::PinInvalid,
            CoreError::TankNotFound(_) => ErrorCode::NotFound,
            CoreError::AlreadyVoided { .. } => ErrorCode::AlreadyVoided,
            CoreError::InvalidStatus { .. } | CoreError::TankInactive(_) => ErrorCode::Conflict,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::CapacityExceeded { .. } => ErrorCode::CapacityExceeded,
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        let code = match &err {
            DbError::NotFound { .. } => ErrorCode::NotFound,
            DbError::UniqueViolation { .. } => ErrorCode::Conflict,
            // Internal wraps failures sqlx could not classify
            DbError::Internal(_) => ErrorCode::Internal,
            _ => ErrorCode::DatabaseError,
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Core(core) => core.into(),
            LedgerError::Db(db) => db.into(),
            LedgerError::ConcurrencyConflict { .. } => {
                ApiError::new(ErrorCode::Conflict, err.to_string())
            }
        }
    }
}

/// Failure envelope: `{"success": false, "errorCode": ..., "message": ...}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    success: bool,
    error_code: ErrorCode,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status();
        if status.is_server_error() {
            tracing::error!(code = ?self.code, message = %self.message, "Request failed");
        } else {
            tracing::debug!(code = ?self.code, message = %self.message, "Request rejected");
        }

        let body = ErrorBody {
            success: false,
            error_code: self.code,
            message: self.message,
        };
        (status, Json(body)).into_response()
    }
}

/// Result alias for handler functions.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ErrorCode::ValidationError.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::PinInvalid.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ErrorCode::InsufficientStock.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ErrorCode::AlreadyVoided.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_ledger_error_conversion() {
        let err: ApiError = LedgerError::Core(CoreError::InsufficientStock {
            tank_id: "t-1".to_string(),
            available_cl: 4_000,
            requested_cl: 6_000,
        })
        .into();
        assert_eq!(err.code, ErrorCode::InsufficientStock);

        let err: ApiError = LedgerError::Core(CoreError::PinInvalid {
            person_id: "p-1".to_string(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::PinInvalid);
    }

    #[test]
    fn test_db_error_conversion() {
        let err: ApiError = DbError::not_found("Tank", "t-1").into();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err: ApiError = DbError::QueryFailed("disk I/O error".to_string()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);

        let err: ApiError = DbError::Internal("unclassified".to_string()).into();
        assert_eq!(err.code, ErrorCode::Internal);
        assert_eq!(err.code.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
