//! # Error Types
//!
//! Domain-specific error types for fuel-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  fuel-core errors (this file)                                           │
//! │  ├── CoreError        - Business rule violations                        │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  fuel-db errors (separate crate)                                        │
//! │  ├── DbError          - Infrastructure failures (retry may be safe)     │
//! │  └── LedgerError      - Core | Db | ConcurrencyConflict                 │
//! │                                                                         │
//! │  API errors (in server)                                                 │
//! │  └── ApiError         - What the frontend sees (serialized)             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → LedgerError → ApiError → Client    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (tank id, volumes, etc.)
//! 3. Errors are enum variants, never String
//! 4. Domain errors are terminal - a caller must never retry them

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business rule violations.
///
/// Every variant corresponds to a terminal, user-reportable failure: the
/// enclosing transaction rolls back and nothing is persisted.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Tank cannot be found.
    #[error("Tank not found: {0}")]
    TankNotFound(String),

    /// Tank exists but is deactivated - no stock may move through it.
    #[error("Tank {0} is inactive")]
    TankInactive(String),

    /// Withdrawal larger than the tank's live stock.
    ///
    /// ## When This Occurs
    /// - Dispense liters exceed the tank's current stock
    /// - Voiding a receipt line after the received fuel was already used
    #[error("Insufficient stock in tank {tank_id}: available {available_cl} cl, requested {requested_cl} cl")]
    InsufficientStock {
        tank_id: String,
        available_cl: i64,
        requested_cl: i64,
    },

    /// Inflow would push the tank above its physical capacity.
    ///
    /// ## When This Occurs
    /// - Receipt line larger than the remaining headroom
    /// - Voiding a dispense after the tank was refilled
    #[error("Capacity exceeded for tank {tank_id}: capacity {capacity_cl} cl, attempted stock {attempted_cl} cl")]
    CapacityExceeded {
        tank_id: String,
        capacity_cl: i64,
        attempted_cl: i64,
    },

    /// PIN verification failed for the given person.
    ///
    /// Deliberately carries no detail beyond the person id - the caller must
    /// not learn whether the person exists or the PIN was merely wrong.
    #[error("Invalid PIN for person {person_id}")]
    PinInvalid { person_id: String },

    /// The movement or document was already voided; a stock effect is
    /// reversed at most once.
    #[error("{entity} {id} is already voided")]
    AlreadyVoided { entity: String, id: String },

    /// Document is not in a state that allows the requested transition.
    ///
    /// ## When This Occurs
    /// - Finalizing a receipt that is not Draft
    /// - Voiding a receipt that never became Active
    #[error("{entity} {id} is {current}, cannot {operation}")]
    InvalidStatus {
        entity: String,
        id: String,
        current: String,
        operation: String,
    },

    /// Receipt lines do not sum to the declared total. Exact match, no
    /// tolerance.
    #[error("Receipt lines sum to {lines_cl} cl but declared total is {declared_cl} cl")]
    LineTotalMismatch { declared_cl: i64, lines_cl: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller input doesn't meet requirements. Used for early
/// validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., non-digit PIN, malformed id).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Collection size constraint violated.
    #[error("{field} must have between {min} and {max} entries")]
    InvalidCount { field: String, min: usize, max: usize },
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
        let err = CoreError::InsufficientStock {
            tank_id: "tank-1".to_string(),
            available_cl: 4_000,
            requested_cl: 6_000,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock in tank tank-1: available 4000 cl, requested 6000 cl"
        );

        let err = CoreError::AlreadyVoided {
            entity: "Movement".to_string(),
            id: "m-1".to_string(),
        };
        assert_eq!(err.to_string(), "Movement m-1 is already voided");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "supplier_id".to_string(),
        };
        assert_eq!(err.to_string(), "supplier_id is required");

        let err = ValidationError::MustBePositive {
            field: "capacity".to_string(),
        };
        assert_eq!(err.to_string(), "capacity must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "tank_id".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
