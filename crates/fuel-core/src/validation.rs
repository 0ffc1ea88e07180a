//! # Validation Module
//!
//! Input validation rules for the fuel ledger.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP handler (deserialization, required fields)               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - business rule validation, pure and early        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database - CHECK constraints, FKs, the guarded stock UPDATE   │
//! │                                                                         │
//! │  Defense in depth: each layer catches a different class of error        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::{MAX_PIN_LEN, MAX_RECEIPT_LINES, MIN_PIN_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates that a required reference field is non-empty.
///
/// ## Example
/// ```rust
/// use fuel_core::validation::validate_required;
///
/// assert!(validate_required("supplier_id", "SUP-01").is_ok());
/// assert!(validate_required("supplier_id", "  ").is_err());
/// ```
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a tank capacity: must be strictly positive.
pub fn validate_capacity(capacity_cl: i64) -> ValidationResult<()> {
    if capacity_cl <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "capacity".to_string(),
        });
    }
    Ok(())
}

/// Validates an initial stock against a capacity.
pub fn validate_initial_stock(stock_cl: i64, capacity_cl: i64) -> ValidationResult<()> {
    if stock_cl < 0 || stock_cl > capacity_cl {
        return Err(ValidationError::OutOfRange {
            field: "initial_stock".to_string(),
            min: 0,
            max: capacity_cl,
        });
    }
    Ok(())
}

/// Validates a positive volume amount (movement magnitude, line liters).
pub fn validate_positive_amount(field: &str, amount_cl: i64) -> ValidationResult<()> {
    if amount_cl <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Meter Readings
// =============================================================================

/// Computes dispensed liters from pump meter readings.
///
/// The source meters count down remaining volume, so
/// `liters = meter_start - meter_end` and the difference must be strictly
/// positive.
///
/// ## Example
/// ```rust
/// use fuel_core::validation::dispensed_liters;
///
/// // meterStart 1200.00, meterEnd 1150.00 -> 50.00 L
/// assert_eq!(dispensed_liters(120_000, 115_000).unwrap(), 5_000);
/// assert!(dispensed_liters(100, 100).is_err());
/// ```
pub fn dispensed_liters(meter_start_cl: i64, meter_end_cl: i64) -> ValidationResult<i64> {
    let Some(liters) = meter_start_cl.checked_sub(meter_end_cl) else {
        return Err(ValidationError::OutOfRange {
            field: "meter readings".to_string(),
            min: 0,
            max: i64::MAX,
        });
    };
    if liters <= 0 {
        return Err(ValidationError::InvalidFormat {
            field: "meter readings".to_string(),
            reason: format!(
                "meter_start ({}) must be greater than meter_end ({})",
                meter_start_cl, meter_end_cl
            ),
        });
    }
    Ok(liters)
}

// =============================================================================
// Receipt Lines
// =============================================================================

/// Validates a receipt's line volumes against its declared total.
///
/// ## Rules
/// - 1..=MAX_RECEIPT_LINES lines
/// - every line strictly positive
/// - `sum(lines) == declared_total` EXACTLY - no tolerance
pub fn validate_receipt_lines(line_liters_cl: &[i64], declared_total_cl: i64) -> CoreResult<()> {
    if line_liters_cl.is_empty() || line_liters_cl.len() > MAX_RECEIPT_LINES {
        return Err(ValidationError::InvalidCount {
            field: "lines".to_string(),
            min: 1,
            max: MAX_RECEIPT_LINES,
        }
        .into());
    }

    for &liters in line_liters_cl {
        validate_positive_amount("line liters", liters)?;
    }

    let sum = line_liters_cl
        .iter()
        .try_fold(0i64, |acc, &liters| acc.checked_add(liters))
        .ok_or(ValidationError::OutOfRange {
            field: "lines".to_string(),
            min: 0,
            max: i64::MAX,
        })?;
    if sum != declared_total_cl {
        return Err(CoreError::LineTotalMismatch {
            declared_cl: declared_total_cl,
            lines_cl: sum,
        });
    }

    Ok(())
}

// =============================================================================
// PIN Format
// =============================================================================

/// Validates the format of a plaintext PIN: 4-8 ASCII digits.
///
/// Format only - actual verification happens against the stored hash.
pub fn validate_pin_format(pin: &str) -> ValidationResult<()> {
    if pin.len() < MIN_PIN_LEN || pin.len() > MAX_PIN_LEN {
        return Err(ValidationError::OutOfRange {
            field: "pin length".to_string(),
            min: MIN_PIN_LEN as i64,
            max: MAX_PIN_LEN as i64,
        });
    }

    if !pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "pin".to_string(),
            reason: "must contain only digits".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required() {
        assert!(validate_required("supplier_id", "SUP-01").is_ok());
        assert!(validate_required("supplier_id", "").is_err());
        assert!(validate_required("supplier_id", "   ").is_err());
    }

    #[test]
    fn test_validate_capacity() {
        assert!(validate_capacity(1).is_ok());
        assert!(validate_capacity(0).is_err());
        assert!(validate_capacity(-100).is_err());
    }

    #[test]
    fn test_validate_initial_stock() {
        assert!(validate_initial_stock(0, 1_000).is_ok());
        assert!(validate_initial_stock(1_000, 1_000).is_ok());
        assert!(validate_initial_stock(-1, 1_000).is_err());
        assert!(validate_initial_stock(1_001, 1_000).is_err());
    }

    #[test]
    fn test_dispensed_liters() {
        assert_eq!(dispensed_liters(120_000, 115_000).unwrap(), 5_000);
        assert!(dispensed_liters(115_000, 120_000).is_err());
        assert!(dispensed_liters(100, 100).is_err());
    }

    #[test]
    fn test_receipt_lines_exact_sum() {
        // 300 L + 200 L == 500 L declared
        assert!(validate_receipt_lines(&[30_000, 20_000], 50_000).is_ok());

        // 450 vs 500 declared: off by 50 L, must fail
        let err = validate_receipt_lines(&[30_000, 15_000], 50_000).unwrap_err();
        assert!(matches!(
            err,
            CoreError::LineTotalMismatch {
                declared_cl: 50_000,
                lines_cl: 45_000,
            }
        ));
    }

    #[test]
    fn test_dispensed_liters_extreme_readings() {
        // A subtraction spanning the full i64 range must reject, not wrap
        assert!(matches!(
            dispensed_liters(i64::MAX, i64::MIN),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(
            dispensed_liters(i64::MIN, i64::MAX),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_receipt_lines_extreme_sum() {
        // Line volumes whose sum exceeds i64 must reject, not wrap
        let err = validate_receipt_lines(&[i64::MAX, i64::MAX], 10).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { .. })
        ));
        let err = validate_receipt_lines(&[i64::MAX, 1], 10).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_receipt_lines_bounds() {
        assert!(validate_receipt_lines(&[], 0).is_err());
        assert!(validate_receipt_lines(&[0], 0).is_err());
        assert!(validate_receipt_lines(&[-10, 10], 0).is_err());

        let too_many: Vec<i64> = vec![100; MAX_RECEIPT_LINES + 1];
        assert!(validate_receipt_lines(&too_many, 100 * (MAX_RECEIPT_LINES as i64 + 1)).is_err());
    }

    #[test]
    fn test_pin_format() {
        assert!(validate_pin_format("1234").is_ok());
        assert!(validate_pin_format("12345678").is_ok());
        assert!(validate_pin_format("123").is_err());
        assert!(validate_pin_format("123456789").is_err());
        assert!(validate_pin_format("12a4").is_err());
    }
}
