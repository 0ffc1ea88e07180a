//! # PIN Authorization
//!
//! One-way hashing and verification of personnel PINs.
//!
//! Dispensing fuel requires a human sign-off from the delivering (and, for
//! internal dispenses, the receiving) personnel. Each person has a short
//! numeric PIN stored only as an argon2 hash; this module knows nothing about
//! tanks or documents and is usable by any workflow that needs a human
//! authorization step.
//!
//! ## Why argon2?
//! PINs have tiny entropy (4-8 digits), so the hash must be deliberately
//! expensive to brute-force offline. The PHC string format stores salt and
//! parameters alongside the hash, so verification needs no extra state.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use thiserror::Error;

use crate::validation::validate_pin_format;
use crate::ValidationError;

/// Errors from PIN hashing.
#[derive(Debug, Error)]
pub enum PinError {
    /// PIN does not meet format rules (4-8 digits).
    #[error("Invalid PIN format: {0}")]
    Format(#[from] ValidationError),

    /// The hashing backend failed (should not happen in practice).
    #[error("PIN hashing failed: {0}")]
    Hash(String),
}

/// Hashes a plaintext PIN into a PHC-format string for storage.
///
/// ## Example
/// ```rust
/// use fuel_core::pin::{hash_pin, verify_pin};
///
/// let stored = hash_pin("4821").unwrap();
/// assert!(verify_pin("4821", &stored));
/// assert!(!verify_pin("0000", &stored));
/// ```
pub fn hash_pin(pin: &str) -> Result<String, PinError> {
    validate_pin_format(pin)?;

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(pin.as_bytes(), &salt)
        .map_err(|e| PinError::Hash(e.to_string()))?;

    Ok(hash.to_string())
}

/// Verifies a plaintext PIN against a stored PHC-format hash.
///
/// Returns `false` for a malformed stored hash rather than erroring: a
/// corrupt credential must fail closed, never open.
pub fn verify_pin(pin: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(pin.as_bytes(), &parsed)
        .is_ok()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_round_trip() {
        let hash = hash_pin("4821").unwrap();
        assert!(verify_pin("4821", &hash));
        assert!(!verify_pin("4822", &hash));
        assert!(!verify_pin("0000", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_pin("4821").unwrap();
        let b = hash_pin("4821").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_rejects_bad_format() {
        assert!(matches!(hash_pin("12"), Err(PinError::Format(_))));
        assert!(matches!(hash_pin("abcd"), Err(PinError::Format(_))));
    }

    #[test]
    fn test_verify_fails_closed_on_garbage_hash() {
        assert!(!verify_pin("4821", "not-a-phc-string"));
        assert!(!verify_pin("4821", ""));
    }
}
