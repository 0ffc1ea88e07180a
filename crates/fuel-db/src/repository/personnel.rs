//! # Personnel Credential Repository
//!
//! Stores and verifies one-way PIN hashes per person.
//!
//! Person ids come from the external personnel directory; this repository
//! knows nothing about tanks or documents. Verification returns a plain
//! `bool` - workflows decide what a failed check means (always `PinInvalid`,
//! always before any write).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbResult, LedgerResult};
use fuel_core::pin::{hash_pin, verify_pin};
use fuel_core::{CoreError, ValidationError};

/// Repository for personnel PIN credentials.
#[derive(Debug, Clone)]
pub struct PersonnelRepository {
    pool: SqlitePool,
}

impl PersonnelRepository {
    /// Creates a new PersonnelRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PersonnelRepository { pool }
    }

    /// Sets (or replaces) a person's PIN credential.
    ///
    /// The plaintext never touches the database - only the argon2 PHC
    /// string is stored.
    pub async fn set_credential(&self, person_id: &str, pin: &str) -> LedgerResult<()> {
        if person_id.trim().is_empty() {
            return Err(CoreError::Validation(ValidationError::Required {
                field: "person_id".to_string(),
            })
            .into());
        }

        let pin_hash = hash_pin(pin).map_err(|e| {
            CoreError::Validation(ValidationError::InvalidFormat {
                field: "pin".to_string(),
                reason: e.to_string(),
            })
        })?;
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO personnel_credentials (person_id, pin_hash, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (person_id) DO UPDATE SET pin_hash = ?2, updated_at = ?3
            "#,
        )
        .bind(person_id)
        .bind(&pin_hash)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(crate::error::DbError::from)?;

        debug!(person_id = %person_id, "PIN credential stored");
        Ok(())
    }

    /// Verifies a plaintext PIN for a person.
    ///
    /// Returns `false` for an unknown person - callers must not be able to
    /// distinguish "no such person" from "wrong PIN".
    pub async fn verify(&self, person_id: &str, pin: &str) -> DbResult<bool> {
        let stored: Option<(String,)> =
            sqlx::query_as("SELECT pin_hash FROM personnel_credentials WHERE person_id = ?1")
                .bind(person_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(match stored {
            Some((hash,)) => verify_pin(pin, &hash),
            None => false,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_set_and_verify() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.personnel();

        repo.set_credential("person-1", "4821").await.unwrap();

        assert!(repo.verify("person-1", "4821").await.unwrap());
        assert!(!repo.verify("person-1", "0000").await.unwrap());
        assert!(!repo.verify("nobody", "4821").await.unwrap());
    }

    #[tokio::test]
    async fn test_replace_credential() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.personnel();

        repo.set_credential("person-1", "4821").await.unwrap();
        repo.set_credential("person-1", "9999").await.unwrap();

        assert!(!repo.verify("person-1", "4821").await.unwrap());
        assert!(repo.verify("person-1", "9999").await.unwrap());
    }

    #[tokio::test]
    async fn test_rejects_bad_pin_format() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.personnel();

        assert!(repo.set_credential("person-1", "12").await.is_err());
        assert!(repo.set_credential("person-1", "abcd").await.is_err());
        assert!(repo.set_credential("", "4821").await.is_err());
    }
}
