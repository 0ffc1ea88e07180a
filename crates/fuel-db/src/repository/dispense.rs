//! # Dispense Repository
//!
//! Database operations for dispenses.
//!
//! A dispense is created stock-effective (Active) in one step and its only
//! subsequent transition is the guarded flip to Voided - the same row-level
//! state machine pattern as receipts and movements.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult, LedgerError, LedgerResult};
use fuel_core::{CoreError, Dispense, DispenseStatus};

const DISPENSE_COLUMNS: &str = "id, tank_id, kind, machine_id, job_type_id, external_ref, \
     deliverer_id, receiver_id, meter_start_cl, meter_end_cl, liters_cl, movement_id, \
     status, created_by, created_at, updated_at";

/// Repository for dispense database operations.
#[derive(Debug, Clone)]
pub struct DispenseRepository {
    pool: SqlitePool,
}

impl DispenseRepository {
    /// Creates a new DispenseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DispenseRepository { pool }
    }

    /// Inserts a dispense row inside the caller's transaction.
    pub async fn insert(conn: &mut SqliteConnection, dispense: &Dispense) -> DbResult<()> {
        debug!(
            id = %dispense.id,
            tank_id = %dispense.tank_id,
            liters_cl = dispense.liters_cl,
            "Inserting dispense"
        );

        sqlx::query(
            r#"
            INSERT INTO dispenses (
                id, tank_id, kind, machine_id, job_type_id, external_ref,
                deliverer_id, receiver_id, meter_start_cl, meter_end_cl,
                liters_cl, movement_id, status, created_by, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            "#,
        )
        .bind(&dispense.id)
        .bind(&dispense.tank_id)
        .bind(dispense.kind)
        .bind(&dispense.machine_id)
        .bind(&dispense.job_type_id)
        .bind(&dispense.external_ref)
        .bind(&dispense.deliverer_id)
        .bind(&dispense.receiver_id)
        .bind(dispense.meter_start_cl)
        .bind(dispense.meter_end_cl)
        .bind(dispense.liters_cl)
        .bind(&dispense.movement_id)
        .bind(dispense.status)
        .bind(&dispense.created_by)
        .bind(dispense.created_at)
        .bind(dispense.updated_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Gets a dispense by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Dispense>> {
        let dispense = sqlx::query_as::<_, Dispense>(&format!(
            "SELECT {DISPENSE_COLUMNS} FROM dispenses WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(dispense)
    }

    /// Dispense fetched inside the caller's transaction (used by void).
    pub async fn fetch_in_tx(conn: &mut SqliteConnection, id: &str) -> DbResult<Dispense> {
        let dispense = sqlx::query_as::<_, Dispense>(&format!(
            "SELECT {DISPENSE_COLUMNS} FROM dispenses WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        dispense.ok_or_else(|| DbError::not_found("Dispense", id))
    }

    /// Links the ledger movement created for this dispense.
    pub async fn set_movement_id(
        conn: &mut SqliteConnection,
        id: &str,
        movement_id: &str,
    ) -> DbResult<()> {
        let result = sqlx::query("UPDATE dispenses SET movement_id = ?2 WHERE id = ?1")
            .bind(id)
            .bind(movement_id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Dispense", id));
        }

        Ok(())
    }

    /// Guarded flip `Active -> Voided`.
    pub async fn mark_voided(conn: &mut SqliteConnection, id: &str) -> LedgerResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE dispenses SET status = 'voided', updated_at = ?2 \
             WHERE id = ?1 AND status = 'active'",
        )
        .bind(id)
        .bind(now)
        .execute(&mut *conn)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            let status: Option<(DispenseStatus,)> =
                sqlx::query_as("SELECT status FROM dispenses WHERE id = ?1")
                    .bind(id)
                    .fetch_optional(&mut *conn)
                    .await
                    .map_err(DbError::from)?;

            return match status {
                None => Err(LedgerError::Db(DbError::not_found("Dispense", id))),
                Some(_) => Err(CoreError::AlreadyVoided {
                    entity: "Dispense".to_string(),
                    id: id.to_string(),
                }
                .into()),
            };
        }

        Ok(())
    }

    /// Recent dispenses for a tank, newest first.
    pub async fn list_for_tank(&self, tank_id: &str, limit: u32) -> DbResult<Vec<Dispense>> {
        let dispenses = sqlx::query_as::<_, Dispense>(&format!(
            "SELECT {DISPENSE_COLUMNS} FROM dispenses \
             WHERE tank_id = ?1 ORDER BY created_at DESC LIMIT ?2"
        ))
        .bind(tank_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(dispenses)
    }
}
