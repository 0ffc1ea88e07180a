//! # Receipt Repository
//!
//! Database operations for receipts and their lines.
//!
//! ## Receipt Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Receipt Lifecycle                                  │
//! │                                                                         │
//! │  1. CREATE DRAFT                                                        │
//! │     └── insert() → Receipt { status: Draft }      (no stock effect)     │
//! │                                                                         │
//! │  2. FINALIZE (service::receipt, one transaction)                        │
//! │     └── mark_active() guarded flip Draft → Active                       │
//! │     └── one movement + one line per tank                                │
//! │                                                                         │
//! │  3. (OPTIONAL) VOID                                                     │
//! │     └── mark_voided() guarded flip Active → Voided                      │
//! │     └── every line's movement reversed                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The status flips use guarded UPDATEs (`WHERE status = ...`): the state
//! machine is enforced at the row level, not by read-then-write.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult, LedgerResult};
use fuel_core::{CoreError, Receipt, ReceiptLine, ReceiptStatus};

const RECEIPT_COLUMNS: &str = "id, supplier_id, payment_type, declared_total_cl, \
     unit_price_cents, status, photo_path, created_by, created_at, updated_at, finalized_at";

const LINE_COLUMNS: &str =
    "id, receipt_id, tank_id, liters_cl, meter_start_cl, meter_end_cl, movement_id, created_at";

/// Repository for receipt database operations.
#[derive(Debug, Clone)]
pub struct ReceiptRepository {
    pool: SqlitePool,
}

impl ReceiptRepository {
    /// Creates a new ReceiptRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReceiptRepository { pool }
    }

    /// Inserts a draft receipt inside the caller's transaction.
    pub async fn insert(conn: &mut SqliteConnection, receipt: &Receipt) -> DbResult<()> {
        debug!(id = %receipt.id, supplier = %receipt.supplier_id, "Inserting receipt");

        sqlx::query(
            r#"
            INSERT INTO receipts (
                id, supplier_id, payment_type, declared_total_cl, unit_price_cents,
                status, photo_path, created_by, created_at, updated_at, finalized_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&receipt.id)
        .bind(&receipt.supplier_id)
        .bind(&receipt.payment_type)
        .bind(receipt.declared_total_cl)
        .bind(receipt.unit_price_cents)
        .bind(receipt.status)
        .bind(&receipt.photo_path)
        .bind(&receipt.created_by)
        .bind(receipt.created_at)
        .bind(receipt.updated_at)
        .bind(receipt.finalized_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Gets a receipt by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Receipt>> {
        let receipt = sqlx::query_as::<_, Receipt>(&format!(
            "SELECT {RECEIPT_COLUMNS} FROM receipts WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(receipt)
    }

    /// Inserts one receipt line inside the caller's transaction.
    pub async fn insert_line(conn: &mut SqliteConnection, line: &ReceiptLine) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO receipt_lines (
                id, receipt_id, tank_id, liters_cl,
                meter_start_cl, meter_end_cl, movement_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&line.id)
        .bind(&line.receipt_id)
        .bind(&line.tank_id)
        .bind(line.liters_cl)
        .bind(line.meter_start_cl)
        .bind(line.meter_end_cl)
        .bind(&line.movement_id)
        .bind(line.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Gets all lines of a receipt, oldest first.
    pub async fn get_lines(&self, receipt_id: &str) -> DbResult<Vec<ReceiptLine>> {
        let lines = sqlx::query_as::<_, ReceiptLine>(&format!(
            "SELECT {LINE_COLUMNS} FROM receipt_lines WHERE receipt_id = ?1 ORDER BY created_at, id"
        ))
        .bind(receipt_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Lines fetched inside the caller's transaction (used by void).
    pub async fn get_lines_in_tx(
        conn: &mut SqliteConnection,
        receipt_id: &str,
    ) -> DbResult<Vec<ReceiptLine>> {
        let lines = sqlx::query_as::<_, ReceiptLine>(&format!(
            "SELECT {LINE_COLUMNS} FROM receipt_lines WHERE receipt_id = ?1 ORDER BY created_at, id"
        ))
        .bind(receipt_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(lines)
    }

    /// Guarded flip `Draft -> Active`. Sets finalized_at and the evidence
    /// photo in the same statement.
    pub async fn mark_active(
        conn: &mut SqliteConnection,
        id: &str,
        photo_path: Option<&str>,
    ) -> LedgerResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE receipts
            SET status = 'active', photo_path = ?2, finalized_at = ?3, updated_at = ?3
            WHERE id = ?1 AND status = 'draft'
            "#,
        )
        .bind(id)
        .bind(photo_path)
        .bind(now)
        .execute(&mut *conn)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(Self::status_error(conn, id, "finalize").await);
        }

        Ok(())
    }

    /// Guarded flip `Active -> Voided`.
    pub async fn mark_voided(conn: &mut SqliteConnection, id: &str) -> LedgerResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE receipts SET status = 'voided', updated_at = ?2 \
             WHERE id = ?1 AND status = 'active'",
        )
        .bind(id)
        .bind(now)
        .execute(&mut *conn)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(Self::status_error(conn, id, "void").await);
        }

        Ok(())
    }

    /// Diagnoses why a guarded status flip missed.
    async fn status_error(conn: &mut SqliteConnection, id: &str, operation: &str) -> crate::error::LedgerError {
        let status: Result<Option<(ReceiptStatus,)>, sqlx::Error> =
            sqlx::query_as("SELECT status FROM receipts WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await;

        match status {
            Ok(None) => DbError::not_found("Receipt", id).into(),
            Ok(Some((ReceiptStatus::Voided,))) => CoreError::AlreadyVoided {
                entity: "Receipt".to_string(),
                id: id.to_string(),
            }
            .into(),
            Ok(Some((current,))) => CoreError::InvalidStatus {
                entity: "Receipt".to_string(),
                id: id.to_string(),
                current: current.as_str().to_string(),
                operation: operation.to_string(),
            }
            .into(),
            Err(e) => DbError::from(e).into(),
        }
    }
}
