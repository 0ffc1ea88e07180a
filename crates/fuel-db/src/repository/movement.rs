//! # Movement Repository
//!
//! Database operations for ledger movements.
//!
//! ## Immutability Contract
//! A movement row is inserted once, optionally gets its `status` flipped to
//! `voided` exactly once, and is NEVER deleted. There is deliberately no
//! generic update method on this repository.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult, LedgerResult};
use fuel_core::{CoreError, DocumentKind, Movement, MovementKind, MovementStatus};

const MOVEMENT_COLUMNS: &str = "id, kind, document_kind, document_id, tank_id, amount_cl, \
     stock_before_cl, stock_after_cl, status, actor_id, note, created_at";

/// Filter for the movement history query. All fields optional.
#[derive(Debug, Clone, Default)]
pub struct MovementFilter {
    pub tank_id: Option<String>,
    pub kind: Option<MovementKind>,
    pub status: Option<MovementStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
}

/// Repository for movement database operations.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    pool: SqlitePool,
}

impl MovementRepository {
    /// Creates a new MovementRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MovementRepository { pool }
    }

    /// Inserts a movement row inside the caller's transaction.
    pub async fn insert(conn: &mut SqliteConnection, movement: &Movement) -> DbResult<()> {
        debug!(
            id = %movement.id,
            tank_id = %movement.tank_id,
            amount_cl = movement.amount_cl,
            "Inserting movement"
        );

        sqlx::query(
            r#"
            INSERT INTO movements (
                id, kind, document_kind, document_id, tank_id,
                amount_cl, stock_before_cl, stock_after_cl,
                status, actor_id, note, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&movement.id)
        .bind(movement.kind)
        .bind(movement.document_kind)
        .bind(&movement.document_id)
        .bind(&movement.tank_id)
        .bind(movement.amount_cl)
        .bind(movement.stock_before_cl)
        .bind(movement.stock_after_cl)
        .bind(movement.status)
        .bind(&movement.actor_id)
        .bind(&movement.note)
        .bind(movement.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Gets a movement by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Movement>> {
        let movement = sqlx::query_as::<_, Movement>(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM movements WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(movement)
    }

    /// Fetches a movement by ID inside the caller's transaction.
    pub async fn fetch_in_tx(conn: &mut SqliteConnection, id: &str) -> DbResult<Movement> {
        let movement = sqlx::query_as::<_, Movement>(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM movements WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        movement.ok_or_else(|| DbError::not_found("Movement", id))
    }

    /// All movements belonging to one source document, oldest first.
    pub async fn list_for_document(
        &self,
        document_kind: DocumentKind,
        document_id: &str,
    ) -> DbResult<Vec<Movement>> {
        let movements = sqlx::query_as::<_, Movement>(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM movements \
             WHERE document_kind = ?1 AND document_id = ?2 \
             ORDER BY created_at, id"
        ))
        .bind(document_kind)
        .bind(document_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Flips a movement's status `active -> voided`, exactly once.
    ///
    /// The guard is the WHERE clause: zero rows affected on an existing
    /// movement means it was already voided - the ledger's at-most-once
    /// reversal invariant, enforced at the row level.
    pub async fn mark_voided(conn: &mut SqliteConnection, id: &str) -> LedgerResult<()> {
        let result = sqlx::query(
            "UPDATE movements SET status = 'voided' WHERE id = ?1 AND status = 'active'",
        )
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            let exists: Option<(i64,)> =
                sqlx::query_as("SELECT 1 FROM movements WHERE id = ?1")
                    .bind(id)
                    .fetch_optional(&mut *conn)
                    .await
                    .map_err(DbError::from)?;

            return match exists {
                None => Err(DbError::not_found("Movement", id).into()),
                Some(_) => Err(CoreError::AlreadyVoided {
                    entity: "Movement".to_string(),
                    id: id.to_string(),
                }
                .into()),
            };
        }

        debug!(id = %id, "Movement voided");
        Ok(())
    }

    /// Movement history with optional filters, ordered by commit time.
    ///
    /// Built dynamically - only the filters the caller supplied become
    /// predicates.
    pub async fn history(&self, filter: &MovementFilter) -> DbResult<Vec<Movement>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {MOVEMENT_COLUMNS} FROM movements WHERE 1 = 1"
        ));

        if let Some(tank_id) = &filter.tank_id {
            qb.push(" AND tank_id = ").push_bind(tank_id);
        }
        if let Some(kind) = filter.kind {
            qb.push(" AND kind = ").push_bind(kind);
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(from) = filter.from {
            qb.push(" AND created_at >= ").push_bind(from);
        }
        if let Some(to) = filter.to {
            qb.push(" AND created_at <= ").push_bind(to);
        }

        qb.push(" ORDER BY created_at, id");

        if let Some(limit) = filter.limit {
            qb.push(" LIMIT ").push_bind(limit as i64);
        }

        let movements = qb
            .build_query_as::<Movement>()
            .fetch_all(&self.pool)
            .await?;

        Ok(movements)
    }
}
