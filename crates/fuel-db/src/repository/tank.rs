//! # Tank Repository
//!
//! Database operations for tanks - including the ONLY stock mutator in the
//! entire system.
//!
//! ## The Guarded Stock Update
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              How adjust_stock Stays Race-Free                           │
//! │                                                                         │
//! │  UPDATE tanks                                                           │
//! │  SET current_stock_cl = current_stock_cl + :delta,                      │
//! │      version          = version + 1                                     │
//! │  WHERE id = :id                                                         │
//! │    AND is_active = 1                                                    │
//! │    AND current_stock_cl + :delta >= 0            ← non-negativity       │
//! │    AND current_stock_cl + :delta <= capacity_cl  ← capacity bound       │
//! │  RETURNING current_stock_cl                                             │
//! │                                                                         │
//! │  The read-modify-write happens INSIDE one statement, which SQLite       │
//! │  serializes. A competing writer queues on the busy timeout and then     │
//! │  re-evaluates the predicate against committed state - there is no       │
//! │  window in which a stale read can be written back.                      │
//! │                                                                         │
//! │  Zero rows updated → re-read the tank to report the PRECISE failure:    │
//! │  NotFound / TankInactive / InsufficientStock / CapacityExceeded.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult, LedgerError, LedgerResult};
use fuel_core::validation::{validate_capacity, validate_initial_stock, validate_required};
use fuel_core::{CoreError, Tank, TankKind, TankSnapshot};

/// Input for registering a new tank.
#[derive(Debug, Clone)]
pub struct NewTank {
    pub name: String,
    pub kind: TankKind,
    pub capacity_cl: i64,
    pub initial_stock_cl: i64,
}

/// Result of a committed stock delta: the before/after snapshot the movement
/// ledger freezes into its rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockChange {
    pub stock_before_cl: i64,
    pub stock_after_cl: i64,
}

const TANK_COLUMNS: &str =
    "id, name, kind, capacity_cl, current_stock_cl, is_active, version, created_at, updated_at";

/// Repository for tank database operations.
#[derive(Debug, Clone)]
pub struct TankRepository {
    pool: SqlitePool,
}

impl TankRepository {
    /// Creates a new TankRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TankRepository { pool }
    }

    /// Registers a new tank.
    ///
    /// Fails validation if the capacity is not positive or the initial stock
    /// is outside `[0, capacity]`.
    pub async fn create(&self, new: NewTank) -> LedgerResult<Tank> {
        validate_required("name", &new.name).map_err(CoreError::from)?;
        validate_capacity(new.capacity_cl).map_err(CoreError::from)?;
        validate_initial_stock(new.initial_stock_cl, new.capacity_cl).map_err(CoreError::from)?;

        let now = Utc::now();
        let tank = Tank {
            id: Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            kind: new.kind,
            capacity_cl: new.capacity_cl,
            current_stock_cl: new.initial_stock_cl,
            is_active: true,
            version: 0,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %tank.id, name = %tank.name, capacity_cl = tank.capacity_cl, "Creating tank");

        sqlx::query(
            r#"
            INSERT INTO tanks (
                id, name, kind, capacity_cl, current_stock_cl,
                is_active, version, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&tank.id)
        .bind(&tank.name)
        .bind(tank.kind)
        .bind(tank.capacity_cl)
        .bind(tank.current_stock_cl)
        .bind(tank.is_active)
        .bind(tank.version)
        .bind(tank.created_at)
        .bind(tank.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(tank)
    }

    /// Gets a tank by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Tank>> {
        let tank = sqlx::query_as::<_, Tank>(&format!(
            "SELECT {TANK_COLUMNS} FROM tanks WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tank)
    }

    /// Read-only view for workflows and the UI.
    pub async fn snapshot(&self, id: &str) -> DbResult<Option<TankSnapshot>> {
        Ok(self.get_by_id(id).await?.map(|t| TankSnapshot::from(&t)))
    }

    /// Lists all tanks, active first, newest last.
    pub async fn list(&self) -> DbResult<Vec<Tank>> {
        let tanks = sqlx::query_as::<_, Tank>(&format!(
            "SELECT {TANK_COLUMNS} FROM tanks ORDER BY is_active DESC, created_at"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(tanks)
    }

    /// Activates or deactivates a tank (soft delete).
    pub async fn set_active(&self, id: &str, active: bool) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE tanks SET is_active = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Tank", id));
        }

        Ok(())
    }

    /// Atomically applies a signed stock delta to a tank.
    ///
    /// This is the single mutator of `current_stock_cl`. It runs inside the
    /// caller's transaction (`conn`) so a failing workflow rolls the change
    /// back together with everything else.
    ///
    /// Returns the before/after stock snapshot on success. On a predicate
    /// miss the tank is re-read on the same connection to report the precise
    /// domain error; the version counter disambiguates genuine races.
    pub async fn adjust_stock(
        conn: &mut SqliteConnection,
        tank_id: &str,
        delta_cl: i64,
    ) -> LedgerResult<StockChange> {
        let now = Utc::now();

        let updated: Option<(i64,)> = sqlx::query_as(
            r#"
            UPDATE tanks
            SET current_stock_cl = current_stock_cl + ?1,
                version = version + 1,
                updated_at = ?2
            WHERE id = ?3
              AND is_active = 1
              AND current_stock_cl + ?1 >= 0
              AND current_stock_cl + ?1 <= capacity_cl
            RETURNING current_stock_cl
            "#,
        )
        .bind(delta_cl)
        .bind(now)
        .bind(tank_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(DbError::from)?;

        if let Some((stock_after_cl,)) = updated {
            debug!(
                tank_id = %tank_id,
                delta_cl,
                stock_after_cl,
                "Stock adjusted"
            );
            return Ok(StockChange {
                stock_before_cl: stock_after_cl - delta_cl,
                stock_after_cl,
            });
        }

        // Predicate miss: diagnose on the same connection so the error
        // reflects the state this transaction actually observed.
        let tank = sqlx::query_as::<_, Tank>(&format!(
            "SELECT {TANK_COLUMNS} FROM tanks WHERE id = ?1"
        ))
        .bind(tank_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(DbError::from)?;

        let Some(tank) = tank else {
            return Err(CoreError::TankNotFound(tank_id.to_string()).into());
        };

        // apply_delta reproduces the UPDATE predicate and names the
        // violated invariant.
        match tank.apply_delta(delta_cl) {
            Err(core_err) => Err(core_err.into()),
            // The pure check passes but the UPDATE missed: another writer
            // must have slipped in between the two statements.
            Ok(_) => Err(LedgerError::ConcurrencyConflict {
                tank_id: tank_id.to_string(),
            }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn new_tank(capacity_cl: i64, initial_cl: i64) -> NewTank {
        NewTank {
            name: "Main Tank".to_string(),
            kind: TankKind::Fixed,
            capacity_cl,
            initial_stock_cl: initial_cl,
        }
    }

    #[tokio::test]
    async fn test_create_and_snapshot() {
        let db = test_db().await;
        let tank = db.tanks().create(new_tank(50_000, 10_000)).await.unwrap();

        let snap = db.tanks().snapshot(&tank.id).await.unwrap().unwrap();
        assert_eq!(snap.capacity_cl, 50_000);
        assert_eq!(snap.stock_cl, 10_000);
        assert!((snap.percentage - 20.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_capacity() {
        let db = test_db().await;

        let err = db.tanks().create(new_tank(0, 0)).await.unwrap_err();
        assert!(matches!(err, LedgerError::Core(CoreError::Validation(_))));

        let err = db.tanks().create(new_tank(1_000, 2_000)).await.unwrap_err();
        assert!(matches!(err, LedgerError::Core(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_adjust_stock_bounds() {
        let db = test_db().await;
        let tank = db.tanks().create(new_tank(50_000, 10_000)).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();

        // Inflow
        let change = TankRepository::adjust_stock(&mut conn, &tank.id, 5_000)
            .await
            .unwrap();
        assert_eq!(change.stock_before_cl, 10_000);
        assert_eq!(change.stock_after_cl, 15_000);

        // Outflow beyond stock
        let err = TankRepository::adjust_stock(&mut conn, &tank.id, -20_000)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::InsufficientStock { .. })
        ));

        // Inflow beyond capacity
        let err = TankRepository::adjust_stock(&mut conn, &tank.id, 40_000)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::CapacityExceeded { .. })
        ));

        // Failed adjustments must not have touched the stock
        drop(conn);
        let snap = db.tanks().snapshot(&tank.id).await.unwrap().unwrap();
        assert_eq!(snap.stock_cl, 15_000);
    }

    #[tokio::test]
    async fn test_adjust_stock_inactive_tank() {
        let db = test_db().await;
        let tank = db.tanks().create(new_tank(50_000, 10_000)).await.unwrap();
        db.tanks().set_active(&tank.id, false).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        let err = TankRepository::adjust_stock(&mut conn, &tank.id, 100)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Core(CoreError::TankInactive(_))));
    }

    #[tokio::test]
    async fn test_adjust_stock_unknown_tank() {
        let db = test_db().await;
        let mut conn = db.pool().acquire().await.unwrap();
        let err = TankRepository::adjust_stock(&mut conn, "missing", 100)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Core(CoreError::TankNotFound(_))));
    }
}
