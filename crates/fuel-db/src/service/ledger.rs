//! # Movement Ledger
//!
//! The two primitives every workflow is built from: apply a typed stock
//! delta, and exactly compensate a previously applied one.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     record_movement / void_movement                     │
//! │                                                                         │
//! │  record_movement(kind, document, tank, amount)                          │
//! │    1. amount > 0                             (ValidationError)          │
//! │    2. delta = kind.signed_delta(amount)                                 │
//! │    3. TankRepository::adjust_stock(delta)    (the guarded UPDATE)       │
//! │    4. INSERT movement {stock_before, stock_after, status: active}       │
//! │                                                                         │
//! │  void_movement(movement_id)                                             │
//! │    1. flip status active → voided            (AlreadyVoided guard)      │
//! │    2. adjust_stock(inverse delta)            (may CapacityExceeded)     │
//! │                                                                         │
//! │  Both run inside the CALLER's transaction: any failure rolls back       │
//! │  the stock change, the movement row and the document change together.   │
//! │  No partial row ever survives.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The status flip in `void_movement` happens BEFORE the stock reversal on
//! purpose: it is the transaction's first write, so the writer lock is taken
//! up front and the at-most-once guard evaluates against committed state.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::info;
use uuid::Uuid;

use crate::error::LedgerResult;
use crate::repository::movement::MovementRepository;
use crate::repository::tank::TankRepository;
use fuel_core::validation::validate_positive_amount;
use fuel_core::{
    Actor, CoreError, DocumentRef, Movement, MovementKind, MovementStatus,
};

/// Applies one typed stock delta and persists the ledger row.
///
/// On any failure the caller's transaction must be rolled back; nothing in
/// here is observable until the caller commits.
pub async fn record_movement(
    conn: &mut SqliteConnection,
    kind: MovementKind,
    document: DocumentRef,
    tank_id: &str,
    amount_cl: i64,
    actor: &Actor,
    note: Option<String>,
) -> LedgerResult<Movement> {
    validate_positive_amount("amount", amount_cl).map_err(CoreError::from)?;

    let delta_cl = kind.signed_delta(amount_cl);
    let change = TankRepository::adjust_stock(conn, tank_id, delta_cl).await?;

    let movement = Movement {
        id: Uuid::new_v4().to_string(),
        kind,
        document_kind: document.kind,
        document_id: document.id,
        tank_id: tank_id.to_string(),
        amount_cl,
        stock_before_cl: change.stock_before_cl,
        stock_after_cl: change.stock_after_cl,
        status: MovementStatus::Active,
        actor_id: actor.user_id.clone(),
        note,
        created_at: Utc::now(),
    };

    MovementRepository::insert(conn, &movement).await?;

    info!(
        movement_id = %movement.id,
        tank_id = %tank_id,
        ?kind,
        amount_cl,
        stock_after_cl = change.stock_after_cl,
        "Movement recorded"
    );

    Ok(movement)
}

/// Exactly compensates a previously recorded movement, at most once.
///
/// The inverse delta goes through the same bounded `adjust_stock`, so
/// reversing a dispense into a since-refilled tank fails `CapacityExceeded`
/// and the caller's transaction rolls back - the movement stays Active.
pub async fn void_movement(
    conn: &mut SqliteConnection,
    movement_id: &str,
    actor: &Actor,
) -> LedgerResult<Movement> {
    // First write of the void path: the at-most-once guard.
    MovementRepository::mark_voided(conn, movement_id).await?;

    let movement = MovementRepository::fetch_in_tx(conn, movement_id).await?;

    TankRepository::adjust_stock(conn, &movement.tank_id, movement.inverse_delta()).await?;

    info!(
        movement_id = %movement_id,
        tank_id = %movement.tank_id,
        inverse_delta_cl = movement.inverse_delta(),
        actor = %actor.user_id,
        "Movement voided"
    );

    Ok(movement)
}
