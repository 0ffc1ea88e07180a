//! # Stock Transfer & Adjustment
//!
//! Inter-tank transfers and physical-recount corrections, expressed as
//! ordinary ledger movements under a shared document id.
//!
//! A transfer is two movements (TransferOut on the source, TransferIn on the
//! destination) in one transaction, so the fuel is never in two tanks or in
//! neither. An adjustment is a single movement with a mandatory note naming
//! the recount.

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::LedgerResult;
use crate::pool::Database;
use crate::repository::audit::AuditRepository;
use crate::service::ledger;
use fuel_core::validation::{validate_positive_amount, validate_required};
use fuel_core::{
    Actor, AuditAction, CoreError, DocumentKind, DocumentRef, Movement, MovementKind,
    ValidationError,
};

// =============================================================================
// Inputs
// =============================================================================

/// Input for an inter-tank transfer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransfer {
    pub from_tank_id: String,
    pub to_tank_id: String,
    pub liters_cl: i64,
    pub note: Option<String>,
}

/// Input for a stock adjustment after a physical recount.
///
/// `delta_cl` is signed: positive adds stock, negative removes it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAdjustment {
    pub tank_id: String,
    pub delta_cl: i64,
    pub note: String,
}

/// Result of a transfer: the two paired movements.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResult {
    pub transfer_id: String,
    pub out_movement: Movement,
    pub in_movement: Movement,
}

// =============================================================================
// Service
// =============================================================================

/// Transfers and adjustments on top of the movement ledger.
#[derive(Debug, Clone)]
pub struct StockService {
    db: Database,
}

impl StockService {
    /// Creates a new StockService.
    pub fn new(db: Database) -> Self {
        StockService { db }
    }

    /// Moves fuel between two distinct tanks atomically.
    pub async fn transfer(&self, new: NewTransfer, actor: &Actor) -> LedgerResult<TransferResult> {
        validate_required("from_tank_id", &new.from_tank_id).map_err(CoreError::from)?;
        validate_required("to_tank_id", &new.to_tank_id).map_err(CoreError::from)?;
        validate_positive_amount("liters", new.liters_cl).map_err(CoreError::from)?;

        if new.from_tank_id == new.to_tank_id {
            return Err(CoreError::Validation(ValidationError::InvalidFormat {
                field: "to_tank_id".to_string(),
                reason: "source and destination tanks must differ".to_string(),
            })
            .into());
        }

        let transfer_id = Uuid::new_v4().to_string();
        let document = DocumentRef::new(DocumentKind::Transfer, transfer_id.clone());

        let mut tx = self.db.pool().begin().await?;

        // Outbound leg first: an insufficient source fails before the
        // destination is touched.
        let out_movement = ledger::record_movement(
            &mut tx,
            MovementKind::TransferOut,
            document.clone(),
            &new.from_tank_id,
            new.liters_cl,
            actor,
            new.note.clone(),
        )
        .await?;

        let in_movement = ledger::record_movement(
            &mut tx,
            MovementKind::TransferIn,
            document,
            &new.to_tank_id,
            new.liters_cl,
            actor,
            new.note,
        )
        .await?;

        AuditRepository::append(
            &mut tx,
            DocumentKind::Transfer,
            &transfer_id,
            AuditAction::Created,
            actor,
        )
        .await?;
        tx.commit().await?;

        info!(
            transfer_id = %transfer_id,
            from = %new.from_tank_id,
            to = %new.to_tank_id,
            liters_cl = new.liters_cl,
            "Transfer completed"
        );

        Ok(TransferResult {
            transfer_id,
            out_movement,
            in_movement,
        })
    }

    /// Records a signed stock correction with a mandatory note.
    pub async fn adjust(&self, new: NewAdjustment, actor: &Actor) -> LedgerResult<Movement> {
        validate_required("tank_id", &new.tank_id).map_err(CoreError::from)?;
        validate_required("note", &new.note).map_err(CoreError::from)?;
        if new.delta_cl == 0 {
            return Err(CoreError::Validation(ValidationError::MustBePositive {
                field: "delta".to_string(),
            })
            .into());
        }

        let kind = if new.delta_cl > 0 {
            MovementKind::AdjustmentIn
        } else {
            MovementKind::AdjustmentOut
        };
        let amount_cl = new.delta_cl.abs();
        let adjustment_id = Uuid::new_v4().to_string();

        let mut tx = self.db.pool().begin().await?;

        let movement = ledger::record_movement(
            &mut tx,
            kind,
            DocumentRef::new(DocumentKind::Adjustment, adjustment_id.clone()),
            &new.tank_id,
            amount_cl,
            actor,
            Some(new.note),
        )
        .await?;

        AuditRepository::append(
            &mut tx,
            DocumentKind::Adjustment,
            &adjustment_id,
            AuditAction::Created,
            actor,
        )
        .await?;
        tx.commit().await?;

        info!(
            adjustment_id = %adjustment_id,
            tank_id = %new.tank_id,
            delta_cl = new.delta_cl,
            "Stock adjusted"
        );

        Ok(movement)
    }
}
