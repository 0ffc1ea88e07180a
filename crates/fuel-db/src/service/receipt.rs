//! # Receipt Workflow (Ingreso)
//!
//! Two-phase purchase intake: a Draft is captured first (no stock effect),
//! then finalized into the ledger, optionally voided later.
//!
//! ## Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Receipt Workflow                                   │
//! │                                                                         │
//! │  create(new, actor)                    one transaction                  │
//! │    └── insert Draft + audit Created    (stock untouched)                │
//! │                                                                         │
//! │  finalize(id, lines, photo, actor)     one transaction                  │
//! │    ├── sum(lines) == declared_total    (exact, validated up front)      │
//! │    ├── guarded flip Draft → Active     (first write)                    │
//! │    ├── per line: Receipt movement + line row carrying the movement id   │
//! │    └── audit Finalized                                                  │
//! │                                                                         │
//! │  void(id, actor)                       one transaction                  │
//! │    ├── guarded flip Active → Voided    (first write)                    │
//! │    ├── per line: void_movement (inverse delta)                          │
//! │    └── audit Voided                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Line failures abort the whole transaction: a receipt is either fully
//! applied across all its tanks or not applied at all.

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::LedgerResult;
use crate::pool::Database;
use crate::repository::audit::AuditRepository;
use crate::repository::receipt::ReceiptRepository;
use crate::service::ledger;
use fuel_core::validation::{
    validate_positive_amount, validate_receipt_lines, validate_required,
};
use fuel_core::{
    Actor, AuditAction, CoreError, DocumentKind, DocumentRef, MovementKind, Receipt,
    ReceiptLine, ReceiptStatus,
};

// =============================================================================
// Inputs
// =============================================================================

/// Input for creating a draft receipt.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReceipt {
    /// External supplier catalog id.
    pub supplier_id: String,
    /// External payment-type catalog id.
    pub payment_type: String,
    /// Declared total on the purchase invoice, in centiliters.
    pub declared_total_cl: i64,
    /// Unit price in cents per liter.
    pub unit_price_cents: i64,
}

/// One tank's share of a receipt, supplied at finalize.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReceiptLine {
    pub tank_id: String,
    pub liters_cl: i64,
    pub meter_start_cl: Option<i64>,
    pub meter_end_cl: Option<i64>,
}

// =============================================================================
// Service
// =============================================================================

/// Transactional receipt workflow.
#[derive(Debug, Clone)]
pub struct ReceiptService {
    db: Database,
}

impl ReceiptService {
    /// Creates a new ReceiptService.
    pub fn new(db: Database) -> Self {
        ReceiptService { db }
    }

    /// Captures a Draft receipt. No stock effect until finalize.
    pub async fn create(&self, new: NewReceipt, actor: &Actor) -> LedgerResult<Receipt> {
        validate_required("supplier_id", &new.supplier_id).map_err(CoreError::from)?;
        validate_required("payment_type", &new.payment_type).map_err(CoreError::from)?;
        validate_positive_amount("declared_total", new.declared_total_cl)
            .map_err(CoreError::from)?;
        validate_positive_amount("unit_price", new.unit_price_cents).map_err(CoreError::from)?;

        let now = Utc::now();
        let receipt = Receipt {
            id: Uuid::new_v4().to_string(),
            supplier_id: new.supplier_id,
            payment_type: new.payment_type,
            declared_total_cl: new.declared_total_cl,
            unit_price_cents: new.unit_price_cents,
            status: ReceiptStatus::Draft,
            photo_path: None,
            created_by: actor.user_id.clone(),
            created_at: now,
            updated_at: now,
            finalized_at: None,
        };

        let mut tx = self.db.pool().begin().await?;
        ReceiptRepository::insert(&mut tx, &receipt).await?;
        AuditRepository::append(
            &mut tx,
            DocumentKind::Receipt,
            &receipt.id,
            AuditAction::Created,
            actor,
        )
        .await?;
        tx.commit().await?;

        info!(
            receipt_id = %receipt.id,
            supplier = %receipt.supplier_id,
            declared_total_cl = receipt.declared_total_cl,
            "Draft receipt created"
        );

        Ok(receipt)
    }

    /// Finalizes a Draft receipt: applies one movement per line atomically.
    pub async fn finalize(
        &self,
        receipt_id: &str,
        lines: Vec<NewReceiptLine>,
        photo_path: Option<String>,
        actor: &Actor,
    ) -> LedgerResult<Receipt> {
        let receipt = self
            .db
            .receipts()
            .get_by_id(receipt_id)
            .await?
            .ok_or_else(|| crate::error::DbError::not_found("Receipt", receipt_id))?;

        let line_volumes: Vec<i64> = lines.iter().map(|l| l.liters_cl).collect();
        validate_receipt_lines(&line_volumes, receipt.declared_total_cl)?;
        for line in &lines {
            validate_required("tank_id", &line.tank_id).map_err(CoreError::from)?;
        }

        let mut tx = self.db.pool().begin().await?;

        // First write: the Draft -> Active guard rejects a competing
        // finalize before any stock is touched.
        ReceiptRepository::mark_active(&mut tx, receipt_id, photo_path.as_deref()).await?;

        for line in &lines {
            let movement = ledger::record_movement(
                &mut tx,
                MovementKind::Receipt,
                DocumentRef::new(DocumentKind::Receipt, receipt_id),
                &line.tank_id,
                line.liters_cl,
                actor,
                None,
            )
            .await?;

            let row = ReceiptLine {
                id: Uuid::new_v4().to_string(),
                receipt_id: receipt_id.to_string(),
                tank_id: line.tank_id.clone(),
                liters_cl: line.liters_cl,
                meter_start_cl: line.meter_start_cl,
                meter_end_cl: line.meter_end_cl,
                movement_id: Some(movement.id),
                created_at: Utc::now(),
            };
            ReceiptRepository::insert_line(&mut tx, &row).await?;
        }

        AuditRepository::append(
            &mut tx,
            DocumentKind::Receipt,
            receipt_id,
            AuditAction::Finalized,
            actor,
        )
        .await?;
        tx.commit().await?;

        info!(
            receipt_id = %receipt_id,
            lines = lines.len(),
            total_cl = receipt.declared_total_cl,
            "Receipt finalized"
        );

        self.db
            .receipts()
            .get_by_id(receipt_id)
            .await?
            .ok_or_else(|| crate::error::DbError::not_found("Receipt", receipt_id).into())
    }

    /// Voids an Active receipt: reverses every line's movement, or none.
    pub async fn void(&self, receipt_id: &str, actor: &Actor) -> LedgerResult<Receipt> {
        let mut tx = self.db.pool().begin().await?;

        // First write: the Active -> Voided guard makes the void
        // exactly-once under concurrent attempts.
        ReceiptRepository::mark_voided(&mut tx, receipt_id).await?;

        let lines = ReceiptRepository::get_lines_in_tx(&mut tx, receipt_id).await?;
        for line in &lines {
            if let Some(movement_id) = &line.movement_id {
                ledger::void_movement(&mut tx, movement_id, actor).await?;
            }
        }

        AuditRepository::append(
            &mut tx,
            DocumentKind::Receipt,
            receipt_id,
            AuditAction::Voided,
            actor,
        )
        .await?;
        tx.commit().await?;

        warn!(
            receipt_id = %receipt_id,
            lines = lines.len(),
            actor = %actor.user_id,
            "Receipt voided"
        );

        self.db
            .receipts()
            .get_by_id(receipt_id)
            .await?
            .ok_or_else(|| crate::error::DbError::not_found("Receipt", receipt_id).into())
    }
}
