//! # Dispense Workflow (Egreso)
//!
//! Single-tank fuel withdrawal, created stock-effective in one step.
//!
//! ## Authorization
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Dispense Authorization                               │
//! │                                                                         │
//! │  Internal (company machine on a job)                                    │
//! │    ├── machine_id + job_type_id required                                │
//! │    ├── deliverer PIN verified                                           │
//! │    └── receiver PIN verified (dual-PIN handshake)                       │
//! │                                                                         │
//! │  External (third-party vehicle)                                         │
//! │    ├── external_ref required (e.g. plate number)                        │
//! │    └── deliverer PIN verified only                                      │
//! │                                                                         │
//! │  Any failed PIN → PinInvalid, NOTHING persisted.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All reads and PIN checks happen before the write transaction opens; the
//! transaction's first statement is the dispense INSERT, so the writer lock
//! is held before the authoritative stock check runs.

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::LedgerResult;
use crate::pool::Database;
use crate::repository::audit::AuditRepository;
use crate::repository::dispense::DispenseRepository;
use crate::service::ledger;
use fuel_core::validation::{dispensed_liters, validate_required};
use fuel_core::{
    Actor, AuditAction, CoreError, Dispense, DispenseKind, DispenseStatus, DocumentKind,
    DocumentRef, MovementKind,
};

// =============================================================================
// Input
// =============================================================================

/// Input for creating a dispense.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDispense {
    pub tank_id: String,
    pub kind: DispenseKind,
    /// Machine catalog id (Internal only).
    pub machine_id: Option<String>,
    /// Job type catalog id (Internal only).
    pub job_type_id: Option<String>,
    /// External vehicle reference (External only).
    pub external_ref: Option<String>,
    pub deliverer_id: String,
    pub deliverer_pin: String,
    pub receiver_id: Option<String>,
    pub receiver_pin: Option<String>,
    pub meter_start_cl: i64,
    pub meter_end_cl: i64,
}

// =============================================================================
// Service
// =============================================================================

/// Transactional dispense workflow.
#[derive(Debug, Clone)]
pub struct DispenseService {
    db: Database,
}

impl DispenseService {
    /// Creates a new DispenseService.
    pub fn new(db: Database) -> Self {
        DispenseService { db }
    }

    /// Creates an Active dispense: validation, dual PIN, then one atomic
    /// write transaction.
    pub async fn create(&self, new: NewDispense, actor: &Actor) -> LedgerResult<Dispense> {
        validate_required("tank_id", &new.tank_id).map_err(CoreError::from)?;
        validate_required("deliverer_id", &new.deliverer_id).map_err(CoreError::from)?;
        let liters_cl =
            dispensed_liters(new.meter_start_cl, new.meter_end_cl).map_err(CoreError::from)?;

        let receiver_id = self.validate_kind_fields(&new)?;

        // Advisory pre-check against the snapshot. The guarded UPDATE inside
        // the transaction is the authoritative check; this one exists to
        // fail fast before the PIN ceremony.
        let tank = self
            .db
            .tanks()
            .get_by_id(&new.tank_id)
            .await?
            .ok_or_else(|| CoreError::TankNotFound(new.tank_id.clone()))?;
        tank.apply_delta(-liters_cl)?;

        self.verify_pin(&new.deliverer_id, &new.deliverer_pin).await?;
        if let (Some(person), Some(pin)) = (&receiver_id, &new.receiver_pin) {
            self.verify_pin(person, pin).await?;
        }

        let now = Utc::now();
        let mut dispense = Dispense {
            id: Uuid::new_v4().to_string(),
            tank_id: new.tank_id.clone(),
            kind: new.kind,
            machine_id: new.machine_id,
            job_type_id: new.job_type_id,
            external_ref: new.external_ref,
            deliverer_id: new.deliverer_id,
            receiver_id,
            meter_start_cl: new.meter_start_cl,
            meter_end_cl: new.meter_end_cl,
            liters_cl,
            movement_id: None,
            status: DispenseStatus::Active,
            created_by: actor.user_id.clone(),
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.db.pool().begin().await?;

        // First write: takes the writer lock before the stock check.
        DispenseRepository::insert(&mut tx, &dispense).await?;

        let movement = ledger::record_movement(
            &mut tx,
            MovementKind::Dispense,
            DocumentRef::new(DocumentKind::Dispense, dispense.id.clone()),
            &dispense.tank_id,
            liters_cl,
            actor,
            None,
        )
        .await?;

        DispenseRepository::set_movement_id(&mut tx, &dispense.id, &movement.id).await?;
        AuditRepository::append(
            &mut tx,
            DocumentKind::Dispense,
            &dispense.id,
            AuditAction::Created,
            actor,
        )
        .await?;
        tx.commit().await?;

        dispense.movement_id = Some(movement.id);

        info!(
            dispense_id = %dispense.id,
            tank_id = %dispense.tank_id,
            liters_cl,
            kind = ?dispense.kind,
            "Dispense created"
        );

        Ok(dispense)
    }

    /// Voids an Active dispense, returning the fuel to its tank.
    ///
    /// The reversal re-checks capacity; if the tank was refilled in the
    /// meantime the whole transaction rolls back and the dispense stays
    /// Active.
    pub async fn void(&self, dispense_id: &str, actor: &Actor) -> LedgerResult<Dispense> {
        let mut tx = self.db.pool().begin().await?;

        // First write: the exactly-once guard.
        DispenseRepository::mark_voided(&mut tx, dispense_id).await?;

        let dispense = DispenseRepository::fetch_in_tx(&mut tx, dispense_id).await?;
        if let Some(movement_id) = &dispense.movement_id {
            ledger::void_movement(&mut tx, movement_id, actor).await?;
        }

        AuditRepository::append(
            &mut tx,
            DocumentKind::Dispense,
            dispense_id,
            AuditAction::Voided,
            actor,
        )
        .await?;
        tx.commit().await?;

        warn!(
            dispense_id = %dispense_id,
            tank_id = %dispense.tank_id,
            liters_cl = dispense.liters_cl,
            actor = %actor.user_id,
            "Dispense voided"
        );

        self.db
            .dispenses()
            .get_by_id(dispense_id)
            .await?
            .ok_or_else(|| crate::error::DbError::not_found("Dispense", dispense_id).into())
    }

    /// Kind-specific field requirements. Returns the receiver to verify,
    /// if any.
    fn validate_kind_fields(&self, new: &NewDispense) -> LedgerResult<Option<String>> {
        match new.kind {
            DispenseKind::Internal => {
                let machine = new.machine_id.as_deref().unwrap_or("");
                let job = new.job_type_id.as_deref().unwrap_or("");
                validate_required("machine_id", machine).map_err(CoreError::from)?;
                validate_required("job_type_id", job).map_err(CoreError::from)?;

                let receiver = new.receiver_id.as_deref().unwrap_or("");
                validate_required("receiver_id", receiver).map_err(CoreError::from)?;
                if new.receiver_pin.as_deref().unwrap_or("").is_empty() {
                    return Err(CoreError::from(
                        fuel_core::ValidationError::Required {
                            field: "receiver_pin".to_string(),
                        },
                    )
                    .into());
                }
                Ok(new.receiver_id.clone())
            }
            DispenseKind::External => {
                let external = new.external_ref.as_deref().unwrap_or("");
                validate_required("external_ref", external).map_err(CoreError::from)?;
                Ok(None)
            }
        }
    }

    /// Maps a failed check to `PinInvalid` without leaking whether the
    /// person exists.
    async fn verify_pin(&self, person_id: &str, pin: &str) -> LedgerResult<()> {
        if self.db.personnel().verify(person_id, pin).await? {
            Ok(())
        } else {
            warn!(person_id = %person_id, "PIN verification failed");
            Err(CoreError::PinInvalid {
                person_id: person_id.to_string(),
            }
            .into())
        }
    }
}
