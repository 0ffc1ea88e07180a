//! # Domain Types
//!
//! Core domain types of the fuel inventory ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Tank       │   │    Movement     │   │   AuditEntry    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  capacity_cl    │   │  kind           │   │  document ref   │       │
//! │  │  current_stock  │   │  stock_before   │   │  action         │       │
//! │  │  version        │   │  stock_after    │   │  actor, ip      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │     Receipt     │   │    Dispense     │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  Draft→Active   │   │  Active→Voided  │                             │
//! │  │  →Voided        │   │  dual PIN       │                             │
//! │  │  1..N lines     │   │  single tank    │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has a UUID v4 `id` (immutable, used for relations). Catalog
//! references (supplier, machine, job type, personnel) are opaque external
//! ids - the ledger never interprets them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::volume::Volume;

// =============================================================================
// Tank
// =============================================================================

/// Physical placement of a tank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum TankKind {
    /// Stationary tank at the yard.
    Fixed,
    /// Tank mounted on a service truck.
    Mobile,
}

/// A fuel reservoir with bounded capacity and a live stock level.
///
/// ## Invariant
/// `0 <= current_stock_cl <= capacity_cl` holds after every committed
/// operation. The stock is mutated ONLY through the ledger's guarded delta
/// operation, never written directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Tank {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, e.g. "Tanque Principal".
    pub name: String,

    /// Fixed or mobile.
    pub kind: TankKind,

    /// Physical capacity in centiliters (> 0).
    pub capacity_cl: i64,

    /// Live stock level in centiliters.
    pub current_stock_cl: i64,

    /// Whether the tank accepts movements (soft delete).
    pub is_active: bool,

    /// Optimistic concurrency counter, bumped on every stock change.
    pub version: i64,

    /// When the tank was registered.
    pub created_at: DateTime<Utc>,

    /// When the tank was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Tank {
    /// Returns the capacity as a Volume.
    #[inline]
    pub fn capacity(&self) -> Volume {
        Volume::from_centiliters(self.capacity_cl)
    }

    /// Returns the live stock as a Volume.
    #[inline]
    pub fn stock(&self) -> Volume {
        Volume::from_centiliters(self.current_stock_cl)
    }

    /// Fill level as a percentage (display only - never used in rules).
    pub fn fill_percentage(&self) -> f64 {
        if self.capacity_cl == 0 {
            return 0.0;
        }
        self.current_stock_cl as f64 * 100.0 / self.capacity_cl as f64
    }

    /// Pure compare-and-apply of a signed stock delta.
    ///
    /// Returns the new stock level, or the precise invariant violation.
    /// The persistence layer enforces the same predicate atomically inside
    /// the UPDATE statement; this method is the rule of record and the one
    /// unit tests exercise.
    pub fn apply_delta(&self, delta_cl: i64) -> CoreResult<i64> {
        if !self.is_active {
            return Err(CoreError::TankInactive(self.id.clone()));
        }

        let new_stock = self.current_stock_cl + delta_cl;

        if new_stock < 0 {
            return Err(CoreError::InsufficientStock {
                tank_id: self.id.clone(),
                available_cl: self.current_stock_cl,
                requested_cl: -delta_cl,
            });
        }

        if new_stock > self.capacity_cl {
            return Err(CoreError::CapacityExceeded {
                tank_id: self.id.clone(),
                capacity_cl: self.capacity_cl,
                attempted_cl: new_stock,
            });
        }

        Ok(new_stock)
    }
}

/// Read-only view of a tank for workflows and the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TankSnapshot {
    pub tank_id: String,
    pub name: String,
    pub kind: TankKind,
    pub capacity_cl: i64,
    pub stock_cl: i64,
    pub percentage: f64,
    pub is_active: bool,
}

impl From<&Tank> for TankSnapshot {
    fn from(tank: &Tank) -> Self {
        TankSnapshot {
            tank_id: tank.id.clone(),
            name: tank.name.clone(),
            kind: tank.kind,
            capacity_cl: tank.capacity_cl,
            stock_cl: tank.current_stock_cl,
            percentage: tank.fill_percentage(),
            is_active: tank.is_active,
        }
    }
}

// =============================================================================
// Movement
// =============================================================================

/// The kind of a stock-affecting event.
///
/// The sign of the stock delta is a total function of the kind - amounts are
/// always positive magnitudes, so there is no signed-amount ambiguity in the
/// ledger rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Fuel purchased and pumped in (receipt line).
    Receipt,
    /// Fuel withdrawn to a machine or external vehicle.
    Dispense,
    /// Inbound leg of an inter-tank transfer.
    TransferIn,
    /// Outbound leg of an inter-tank transfer.
    TransferOut,
    /// Upward stock correction after a physical recount.
    AdjustmentIn,
    /// Downward stock correction after a physical recount.
    AdjustmentOut,
}

impl MovementKind {
    /// Whether the kind adds stock to its tank.
    #[inline]
    pub const fn is_inflow(&self) -> bool {
        matches!(
            self,
            MovementKind::Receipt | MovementKind::TransferIn | MovementKind::AdjustmentIn
        )
    }

    /// Signed stock delta for a positive amount magnitude.
    #[inline]
    pub const fn signed_delta(&self, amount_cl: i64) -> i64 {
        if self.is_inflow() {
            amount_cl
        } else {
            -amount_cl
        }
    }
}

/// Status of a ledger movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum MovementStatus {
    /// The stock effect is applied.
    Active,
    /// The stock effect was exactly compensated by a reversal.
    Voided,
}

/// The kind of source document a movement belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Receipt,
    Dispense,
    Transfer,
    Adjustment,
}

/// Reference to the source document of a movement or audit entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRef {
    pub kind: DocumentKind,
    pub id: String,
}

impl DocumentRef {
    pub fn new(kind: DocumentKind, id: impl Into<String>) -> Self {
        DocumentRef {
            kind,
            id: id.into(),
        }
    }
}

/// One stock-affecting event, with before/after balances frozen at commit
/// time.
///
/// ## Immutability
/// A movement row is never updated except for the single `status` flip on
/// void, and never deleted. The `stock_before_cl`/`stock_after_cl` snapshot
/// allows point-in-time stock reconstruction without replaying the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Movement {
    pub id: String,
    pub kind: MovementKind,
    pub document_kind: DocumentKind,
    pub document_id: String,
    pub tank_id: String,
    /// Positive magnitude in centiliters; sign comes from `kind`.
    pub amount_cl: i64,
    /// Tank stock at the instant the movement committed.
    pub stock_before_cl: i64,
    /// Tank stock immediately after: `stock_before ± amount`.
    pub stock_after_cl: i64,
    pub status: MovementStatus,
    pub actor_id: String,
    /// Free-form note; mandatory for adjustments.
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Movement {
    /// The signed delta this movement applied to its tank.
    #[inline]
    pub fn signed_delta(&self) -> i64 {
        self.kind.signed_delta(self.amount_cl)
    }

    /// The delta that exactly compensates this movement on void.
    #[inline]
    pub fn inverse_delta(&self) -> i64 {
        -self.signed_delta()
    }

    /// Reference to the owning document.
    pub fn document(&self) -> DocumentRef {
        DocumentRef::new(self.document_kind, self.document_id.clone())
    }
}

// =============================================================================
// Receipt (Ingreso)
// =============================================================================

/// State machine of a purchase receipt: `Draft -> Active -> Voided`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStatus {
    /// Captured but not yet stock-effective.
    Draft,
    /// Finalized; one movement per line applied.
    Active,
    /// Every line's movement reversed.
    Voided,
}

impl ReceiptStatus {
    /// Only a Draft receipt may be finalized.
    #[inline]
    pub const fn can_finalize(&self) -> bool {
        matches!(self, ReceiptStatus::Draft)
    }

    /// Only an Active receipt may be voided.
    #[inline]
    pub const fn can_void(&self) -> bool {
        matches!(self, ReceiptStatus::Active)
    }

    /// Stable lowercase name, matching the persisted representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ReceiptStatus::Draft => "draft",
            ReceiptStatus::Active => "active",
            ReceiptStatus::Voided => "voided",
        }
    }
}

impl Default for ReceiptStatus {
    fn default() -> Self {
        ReceiptStatus::Draft
    }
}

/// A purchase document distributing incoming fuel across 1..N tanks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Receipt {
    pub id: String,
    /// External supplier catalog id.
    pub supplier_id: String,
    /// External payment-type catalog id (cash, credit, ...).
    pub payment_type: String,
    /// Declared total liters on the purchase invoice, in centiliters.
    pub declared_total_cl: i64,
    /// Unit price in cents per liter.
    pub unit_price_cents: i64,
    pub status: ReceiptStatus,
    /// Meter photo evidence, captured at finalize.
    pub photo_path: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub finalized_at: Option<DateTime<Utc>>,
}

/// One tank's share of a receipt. Liters across all lines must sum to the
/// receipt's declared total before the receipt may go Active.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ReceiptLine {
    pub id: String,
    pub receipt_id: String,
    pub tank_id: String,
    pub liters_cl: i64,
    pub meter_start_cl: Option<i64>,
    pub meter_end_cl: Option<i64>,
    /// Ledger movement applied at finalize; None while the receipt is Draft.
    pub movement_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Dispense (Egreso)
// =============================================================================

/// Destination class of a dispense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum DispenseKind {
    /// Company machine on a job; requires machine + job ids and dual PIN.
    Internal,
    /// External vehicle; lighter validation, deliverer PIN only.
    External,
}

/// Status of a dispense document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum DispenseStatus {
    Active,
    Voided,
}

impl DispenseStatus {
    #[inline]
    pub const fn can_void(&self) -> bool {
        matches!(self, DispenseStatus::Active)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            DispenseStatus::Active => "active",
            DispenseStatus::Voided => "voided",
        }
    }
}

/// A single-tank fuel withdrawal, created stock-effective in one step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Dispense {
    pub id: String,
    pub tank_id: String,
    pub kind: DispenseKind,
    /// Machine catalog id (Internal only).
    pub machine_id: Option<String>,
    /// Job type catalog id (Internal only).
    pub job_type_id: Option<String>,
    /// External vehicle reference, e.g. a plate number (External only).
    pub external_ref: Option<String>,
    /// Person who operated the pump. Always PIN-verified.
    pub deliverer_id: String,
    /// Person who received the fuel. PIN-verified for Internal dispenses.
    pub receiver_id: Option<String>,
    pub meter_start_cl: i64,
    pub meter_end_cl: i64,
    /// Computed `meter_start - meter_end`, frozen at creation.
    pub liters_cl: i64,
    /// Ledger movement applied at creation.
    pub movement_id: Option<String>,
    pub status: DispenseStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Audit Trail (Bitácora)
// =============================================================================

/// Lifecycle action recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Created,
    Finalized,
    Voided,
}

/// Append-only record of one lifecycle transition. Never updated, never
/// deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AuditEntry {
    pub id: String,
    pub document_kind: DocumentKind,
    pub document_id: String,
    pub action: AuditAction,
    pub actor_id: String,
    pub ip: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Actor
// =============================================================================

/// The authenticated identity performing an operation.
///
/// Identity management is an external collaborator; the ledger only records
/// the attribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub user_id: String,
    pub ip: Option<String>,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, ip: Option<String>) -> Self {
        Actor {
            user_id: user_id.into(),
            ip,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn tank(stock_cl: i64, capacity_cl: i64, active: bool) -> Tank {
        let now = Utc::now();
        Tank {
            id: "tank-1".to_string(),
            name: "Main Tank".to_string(),
            kind: TankKind::Fixed,
            capacity_cl,
            current_stock_cl: stock_cl,
            is_active: active,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_movement_kind_signs() {
        assert_eq!(MovementKind::Receipt.signed_delta(500), 500);
        assert_eq!(MovementKind::TransferIn.signed_delta(500), 500);
        assert_eq!(MovementKind::AdjustmentIn.signed_delta(500), 500);
        assert_eq!(MovementKind::Dispense.signed_delta(500), -500);
        assert_eq!(MovementKind::TransferOut.signed_delta(500), -500);
        assert_eq!(MovementKind::AdjustmentOut.signed_delta(500), -500);
    }

    #[test]
    fn test_apply_delta_within_bounds() {
        let t = tank(10_000, 50_000, true);
        assert_eq!(t.apply_delta(5_000).unwrap(), 15_000);
        assert_eq!(t.apply_delta(-10_000).unwrap(), 0);
        assert_eq!(t.apply_delta(40_000).unwrap(), 50_000);
    }

    #[test]
    fn test_apply_delta_insufficient_stock() {
        let t = tank(10_000, 50_000, true);
        let err = t.apply_delta(-10_001).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock {
                available_cl: 10_000,
                requested_cl: 10_001,
                ..
            }
        ));
    }

    #[test]
    fn test_apply_delta_capacity_exceeded() {
        let t = tank(10_000, 50_000, true);
        let err = t.apply_delta(40_001).unwrap_err();
        assert!(matches!(
            err,
            CoreError::CapacityExceeded {
                capacity_cl: 50_000,
                attempted_cl: 50_001,
                ..
            }
        ));
    }

    #[test]
    fn test_apply_delta_inactive_tank() {
        let t = tank(10_000, 50_000, false);
        assert!(matches!(
            t.apply_delta(100).unwrap_err(),
            CoreError::TankInactive(_)
        ));
    }

    #[test]
    fn test_movement_inverse_delta() {
        let now = Utc::now();
        let m = Movement {
            id: "m-1".to_string(),
            kind: MovementKind::Dispense,
            document_kind: DocumentKind::Dispense,
            document_id: "d-1".to_string(),
            tank_id: "tank-1".to_string(),
            amount_cl: 5_000,
            stock_before_cl: 10_000,
            stock_after_cl: 5_000,
            status: MovementStatus::Active,
            actor_id: "user-1".to_string(),
            note: None,
            created_at: now,
        };
        assert_eq!(m.signed_delta(), -5_000);
        assert_eq!(m.inverse_delta(), 5_000);
        assert_eq!(m.stock_after_cl, m.stock_before_cl + m.signed_delta());
    }

    #[test]
    fn test_receipt_status_transitions() {
        assert!(ReceiptStatus::Draft.can_finalize());
        assert!(!ReceiptStatus::Active.can_finalize());
        assert!(!ReceiptStatus::Voided.can_finalize());

        assert!(!ReceiptStatus::Draft.can_void());
        assert!(ReceiptStatus::Active.can_void());
        assert!(!ReceiptStatus::Voided.can_void());
    }

    #[test]
    fn test_fill_percentage() {
        let t = tank(25_000, 50_000, true);
        assert!((t.fill_percentage() - 50.0).abs() < f64::EPSILON);
    }
}
