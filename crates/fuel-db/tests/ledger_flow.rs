//! End-to-end workflow tests against real SQLite databases.
//!
//! Most tests run on an in-memory database; the concurrency test uses a
//! temp-file database because in-memory SQLite is per-connection.

use fuel_core::{
    Actor, AuditAction, CoreError, DispenseKind, DispenseStatus, MovementKind, MovementStatus,
    ReceiptStatus, TankKind,
};
use fuel_db::service::dispense::DispenseService;
use fuel_db::service::receipt::{NewReceipt, NewReceiptLine, ReceiptService};
use fuel_db::service::stock::{NewAdjustment, NewTransfer, StockService};
use fuel_db::{Database, DbConfig, LedgerError, MovementFilter, NewDispense, NewTank};

// =============================================================================
// Helpers
// =============================================================================

async fn mem_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

fn actor() -> Actor {
    Actor::new("user-1", Some("10.0.0.7".to_string()))
}

async fn tank_with(db: &Database, capacity_cl: i64, stock_cl: i64) -> String {
    db.tanks()
        .create(NewTank {
            name: "Tanque Principal".to_string(),
            kind: TankKind::Fixed,
            capacity_cl,
            initial_stock_cl: stock_cl,
        })
        .await
        .unwrap()
        .id
}

async fn stock_of(db: &Database, tank_id: &str) -> i64 {
    db.tanks()
        .snapshot(tank_id)
        .await
        .unwrap()
        .unwrap()
        .stock_cl
}

/// External dispense: one PIN, no machine/job references.
fn external_dispense(tank_id: &str, meter_start_cl: i64, meter_end_cl: i64) -> NewDispense {
    NewDispense {
        tank_id: tank_id.to_string(),
        kind: DispenseKind::External,
        machine_id: None,
        job_type_id: None,
        external_ref: Some("ABC-123".to_string()),
        deliverer_id: "deliverer-1".to_string(),
        deliverer_pin: "4821".to_string(),
        receiver_id: None,
        receiver_pin: None,
        meter_start_cl,
        meter_end_cl,
    }
}

async fn seed_deliverer(db: &Database) {
    db.personnel()
        .set_credential("deliverer-1", "4821")
        .await
        .unwrap();
}

// =============================================================================
// Receipt workflow
// =============================================================================

#[tokio::test]
async fn receipt_split_across_tanks_round_trips_on_void() {
    let db = mem_db().await;
    let tank_a = tank_with(&db, 100_000, 10_000).await;
    let tank_b = tank_with(&db, 100_000, 20_000).await;
    let receipts = ReceiptService::new(db.clone());

    // 500 L declared, split 300 / 200
    let receipt = receipts
        .create(
            NewReceipt {
                supplier_id: "SUP-01".to_string(),
                payment_type: "cash".to_string(),
                declared_total_cl: 50_000,
                unit_price_cents: 135,
            },
            &actor(),
        )
        .await
        .unwrap();
    assert_eq!(receipt.status, ReceiptStatus::Draft);
    assert_eq!(stock_of(&db, &tank_a).await, 10_000);

    let finalized = receipts
        .finalize(
            &receipt.id,
            vec![
                NewReceiptLine {
                    tank_id: tank_a.clone(),
                    liters_cl: 30_000,
                    meter_start_cl: None,
                    meter_end_cl: None,
                },
                NewReceiptLine {
                    tank_id: tank_b.clone(),
                    liters_cl: 20_000,
                    meter_start_cl: None,
                    meter_end_cl: None,
                },
            ],
            Some("/photos/r1.jpg".to_string()),
            &actor(),
        )
        .await
        .unwrap();
    assert_eq!(finalized.status, ReceiptStatus::Active);
    assert!(finalized.finalized_at.is_some());
    assert_eq!(stock_of(&db, &tank_a).await, 40_000);
    assert_eq!(stock_of(&db, &tank_b).await, 40_000);

    // Each line carries its movement id with the frozen balances
    let lines = db.receipts().get_lines(&receipt.id).await.unwrap();
    assert_eq!(lines.len(), 2);
    for line in &lines {
        let movement_id = line.movement_id.as_ref().unwrap();
        let movement = db.movements().get_by_id(movement_id).await.unwrap().unwrap();
        assert_eq!(movement.kind, MovementKind::Receipt);
        assert_eq!(
            movement.stock_after_cl,
            movement.stock_before_cl + line.liters_cl
        );
    }

    // Void restores both tanks exactly
    let voided = receipts.void(&receipt.id, &actor()).await.unwrap();
    assert_eq!(voided.status, ReceiptStatus::Voided);
    assert_eq!(stock_of(&db, &tank_a).await, 10_000);
    assert_eq!(stock_of(&db, &tank_b).await, 20_000);
}

#[tokio::test]
async fn receipt_finalize_rejects_line_total_mismatch_atomically() {
    let db = mem_db().await;
    let tank_a = tank_with(&db, 100_000, 10_000).await;
    let tank_b = tank_with(&db, 100_000, 20_000).await;
    let receipts = ReceiptService::new(db.clone());

    let receipt = receipts
        .create(
            NewReceipt {
                supplier_id: "SUP-01".to_string(),
                payment_type: "cash".to_string(),
                declared_total_cl: 50_000,
                unit_price_cents: 135,
            },
            &actor(),
        )
        .await
        .unwrap();

    // Lines sum to 450 L against 500 L declared
    let err = receipts
        .finalize(
            &receipt.id,
            vec![
                NewReceiptLine {
                    tank_id: tank_a.clone(),
                    liters_cl: 30_000,
                    meter_start_cl: None,
                    meter_end_cl: None,
                },
                NewReceiptLine {
                    tank_id: tank_b.clone(),
                    liters_cl: 15_000,
                    meter_start_cl: None,
                    meter_end_cl: None,
                },
            ],
            None,
            &actor(),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Core(CoreError::LineTotalMismatch {
            declared_cl: 50_000,
            lines_cl: 45_000,
        })
    ));

    // Nothing happened: still Draft, no lines, no stock change
    let receipt = db.receipts().get_by_id(&receipt.id).await.unwrap().unwrap();
    assert_eq!(receipt.status, ReceiptStatus::Draft);
    assert!(db.receipts().get_lines(&receipt.id).await.unwrap().is_empty());
    assert_eq!(stock_of(&db, &tank_a).await, 10_000);
    assert_eq!(stock_of(&db, &tank_b).await, 20_000);
}

#[tokio::test]
async fn receipt_finalize_rolls_back_all_lines_when_one_overflows() {
    let db = mem_db().await;
    let tank_a = tank_with(&db, 100_000, 10_000).await;
    // Second tank too full for its line
    let tank_b = tank_with(&db, 25_000, 20_000).await;
    let receipts = ReceiptService::new(db.clone());

    let receipt = receipts
        .create(
            NewReceipt {
                supplier_id: "SUP-01".to_string(),
                payment_type: "credit".to_string(),
                declared_total_cl: 50_000,
                unit_price_cents: 135,
            },
            &actor(),
        )
        .await
        .unwrap();

    let err = receipts
        .finalize(
            &receipt.id,
            vec![
                NewReceiptLine {
                    tank_id: tank_a.clone(),
                    liters_cl: 30_000,
                    meter_start_cl: None,
                    meter_end_cl: None,
                },
                NewReceiptLine {
                    tank_id: tank_b.clone(),
                    liters_cl: 20_000,
                    meter_start_cl: None,
                    meter_end_cl: None,
                },
            ],
            None,
            &actor(),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Core(CoreError::CapacityExceeded { .. })
    ));

    // The first line's successful movement rolled back with the rest
    assert_eq!(stock_of(&db, &tank_a).await, 10_000);
    assert_eq!(stock_of(&db, &tank_b).await, 20_000);
    let receipt = db.receipts().get_by_id(&receipt.id).await.unwrap().unwrap();
    assert_eq!(receipt.status, ReceiptStatus::Draft);
}

#[tokio::test]
async fn receipt_double_void_fails_without_double_reversal() {
    let db = mem_db().await;
    let tank = tank_with(&db, 100_000, 10_000).await;
    let receipts = ReceiptService::new(db.clone());

    let receipt = receipts
        .create(
            NewReceipt {
                supplier_id: "SUP-01".to_string(),
                payment_type: "cash".to_string(),
                declared_total_cl: 30_000,
                unit_price_cents: 135,
            },
            &actor(),
        )
        .await
        .unwrap();
    receipts
        .finalize(
            &receipt.id,
            vec![NewReceiptLine {
                tank_id: tank.clone(),
                liters_cl: 30_000,
                meter_start_cl: None,
                meter_end_cl: None,
            }],
            None,
            &actor(),
        )
        .await
        .unwrap();
    assert_eq!(stock_of(&db, &tank).await, 40_000);

    receipts.void(&receipt.id, &actor()).await.unwrap();
    assert_eq!(stock_of(&db, &tank).await, 10_000);

    let err = receipts.void(&receipt.id, &actor()).await.unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Core(CoreError::AlreadyVoided { .. })
    ));
    assert_eq!(stock_of(&db, &tank).await, 10_000);
}

// =============================================================================
// Dispense workflow
// =============================================================================

#[tokio::test]
async fn dispense_computes_liters_from_meter_readings() {
    let db = mem_db().await;
    seed_deliverer(&db).await;
    let tank = tank_with(&db, 100_000, 10_000).await;
    let dispenses = DispenseService::new(db.clone());

    // meterStart 1200.00, meterEnd 1150.00 -> 50.00 L
    let dispense = dispenses
        .create(external_dispense(&tank, 120_000, 115_000), &actor())
        .await
        .unwrap();
    assert_eq!(dispense.liters_cl, 5_000);
    assert_eq!(dispense.status, DispenseStatus::Active);
    assert_eq!(stock_of(&db, &tank).await, 5_000);

    let movement = db
        .movements()
        .get_by_id(dispense.movement_id.as_ref().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(movement.kind, MovementKind::Dispense);
    assert_eq!(movement.amount_cl, 5_000);
    assert_eq!(movement.stock_before_cl, 10_000);
    assert_eq!(movement.stock_after_cl, 5_000);
}

#[tokio::test]
async fn dispense_wrong_pin_persists_nothing() {
    let db = mem_db().await;
    seed_deliverer(&db).await;
    let tank = tank_with(&db, 100_000, 10_000).await;
    let dispenses = DispenseService::new(db.clone());

    let mut new = external_dispense(&tank, 120_000, 115_000);
    new.deliverer_pin = "0000".to_string();

    let err = dispenses.create(new, &actor()).await.unwrap_err();
    assert!(matches!(err, LedgerError::Core(CoreError::PinInvalid { .. })));

    assert_eq!(stock_of(&db, &tank).await, 10_000);
    assert!(db
        .movements()
        .history(&MovementFilter {
            tank_id: Some(tank.clone()),
            ..Default::default()
        })
        .await
        .unwrap()
        .is_empty());
    assert!(db.dispenses().list_for_tank(&tank, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn dispense_internal_requires_receiver_pin() {
    let db = mem_db().await;
    seed_deliverer(&db).await;
    db.personnel()
        .set_credential("receiver-1", "7755")
        .await
        .unwrap();
    let tank = tank_with(&db, 100_000, 10_000).await;
    let dispenses = DispenseService::new(db.clone());

    let internal = NewDispense {
        tank_id: tank.clone(),
        kind: DispenseKind::Internal,
        machine_id: Some("EXC-07".to_string()),
        job_type_id: Some("JOB-EXCAVATION".to_string()),
        external_ref: None,
        deliverer_id: "deliverer-1".to_string(),
        deliverer_pin: "4821".to_string(),
        receiver_id: Some("receiver-1".to_string()),
        receiver_pin: Some("7755".to_string()),
        meter_start_cl: 120_000,
        meter_end_cl: 117_000,
    };
    let dispense = dispenses.create(internal.clone(), &actor()).await.unwrap();
    assert_eq!(dispense.liters_cl, 3_000);

    // Wrong receiver PIN aborts the dual-PIN handshake
    let mut bad = internal.clone();
    bad.receiver_pin = Some("1111".to_string());
    let err = dispenses.create(bad, &actor()).await.unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Core(CoreError::PinInvalid { ref person_id }) if person_id == "receiver-1"
    ));

    // Missing machine reference fails validation before any PIN check
    let mut incomplete = internal;
    incomplete.machine_id = None;
    let err = dispenses.create(incomplete, &actor()).await.unwrap_err();
    assert!(matches!(err, LedgerError::Core(CoreError::Validation(_))));

    assert_eq!(stock_of(&db, &tank).await, 7_000);
}

#[tokio::test]
async fn dispense_exceeding_stock_fails_and_leaves_stock_unchanged() {
    let db = mem_db().await;
    seed_deliverer(&db).await;
    let tank = tank_with(&db, 100_000, 4_000).await;
    let dispenses = DispenseService::new(db.clone());

    let err = dispenses
        .create(external_dispense(&tank, 120_000, 115_000), &actor())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Core(CoreError::InsufficientStock { .. })
    ));
    assert_eq!(stock_of(&db, &tank).await, 4_000);
}

#[tokio::test]
async fn dispense_void_restores_stock_exactly_once() {
    let db = mem_db().await;
    seed_deliverer(&db).await;
    let tank = tank_with(&db, 100_000, 10_000).await;
    let dispenses = DispenseService::new(db.clone());

    let dispense = dispenses
        .create(external_dispense(&tank, 120_000, 115_000), &actor())
        .await
        .unwrap();
    assert_eq!(stock_of(&db, &tank).await, 5_000);

    let voided = dispenses.void(&dispense.id, &actor()).await.unwrap();
    assert_eq!(voided.status, DispenseStatus::Voided);
    assert_eq!(stock_of(&db, &tank).await, 10_000);

    let err = dispenses.void(&dispense.id, &actor()).await.unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Core(CoreError::AlreadyVoided { .. })
    ));
    assert_eq!(stock_of(&db, &tank).await, 10_000);

    let movement = db
        .movements()
        .get_by_id(dispense.movement_id.as_ref().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(movement.status, MovementStatus::Voided);
}

#[tokio::test]
async fn dispense_void_blocked_by_refilled_tank_stays_active() {
    let db = mem_db().await;
    seed_deliverer(&db).await;
    // Capacity 100 L, start at 50 L
    let tank = tank_with(&db, 10_000, 5_000).await;
    let dispenses = DispenseService::new(db.clone());
    let stock = StockService::new(db.clone());

    // Dispense 30 L -> 20 L
    let dispense = dispenses
        .create(external_dispense(&tank, 120_000, 117_000), &actor())
        .await
        .unwrap();
    assert_eq!(stock_of(&db, &tank).await, 2_000);

    // Refill to 90 L; the 30 L reversal would overflow
    stock
        .adjust(
            NewAdjustment {
                tank_id: tank.clone(),
                delta_cl: 7_000,
                note: "recount after refill".to_string(),
            },
            &actor(),
        )
        .await
        .unwrap();

    let err = dispenses.void(&dispense.id, &actor()).await.unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Core(CoreError::CapacityExceeded { .. })
    ));

    // Transaction rolled back: dispense still Active, stock untouched
    let dispense = db.dispenses().get_by_id(&dispense.id).await.unwrap().unwrap();
    assert_eq!(dispense.status, DispenseStatus::Active);
    assert_eq!(stock_of(&db, &tank).await, 9_000);
}

// =============================================================================
// Transfers & adjustments
// =============================================================================

#[tokio::test]
async fn transfer_moves_fuel_atomically() {
    let db = mem_db().await;
    let tank_a = tank_with(&db, 100_000, 30_000).await;
    let tank_b = tank_with(&db, 100_000, 10_000).await;
    let stock = StockService::new(db.clone());

    let result = stock
        .transfer(
            NewTransfer {
                from_tank_id: tank_a.clone(),
                to_tank_id: tank_b.clone(),
                liters_cl: 20_000,
                note: None,
            },
            &actor(),
        )
        .await
        .unwrap();

    assert_eq!(result.out_movement.kind, MovementKind::TransferOut);
    assert_eq!(result.in_movement.kind, MovementKind::TransferIn);
    assert_eq!(result.out_movement.document_id, result.in_movement.document_id);
    assert_eq!(stock_of(&db, &tank_a).await, 10_000);
    assert_eq!(stock_of(&db, &tank_b).await, 30_000);
}

#[tokio::test]
async fn transfer_failure_leaves_both_tanks_untouched() {
    let db = mem_db().await;
    let tank_a = tank_with(&db, 100_000, 30_000).await;
    // Destination nearly full
    let tank_b = tank_with(&db, 35_000, 30_000).await;
    let stock = StockService::new(db.clone());

    let err = stock
        .transfer(
            NewTransfer {
                from_tank_id: tank_a.clone(),
                to_tank_id: tank_b.clone(),
                liters_cl: 20_000,
                note: None,
            },
            &actor(),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Core(CoreError::CapacityExceeded { .. })
    ));

    // The outbound leg rolled back with the inbound failure
    assert_eq!(stock_of(&db, &tank_a).await, 30_000);
    assert_eq!(stock_of(&db, &tank_b).await, 30_000);
}

#[tokio::test]
async fn transfer_rejects_same_tank() {
    let db = mem_db().await;
    let tank = tank_with(&db, 100_000, 30_000).await;
    let stock = StockService::new(db.clone());

    let err = stock
        .transfer(
            NewTransfer {
                from_tank_id: tank.clone(),
                to_tank_id: tank.clone(),
                liters_cl: 1_000,
                note: None,
            },
            &actor(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Core(CoreError::Validation(_))));
}

#[tokio::test]
async fn adjustment_requires_note_and_signs_correctly() {
    let db = mem_db().await;
    let tank = tank_with(&db, 100_000, 30_000).await;
    let stock = StockService::new(db.clone());

    let err = stock
        .adjust(
            NewAdjustment {
                tank_id: tank.clone(),
                delta_cl: -2_000,
                note: "  ".to_string(),
            },
            &actor(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Core(CoreError::Validation(_))));

    let down = stock
        .adjust(
            NewAdjustment {
                tank_id: tank.clone(),
                delta_cl: -2_000,
                note: "physical recount short".to_string(),
            },
            &actor(),
        )
        .await
        .unwrap();
    assert_eq!(down.kind, MovementKind::AdjustmentOut);
    assert_eq!(stock_of(&db, &tank).await, 28_000);

    let up = stock
        .adjust(
            NewAdjustment {
                tank_id: tank.clone(),
                delta_cl: 500,
                note: "physical recount over".to_string(),
            },
            &actor(),
        )
        .await
        .unwrap();
    assert_eq!(up.kind, MovementKind::AdjustmentIn);
    assert_eq!(stock_of(&db, &tank).await, 28_500);
}

// =============================================================================
// Audit trail
// =============================================================================

#[tokio::test]
async fn audit_records_every_lifecycle_transition() {
    let db = mem_db().await;
    let tank = tank_with(&db, 100_000, 10_000).await;
    let receipts = ReceiptService::new(db.clone());

    let receipt = receipts
        .create(
            NewReceipt {
                supplier_id: "SUP-01".to_string(),
                payment_type: "cash".to_string(),
                declared_total_cl: 30_000,
                unit_price_cents: 135,
            },
            &actor(),
        )
        .await
        .unwrap();
    receipts
        .finalize(
            &receipt.id,
            vec![NewReceiptLine {
                tank_id: tank.clone(),
                liters_cl: 30_000,
                meter_start_cl: None,
                meter_end_cl: None,
            }],
            None,
            &actor(),
        )
        .await
        .unwrap();
    receipts.void(&receipt.id, &actor()).await.unwrap();

    let entries = db
        .audit()
        .list_for_document(fuel_core::DocumentKind::Receipt, &receipt.id)
        .await
        .unwrap();
    let actions: Vec<AuditAction> = entries.iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![
            AuditAction::Created,
            AuditAction::Finalized,
            AuditAction::Voided,
        ]
    );
    for entry in &entries {
        assert_eq!(entry.actor_id, "user-1");
        assert_eq!(entry.ip.as_deref(), Some("10.0.0.7"));
    }
}

// =============================================================================
// Movement history
// =============================================================================

#[tokio::test]
async fn movement_history_filters_by_kind_and_status() {
    let db = mem_db().await;
    seed_deliverer(&db).await;
    let tank = tank_with(&db, 100_000, 50_000).await;
    let dispenses = DispenseService::new(db.clone());
    let stock = StockService::new(db.clone());

    let d1 = dispenses
        .create(external_dispense(&tank, 120_000, 115_000), &actor())
        .await
        .unwrap();
    dispenses
        .create(external_dispense(&tank, 115_000, 112_000), &actor())
        .await
        .unwrap();
    stock
        .adjust(
            NewAdjustment {
                tank_id: tank.clone(),
                delta_cl: 1_000,
                note: "recount".to_string(),
            },
            &actor(),
        )
        .await
        .unwrap();
    dispenses.void(&d1.id, &actor()).await.unwrap();

    let all = db
        .movements()
        .history(&MovementFilter {
            tank_id: Some(tank.clone()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(all.len(), 3);

    let active_dispenses = db
        .movements()
        .history(&MovementFilter {
            tank_id: Some(tank.clone()),
            kind: Some(MovementKind::Dispense),
            status: Some(MovementStatus::Active),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(active_dispenses.len(), 1);

    let limited = db
        .movements()
        .history(&MovementFilter {
            tank_id: Some(tank.clone()),
            limit: Some(2),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(limited.len(), 2);
}

// =============================================================================
// Concurrency
// =============================================================================

/// Two 60 L dispenses race against a tank holding 100 L: exactly one commits,
/// the other fails `InsufficientStock`, and the final stock is 40 L.
///
/// Uses a temp-file database - in-memory SQLite is per-connection, so a real
/// multi-connection race needs a file.
#[tokio::test]
async fn concurrent_dispenses_serialize_on_the_stock_predicate() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::new(DbConfig::new(dir.path().join("ledger.db")))
        .await
        .unwrap();
    seed_deliverer(&db).await;
    let tank = tank_with(&db, 100_000, 10_000).await;

    let make_task = |meter_start_cl: i64| {
        let dispenses = DispenseService::new(db.clone());
        let tank = tank.clone();
        tokio::spawn(async move {
            dispenses
                .create(external_dispense(&tank, meter_start_cl, meter_start_cl - 6_000), &actor())
                .await
        })
    };

    let (a, b) = tokio::join!(make_task(120_000), make_task(90_000));
    let results = [a.unwrap(), b.unwrap()];

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    assert!(results.iter().any(|r| matches!(
        r,
        Err(LedgerError::Core(CoreError::InsufficientStock { .. }))
    )));

    assert_eq!(stock_of(&db, &tank).await, 4_000);
    assert_eq!(db.dispenses().list_for_tank(&tank, 10).await.unwrap().len(), 1);
}
