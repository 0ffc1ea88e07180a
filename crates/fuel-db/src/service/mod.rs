//! # Service Module
//!
//! Transactional use-case workflows. Each public operation is one bounded
//! SQLite transaction built from the repositories; the `ledger` primitives
//! (`record_movement` / `void_movement`) are the only path to a tank's
//! stock.

pub mod dispense;
pub mod ledger;
pub mod receipt;
pub mod stock;

pub use dispense::{DispenseService, NewDispense};
pub use ledger::{record_movement, void_movement};
pub use receipt::{NewReceipt, NewReceiptLine, ReceiptService};
pub use stock::{NewAdjustment, NewTransfer, StockService, TransferResult};
