//! # Repository Module
//!
//! One repository per aggregate. Reads go through the pool; writes that
//! belong to a workflow take `&mut SqliteConnection` so the service layer
//! decides the transaction scope.

pub mod audit;
pub mod dispense;
pub mod movement;
pub mod personnel;
pub mod receipt;
pub mod tank;

pub use audit::AuditRepository;
pub use dispense::DispenseRepository;
pub use movement::{MovementFilter, MovementRepository};
pub use personnel::PersonnelRepository;
pub use receipt::ReceiptRepository;
pub use tank::{NewTank, StockChange, TankRepository};
