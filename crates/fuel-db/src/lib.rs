//! # fuel-db - SQLite Persistence Layer
//!
//! Persistence and transactional workflows for the fuel inventory ledger.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        fuel-db                                          │
//! │                                                                         │
//! │  ┌───────────┐  ┌──────────────┐  ┌───────────────────────────────┐    │
//! │  │   pool    │  │  migrations  │  │           service             │    │
//! │  │ Database  │  │   embedded   │  │  ledger / receipt / dispense  │    │
//! │  │ DbConfig  │  │  SQL files   │  │          / stock              │    │
//! │  └───────────┘  └──────────────┘  └───────────────┬───────────────┘    │
//! │                                                   │                    │
//! │  ┌────────────────────────────────────────────────▼───────────────┐    │
//! │  │                        repository                              │    │
//! │  │   tank / movement / receipt / dispense / audit / personnel     │    │
//! │  └────────────────────────────────────────────────────────────────┘    │
//! │                                                                         │
//! │  Depends on fuel-core for all domain types and rules.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transaction Discipline
//! Repositories expose two shapes: pool-backed reads on `&self`, and
//! workflow writes on `&mut SqliteConnection`. Services own the transaction
//! scope; a workflow either commits completely or leaves no trace.

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

pub use error::{DbError, DbResult, LedgerError, LedgerResult};
pub use pool::{Database, DbConfig};
pub use repository::{
    AuditRepository, DispenseRepository, MovementFilter, MovementRepository,
    PersonnelRepository, ReceiptRepository, NewTank, StockChange, TankRepository,
};
pub use service::{
    DispenseService, NewAdjustment, NewDispense, NewReceipt, NewReceiptLine, NewTransfer,
    ReceiptService, StockService, TransferResult,
};
