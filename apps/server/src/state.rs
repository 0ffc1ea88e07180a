//! # Shared Application State
//!
//! One `Database` handle and the workflow services built on it. Cloning is
//! cheap - everything shares the underlying pool.

use fuel_db::{Database, DispenseService, ReceiptService, StockService};

/// State injected into every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub receipts: ReceiptService,
    pub dispenses: DispenseService,
    pub stock: StockService,
}

impl AppState {
    /// Builds the service graph on top of one database handle.
    pub fn new(db: Database) -> Self {
        AppState {
            receipts: ReceiptService::new(db.clone()),
            dispenses: DispenseService::new(db.clone()),
            stock: StockService::new(db.clone()),
            db,
        }
    }
}
