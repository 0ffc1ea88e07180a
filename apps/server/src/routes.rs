//! # Route Table
//!
//! All endpoints under `/api`, wired to the shared `AppState`.

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Tanks
        .route("/api/tanks", post(handlers::tank::create).get(handlers::tank::list))
        .route("/api/tanks/:id/snapshot", get(handlers::tank::snapshot))
        // Receipts (Ingreso)
        .route("/api/receipts", post(handlers::receipt::create))
        .route("/api/receipts/:id/finalize", post(handlers::receipt::finalize))
        .route("/api/receipts/:id/void", post(handlers::receipt::void))
        // Dispenses (Egreso)
        .route("/api/dispenses", post(handlers::dispense::create))
        .route("/api/dispenses/:id/void", post(handlers::dispense::void))
        // Transfers & adjustments
        .route("/api/transfers", post(handlers::stock::transfer))
        .route("/api/adjustments", post(handlers::stock::adjust))
        // Ledger history
        .route("/api/movements", get(handlers::movement::history))
        // Personnel credentials
        .route("/api/personnel/:id/pin", post(handlers::personnel::set_pin))
        // Health
        .route("/api/health", get(handlers::health::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
