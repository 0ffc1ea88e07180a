//! Transfer and adjustment endpoints.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use crate::error::ApiResult;
use crate::handlers::{actor_from, ok, Envelope};
use crate::state::AppState;
use fuel_core::Movement;
use fuel_db::{NewAdjustment, NewTransfer, TransferResult};

/// `POST /api/transfers` - moves fuel between two tanks atomically.
pub async fn transfer(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<NewTransfer>,
) -> ApiResult<Json<Envelope<TransferResult>>> {
    let actor = actor_from(&headers)?;
    let result = state.stock.transfer(body, &actor).await?;
    Ok(ok(result))
}

/// `POST /api/adjustments` - signed recount correction with mandatory note.
pub async fn adjust(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<NewAdjustment>,
) -> ApiResult<Json<Envelope<Movement>>> {
    let actor = actor_from(&headers)?;
    let movement = state.stock.adjust(body, &actor).await?;
    Ok(ok(movement))
}
