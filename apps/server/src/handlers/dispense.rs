//! Dispense (Egreso) endpoints.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;

use crate::error::ApiResult;
use crate::handlers::{actor_from, ok, Envelope};
use crate::state::AppState;
use fuel_core::Dispense;
use fuel_db::NewDispense;

/// `POST /api/dispenses` - PIN-authorized, stock-effective in one step.
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<NewDispense>,
) -> ApiResult<Json<Envelope<Dispense>>> {
    let actor = actor_from(&headers)?;
    let dispense = state.dispenses.create(body, &actor).await?;
    Ok(ok(dispense))
}

/// `POST /api/dispenses/{id}/void` - returns the fuel to its tank, once.
pub async fn void(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<Envelope<Dispense>>> {
    let actor = actor_from(&headers)?;
    let dispense = state.dispenses.void(&id, &actor).await?;
    Ok(ok(dispense))
}
