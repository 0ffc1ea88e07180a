//! Tank registry endpoints.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::handlers::{ok, Envelope};
use crate::state::AppState;
use fuel_core::{Tank, TankKind, TankSnapshot};
use fuel_db::NewTank;

/// Body for `POST /api/tanks`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTankRequest {
    pub name: String,
    pub kind: TankKind,
    pub capacity_cl: i64,
    #[serde(default)]
    pub initial_stock_cl: i64,
}

/// `POST /api/tanks`
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateTankRequest>,
) -> ApiResult<Json<Envelope<Tank>>> {
    let tank = state
        .db
        .tanks()
        .create(NewTank {
            name: body.name,
            kind: body.kind,
            capacity_cl: body.capacity_cl,
            initial_stock_cl: body.initial_stock_cl,
        })
        .await?;

    Ok(ok(tank))
}

/// `GET /api/tanks`
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Envelope<Vec<Tank>>>> {
    let tanks = state.db.tanks().list().await?;
    Ok(ok(tanks))
}

/// `GET /api/tanks/{id}/snapshot`
pub async fn snapshot(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<TankSnapshot>>> {
    let snapshot = state
        .db
        .tanks()
        .snapshot(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Tank not found: {id}")))?;

    Ok(ok(snapshot))
}
