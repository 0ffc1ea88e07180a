//! Receipt (Ingreso) endpoints.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::handlers::{actor_from, ok, Envelope};
use crate::state::AppState;
use fuel_core::Receipt;
use fuel_db::{NewReceipt, NewReceiptLine};

/// Body for `POST /api/receipts/{id}/finalize`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeRequest {
    pub lines: Vec<NewReceiptLine>,
    pub photo_path: Option<String>,
}

/// `POST /api/receipts` - captures a Draft, no stock effect.
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<NewReceipt>,
) -> ApiResult<Json<Envelope<Receipt>>> {
    let actor = actor_from(&headers)?;
    let receipt = state.receipts.create(body, &actor).await?;
    Ok(ok(receipt))
}

/// `POST /api/receipts/{id}/finalize` - applies one movement per line.
pub async fn finalize(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<FinalizeRequest>,
) -> ApiResult<Json<Envelope<Receipt>>> {
    let actor = actor_from(&headers)?;
    let receipt = state
        .receipts
        .finalize(&id, body.lines, body.photo_path, &actor)
        .await?;
    Ok(ok(receipt))
}

/// `POST /api/receipts/{id}/void` - reverses every line, or none.
pub async fn void(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<Envelope<Receipt>>> {
    let actor = actor_from(&headers)?;
    let receipt = state.receipts.void(&id, &actor).await?;
    Ok(ok(receipt))
}
