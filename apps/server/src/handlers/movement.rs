//! Movement history endpoint.

use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::handlers::{ok, Envelope};
use crate::state::AppState;
use fuel_core::{Movement, MovementKind, MovementStatus};
use fuel_db::MovementFilter;

/// Query parameters for `GET /api/movements`. All optional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub tank_id: Option<String>,
    pub kind: Option<MovementKind>,
    pub status: Option<MovementStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
}

/// `GET /api/movements?tankId&kind&status&from&to&limit`
pub async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<Envelope<Vec<Movement>>>> {
    let movements = state
        .db
        .movements()
        .history(&MovementFilter {
            tank_id: query.tank_id,
            kind: query.kind,
            status: query.status,
            from: query.from,
            to: query.to,
            limit: query.limit,
        })
        .await?;

    Ok(ok(movements))
}
