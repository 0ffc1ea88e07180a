//! Personnel PIN credential endpoint.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::handlers::{ok, Envelope};
use crate::state::AppState;

/// Body for `POST /api/personnel/{id}/pin`.
#[derive(Debug, Deserialize)]
pub struct SetPinRequest {
    pub pin: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPinResponse {
    pub person_id: String,
}

/// `POST /api/personnel/{id}/pin` - stores the argon2 hash, never the PIN.
pub async fn set_pin(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<SetPinRequest>,
) -> ApiResult<Json<Envelope<SetPinResponse>>> {
    state.db.personnel().set_credential(&id, &body.pin).await?;
    Ok(ok(SetPinResponse { person_id: id }))
}
