//! # Request Handlers
//!
//! One module per resource. Every handler returns the uniform envelope:
//! success `{"success": true, "data": ...}`, failure
//! `{"success": false, "errorCode": ..., "message": ...}` via `ApiError`.

pub mod dispense;
pub mod health;
pub mod movement;
pub mod personnel;
pub mod receipt;
pub mod stock;
pub mod tank;

use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

use crate::error::{ApiError, ApiResult, ErrorCode};
use fuel_core::Actor;

/// Success envelope.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

/// Wraps handler output in the success envelope.
pub fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        data,
    })
}

/// Extracts the acting identity from request headers.
///
/// `x-actor-id` is mandatory on every mutating endpoint; the client ip (via
/// `x-forwarded-for` when behind a proxy) lands in the audit trail.
pub fn actor_from(headers: &HeaderMap) -> ApiResult<Actor> {
    let user_id = headers
        .get("x-actor-id")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            ApiError::new(ErrorCode::ValidationError, "x-actor-id header is required")
        })?;

    let ip = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string());

    Ok(Actor::new(user_id, ip))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_actor_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-actor-id", HeaderValue::from_static("user-7"));
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("10.0.0.9, 172.16.0.1"),
        );

        let actor = actor_from(&headers).unwrap();
        assert_eq!(actor.user_id, "user-7");
        assert_eq!(actor.ip.as_deref(), Some("10.0.0.9"));
    }

    #[test]
    fn test_actor_requires_header() {
        let headers = HeaderMap::new();
        let err = actor_from(&headers).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
