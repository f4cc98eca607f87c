//! Bearer-token middleware for the update endpoint
//!
//! When no token is configured every request passes through. Otherwise the
//! request must carry `Authorization: Bearer <token>`.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::updates::ApiError;
use crate::AppState;

/// Authentication middleware (applied to protected routes only)
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.api_token.as_deref() else {
        return Ok(next.run(request).await);
    };

    let provided = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);

    if provided != Some(expected) {
        warn!("Rejected update with missing or invalid API token");
        return Err(ApiError::Unauthorized);
    }

    Ok(next.run(request).await)
}
