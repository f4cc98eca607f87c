//! Update intake endpoint
//!
//! POST /api/updates
//!
//! ```json
//! {"user_id": 12345678, "update": {"type": "message", "text": "/start"}}
//! ```
//!
//! The response body is the [`Reply`] for that user.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use refdesk_common::UserId;

use crate::dispatcher::Update;
use crate::reply::Reply;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub user_id: UserId,
    pub update: Update,
}

/// Errors surfaced to the transport as JSON bodies
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request body: {0}")]
    BadRequest(String),

    #[error("Missing or invalid API token")]
    Unauthorized,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// POST /api/updates
pub async fn post_update(
    State(state): State<AppState>,
    payload: Result<Json<UpdateRequest>, JsonRejection>,
) -> Result<Json<Reply>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    debug!("Update from {}: {:?}", request.user_id, request.update);

    let mut dispatcher = state.dispatcher.lock().await;
    let reply = dispatcher.handle(request.user_id, request.update);
    Ok(Json(reply))
}
