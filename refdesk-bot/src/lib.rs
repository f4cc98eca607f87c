//! refdesk-bot library - conversational front end for the reference desk
//!
//! The chat transport posts each user update to `/api/updates` and relays
//! the returned reply. All conversation state lives in one [`Dispatcher`]
//! behind a mutex, so updates are processed one at a time in arrival order.

use std::sync::Arc;

use axum::Router;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod api;
pub mod command;
pub mod dispatcher;
pub mod reply;
pub mod session;

pub use dispatcher::{Dispatcher, Update};
pub use reply::Reply;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Mutex<Dispatcher>>,
    /// Bearer token required on `/api/updates` (`None` disables the check)
    pub api_token: Option<String>,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher, api_token: Option<String>) -> Self {
        Self {
            dispatcher: Arc::new(Mutex::new(dispatcher)),
            api_token,
        }
    }
}

/// Build application router
///
/// `/health` is always open; `/api/updates` sits behind the token check.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::post;

    let protected = Router::new()
        .route("/api/updates", post(api::post_update))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    Router::new()
        .merge(protected)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
