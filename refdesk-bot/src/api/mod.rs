//! HTTP API handlers for refdesk-bot

pub mod auth;
pub mod health;
pub mod updates;

pub use auth::auth_middleware;
pub use health::health_routes;
pub use updates::{post_update, ApiError, UpdateRequest};
