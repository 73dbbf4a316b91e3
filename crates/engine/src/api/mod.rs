//! API layer - HTTP and WebSocket entry points.

pub mod connections;
pub mod http;
pub mod identity;
pub mod websocket;

pub use connections::BroadcastHub;
pub use identity::RequestIdentity;

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::app::App;

/// HTTP routes plus the WebSocket endpoint, bound to `app`.
pub fn router(app: Arc<App>) -> Router {
    http::routes()
        .route("/ws/{code}", get(websocket::ws_handler))
        .with_state(app)
}
