//! HTTP adapters - REST and server-sent event endpoints.
//!
//! Each area has its own adapter; [`router`] assembles them under `/api`.

pub mod catalog;
mod error;
pub mod sessions;
mod state;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

pub use catalog::catalog_routes;
pub use error::{ApiError, ErrorResponse};
pub use sessions::{session_routes, SessionRegistry};
pub use state::AppState;

/// GET /health - Liveness probe
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Create the complete application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new().merge(catalog_routes()).merge(session_routes());

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .with_state(state)
}
