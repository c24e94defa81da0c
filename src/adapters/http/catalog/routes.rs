//! Axum router configuration for catalog endpoints.

use axum::{routing::get, Router};

use super::handlers::{get_persona, get_school, list_personas, list_schools};
use crate::adapters::http::state::AppState;

/// Create the catalog API router.
///
/// # Routes
///
/// - `GET /schools` - Schools ranked for an optional profile
/// - `GET /schools/:id` - School detail with ranked personas
/// - `GET /personas` - Personas ranked for an optional profile
/// - `GET /personas/:id` - Persona detail
///
/// Every list accepts `search`, `code`, `category` and `max`; `/personas`
/// also accepts `school`.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/schools", get(list_schools))
        .route("/schools/:id", get(get_school))
        .route("/personas", get(list_personas))
        .route("/personas/:id", get(get_persona))
}
