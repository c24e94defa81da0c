//! Axum router configuration for session endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::handlers::{
    cancel_turn, close_session, create_session, get_session, select_suggestion, send_message,
    session_events,
};
use crate::adapters::http::state::AppState;

/// Create the session API router.
///
/// # Routes
///
/// - `POST /sessions` - Open a session
/// - `GET /sessions/:id` - Session view
/// - `DELETE /sessions/:id` - Close the session
/// - `POST /sessions/:id/messages` - Submit a message
/// - `POST /sessions/:id/suggestions` - Submit a suggestion
/// - `DELETE /sessions/:id/turn` - Cancel the in-flight turn
/// - `GET /sessions/:id/events` - Server-sent progress events
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/:id", get(get_session).delete(close_session))
        .route("/sessions/:id/messages", post(send_message))
        .route("/sessions/:id/suggestions", post(select_suggestion))
        .route("/sessions/:id/turn", delete(cancel_turn))
        .route("/sessions/:id/events", get(session_events))
}
