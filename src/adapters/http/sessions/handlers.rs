//! HTTP handlers for session endpoints.
//!
//! Turns run on background tasks; submit endpoints answer `202 Accepted` with
//! the turn id and progress is delivered over the session's event stream.

use std::convert::Infallible;
use std::str::FromStr;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::Json;
use futures::Stream;
use tokio::sync::broadcast::error::RecvError;

use crate::domain::foundation::{SessionId, ValidationError};

use super::dto::{
    CancelTurnResponse, CreateSessionRequest, SelectSuggestionRequest, SendMessageRequest,
    SessionResponse, TurnAcceptedResponse,
};
use super::registry::spawn_turn;
use crate::adapters::http::error::ApiError;
use crate::adapters::http::state::AppState;

fn parse_session_id(raw: &str) -> Result<SessionId, ValidationError> {
    SessionId::from_str(raw)
        .map_err(|e| ValidationError::invalid_format("session_id", e.to_string()))
}

/// POST /api/sessions - Open a session, firing its opening question if any
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = request.into_command()?;
    let session = state.start_session_handler().handle(command)?;
    let entry = state.sessions.insert(session);

    let (response, auto_start) = {
        let mut session = entry.lock();
        let ticket = session.take_auto_start();
        (SessionResponse::from(&*session), ticket)
    };
    if let Some(ticket) = auto_start {
        spawn_turn(state.driver.clone(), entry, ticket);
    }

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/sessions/:id - Current session view
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state.sessions.get(&parse_session_id(&id)?)?;
    let response = SessionResponse::from(&*entry.lock());
    Ok(Json(response))
}

/// POST /api/sessions/:id/messages - Submit a user message
pub async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state.sessions.get(&parse_session_id(&id)?)?;
    let ticket = entry.lock().submit(&request.text)?;
    let turn_id = ticket.turn_id;

    spawn_turn(state.driver.clone(), entry, ticket);
    Ok((StatusCode::ACCEPTED, Json(TurnAcceptedResponse { turn_id })))
}

/// POST /api/sessions/:id/suggestions - Send a suggestion as the next message
pub async fn select_suggestion(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SelectSuggestionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state.sessions.get(&parse_session_id(&id)?)?;
    let ticket = entry.lock().select_suggestion(&request.suggestion)?;
    let turn_id = ticket.turn_id;

    spawn_turn(state.driver.clone(), entry, ticket);
    Ok((StatusCode::ACCEPTED, Json(TurnAcceptedResponse { turn_id })))
}

/// DELETE /api/sessions/:id/turn - Cancel the in-flight turn
pub async fn cancel_turn(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state.sessions.get(&parse_session_id(&id)?)?;
    let cancelled = entry.cancel_turn();
    Ok(Json(CancelTurnResponse { cancelled }))
}

/// DELETE /api/sessions/:id - Close the session
pub async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.sessions.close(&parse_session_id(&id)?)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/sessions/:id/events - Server-sent turn progress
pub async fn session_events(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let entry = state.sessions.get(&parse_session_id(&id)?)?;
    let session_id = entry.id();
    let receiver = entry.subscribe();
    drop(entry);

    let stream = futures::stream::unfold(receiver, move |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let sse = Event::default()
                        .event(event.name())
                        .json_data(&event)
                        .unwrap_or_else(|_| Event::default().event(event.name()));
                    return Some((Ok(sse), receiver));
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(session_id = %session_id, skipped, "Event subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
