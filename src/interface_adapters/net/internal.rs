use crate::domain::SessionError;
use crate::interface_adapters::http::ErrorResponse;
use crate::interface_adapters::state::AppState;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

#[derive(Debug, serde::Deserialize)]
pub struct SessionInitRequest {
    // Session id chosen by the matchmaking side.
    session_id: String,
    // Identity of the host, who becomes player1.
    host_id: String,
    #[serde(default)]
    host_name: String,
}

#[derive(Debug, serde::Serialize)]
struct SessionInitResponse {
    // The session id that was created.
    session_id: String,
}

pub async fn create_session_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SessionInitRequest>,
) -> impl IntoResponse {
    let session_id = payload.session_id.trim().to_string();
    let host_id = payload.host_id.trim().to_string();
    if session_id.is_empty() || host_id.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("session_id and host_id are required")),
        )
            .into_response();
    }
    let host_name = if payload.host_name.trim().is_empty() {
        host_id.clone()
    } else {
        payload.host_name.trim().to_string()
    };

    match state
        .session_registry
        .create_session(session_id.clone(), &host_id, &host_name)
        .await
    {
        Ok(_handle) => (StatusCode::CREATED, Json(SessionInitResponse { session_id })).into_response(),
        Err(SessionError::SessionAlreadyExists(_)) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse::new("session already exists")),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(e.to_string())),
        )
            .into_response(),
    }
}
