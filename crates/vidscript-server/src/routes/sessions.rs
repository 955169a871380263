//! Session routes: create, list scripts, export.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::info;

use super::{ok, ApiError};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/{session_id}/scripts", get(list_scripts))
        .route("/sessions/{session_id}/export", get(export_scripts))
}

/// POST /api/sessions
async fn create_session(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let session = state.store.create_session()?;
    info!("Session created: {}", session.id);
    Ok(ok(json!({ "sessionId": session.id, "createdAt": session.created_at })))
}

/// GET /api/sessions/{session_id}/scripts
async fn list_scripts(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let scripts = state.store.list_scripts(&session_id)?;
    Ok(ok(scripts))
}

/// GET /api/sessions/{session_id}/export: plain-text attachment.
async fn export_scripts(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Response, ApiError> {
    let text = state.store.export_scripts_text(&session_id)?;
    let disposition = format!("attachment; filename=\"scripts_{}.txt\"", session_id);
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        text,
    )
        .into_response())
}
