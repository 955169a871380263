//! HTTP route handlers. Every JSON response uses the
//! `{success, data?, message?, error?}` envelope the web client expects.

pub mod health;
pub mod scripts;
pub mod sessions;
pub mod upload;

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;
use vidscript_core::Error;

use crate::state::AppState;

/// Build the main Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_bytes;
    Router::new()
        .nest("/api", api_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(health::routes())
        .merge(sessions::routes())
        .merge(upload::routes())
        .merge(scripts::routes())
}

/// `{success: true, data}`.
pub(crate) fn ok(data: impl serde::Serialize) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

/// Failed request, rendered as `{success: false, error}` with a status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn llm_unavailable() -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "未配置DeepSeek API密钥，无法生成脚本",
        )
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        match e {
            Error::Validation(msg) | Error::UnsupportedFormat(msg) => Self::bad_request(msg),
            Error::NotFound(msg) => Self::not_found(msg),
            Error::Llm(msg) => {
                error!("LLM request failed: {}", msg);
                Self::new(StatusCode::BAD_GATEWAY, "生成脚本失败")
            }
            other => {
                error!("Request failed: {}", other);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "success": false, "error": self.message })),
        )
            .into_response()
    }
}

/// Deserialize a JSON body, answering malformed input inside the envelope.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::bad_request(format!("请求格式错误: {}", e)))
}
