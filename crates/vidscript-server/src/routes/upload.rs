//! Product brief intake: file/text upload with AI-then-rules extraction, and
//! rule-only extraction.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};
use vidscript_core::MatchStrategy;
use vidscript_extract::{decode_upload, extract_product_info_with};
use vidscript_llm::extract_product_info_with_ai;

use super::{ok, parse_body, ApiError};
use crate::state::AppState;

const FILE_FIELD: &str = "file";
const DEFAULT_FILENAME: &str = "upload.txt";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/upload", post(upload))
        .route("/extract", post(extract))
}

#[derive(Deserialize)]
struct ContentBody {
    content: String,
}

#[derive(Deserialize)]
struct ExtractBody {
    text: String,
    #[serde(default)]
    strategy: Option<String>,
}

/// POST /api/upload: multipart `file`, `text/plain` body, or JSON `{content}`.
async fn upload(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Value>, ApiError> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase();

    let content = if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        read_upload_field(multipart).await?
    } else {
        let body = Bytes::from_request(request, &state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        if content_type.starts_with("application/json") {
            parse_body::<ContentBody>(&body)?.content
        } else {
            String::from_utf8_lossy(&body).into_owned()
        }
    };

    let extraction = extract_product_info_with_ai(&state.parser, &content, state.strategy()).await;
    info!(
        "Upload extracted: brand={}, source={:?}, confidence={:?}",
        extraction.info.brand_name, extraction.source, extraction.confidence
    );

    Ok(Json(json!({
        "success": true,
        "data": {
            "content": content,
            "extractedInfo": extraction.info,
        },
        "confidence": extraction.confidence,
        "source": extraction.source,
    })))
}

async fn read_upload_field(mut multipart: Multipart) -> Result<String, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or(DEFAULT_FILENAME).to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        debug!("Received upload {} ({} bytes)", filename, bytes.len());
        return Ok(decode_upload(&filename, &bytes)?);
    }
    Err(ApiError::bad_request("请选择要上传的文件"))
}

/// POST /api/extract: rule-based extraction only.
async fn extract(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let req: ExtractBody = parse_body(&body)?;
    let strategy = match req.strategy.as_deref() {
        Some(raw) => raw
            .parse::<MatchStrategy>()
            .map_err(|e| ApiError::bad_request(e.to_string()))?,
        None => state.strategy(),
    };

    let info = extract_product_info_with(&req.text, strategy);
    Ok(ok(json!({
        "extractedInfo": info,
        "strategy": strategy.to_string(),
    })))
}
