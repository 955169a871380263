//! Script routes: batch generation, single-template regeneration, edits.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::routing::{post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use vidscript_core::{ProductInfo, ScriptTemplateType, ScriptUpdate};
use vidscript_llm::template_name;

use super::{ok, parse_body, ApiError};
use crate::state::AppState;

const REQUIRED_FIELDS_MESSAGE: &str = "品牌名称、行业和视频目的是必填项";
const SELLING_POINTS_MESSAGE: &str = "核心卖点必须包含1-3个";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/generate", post(generate_scripts))
        .route("/scripts/{id}", put(update_script))
        .route(
            "/sessions/{session_id}/templates/{template}",
            post(regenerate_template),
        )
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateBody {
    product_info: Value,
    #[serde(default)]
    session_id: Option<String>,
}

/// Check the submitted form and turn it into a `ProductInfo`.
fn validate_product_info(raw: Value) -> Result<ProductInfo, ApiError> {
    let present = |key: &str| {
        raw.get(key)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.trim().is_empty())
    };
    if !present("brandName") || !present("industry") || !present("videoPurpose") {
        return Err(ApiError::bad_request(REQUIRED_FIELDS_MESSAGE));
    }

    let points = raw
        .get("sellingPoints")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    if !(1..=3).contains(&points) {
        return Err(ApiError::bad_request(SELLING_POINTS_MESSAGE));
    }

    serde_json::from_value(raw).map_err(|e| ApiError::bad_request(format!("产品信息无效: {}", e)))
}

/// POST /api/generate: store the product info and generate all six scripts.
async fn generate_scripts(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let req: GenerateBody = parse_body(&body)?;
    let info = validate_product_info(req.product_info)?;
    let generator = state.generator.as_ref().ok_or_else(ApiError::llm_unavailable)?;

    let session_id = match req.session_id.filter(|id| !id.trim().is_empty()) {
        Some(id) => {
            state.store.ensure_session(&id)?;
            id
        }
        None => state.store.create_session()?.id,
    };
    state.store.save_product_info(&session_id, &info)?;

    let generated = generator.generate_all(&info, &session_id).await;
    let scripts = generated
        .iter()
        .map(|script| state.store.add_script(script))
        .collect::<vidscript_core::Result<Vec<_>>>()?;
    info!(
        "Generated {} scripts for session {} ({})",
        scripts.len(),
        session_id,
        info.brand_name
    );

    Ok(ok(json!({ "sessionId": session_id, "scripts": scripts })))
}

/// PUT /api/scripts/{id}: partial update of a script's text sections.
async fn update_script(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let update: ScriptUpdate = parse_body(&body)?;
    if !state.store.update_script(id, &update)? {
        return Err(ApiError::not_found("脚本不存在"));
    }
    Ok(Json(json!({ "success": true, "message": "脚本更新成功" })))
}

/// POST /api/sessions/{session_id}/templates/{template}: regenerate one
/// template from the session's latest product info.
async fn regenerate_template(
    State(state): State<Arc<AppState>>,
    Path((session_id, template)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let template = ScriptTemplateType::parse(&template)
        .ok_or_else(|| ApiError::bad_request(format!("未知的模板类型: {}", template)))?;
    if !state.store.session_exists(&session_id)? {
        return Err(ApiError::not_found("会话不存在"));
    }
    let info = state
        .store
        .latest_product_info(&session_id)?
        .ok_or_else(|| ApiError::not_found("未找到产品信息"))?;
    let generator = state.generator.as_ref().ok_or_else(ApiError::llm_unavailable)?;

    let mut script = generator.generate(&info, template).await?;
    script.session_id = session_id;
    let saved = state.store.add_script(&script)?;
    info!(
        "Regenerated {} script for session {}",
        template_name(template),
        saved.session_id
    );

    Ok(ok(saved))
}
