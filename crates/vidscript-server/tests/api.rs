//! Router-level API tests: response envelopes, status codes and the
//! store-backed session flow, driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use vidscript_core::{
    AppConfig, DataPaths, MatchStrategy, ProductInfo, ScriptContent, ScriptTemplateType,
};
use vidscript_llm::{AiParser, ChatClient, ScriptGenerator};
use vidscript_server::{build_router, AppState};
use vidscript_store::ScriptStore;

const BRIEF: &str = "品牌：斐萃\n核心卖点：高吸收、天然提取\n行业：保健品\n平台：抖音";

const SCRIPT_REPLY: &str = "标题：三秒告别熬夜脸\n封面建议：前后对比图\n黄金3s钩子：你是不是也天天熬夜？\n内容文案：每天一粒，轻松补充营养\n拍摄建议：近景特写\n爆款属性：ARPU 1.5万-2万";

fn test_app() -> (Router, Arc<AppState>, TempDir) {
    test_app_with_generator(None)
}

fn test_app_with_generator(generator: Option<ScriptGenerator>) -> (Router, Arc<AppState>, TempDir) {
    let dir = TempDir::new().unwrap();
    let data_paths = DataPaths::new(dir.path()).unwrap();
    let store = ScriptStore::open(&data_paths.database).unwrap();
    let config = AppConfig {
        port: 0,
        data_paths,
        match_strategy: MatchStrategy::default(),
        max_upload_bytes: 10 * 1024 * 1024,
    };
    let state = Arc::new(AppState::with_llm(
        config,
        store,
        AiParser::unconfigured(MatchStrategy::default()),
        generator,
    ));
    (build_router(state.clone()), state, dir)
}

/// A generator backed by a local completion endpoint that always answers
/// with `reply`.
async fn canned_generator(reply: &'static str) -> ScriptGenerator {
    let body = json!({
        "choices": [{"message": {"role": "assistant", "content": reply}}]
    })
    .to_string();
    let endpoint = Router::new().route(
        "/chat/completions",
        axum::routing::post(move || {
            let body = body.clone();
            async move { ([(header::CONTENT_TYPE, "application/json")], body) }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, endpoint).await.unwrap() });

    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    let client = ChatClient::new(
        http,
        format!("http://{}/chat/completions", addr),
        "deepseek-chat",
        "sk-test",
    );
    ScriptGenerator::new(client, Duration::from_secs(5))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn send_json(app: &Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, bytes) = send(app, request).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, bytes) = send(app, request).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn multipart_request(filename: &str, content: &[u8]) -> Request<Body> {
    let boundary = "vidscriptboundary";
    let mut body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n",
        b = boundary,
        f = filename
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

fn stored_script(session_id: &str, template: ScriptTemplateType, title: &str) -> ScriptContent {
    ScriptContent {
        session_id: session_id.into(),
        title: title.into(),
        content: "正文".into(),
        ..ScriptContent::empty(template)
    }
}

#[tokio::test]
async fn test_health() {
    let (app, _state, _dir) = test_app();
    let (status, body) = get_json(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["aiConfigured"], false);
    assert_eq!(body["matchStrategy"], "most-matches");
}

#[tokio::test]
async fn test_extract_rules_only() {
    let (app, _state, _dir) = test_app();
    let (status, body) = send_json(&app, "POST", "/api/extract", json!({ "text": BRIEF })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let info = &body["data"]["extractedInfo"];
    assert_eq!(info["brandName"], "斐萃");
    assert_eq!(info["industry"], "保健品");
    assert_eq!(info["platforms"], json!(["抖音"]));
}

#[tokio::test]
async fn test_extract_rejects_unknown_strategy() {
    let (app, _state, _dir) = test_app();
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/extract",
        json!({ "text": BRIEF, "strategy": "argmax" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_upload_plain_text_falls_back_to_rules() {
    let (app, _state, _dir) = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Body::from(BRIEF))
        .unwrap();
    let (status, bytes) = send(&app, request).await;
    let body: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["source"], "rules");
    assert!(body["confidence"].is_null());
    assert_eq!(body["data"]["content"], BRIEF);
    assert_eq!(body["data"]["extractedInfo"]["brandName"], "斐萃");
}

#[tokio::test]
async fn test_upload_json_content() {
    let (app, _state, _dir) = test_app();
    let (status, body) =
        send_json(&app, "POST", "/api/upload", json!({ "content": BRIEF })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["extractedInfo"]["industry"], "保健品");
}

#[tokio::test]
async fn test_upload_empty_text_yields_defaults() {
    let (app, _state, _dir) = test_app();
    let (status, body) = send_json(&app, "POST", "/api/upload", json!({ "content": "" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"]["extractedInfo"],
        serde_json::to_value(ProductInfo::default()).unwrap()
    );
}

#[tokio::test]
async fn test_upload_multipart_file() {
    let (app, _state, _dir) = test_app();
    let (status, bytes) = send(&app, multipart_request("brief.txt", BRIEF.as_bytes())).await;
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["content"], BRIEF);
    assert_eq!(body["data"]["extractedInfo"]["brandName"], "斐萃");
}

#[tokio::test]
async fn test_upload_rejects_unsupported_file() {
    let (app, _state, _dir) = test_app();
    let (status, bytes) = send(&app, multipart_request("brief.xlsx", b"binary")).await;
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_generate_validation() {
    let (app, _state, _dir) = test_app();

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/generate",
        json!({ "productInfo": { "brandName": "", "industry": "食品", "videoPurpose": "种草带货",
                                 "sellingPoints": ["好吃"] } }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "品牌名称、行业和视频目的是必填项");

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/generate",
        json!({ "productInfo": { "brandName": "斐萃", "industry": "食品", "videoPurpose": "种草带货",
                                 "sellingPoints": ["a", "b", "c", "d"] } }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "核心卖点必须包含1-3个");
}

#[tokio::test]
async fn test_generate_without_api_key_is_unavailable() {
    let (app, _state, _dir) = test_app();
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/generate",
        json!({ "productInfo": { "brandName": "斐萃", "industry": "食品", "videoPurpose": "种草带货",
                                 "sellingPoints": ["好吃"] } }),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_generate_stores_all_templates() {
    let (app, state, _dir) = test_app_with_generator(Some(canned_generator(SCRIPT_REPLY).await));

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/generate",
        json!({ "productInfo": { "brandName": "斐萃", "industry": "保健品", "videoPurpose": "种草带货",
                                 "sellingPoints": ["高吸收", "天然提取"] } }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let session_id = body["data"]["sessionId"].as_str().unwrap().to_string();
    let scripts = body["data"]["scripts"].as_array().unwrap();
    assert_eq!(scripts.len(), ScriptTemplateType::ALL.len());
    assert!(scripts.iter().all(|s| s["title"] == "三秒告别熬夜脸"));
    assert!(scripts.iter().all(|s| s["sessionId"] == session_id.as_str()));

    assert_eq!(state.store.list_scripts(&session_id).unwrap().len(), 6);
    let saved = state.store.latest_product_info(&session_id).unwrap().unwrap();
    assert_eq!(saved.brand_name, "斐萃");

    let uri = format!("/api/sessions/{}/templates/tutorial", session_id);
    let (status, body) = send_json(&app, "POST", &uri, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["templateType"], "tutorial");
    assert_eq!(body["data"]["hook"], "你是不是也天天熬夜？");
    assert_eq!(state.store.list_scripts(&session_id).unwrap().len(), 7);
}

#[tokio::test]
async fn test_generate_reuses_client_session_id() {
    let (app, state, _dir) = test_app_with_generator(Some(canned_generator(SCRIPT_REPLY).await));

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/generate",
        json!({ "sessionId": "client-session",
                "productInfo": { "brandName": "斐萃", "industry": "保健品", "videoPurpose": "种草带货",
                                 "sellingPoints": ["高吸收"] } }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["sessionId"], "client-session");
    assert!(state.store.session_exists("client-session").unwrap());
    assert_eq!(state.store.list_scripts("client-session").unwrap().len(), 6);
}

#[tokio::test]
async fn test_session_scripts_update_and_export() {
    let (app, state, _dir) = test_app();

    let (status, body) = send_json(&app, "POST", "/api/sessions", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let session_id = body["data"]["sessionId"].as_str().unwrap().to_string();

    let first = state
        .store
        .add_script(&stored_script(&session_id, ScriptTemplateType::Tutorial, "教程"))
        .unwrap();
    state
        .store
        .add_script(&stored_script(&session_id, ScriptTemplateType::Comparison, "对比"))
        .unwrap();

    let (status, body) = get_json(&app, &format!("/api/sessions/{}/scripts", session_id)).await;
    assert_eq!(status, StatusCode::OK);
    let scripts = body["data"].as_array().unwrap();
    assert_eq!(scripts.len(), 2);
    assert_eq!(scripts[0]["templateType"], "tutorial");

    let id = first.id.unwrap();
    let (status, body) = send_json(
        &app,
        "PUT",
        &format!("/api/scripts/{}", id),
        json!({ "title": "新教程" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "脚本更新成功");
    assert_eq!(state.store.get_script(id).unwrap().unwrap().title, "新教程");

    let (status, body) =
        send_json(&app, "PUT", &format!("/api/scripts/{}", id), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "没有需要更新的字段");

    let (status, _) =
        send_json(&app, "PUT", "/api/scripts/9999", json!({ "hook": "x" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let request = Request::builder()
        .uri(format!("/api/sessions/{}/export", session_id))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/plain; charset=utf-8"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        format!("attachment; filename=\"scripts_{}.txt\"", session_id).as_str()
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.starts_with("短视频脚本导出\n"));
    assert!(text.contains("标题: 新教程"));
}

#[tokio::test]
async fn test_export_empty_session_not_found() {
    let (app, state, _dir) = test_app();
    let session = state.store.create_session().unwrap();
    let (status, body) = get_json(&app, &format!("/api/sessions/{}/export", session.id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "没有找到脚本内容");
}

#[tokio::test]
async fn test_regenerate_template_errors() {
    let (app, state, _dir) = test_app();
    let session = state.store.create_session().unwrap();

    let (status, body) =
        send_json(&app, "POST", "/api/sessions/missing/templates/tutorial", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "会话不存在");

    let uri = format!("/api/sessions/{}/templates/tutorial", session.id);
    let (status, body) = send_json(&app, "POST", &uri, json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "未找到产品信息");

    let uri = format!("/api/sessions/{}/templates/unboxing", session.id);
    let (status, _) = send_json(&app, "POST", &uri, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    state
        .store
        .save_product_info(&session.id, &ProductInfo::default())
        .unwrap();
    let uri = format!("/api/sessions/{}/templates/tutorial", session.id);
    let (status, _) = send_json(&app, "POST", &uri, json!({})).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
