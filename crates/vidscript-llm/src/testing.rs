//! Canned chat-completion endpoint for unit tests.

use axum::http::{header, StatusCode};
use axum::routing::post;
use axum::Router;
use tokio::net::TcpListener;

use crate::client::ChatClient;

/// Wrap `content` the way a chat-completion endpoint returns it.
pub(crate) fn chat_reply(content: &str) -> String {
    serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    })
    .to_string()
}

/// Serve `body` with `status` to every completion request; returns the
/// endpoint URL.
pub(crate) async fn serve_canned(status: u16, body: String) -> String {
    let status = StatusCode::from_u16(status).unwrap();
    let app = Router::new().route(
        "/chat/completions",
        post(move || {
            let body = body.clone();
            async move { (status, [(header::CONTENT_TYPE, "application/json")], body) }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    format!("http://{}/chat/completions", addr)
}

/// A client pointed at `url` that bypasses any system proxy.
pub(crate) fn test_client(url: &str) -> ChatClient {
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    ChatClient::new(http, url, "deepseek-chat", "sk-test")
}
