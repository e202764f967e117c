// tests/common/mod.rs
pub use serde_json::json;

use std::sync::Arc;
use std::time::Duration;

use httpmock::Method::POST;
use httpmock::{Mock, MockServer};
use serde_json::Value;

use crate::cache::token_manager::TokenManager;
use crate::client::chat::Client;
use crate::config::settings::{ApiConfig, AuthConfig};

pub const AUTH_KEY: &str = "dGVzdC1jbGllbnQ6dGVzdC1zZWNyZXQ=";
pub const OAUTH_PATH: &str = "/api/v2/oauth";

pub fn auth_config(server: &MockServer) -> AuthConfig {
    AuthConfig::new(AUTH_KEY).with_oauth_uri(server.base_url()).with_timeout(5)
}

pub fn token_manager(server: &MockServer) -> Arc<TokenManager> {
    Arc::new(TokenManager::new(&auth_config(server)).expect("token manager"))
}

/// Client whose authorization and API endpoints both live on `server`.
pub fn client(server: &MockServer) -> Client {
    let api = ApiConfig::default().with_base_uri(server.base_url()).with_timeout(5);
    Client::new(token_manager(server), &api).expect("client")
}

/// Authorization endpoint answering with `body` after `delay`.
pub async fn mock_oauth<'a>(server: &'a MockServer, body: Value, delay: Duration) -> Mock<'a> {
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path(OAUTH_PATH)
                .header("authorization", format!("Basic {}", AUTH_KEY))
                .header("content-type", "application/x-www-form-urlencoded")
                .header("accept", "application/json")
                .header_exists("rquid")
                .body("scope=GIGACHAT_API_PERS");
            then.status(200)
                .header("content-type", "application/json")
                .delay(delay)
                .json_body(body);
        })
        .await
}

/// Authorization endpoint issuing `token` valid for an hour.
pub async fn mock_valid_token<'a>(server: &'a MockServer, token: &str) -> Mock<'a> {
    let expires_at_ms = (chrono::Utc::now().timestamp() + 3600) * 1000;
    mock_oauth(
        server,
        json!({ "access_token": token, "expires_at": expires_at_ms }),
        Duration::ZERO,
    )
    .await
}

pub fn chat_response(content: &str) -> Value {
    json!({
        "choices": [{
            "message": { "role": "assistant", "content": content },
            "index": 0,
            "finish_reason": "stop"
        }],
        "created": 1700000000,
        "model": "GigaChat:1.0.26.20",
        "usage": { "prompt_tokens": 12, "completion_tokens": 7, "total_tokens": 19 },
        "object": "chat.completion"
    })
}

pub fn stream_chunk(content: &str) -> String {
    json!({
        "choices": [{ "delta": { "content": content, "role": "assistant" }, "index": 0 }],
        "created": 1700000000,
        "model": "GigaChat:1.0.26.20",
        "object": "chat.completion"
    })
    .to_string()
}
