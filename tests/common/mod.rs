//! Mock Qianfan server for testing sessions offline
//!
//! Provides wiremock-based mocks for the credential exchange and the
//! chat / text-to-image endpoints, laid out under the vendor paths so a
//! `SessionConfig::with_host(mock.uri())` session talks to it unchanged.

#![allow(dead_code)]

use qianfan::{Clock, SessionConfig};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, Request, ResponseTemplate,
};

pub const API_KEY: &str = "test-key";
pub const SECRET_KEY: &str = "test-secret";

pub const TOKEN_PATH: &str = "/oauth/2.0/token";
pub const API_PATH: &str = "/rpc/2.0/ai_custom/v1/wenxinworkshop";

/// Qianfan mock server
pub struct QianfanMockServer {
    server: MockServer,
}

impl QianfanMockServer {
    /// Start a new mock server
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Get the base URL of this mock server
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Session configuration pointing at this server
    pub fn config(&self) -> SessionConfig {
        SessionConfig::new(API_KEY, SECRET_KEY).with_host(&self.uri())
    }

    /// Successful credential exchange for the test credentials
    pub async fn mock_token(&self, access_token: &str, expires_in: u64) {
        self.mock_token_response(
            ResponseTemplate::new(200).set_body_json(json!({
                "refresh_token": "25.refresh",
                "expires_in": expires_in,
                "session_key": "9mzdDZXu",
                "access_token": access_token,
                "scope": "public wise_adapt",
                "session_secret": "dfac94a3489fe9fca7c3221cbf7525ff"
            })),
        )
        .await;
    }

    /// Successful credential exchange answered after `delay`
    pub async fn mock_slow_token(&self, access_token: &str, expires_in: u64, delay: Duration) {
        self.mock_token_response(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": access_token, "expires_in": expires_in}))
                .set_delay(delay),
        )
        .await;
    }

    /// Rejected credential exchange
    pub async fn mock_token_error(&self, error: &str, description: &str) {
        self.mock_token_response(
            ResponseTemplate::new(401)
                .set_body_json(json!({"error": error, "error_description": description})),
        )
        .await;
    }

    async fn mock_token_response(&self, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .and(query_param("grant_type", "client_credentials"))
            .and(query_param("client_id", API_KEY))
            .and(query_param("client_secret", SECRET_KEY))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    /// Respond to `POST <api>/chat/<endpoint>` with `body`
    pub async fn mock_chat(&self, endpoint: &str, body: Value) {
        Mock::given(method("POST"))
            .and(path(format!("{}/chat/{}", API_PATH, endpoint)))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Respond to `POST <api>/text2image/sd_xl` with `body`
    pub async fn mock_text2image(&self, body: Value) {
        Mock::given(method("POST"))
            .and(path(format!("{}/text2image/sd_xl", API_PATH)))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Get all received requests
    pub async fn received_requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// Requests received on `path`
    pub async fn requests_to(&self, path: &str) -> Vec<Request> {
        self.received_requests()
            .await
            .into_iter()
            .filter(|r| r.url.path() == path)
            .collect()
    }

    /// Number of credential exchanges received
    pub async fn token_calls(&self) -> usize {
        self.requests_to(TOKEN_PATH).await.len()
    }

    /// Number of chat calls received on `endpoint`
    pub async fn chat_calls(&self, endpoint: &str) -> usize {
        self.requests_to(&format!("{}/chat/{}", API_PATH, endpoint))
            .await
            .len()
    }
}

/// Chat success body
pub fn chat_body(result: &str) -> Value {
    json!({
        "id": "x",
        "object": "chat.completion",
        "created": 0,
        "result": result,
        "need_clear_history": false,
        "ban_round": -1,
        "usage": {"prompt_tokens": 1, "completion_tokens": 1, "total_tokens": 2}
    })
}

/// Access token passed on a request's query string
pub fn access_token_of(request: &Request) -> Option<String> {
    request
        .url
        .query_pairs()
        .find(|(key, _)| key == "access_token")
        .map(|(_, value)| value.into_owned())
}

/// Clock the test moves by hand
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn at(now: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(now)),
        }
    }

    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
