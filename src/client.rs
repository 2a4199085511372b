//! Qianfan session: bearer token lifecycle and request dispatch

use super::{
    config::SessionConfig,
    image::{Text2ImageRequest, Text2ImageResponse},
    message::{ChatRequest, ChatResponse},
    registry::{resolve_chat_endpoint, ChatModel},
    token::{auth_error, value_text, AccessTokenResponse, Clock, SystemClock, TokenState},
    Error, Result,
};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client as HttpClient, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

/// Endpoint segment of the Stable Diffusion XL deployment
const TEXT2IMAGE_ENDPOINT: &str = "sd_xl";

const JSON_MIME: &str = "application/json";

/// Trait for Qianfan clients
#[async_trait::async_trait]
pub trait Client: Send + Sync {
    /// Send a chat completion request to `model`, or to `endpoint` when given
    async fn chat_with(
        &self,
        request: &ChatRequest,
        model: ChatModel,
        endpoint: Option<&str>,
    ) -> Result<ChatResponse>;

    /// Send a text-to-image request
    async fn text2image(&self, request: &Text2ImageRequest) -> Result<Text2ImageResponse>;

    /// Send a chat completion request to the default model (ERNIE-Bot)
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.chat_with(request, ChatModel::default(), None).await
    }
}

/// Authenticated connection to the Qianfan API
///
/// Holds the credentials and a cached bearer token. The token is fetched on
/// first use and again whenever it has expired; concurrent callers share a
/// single refresh. A `Session` is `Send + Sync` and can be shared behind an
/// `Arc`.
pub struct Session {
    config: SessionConfig,
    http_client: HttpClient,
    clock: Arc<dyn Clock>,
    token: Mutex<TokenState>,
}

/// Builder for [`Session`] with a custom clock or HTTP client
pub struct SessionBuilder {
    config: SessionConfig,
    clock: Arc<dyn Clock>,
    http_client: Option<HttpClient>,
}

impl SessionBuilder {
    /// Read time from `clock` instead of the system clock
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Send requests through a preconfigured HTTP client
    pub fn http_client(mut self, http_client: HttpClient) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// Build the session
    pub fn build(self) -> Result<Session> {
        let http_client = match self.http_client {
            Some(client) => client,
            None => HttpClient::builder().build()?,
        };
        Ok(Session {
            config: self.config,
            http_client,
            clock: self.clock,
            token: Mutex::new(TokenState::default()),
        })
    }
}

impl Session {
    /// Create a session for the public Qianfan service
    ///
    /// `api_key` and `secret_key` are listed in the Qianfan console under
    /// the application list.
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Result<Self> {
        Self::from_config(SessionConfig::new(api_key, secret_key))
    }

    /// Create a session from a loaded configuration
    pub fn from_config(config: SessionConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    /// Start building a session
    pub fn builder(config: SessionConfig) -> SessionBuilder {
        SessionBuilder {
            config,
            clock: Arc::new(SystemClock),
            http_client: None,
        }
    }

    /// Configuration this session was built from
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Exchange the credentials for a new access token and cache it
    ///
    /// Always contacts the authentication endpoint, even when the cached
    /// token is still valid.
    #[instrument(skip(self))]
    pub async fn get_access_token(&self) -> Result<AccessTokenResponse> {
        let mut state = self.token.lock().await;
        self.refresh(&mut state).await
    }

    /// Expiry of the cached token in epoch seconds, if one is still valid
    pub async fn token_expires_at(&self) -> Option<u64> {
        let state = self.token.lock().await;
        let valid = state.valid_token(self.clock.now()).is_some();
        valid.then(|| state.expires_at())
    }

    /// Send a chat completion request to the default model (ERNIE-Bot)
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.chat_with(request, ChatModel::default(), None).await
    }

    /// Send a chat completion request
    ///
    /// A non-empty `endpoint` targets a custom deployment instead of the
    /// registered endpoint of `model`; `model` still decides which request
    /// features are allowed.
    #[instrument(skip(self, request), fields(model = %model, messages = request.messages.len()))]
    pub async fn chat_with(
        &self,
        request: &ChatRequest,
        model: ChatModel,
        endpoint: Option<&str>,
    ) -> Result<ChatResponse> {
        let endpoint = resolve_chat_endpoint(model, endpoint, request)?;
        self.dispatch("chat", endpoint, request).await
    }

    /// Generate images from a text prompt
    #[instrument(skip(self, request))]
    pub async fn text2image(&self, request: &Text2ImageRequest) -> Result<Text2ImageResponse> {
        self.dispatch("text2image", TEXT2IMAGE_ENDPOINT, request).await
    }

    /// Return a valid token, refreshing it first if it has expired
    async fn ensure_token(&self) -> Result<String> {
        let mut state = self.token.lock().await;
        if let Some(token) = state.valid_token(self.clock.now()) {
            return Ok(token.to_string());
        }
        let response = self.refresh(&mut state).await?;
        Ok(response.access_token)
    }

    /// Run the credential exchange and update `state`; the lock is held by
    /// the caller so concurrent refreshes collapse into one
    async fn refresh(&self, state: &mut TokenState) -> Result<AccessTokenResponse> {
        debug!(auth_url = %self.config.auth_url, "Refreshing access token");
        match self.exchange_credentials().await {
            Ok(response) => {
                state.store(&response, self.clock.now());
                debug!(expires_in = response.expires_in, "Access token refreshed");
                Ok(response)
            }
            Err(e) => {
                state.clear();
                warn!(error = %e, "Credential exchange failed");
                Err(e)
            }
        }
    }

    /// Transport errors are stripped of their URL, which carries the
    /// client secret in the query string
    async fn exchange_credentials(&self) -> Result<AccessTokenResponse> {
        let response = self
            .http_client
            .post(&self.config.auth_url)
            .query(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.api_key.as_str()),
                ("client_secret", self.config.secret_key.as_str()),
            ])
            .header(CONTENT_TYPE, JSON_MIME)
            .header(ACCEPT, JSON_MIME)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        let text = response.text().await.map_err(reqwest::Error::without_url)?;
        let body = parse_body(status, &text)?;

        if let Some(err) = auth_error(&body) {
            return Err(err);
        }
        ensure_success(status, &text)?;

        Ok(serde_json::from_value(body)?)
    }

    /// POST `body` to `<api_base>/<operation>/<endpoint>` with a valid token
    async fn dispatch<B, R>(&self, operation: &str, endpoint: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let token = self.ensure_token().await?;
        let url = format!(
            "{}/{}/{}",
            self.config.api_base.trim_end_matches('/'),
            operation,
            endpoint
        );
        debug!(url = %url, "Sending request");

        let response = self
            .http_client
            .post(&url)
            .query(&[("access_token", token.as_str())])
            .header(CONTENT_TYPE, JSON_MIME)
            .header(ACCEPT, JSON_MIME)
            .json(body)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        let text = response.text().await.map_err(reqwest::Error::without_url)?;
        debug!(status = %status, bytes = text.len(), "Received response");

        let result = classify(status, &text);
        if let Err(Error::Vendor { code, message }) = &result {
            warn!(code = *code, message = %message, "Qianfan API returned an error");
        }
        result
    }
}

#[async_trait::async_trait]
impl Client for Session {
    async fn chat_with(
        &self,
        request: &ChatRequest,
        model: ChatModel,
        endpoint: Option<&str>,
    ) -> Result<ChatResponse> {
        Session::chat_with(self, request, model, endpoint).await
    }

    async fn text2image(&self, request: &Text2ImageRequest) -> Result<Text2ImageResponse> {
        Session::text2image(self, request).await
    }
}

/// Parse a response body as JSON; unparseable bodies on error statuses are
/// reported with the status
fn parse_body(status: StatusCode, text: &str) -> Result<Value> {
    match serde_json::from_str(text) {
        Ok(body) => Ok(body),
        Err(_) if !status.is_success() => Err(status_error(status, text)),
        Err(e) => Err(e.into()),
    }
}

fn ensure_success(status: StatusCode, text: &str) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(status_error(status, text))
    }
}

fn status_error(status: StatusCode, text: &str) -> Error {
    Error::Status {
        status: status.as_u16(),
        body: text.to_string(),
    }
}

/// Vendor error carried by an API response body, if any
fn vendor_error(body: &Value) -> Option<Error> {
    let code = body.get("error_code")?;
    let message = body.get("error_msg")?;
    let code = code
        .as_i64()
        .or_else(|| code.as_str().and_then(|s| s.parse().ok()))
        .unwrap_or_default();
    Some(Error::Vendor {
        code,
        message: value_text(message.clone()),
    })
}

/// Turn an API response into the typed success body or an error
fn classify<R: DeserializeOwned>(status: StatusCode, text: &str) -> Result<R> {
    let body = parse_body(status, text)?;
    if let Some(err) = vendor_error(&body) {
        return Err(err);
    }
    ensure_success(status, text)?;
    Ok(serde_json::from_value(body)?)
}
