//! Bearer token state and credential exchange payloads

use super::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the current time, in Unix epoch seconds
pub trait Clock: Send + Sync {
    /// Seconds since the Unix epoch
    fn now(&self) -> u64;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0)
    }
}

/// Result of a credential exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    /// Bearer token
    pub access_token: String,

    /// Lifetime in seconds (30 days for Qianfan applications)
    pub expires_in: u64,
}

/// Authentication failure carried by a token endpoint body, if any
///
/// The endpoint reports failures as `{"error": ..., "error_description": ...}`.
pub(crate) fn auth_error(body: &Value) -> Option<Error> {
    let error = body.get("error")?;
    let description = body.get("error_description")?;
    tracing::debug!(error = %error, "credential exchange rejected");
    Some(Error::Authentication(value_text(description.clone())))
}

/// String content of a JSON value without surrounding quotes
pub(crate) fn value_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Cached bearer token
///
/// Starts unset (expiry 0) so the first use always refreshes.
#[derive(Debug, Default)]
pub(crate) struct TokenState {
    token: String,
    expires_at: u64,
}

impl TokenState {
    /// Token usable at `now`, if any
    pub(crate) fn valid_token(&self, now: u64) -> Option<&str> {
        (now < self.expires_at).then_some(self.token.as_str())
    }

    /// Store a fresh token obtained at `now`
    pub(crate) fn store(&mut self, response: &AccessTokenResponse, now: u64) {
        self.token = response.access_token.clone();
        self.expires_at = now.saturating_add(response.expires_in);
    }

    /// Forget the cached token
    pub(crate) fn clear(&mut self) {
        self.token.clear();
        self.expires_at = 0;
    }

    pub(crate) fn expires_at(&self) -> u64 {
        self.expires_at
    }
}
