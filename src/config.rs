//! Session configuration
//!
//! Configuration is loaded from multiple sources in priority order:
//! 1. Environment variables (QIANFAN_*) (highest)
//! 2. Local config file (./qianfan.toml)
//! 3. Global config file (~/.qianfan/config.toml)
//! 4. Default values (lowest)

use anyhow::Context;
use indexmap::IndexMap;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Credential exchange endpoint
pub const DEFAULT_AUTH_URL: &str = "https://aip.baidubce.com/oauth/2.0/token";

/// Base URL shared by the chat and text-to-image endpoints
pub const DEFAULT_API_BASE: &str = "https://aip.baidubce.com/rpc/2.0/ai_custom/v1/wenxinworkshop";

const AUTH_PATH: &str = "/oauth/2.0/token";
const API_PATH: &str = "/rpc/2.0/ai_custom/v1/wenxinworkshop";

/// Everything needed to build a [`crate::Session`]
#[derive(Clone)]
pub struct SessionConfig {
    /// Application API Key (Qianfan console, application list)
    pub api_key: String,

    /// Application Secret Key
    pub secret_key: String,

    /// Credential exchange URL
    pub auth_url: String,

    /// API base URL
    pub api_base: String,

    /// Named custom deployments: alias -> endpoint segment
    pub endpoints: IndexMap<String, String>,
}

// Keeps credentials out of logs.
impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("api_key", &"<redacted>")
            .field("secret_key", &"<redacted>")
            .field("auth_url", &self.auth_url)
            .field("api_base", &self.api_base)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

/// One configuration file; every key optional
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    api_key: Option<String>,
    secret_key: Option<String>,
    auth_url: Option<String>,
    api_base: Option<String>,
    #[serde(default)]
    endpoints: IndexMap<String, String>,
}

impl SessionConfig {
    /// Configuration for the public Qianfan service
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        SessionConfig {
            api_key: api_key.into(),
            secret_key: secret_key.into(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            endpoints: IndexMap::new(),
        }
    }

    /// Point both the credential exchange and the API at `host`,
    /// keeping the vendor path layout (used for gateways and mock servers)
    pub fn with_host(mut self, host: &str) -> Self {
        let host = host.trim_end_matches('/');
        self.auth_url = format!("{}{}", host, AUTH_PATH);
        self.api_base = format!("{}{}", host, API_PATH);
        self
    }

    /// Register a named custom deployment
    pub fn with_endpoint(mut self, alias: impl Into<String>, endpoint: impl Into<String>) -> Self {
        self.endpoints.insert(alias.into(), endpoint.into());
        self
    }

    /// Endpoint segment for `name`: the aliased deployment if one is
    /// registered, otherwise `name` itself
    pub fn endpoint<'a>(&'a self, name: &'a str) -> &'a str {
        self.endpoints.get(name).map(String::as_str).unwrap_or(name)
    }

    /// Get the API key
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Get the API base URL
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Load configuration from files and the environment
    ///
    /// ```toml
    /// api_key = "..."
    /// secret_key = "..."
    /// # api_base = "https://aip.baidubce.com/rpc/2.0/ai_custom/v1/wenxinworkshop"
    /// # auth_url = "https://aip.baidubce.com/oauth/2.0/token"
    ///
    /// [endpoints]
    /// my-bot = "abcd1234_custom"
    /// ```
    ///
    /// Environment variables (override config files):
    /// - `QIANFAN_API_KEY` (fallback `API_KEY`)
    /// - `QIANFAN_SECRET_KEY` (fallback `SECRET_KEY`)
    /// - `QIANFAN_AUTH_URL`
    /// - `QIANFAN_API_BASE`
    pub fn load() -> anyhow::Result<Self> {
        let mut files = Vec::new();
        if let Some(home) = dirs::home_dir() {
            files.push(home.join(".qianfan").join("config.toml"));
        }
        files.push(PathBuf::from("qianfan.toml"));

        Self::load_from(&files, |key| std::env::var(key).ok())
    }

    /// Load from `files` (lowest priority first), then apply `env` overrides
    fn load_from<F>(files: &[PathBuf], env: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut merged = FileConfig::default();
        for path in files.iter().filter(|p| p.is_file()) {
            let layer = read_file(path)?;
            tracing::debug!(path = %path.display(), "loaded config file");
            merged.api_key = layer.api_key.or(merged.api_key);
            merged.secret_key = layer.secret_key.or(merged.secret_key);
            merged.auth_url = layer.auth_url.or(merged.auth_url);
            merged.api_base = layer.api_base.or(merged.api_base);
            merged.endpoints.extend(layer.endpoints);
        }

        let api_key = env("QIANFAN_API_KEY")
            .or_else(|| merged.api_key.clone())
            .or_else(|| env("API_KEY"))
            .ok_or_else(|| anyhow::anyhow!("api_key not found in config or environment (QIANFAN_API_KEY)"))?;

        let secret_key = env("QIANFAN_SECRET_KEY")
            .or_else(|| merged.secret_key.clone())
            .or_else(|| env("SECRET_KEY"))
            .ok_or_else(|| {
                anyhow::anyhow!("secret_key not found in config or environment (QIANFAN_SECRET_KEY)")
            })?;

        let auth_url = env("QIANFAN_AUTH_URL")
            .or(merged.auth_url)
            .unwrap_or_else(|| DEFAULT_AUTH_URL.to_string());

        let api_base = env("QIANFAN_API_BASE")
            .or(merged.api_base)
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        Ok(SessionConfig {
            api_key,
            secret_key,
            auth_url,
            api_base,
            endpoints: merged.endpoints,
        })
    }
}

fn read_file(path: &Path) -> anyhow::Result<FileConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Invalid config file {}", path.display()))
}
