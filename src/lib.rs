//! Async client for the Baidu Qianfan (Wenxin Workshop) API
//!
//! A [`Session`] exchanges an API key / secret key pair for a bearer token,
//! caches it until expiry, and dispatches chat and text-to-image requests to
//! the endpoint registered for each model.
//!
//! ```no_run
//! # async fn run() -> qianfan::Result<()> {
//! use qianfan::{ChatRequest, Message, Session};
//!
//! let session = Session::new("api-key", "secret-key")?;
//! let response = session.chat(&ChatRequest::new(vec![Message::user("你好")])).await?;
//! println!("{}", response.result);
//! # Ok(())
//! # }
//! ```
mod client;
mod config;
mod image;
mod message;
mod registry;
mod token;

use thiserror::Error;

/// Result type for qianfan operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for qianfan operations
#[derive(Debug, Error)]
pub enum Error {
    /// Credential exchange rejected by the authentication endpoint
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Structured error payload returned in place of a success body
    #[error("API error {code}: {message}")]
    Vendor {
        /// Vendor error code (`error_code`)
        code: i64,
        /// Vendor error description (`error_msg`)
        message: String,
    },

    /// Request uses a capability the library or the model does not support
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Non-success HTTP status without a recognizable error body
    #[error("HTTP status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Image payload is not valid base64
    #[error("Image decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Human-readable message supplied by the vendor, if this error carries one
    pub fn vendor_message(&self) -> Option<&str> {
        match self {
            Error::Authentication(message) => Some(message),
            Error::Vendor { message, .. } => Some(message),
            _ => None,
        }
    }
}

pub use client::{Client, Session, SessionBuilder};
pub use config::{SessionConfig, DEFAULT_API_BASE, DEFAULT_AUTH_URL};
pub use image::{ImageData, ImageSize, ImageStyle, ImageUsage, Sampler, Text2ImageRequest, Text2ImageResponse};
pub use message::{
    ChatRequest, ChatResponse, Function, FunctionCall, Message, MessageRole, PluginUsage, Usage,
};
pub use registry::{resolve_endpoint, ChatModel, ModelFamily};
pub use token::{AccessTokenResponse, Clock, SystemClock};
