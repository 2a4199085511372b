//! Token command implementation

use anyhow::Result;
use qianfan::{Session, SessionConfig};
use tracing::info;

/// Run the token command
pub async fn run() -> Result<()> {
    let config = match SessionConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            eprintln!();
            eprintln!("Make sure to set up qianfan.toml or environment variables:");
            eprintln!();
            eprintln!("qianfan.toml:");
            eprintln!("  api_key = \"...\"");
            eprintln!("  secret_key = \"...\"");
            eprintln!();
            eprintln!("Or set environment variables:");
            eprintln!("  export QIANFAN_API_KEY=\"...\"");
            eprintln!("  export QIANFAN_SECRET_KEY=\"...\"");
            std::process::exit(1);
        }
    };

    info!(auth_url = %config.auth_url, "Exchanging credentials");

    let key = config.api_key();
    println!("API Key: {}***", &key[..key.char_indices().nth(8).map_or(key.len(), |(i, _)| i)]);
    println!("API Base: {}", config.api_base());

    let session = Session::from_config(config)?;
    let token = session.get_access_token().await?;

    let expires_at = i64::try_from(token.expires_in)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .and_then(|ttl| chrono::Local::now().checked_add_signed(ttl));
    match expires_at {
        Some(at) => println!("Access token obtained, valid until {}", at.format("%Y-%m-%d %H:%M:%S")),
        None => println!("Access token obtained, valid for {}s", token.expires_in),
    }

    Ok(())
}
