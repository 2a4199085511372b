//! Image command implementation

use anyhow::{Context, Result};
use qianfan::{ImageSize, ImageStyle, Session, SessionConfig, Text2ImageRequest};
use serde::de::DeserializeOwned;
use std::path::PathBuf;

/// Optional generation settings from the command line
pub struct ImageOptions {
    pub negative: Option<String>,
    pub size: Option<String>,
    pub n: u8,
    pub style: Option<String>,
    pub seed: Option<u32>,
    pub out: PathBuf,
}

/// Parse a value by its wire name, e.g. "1024x768" or "Digital Art"
fn parse_wire<T: DeserializeOwned>(kind: &str, value: &str) -> Result<T> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .with_context(|| format!("Invalid {}: {}", kind, value))
}

/// Run the image command
pub async fn run(prompt: String, options: ImageOptions) -> Result<()> {
    let mut request = Text2ImageRequest::new(prompt).n(options.n);
    request.negative_prompt = options.negative;
    request.seed = options.seed;
    if let Some(size) = &options.size {
        request.size = Some(parse_wire::<ImageSize>("size", size)?);
    }
    if let Some(style) = &options.style {
        request.style = Some(parse_wire::<ImageStyle>("style", style)?);
    }

    let session = Session::from_config(SessionConfig::load()?)?;
    let response = session.text2image(&request).await?;

    std::fs::create_dir_all(&options.out)
        .with_context(|| format!("Failed to create {}", options.out.display()))?;

    for image in &response.data {
        let path = options.out.join(format!("{}-{}.png", response.id, image.index));
        std::fs::write(&path, image.decode()?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("{}", path.display());
    }

    Ok(())
}
