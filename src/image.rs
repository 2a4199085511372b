//! Text-to-image (Stable Diffusion XL) request and response types

use super::Result;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Output resolution, width x height in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageSize {
    #[serde(rename = "768x768")]
    S768x768,
    #[serde(rename = "768x1024")]
    S768x1024,
    #[serde(rename = "1024x768")]
    S1024x768,
    #[serde(rename = "576x1024")]
    S576x1024,
    #[serde(rename = "1024x576")]
    S1024x576,
    #[default]
    #[serde(rename = "1024x1024")]
    S1024x1024,
}

/// Sampling method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Sampler {
    #[default]
    #[serde(rename = "Euler a")]
    EulerA,
    #[serde(rename = "Euler")]
    Euler,
    #[serde(rename = "DPM++ 2M")]
    DpmPp2M,
    #[serde(rename = "DPM++ 2M Karras")]
    DpmPp2MKarras,
    #[serde(rename = "LMS Karras")]
    LmsKarras,
    #[serde(rename = "DPM++ SDE")]
    DpmPpSde,
    #[serde(rename = "DPM++ SDE Karras")]
    DpmPpSdeKarras,
    #[serde(rename = "DPM2 a Karras")]
    Dpm2AKarras,
    #[serde(rename = "Heun")]
    Heun,
    #[serde(rename = "DPM++ 2M SDE")]
    DpmPp2MSde,
    #[serde(rename = "DPM++ 2M SDE Karras")]
    DpmPp2MSdeKarras,
    #[serde(rename = "DPM2")]
    Dpm2,
    #[serde(rename = "DPM2 Karras")]
    Dpm2Karras,
    #[serde(rename = "DPM2 a")]
    Dpm2A,
    #[serde(rename = "LMS")]
    Lms,
}

/// Rendering style preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageStyle {
    #[default]
    Base,
    #[serde(rename = "3D Model")]
    Model3D,
    #[serde(rename = "Analog Film")]
    AnalogFilm,
    Anime,
    Cinematic,
    #[serde(rename = "Comic Book")]
    ComicBook,
    #[serde(rename = "Craft Clay")]
    CraftClay,
    #[serde(rename = "Digital Art")]
    DigitalArt,
    Enhance,
    #[serde(rename = "Fantasy Art")]
    FantasyArt,
    Isometric,
    #[serde(rename = "Line Art")]
    LineArt,
    Lowpoly,
    Neonpunk,
    Origami,
    Photographic,
    #[serde(rename = "Pixel Art")]
    PixelArt,
    Texture,
}

/// Body of a text-to-image request
///
/// The service validates ranges: `n` in 1..=4, `steps` in 10..=50,
/// `cfg_scale` in 0..=30, `seed` in 0..=4294967295.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Text2ImageRequest {
    /// What to draw; under 1024 characters, Chinese or English
    pub prompt: String,

    /// What to keep out of the picture
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,

    /// Output resolution, 1024x1024 when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<ImageSize>,

    /// Number of images to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<u8>,

    /// Diffusion steps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<u8>,

    /// Sampling method, `Euler a` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampler_index: Option<Sampler>,

    /// Random seed; random when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,

    /// Prompt adherence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cfg_scale: Option<f32>,

    /// Style preset, `Base` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ImageStyle>,

    /// Stable identifier of the end user, for abuse monitoring
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Text2ImageRequest {
    /// Create a request for `prompt` with service defaults
    pub fn new(prompt: impl Into<String>) -> Self {
        Text2ImageRequest {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    /// Set the negative prompt
    pub fn negative_prompt(mut self, negative_prompt: impl Into<String>) -> Self {
        self.negative_prompt = Some(negative_prompt.into());
        self
    }

    /// Set the output resolution
    pub fn size(mut self, size: ImageSize) -> Self {
        self.size = Some(size);
        self
    }

    /// Set the number of images
    pub fn n(mut self, n: u8) -> Self {
        self.n = Some(n);
        self
    }

    /// Set the number of diffusion steps
    pub fn steps(mut self, steps: u8) -> Self {
        self.steps = Some(steps);
        self
    }

    /// Set the sampling method
    pub fn sampler(mut self, sampler: Sampler) -> Self {
        self.sampler_index = Some(sampler);
        self
    }

    /// Fix the random seed
    pub fn seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the prompt adherence
    pub fn cfg_scale(mut self, cfg_scale: f32) -> Self {
        self.cfg_scale = Some(cfg_scale);
        self
    }

    /// Set the style preset
    pub fn style(mut self, style: ImageStyle) -> Self {
        self.style = Some(style);
        self
    }
}

/// One generated image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    /// Payload type, `image`
    pub object: String,

    /// Base64-encoded image bytes
    pub b64_image: String,

    /// Position in the batch
    pub index: u32,
}

impl ImageData {
    /// Decode the image bytes
    pub fn decode(&self) -> Result<Vec<u8>> {
        Ok(STANDARD.decode(self.b64_image.as_bytes())?)
    }
}

/// Token usage of a text-to-image call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUsage {
    /// Number of tokens in the prompt
    pub prompt_tokens: u32,

    /// Total number of tokens
    pub total_tokens: u32,
}

/// Successful text-to-image response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text2ImageResponse {
    /// Id of this request
    pub id: String,

    /// Payload type, `image`
    pub object: String,

    /// Unix timestamp
    pub created: i64,

    /// Generated images
    pub data: Vec<ImageData>,

    /// Token accounting for this request
    pub usage: ImageUsage,

    /// Fields not modelled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
