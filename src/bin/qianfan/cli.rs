//! CLI definitions for qianfan

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "qianfan")]
#[command(about = "Command-line client for the Baidu Qianfan API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send a chat completion request
    Chat {
        /// Model to use (e.g. "ERNIE-Bot-4", "Llama-2-70b-chat")
        #[arg(short, long, default_value = "ERNIE-Bot")]
        model: String,

        /// Custom deployment endpoint or an alias from [endpoints]
        #[arg(short, long)]
        endpoint: Option<String>,

        /// Persona prompt
        #[arg(long)]
        system: Option<String>,

        /// Sampling temperature, (0, 1.0]
        #[arg(short, long)]
        temperature: Option<f32>,

        /// Nucleus sampling, [0, 1.0]
        #[arg(long)]
        top_p: Option<f32>,

        /// Show token usage statistics after response
        #[arg(long)]
        token_stats: bool,

        /// Query text (read from stdin when empty)
        query: Vec<String>,
    },

    /// Generate images with Stable Diffusion XL
    Image {
        /// Negative prompt
        #[arg(long)]
        negative: Option<String>,

        /// Image size, e.g. "1024x1024", "768x1024"
        #[arg(long)]
        size: Option<String>,

        /// Number of images (1-4)
        #[arg(short, default_value_t = 1)]
        n: u8,

        /// Style preset, e.g. "Anime", "Digital Art"
        #[arg(long)]
        style: Option<String>,

        /// Random seed
        #[arg(long)]
        seed: Option<u32>,

        /// Directory to write PNG files into
        #[arg(short, long, default_value = ".")]
        out: String,

        /// Prompt text
        #[arg(required = true)]
        prompt: Vec<String>,
    },

    /// Check credentials by fetching an access token
    Token,

    /// List registered chat models
    Models,
}
