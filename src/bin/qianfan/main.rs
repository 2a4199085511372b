//! qianfan binary entry point

use anyhow::Result;

mod chat;
mod cli;
mod image;
mod token;

use clap::Parser;
use cli::{Cli, Commands};
use qianfan::ChatModel;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Chat {
            model,
            endpoint,
            system,
            temperature,
            top_p,
            token_stats,
            query,
        } => {
            let options = chat::ChatOptions {
                endpoint,
                system,
                temperature,
                top_p,
                token_stats,
            };
            chat::run(model.parse()?, options, query).await?;
        }
        Commands::Image {
            negative,
            size,
            n,
            style,
            seed,
            out,
            prompt,
        } => {
            let options = image::ImageOptions {
                negative,
                size,
                n,
                style,
                seed,
                out: out.into(),
            };
            image::run(prompt.join(" "), options).await?;
        }
        Commands::Token => {
            token::run().await?;
        }
        Commands::Models => {
            println!("{:<30} {:<30} FAMILY", "MODEL", "ENDPOINT");
            for model in ChatModel::ALL {
                println!("{:<30} {:<30} {}", model.name(), model.endpoint(), model.family());
            }
        }
    }

    Ok(())
}
