//! Chat command implementation

use anyhow::Result;
use qianfan::{ChatModel, ChatRequest, Message, Session, SessionConfig};
use std::io::{self, Read};

/// Optional request settings from the command line
pub struct ChatOptions {
    pub endpoint: Option<String>,
    pub system: Option<String>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub token_stats: bool,
}

/// Run the chat command
pub async fn run(model: ChatModel, options: ChatOptions, query: Vec<String>) -> Result<()> {
    let config = SessionConfig::load()?;

    // Handle query: if no args provided, read from stdin
    let query_text = if query.is_empty() {
        let mut buffer = String::new();
        io::stdin().lock().read_to_string(&mut buffer)?;
        buffer.trim().to_string()
    } else {
        query.join(" ")
    };
    if query_text.is_empty() {
        anyhow::bail!("Empty query");
    }

    let endpoint = options
        .endpoint
        .as_deref()
        .map(|name| config.endpoint(name).to_string());

    let mut request = ChatRequest::new(vec![Message::user(query_text)]);
    request.system = options.system;
    request.temperature = options.temperature;
    request.top_p = options.top_p;

    tracing::debug!(model = %model, endpoint = ?endpoint, "Sending chat request");

    let session = Session::from_config(config)?;
    let response = session
        .chat_with(&request, model, endpoint.as_deref())
        .await?;

    println!("{}", response.result);

    if response.need_clear_history {
        eprintln!("warning: the input was flagged (ban_round = {})", response.ban_round);
    }

    if options.token_stats {
        println!();
        println!("=== Token Stats ===");
        println!("Prompt tokens: {}", response.usage.prompt_tokens);
        println!("Completion tokens: {}", response.usage.completion_tokens);
        println!("Total tokens: {}", response.usage.total_tokens);
        for plugin in &response.usage.plugins {
            println!("Plugin {}: {} tokens", plugin.name, plugin.total_tokens);
        }
    }

    Ok(())
}
