use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use moderation_gateway::config::Config;
use moderation_gateway::moderation::openai::OpenAiModerator;
use moderation_gateway::web::{self, AppState};

/// Moderation Gateway: relay text to the OpenAI Moderation API.
///
/// Exposes POST /moderate plus a health endpoint. Configuration comes from
/// the environment (or a .env file); OPENAI_API_KEY is required.
#[derive(Parser)]
#[command(name = "moderation-gateway", version, about)]
struct Cli {
    /// Port to listen on (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("moderation_gateway=info,tower_http=info")
            }),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    config.require_credential()?;
    if let Some(port) = cli.port {
        config.port = port;
    }

    let moderator = OpenAiModerator::new(
        config.openai_api_key.clone(),
        &config.openai_base_url,
        config.openai_timeout,
    )?;

    let state = AppState::new(config, Arc::new(moderator));
    web::run_server(state, &cli.bind).await
}
