//! marketing-server - branded marketing image service

use std::sync::Arc;

use anyhow::Result;
use brandgen::ai::GeminiImageClient;
use brandgen::api::{marketing_router, MarketingState};
use brandgen::models::MarketingConfig;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "marketing-server")]
#[command(about = "Generate branded marketing images from prompts")]
struct CliArgs {
    /// Address to listen on, overriding MARKETING_BIND_ADDR.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "brandgen=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();
    let config = MarketingConfig::from_env()?;
    let bind_addr = args.bind.unwrap_or_else(|| config.bind_addr.clone());

    std::fs::create_dir_all(&config.out_dir)?;
    info!("Output directory: {}", config.out_dir.display());

    let image_gen = GeminiImageClient::new_with_client(
        config.google_api_key.clone(),
        config.image_model.clone(),
        reqwest::Client::new(),
    );

    let state = MarketingState::new(
        Arc::new(image_gen),
        config.public_base_url.clone(),
        config.out_dir.clone(),
    );
    let app = marketing_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(
        "Marketing service listening on {} (model: {})",
        listener.local_addr()?,
        config.image_model
    );
    axum::serve(listener, app).await?;

    Ok(())
}
