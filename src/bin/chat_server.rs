//! chat-server - chat and image relay service

use std::sync::Arc;

use anyhow::Result;
use brandgen::ai::{OpenAiChatClient, OpenAiImageClient};
use brandgen::api::{chat_router, ChatState};
use brandgen::models::ChatConfig;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "chat-server")]
#[command(about = "Relay chat messages and image prompts to hosted AI APIs")]
struct CliArgs {
    /// Address to listen on, overriding CHAT_BIND_ADDR.
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
    let config = ChatConfig::from_env()?;
    let bind_addr = args.bind.unwrap_or_else(|| config.bind_addr.clone());

    // One HTTP connection pool shared across provider clients.
    let http_client = reqwest::Client::new();
    let chat = OpenAiChatClient::new_with_client(
        config.openai_api_key.clone(),
        config.chat_model.clone(),
        http_client.clone(),
    );
    let image = OpenAiImageClient::new_with_client(config.openai_api_key.clone(), http_client);

    let state = ChatState::new(Arc::new(chat), Arc::new(image));
    let app = chat_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(
        "Chat service listening on {} (model: {})",
        listener.local_addr()?,
        config.chat_model
    );
    axum::serve(listener, app).await?;

    Ok(())
}
