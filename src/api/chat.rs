//! Chat and image relay endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::ws;
use crate::ai::{ChatService, ImageRelayService};
use crate::models::{ChatMessage, ChatRequest, ChatResponse, ImageRequest, ImageResponse};
use crate::{prompts, Error, Result};

/// Shared state of the chat/image service.
///
/// The conversation log is shared across requests and connections, so every
/// completion sees the running context.
#[derive(Clone)]
pub struct ChatState {
    pub chat: Arc<dyn ChatService>,
    pub image: Arc<dyn ImageRelayService>,
    pub log: Arc<Mutex<Vec<ChatMessage>>>,
}

impl ChatState {
    pub fn new(chat: Arc<dyn ChatService>, image: Arc<dyn ImageRelayService>) -> Self {
        Self {
            chat,
            image,
            log: Arc::new(Mutex::new(vec![ChatMessage::system(prompts::CHAT_SYSTEM)])),
        }
    }
}

/// Build the chat service router.
pub fn chat_router(state: ChatState) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/image", post(create_image))
        .route("/ws", get(ws::ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn chat(
    State(state): State<ChatState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    if request.message.trim().is_empty() {
        return Err(Error::Validation("message must not be empty".to_string()));
    }

    let history = {
        let mut log = state.log.lock().await;
        log.push(ChatMessage::user(&request.message));
        log.clone()
    };

    let reply = state.chat.complete(&history).await?;
    state.log.lock().await.push(ChatMessage::assistant(&reply));

    Ok(Json(ChatResponse { response: reply }))
}

async fn create_image(
    State(state): State<ChatState>,
    Json(request): Json<ImageRequest>,
) -> Result<Json<ImageResponse>> {
    let prompt = request.prompt.trim();
    if prompt.is_empty() {
        return Err(Error::Validation("prompt must not be empty".to_string()));
    }

    let image_url = state.image.generate_url(prompt).await?;
    Ok(Json(ImageResponse { image_url }))
}
