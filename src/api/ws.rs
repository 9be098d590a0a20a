//! WebSocket relay for streamed chat completions
//!
//! Each connection carries one exchange: the first text frame is the user
//! message, every upstream chunk is forwarded as its own text frame as it
//! arrives, and the connection closes when the remote stream ends. A client
//! disconnect mid-stream cancels the relay; nothing is buffered.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tracing::{error, info, warn};

use super::chat::ChatState;
use crate::models::ChatMessage;

/// Handle WebSocket upgrade
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<ChatState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: ChatState) {
    let (mut sender, mut receiver) = socket.split();

    // First text frame carries the user message; other frame types are
    // ignored until it arrives.
    let user_input = loop {
        match receiver.next().await {
            Some(Ok(Message::Text(text))) => break text.to_string(),
            Some(Ok(Message::Close(_))) | None => return,
            Some(Ok(_)) => continue,
            Some(Err(e)) => {
                warn!("WebSocket receive error: {}", e);
                return;
            }
        }
    };

    if user_input.trim().is_empty() {
        let _ = sender
            .send(Message::Text("Error: message must not be empty".into()))
            .await;
        let _ = sender.send(Message::Close(None)).await;
        return;
    }

    info!("WebSocket chat message received");

    let history = {
        let mut log = state.log.lock().await;
        log.push(ChatMessage::user(&user_input));
        log.clone()
    };

    let mut stream = match state.chat.stream(&history).await {
        Ok(stream) => stream,
        Err(e) => {
            error!("Failed to open chat stream: {}", e);
            let _ = sender.send(Message::Text(format!("Error: {}", e).into())).await;
            let _ = sender.send(Message::Close(None)).await;
            return;
        }
    };

    let mut reply = String::new();
    loop {
        tokio::select! {
            chunk = stream.next() => match chunk {
                Some(Ok(content)) => {
                    reply.push_str(&content);
                    if sender.send(Message::Text(content.into())).await.is_err() {
                        // Client went away mid-stream; drop the rest.
                        return;
                    }
                }
                Some(Err(e)) => {
                    error!("Chat stream error: {}", e);
                    let _ = sender.send(Message::Text(format!("Error: {}", e).into())).await;
                    break;
                }
                None => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => {
                    info!("WebSocket client disconnected mid-stream");
                    return;
                }
                // Frames sent while a reply is streaming are ignored.
                _ => {}
            },
        }
    }

    if !reply.is_empty() {
        state.log.lock().await.push(ChatMessage::assistant(&reply));
    }

    let _ = sender.send(Message::Close(None)).await;
}
