use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use brandgen::ai::{MockChatClient, MockImageRelayClient};
use brandgen::api::{chat_router, ChatState};
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::{connect_async, tungstenite::Message};

async fn spawn_server(state: ChatState) -> SocketAddr {
    let app = chat_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn state_with_chat(chat: MockChatClient) -> ChatState {
    ChatState::new(Arc::new(chat), Arc::new(MockImageRelayClient::new()))
}

#[tokio::test]
async fn test_chat_returns_reply() {
    let chat = MockChatClient::new().with_reply("A sunlit meadow".to_string());
    let addr = spawn_server(state_with_chat(chat)).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/chat", addr))
        .json(&serde_json::json!({ "message": "describe a meadow" }))
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["response"], "A sunlit meadow");
}

#[tokio::test]
async fn test_chat_empty_message_is_rejected_without_upstream_call() {
    let chat = Arc::new(MockChatClient::new());
    let state = ChatState::new(chat.clone(), Arc::new(MockImageRelayClient::new()));
    let addr = spawn_server(state).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/chat", addr))
        .json(&serde_json::json!({ "message": "   " }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("must not be empty"));
    assert_eq!(chat.get_call_count(), 0);
}

#[tokio::test]
async fn test_chat_upstream_failure_surfaces_bad_gateway() {
    let chat = MockChatClient::new().failing("quota exceeded");
    let addr = spawn_server(state_with_chat(chat)).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/chat", addr))
        .json(&serde_json::json!({ "message": "hello" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 502);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("quota exceeded"));
}

#[tokio::test]
async fn test_chat_keeps_running_context() {
    let chat = MockChatClient::new()
        .with_reply("first reply".to_string())
        .with_reply("second reply".to_string());
    let state = state_with_chat(chat);
    let log = state.log.clone();
    let addr = spawn_server(state).await;

    let client = reqwest::Client::new();
    for message in ["one", "two"] {
        client
            .post(format!("http://{}/chat", addr))
            .json(&serde_json::json!({ "message": message }))
            .send()
            .await
            .unwrap();
    }

    // system + (user, assistant) per exchange
    let log = log.lock().await;
    assert_eq!(log.len(), 5);
    assert_eq!(log[0].role, "system");
    assert_eq!(log[1].content, "one");
    assert_eq!(log[2].content, "first reply");
    assert_eq!(log[4].content, "second reply");
}

#[tokio::test]
async fn test_image_returns_hosted_url() {
    let state = ChatState::new(
        Arc::new(MockChatClient::new()),
        Arc::new(
            MockImageRelayClient::new().with_url("https://images.example.com/cat.png".to_string()),
        ),
    );
    let addr = spawn_server(state).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/image", addr))
        .json(&serde_json::json!({ "prompt": "a cat" }))
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["image_url"], "https://images.example.com/cat.png");
}

#[tokio::test]
async fn test_image_empty_prompt_is_rejected() {
    let state = ChatState::new(
        Arc::new(MockChatClient::new()),
        Arc::new(MockImageRelayClient::new()),
    );
    let addr = spawn_server(state).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/image", addr))
        .json(&serde_json::json!({ "prompt": "" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
}

/// Collect text frames until the server closes the connection.
async fn collect_text_frames(
    ws: &mut tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
) -> Vec<String> {
    let mut frames = Vec::new();
    loop {
        let next = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for WebSocket frame");
        match next {
            Some(Ok(Message::Text(text))) => frames.push(text.to_string()),
            Some(Ok(Message::Close(_))) | None => break,
            Some(Ok(_)) => continue,
            Some(Err(e)) => panic!("WebSocket error: {}", e),
        }
    }
    frames
}

#[tokio::test]
async fn test_ws_streams_each_chunk_in_order_then_closes() {
    let chunks = vec!["Once".to_string(), " upon".to_string(), " a time".to_string()];
    let chat = MockChatClient::new().with_stream_chunks(chunks.clone());
    let addr = spawn_server(state_with_chat(chat)).await;

    let (mut ws, _) = connect_async(format!("ws://{}/ws", addr)).await.unwrap();
    ws.send(Message::Text("tell me a story".into()))
        .await
        .unwrap();

    let frames = collect_text_frames(&mut ws).await;
    assert_eq!(frames, chunks);
}

#[tokio::test]
async fn test_ws_empty_message_gets_error_frame() {
    let chat = MockChatClient::new();
    let addr = spawn_server(state_with_chat(chat)).await;

    let (mut ws, _) = connect_async(format!("ws://{}/ws", addr)).await.unwrap();
    ws.send(Message::Text("  ".into())).await.unwrap();

    let frames = collect_text_frames(&mut ws).await;
    assert_eq!(frames.len(), 1);
    assert!(frames[0].starts_with("Error:"));
}

#[tokio::test]
async fn test_ws_upstream_failure_sends_error_frame() {
    let chat = MockChatClient::new().failing("model offline");
    let addr = spawn_server(state_with_chat(chat)).await;

    let (mut ws, _) = connect_async(format!("ws://{}/ws", addr)).await.unwrap();
    ws.send(Message::Text("hello".into())).await.unwrap();

    let frames = collect_text_frames(&mut ws).await;
    assert_eq!(frames.len(), 1);
    assert!(frames[0].contains("model offline"));
}

#[tokio::test]
async fn test_ws_appends_streamed_reply_to_log() {
    let chat = MockChatClient::new()
        .with_stream_chunks(vec!["Hel".to_string(), "lo".to_string()]);
    let state = state_with_chat(chat);
    let log = state.log.clone();
    let addr = spawn_server(state).await;

    let (mut ws, _) = connect_async(format!("ws://{}/ws", addr)).await.unwrap();
    ws.send(Message::Text("hi".into())).await.unwrap();
    let frames = collect_text_frames(&mut ws).await;
    assert_eq!(frames.len(), 2);

    let log = log.lock().await;
    let assistant = log.iter().find(|m| m.role == "assistant").unwrap();
    assert_eq!(assistant.content, "Hello");
}
