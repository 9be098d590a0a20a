//! HTTP API module - routers, handlers, and WebSocket relay

pub mod chat;
pub mod generate;
pub mod ws;

pub use chat::{chat_router, ChatState};
pub use generate::{marketing_router, MarketingState};

use crate::Error;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Map service errors onto the three response kinds: validation (400),
/// upstream failure (502), and local failure (500), all with a JSON
/// `{"error": ...}` body.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::AiProvider(_) | Error::Http(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
