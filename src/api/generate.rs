//! Marketing image endpoints
//!
//! `POST /generate` turns a prompt into a branded PNG on disk and returns
//! where it landed; `GET /outputs/{filename}` serves the saved files.

use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::ai::ImageGenerationService;
use crate::image::{save_png, BrandOverlay};
use crate::models::{GenerateRequest, GenerateResponse};
use crate::{prompts, Error, Result};

const DEFAULT_LOGO_PATH: &str = "./logo.png";
const DEFAULT_PHONE_NUMBER: &str = "0909 123 456";

/// Shared state of the marketing image service.
#[derive(Clone)]
pub struct MarketingState {
    pub image_gen: Arc<dyn ImageGenerationService>,
    pub public_base_url: String,
    pub out_dir: PathBuf,
}

impl MarketingState {
    pub fn new(
        image_gen: Arc<dyn ImageGenerationService>,
        public_base_url: String,
        out_dir: PathBuf,
    ) -> Self {
        Self {
            image_gen,
            public_base_url,
            out_dir,
        }
    }
}

/// Build the marketing service router.
pub fn marketing_router(state: MarketingState) -> Router {
    Router::new()
        .route("/generate", post(generate))
        .route("/outputs/{filename}", get(serve_output))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Treat an absent or empty optional string as "not provided".
fn provided(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

async fn generate(
    State(state): State<MarketingState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>> {
    let prompt = request
        .prompt
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| Error::Validation("Missing 'prompt' in request".to_string()))?
        .to_string();

    let system_prompt = request
        .system_prompt
        .unwrap_or_else(|| prompts::MARKETING_SYSTEM.to_string());
    // An explicitly empty logo_path or phone_number disables that overlay;
    // an absent field gets the default branding.
    let logo_path = provided(
        request
            .logo_path
            .or_else(|| Some(DEFAULT_LOGO_PATH.to_string())),
    )
    .map(PathBuf::from);
    let phone_number = provided(
        request
            .phone_number
            .or_else(|| Some(DEFAULT_PHONE_NUMBER.to_string())),
    );
    let out_dir = request
        .out_dir
        .map(PathBuf::from)
        .unwrap_or_else(|| state.out_dir.clone());

    let image_data = state
        .image_gen
        .generate_image(&prompt, Some(&system_prompt), request.model.as_deref())
        .await?;

    let overlay = BrandOverlay::new(logo_path, phone_number);
    let image_data = if overlay.is_empty() {
        image_data
    } else {
        tokio::task::spawn_blocking(move || overlay.apply(&image_data))
            .await
            .map_err(|e| Error::Generic(format!("Overlay task join error: {}", e)))??
    };

    let image_path = save_png(image_data, &out_dir).await?;
    info!("Saved generated image to {}", image_path.display());

    let image_url = output_url(&state.public_base_url, &image_path);
    Ok(Json(GenerateResponse {
        success: true,
        image_path: image_path.to_string_lossy().into_owned(),
        image_url,
    }))
}

/// Join the serving base address with the `/outputs` route for a saved file.
fn output_url(base_url: &str, image_path: &FsPath) -> String {
    let filename = image_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}/outputs/{}", base_url.trim_end_matches('/'), filename)
}

/// Serve a saved image from the configured output directory.
async fn serve_output(
    Path(filename): Path<String>,
    State(state): State<MarketingState>,
) -> impl IntoResponse {
    // Only bare filenames are valid; anything path-like is rejected.
    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        return (StatusCode::BAD_REQUEST, "invalid filename").into_response();
    }

    match tokio::fs::read(state.out_dir.join(&filename)).await {
        Ok(data) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "image/png")],
            data,
        )
            .into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "image not found").into_response(),
    }
}
