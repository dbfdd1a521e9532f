//! Web server for the steganography API
//!
//! ## Endpoints
//!
//! - `POST /api/encode`: multipart `image`, `message`, optional `password`;
//!   returns the stego PNG as base64
//! - `POST /api/decode`: multipart `image`, optional `password`; returns the message
//! - `POST /api/inspect`: multipart `image`; returns the frame metadata
//! - `GET /api/health`

use axum::{
    extract::{
        multipart::{Multipart, MultipartError},
        DefaultBodyLimit, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose, Engine as _};
use clap::Parser;
use log::{error, info};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use stegvault::common::config::StegConfig;
use stegvault::common::logging::init_logger;
use stegvault::{Metadata, StegCodec, StegoError};

/// Command-line arguments for the web server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (TOML format)
    #[arg(short, long)]
    config: Option<String>,
}

#[derive(Serialize)]
struct EncodeResponse {
    success: bool,
    message: String,
    stego_image_base64: String,
}

#[derive(Serialize)]
struct DecodeResponse {
    success: bool,
    message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

struct AppState {
    codec: StegCodec,
}

/// Fields collected from a multipart upload.
#[derive(Default)]
struct UploadForm {
    image: Option<Vec<u8>>,
    message: Option<String>,
    password: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger(false);

    let args = Args::parse();
    let config = StegConfig::from_optional_file(args.config.as_deref())?;

    info!("🚀 Initializing web server...");

    let state = Arc::new(AppState {
        codec: StegCodec::from_config(&config),
    });

    // Leave room for the multipart framing and the text fields.
    let body_limit = config.limits.max_input_bytes + 1024 * 1024;

    let app = Router::new()
        .route("/api/encode", post(encode_handler))
        .route("/api/decode", post(decode_handler))
        .route("/api/inspect", post(inspect_handler))
        .route("/api/health", get(health_check))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = config.server.address.clone();
    info!("🌐 Web server running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "stegvault",
        "output_format": "png"
    }))
}

/// HTTP status for each codec failure.
fn status_for(err: &StegoError) -> StatusCode {
    match err {
        StegoError::IncorrectPassword => StatusCode::UNAUTHORIZED,
        StegoError::NoHiddenMessage => StatusCode::NOT_FOUND,
        StegoError::CapacityExceeded { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        StegoError::Output(_) | StegoError::Crypto(_) => StatusCode::INTERNAL_SERVER_ERROR,
        StegoError::Input(_)
        | StegoError::InvalidFrameFormat
        | StegoError::InvalidMetadata(_)
        | StegoError::Encoding(_)
        | StegoError::WeakPassword(_) => StatusCode::BAD_REQUEST,
    }
}

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

fn codec_error(err: StegoError) -> ApiError {
    error!("❌ Request failed: {}", err);
    api_error(status_for(&err), err.to_string())
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        api_error(
            StatusCode::BAD_REQUEST,
            format!("Failed to read multipart data: {}", e),
        )
    })? {
        let name = field.name().unwrap_or("").to_string();
        let bad_field = |e: MultipartError| {
            api_error(StatusCode::BAD_REQUEST, format!("Failed to read field {}: {}", name, e))
        };

        match name.as_str() {
            "image" => form.image = Some(field.bytes().await.map_err(bad_field)?.to_vec()),
            "message" => form.message = Some(field.text().await.map_err(bad_field)?),
            "password" => form.password = Some(field.text().await.map_err(bad_field)?),
            _ => {}
        }
    }

    Ok(form)
}

/// Run codec work off the async runtime.
async fn run_blocking<T, F>(job: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> stegvault::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| {
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Codec task panicked: {}", e),
            )
        })?
        .map_err(codec_error)
}

async fn encode_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_form(multipart).await?;
    let image = form
        .image
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "No image provided"))?;
    let message = form
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Please enter a message to hide"))?;

    info!("📤 Encode request: {} bytes of image", image.len());

    let codec = state.codec.clone();
    let password = form.password;
    let png = run_blocking(move || codec.encode_bytes(&image, &message, password.as_deref())).await?;

    info!("✅ Encode complete: {} bytes of PNG", png.len());

    Ok((
        StatusCode::OK,
        Json(EncodeResponse {
            success: true,
            message: "Message hidden successfully".to_string(),
            stego_image_base64: general_purpose::STANDARD.encode(&png),
        }),
    ))
}

async fn decode_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_form(multipart).await?;
    let image = form
        .image
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "No image provided"))?;

    info!("📥 Decode request: {} bytes of image", image.len());

    let codec = state.codec.clone();
    let password = form.password;
    let message = run_blocking(move || codec.decode_bytes(&image, password.as_deref())).await?;

    Ok((
        StatusCode::OK,
        Json(DecodeResponse {
            success: true,
            message,
        }),
    ))
}

async fn inspect_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<Metadata>, ApiError> {
    let form = read_form(multipart).await?;
    let image = form
        .image
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "No image provided"))?;

    let codec = state.codec.clone();
    let metadata = run_blocking(move || codec.inspect_bytes(&image)).await?;
    Ok(Json(metadata))
}
