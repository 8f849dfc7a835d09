use crate::{
    config::Config,
    error::GenerationError,
    image::ReferenceImage,
    messages::{GenerateCharacterRequest, GenerationResult},
    provider::{GatewayProvider, ImageProvider, ProviderRequest},
};
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use std::{any::Any, sync::Arc};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{self, CorsLayer},
    trace::TraceLayer,
};

pub const GENERATE_PATH: &str = "/generate-character";

/// Shared, read-only dependencies of the request handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub provider: Arc<dyn ImageProvider>,
}

impl AppState {
    pub fn new(config: Config, provider: Arc<dyn ImageProvider>) -> Self {
        Self {
            config: Arc::new(config),
            provider,
        }
    }

    /// Wires the configured gateway as the provider.
    pub fn from_config(config: Config) -> Result<Self, GenerationError> {
        let provider = GatewayProvider::from_config(&config)?;
        Ok(Self::new(config, Arc::new(provider)))
    }
}

/// Builds the application router with CORS, tracing and panic recovery.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Welcome to Character Forge!" }))
        .route("/health", get(health))
        .route(GENERATE_PATH, post(generate_character).options(preflight))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

// Browser clients attach their own `x-*` headers, so any header is allowed.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers(cors::Any)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn generate_character(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<GenerationResult>, GenerationError> {
    let api_key = state
        .config
        .api_key
        .as_deref()
        .ok_or(GenerationError::Configuration)?;

    // Parsed whatever the declared content type is; only malformed JSON fails.
    let payload: GenerateCharacterRequest = serde_json::from_slice(&body)
        .map_err(|err| GenerationError::Unexpected(err.to_string()))?;

    let (fields, reference_image) = match (payload.fields, payload.reference_image_base64) {
        (Some(fields), Some(image)) if !image.is_empty() && fields.is_complete() => {
            (fields, image)
        }
        _ => return Err(GenerationError::Validation),
    };

    let reference_image = ReferenceImage::parse(&reference_image, state.config.max_image_bytes)?;
    let prompt = state.config.prompt.build(&fields);

    log::info!(
        "Generating character ({} reference image, {} prompt chars)",
        reference_image.mime(),
        prompt.len()
    );

    let image_url = state
        .provider
        .generate(
            api_key,
            ProviderRequest {
                prompt: prompt.clone(),
                reference_image: reference_image.into_data_uri(),
            },
        )
        .await?;

    Ok(Json(GenerationResult {
        image_url,
        debug_prompt: prompt,
    }))
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        String::new()
    };

    GenerationError::Unexpected(message).into_response()
}
