use crate::{config::API_KEY_VAR, image::ImageError, messages::ErrorBody};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

pub const MISSING_INPUT_MESSAGE: &str = "Missing required fields or reference image";
pub const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded. Please try again shortly.";
pub const QUOTA_MESSAGE: &str = "Usage limit reached. Please add credits to continue.";
pub const PROVIDER_FAILURE_MESSAGE: &str = "Image generation failed";
pub const NO_IMAGE_MESSAGE: &str = "No image was generated. Try adjusting the inputs.";
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// Every way a generation request can fail on the server.
///
/// The `Display` text of each variant is exactly what the caller receives in
/// the `error` member of the response body.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("{} is not configured", API_KEY_VAR)]
    Configuration,

    #[error("{}", MISSING_INPUT_MESSAGE)]
    Validation,

    #[error(transparent)]
    InvalidImage(#[from] ImageError),

    #[error("{}", RATE_LIMIT_MESSAGE)]
    RateLimited,

    #[error("{}", QUOTA_MESSAGE)]
    QuotaExceeded,

    /// Raw details are kept for the server log only.
    #[error("{}", PROVIDER_FAILURE_MESSAGE)]
    Provider { status: u16, body: String },

    #[error("{}", NO_IMAGE_MESSAGE)]
    NoImage,

    #[error("{}", or_unknown(.0))]
    Unexpected(String),
}

fn or_unknown(message: &str) -> &str {
    if message.is_empty() {
        UNKNOWN_ERROR_MESSAGE
    } else {
        message
    }
}

impl GenerationError {
    /// Classifies a non-success provider status.
    pub fn from_provider_status(status: u16, body: String) -> Self {
        match status {
            429 => GenerationError::RateLimited,
            402 => GenerationError::QuotaExceeded,
            _ => GenerationError::Provider { status, body },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            GenerationError::Validation | GenerationError::InvalidImage(_) => {
                StatusCode::BAD_REQUEST
            }
            GenerationError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            GenerationError::QuotaExceeded => StatusCode::PAYMENT_REQUIRED,
            GenerationError::Configuration
            | GenerationError::Provider { .. }
            | GenerationError::NoImage
            | GenerationError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        GenerationError::Unexpected(err.to_string())
    }
}

impl IntoResponse for GenerationError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("generate-character failed: {:?}", self);
        } else {
            log::warn!("generate-character rejected: {}", self);
        }

        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}
