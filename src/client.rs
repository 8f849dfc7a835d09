use crate::{
    fields::CharacterFields,
    image::ReferenceImage,
    messages::{ErrorBody, GenerateCharacterRequest, GenerationResult},
    server::GENERATE_PATH,
};
use async_trait::async_trait;

const GENERIC_FAILURE: &str = "Generation failed";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The endpoint answered with an error; `message` is shown to the user as is.
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// The outbound half of the form: one call per generation attempt.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(
        &self,
        fields: &CharacterFields,
        image: &ReferenceImage,
    ) -> Result<GenerationResult, ClientError>;
}

/// Calls `POST /generate-character` on a running server.
#[derive(Clone)]
pub struct HttpGenerationClient {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpGenerationClient {
    /// `base_url` is the server root, e.g. `http://localhost:3000`.
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), GENERATE_PATH),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl GenerationClient for HttpGenerationClient {
    async fn generate(
        &self,
        fields: &CharacterFields,
        image: &ReferenceImage,
    ) -> Result<GenerationResult, ClientError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&GenerateCharacterRequest {
                fields: Some(fields.clone()),
                reference_image_base64: Some(image.as_data_uri().to_string()),
            })
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?;

        if let Ok(ErrorBody { error }) = serde_json::from_slice::<ErrorBody>(&body) {
            return Err(ClientError::Server {
                status,
                message: error,
            });
        }

        match serde_json::from_slice::<GenerationResult>(&body) {
            Ok(result) if (200..300).contains(&status) => Ok(result),
            _ => Err(ClientError::Server {
                status,
                message: GENERIC_FAILURE.to_string(),
            }),
        }
    }
}
