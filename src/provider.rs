use crate::{config::Config, error::GenerationError, messages::null_as_default};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A single multimodal generation call: the prompt plus the reference image.
#[derive(Clone, Debug)]
pub struct ProviderRequest {
    pub prompt: String,
    pub reference_image: String,
}

/// Trait for the external service that turns a prompt and a portrait into an image.
///
/// Implementations make exactly one outbound attempt per call and report
/// failures already classified as [`GenerationError`].
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Returns the URL (or data URI) of the generated image.
    async fn generate(
        &self,
        api_key: &str,
        request: ProviderRequest,
    ) -> Result<String, GenerationError>;
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    modalities: [&'static str; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: [ContentPart<'a>; 2],
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
}

// Every link of the image path may be absent or `null`; either means no image.
#[derive(Deserialize, Default)]
struct ChatCompletionResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    choices: Vec<Option<Choice>>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Choice {
    message: Option<AssistantMessage>,
}

#[derive(Deserialize, Default)]
struct AssistantMessage {
    #[serde(default, deserialize_with = "null_as_default")]
    images: Vec<Option<GeneratedImage>>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct GeneratedImage {
    image_url: Option<GeneratedImageUrl>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct GeneratedImageUrl {
    url: Option<String>,
}

impl ChatCompletionResponse {
    fn first_image_url(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()??
            .message?
            .images
            .into_iter()
            .next()??
            .image_url?
            .url
            .filter(|url| !url.is_empty())
    }
}

/// OpenAI-style chat-completions gateway that can answer with images.
#[derive(Clone)]
pub struct GatewayProvider {
    http: reqwest::Client,
    url: String,
    model: String,
}

impl GatewayProvider {
    pub fn new(
        url: impl Into<String>,
        model: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, GenerationError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            url: url.into(),
            model: model.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, GenerationError> {
        Self::new(&config.gateway_url, &config.model, config.provider_timeout)
    }
}

#[async_trait]
impl ImageProvider for GatewayProvider {
    async fn generate(
        &self,
        api_key: &str,
        request: ProviderRequest,
    ) -> Result<String, GenerationError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: [
                    ContentPart::Text {
                        text: &request.prompt,
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: &request.reference_image,
                        },
                    },
                ],
            }],
            modalities: ["image", "text"],
        };

        log::debug!("Calling image gateway with model {}", self.model);

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            log::error!("AI gateway error: {} {}", status.as_u16(), text);
            return Err(GenerationError::from_provider_status(status.as_u16(), text));
        }

        let payload: ChatCompletionResponse = response.json().await?;
        let image_url = payload.first_image_url().ok_or(GenerationError::NoImage)?;

        log::info!("Image gateway returned an image");
        Ok(image_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_format() {
        let body = ChatCompletionRequest {
            model: "m",
            messages: [ChatMessage {
                role: "user",
                content: [
                    ContentPart::Text { text: "prompt" },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: "data:image/png;base64,AAAA",
                        },
                    },
                ],
            }],
            modalities: ["image", "text"],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "model": "m",
                "messages": [{
                    "role": "user",
                    "content": [
                        { "type": "text", "text": "prompt" },
                        { "type": "image_url", "image_url": { "url": "data:image/png;base64,AAAA" } }
                    ]
                }],
                "modalities": ["image", "text"]
            })
        );
    }

    #[test]
    fn test_first_image_url_extraction() {
        let payload: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{ "message": {
                "content": "here you go",
                "images": [{ "type": "image_url", "image_url": { "url": "data:image/png;base64,QUJD" } }]
            }}]
        }))
        .unwrap();
        assert_eq!(
            payload.first_image_url().as_deref(),
            Some("data:image/png;base64,QUJD")
        );
    }

    #[test]
    fn test_missing_image_paths() {
        for value in [
            json!({}),
            json!({ "choices": [] }),
            json!({ "choices": [{ "message": { "content": "sorry" } }] }),
            json!({ "choices": [{ "message": { "images": [] } }] }),
            json!({ "choices": [{ "message": { "images": [{ "image_url": { "url": "" } }] } }] }),
        ] {
            let payload: ChatCompletionResponse = serde_json::from_value(value).unwrap();
            assert!(payload.first_image_url().is_none());
        }
    }

    #[test]
    fn test_null_links_mean_no_image() {
        for value in [
            json!({ "choices": null }),
            json!({ "choices": [null] }),
            json!({ "choices": [{ "message": null }] }),
            json!({ "choices": [{ "message": { "images": null } }] }),
            json!({ "choices": [{ "message": { "images": [null] } }] }),
            json!({ "choices": [{ "message": { "images": [{ "image_url": null }] } }] }),
            json!({ "choices": [{ "message": { "images": [{ "image_url": { "url": null } }] } }] }),
        ] {
            let payload: ChatCompletionResponse = serde_json::from_value(value).unwrap();
            assert!(payload.first_image_url().is_none());
        }
    }
}
