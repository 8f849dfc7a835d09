//! Full-body character portraits from a reference photo and a few clothing notes.
//!
//! The server side exposes `POST /generate-character`, which turns the form
//! fields into a prompt and forwards it, together with the reference image, to
//! a multimodal image gateway. The client side is a [`FormController`] that
//! gates, sends and renders one generation attempt at a time.

pub mod client;
pub mod config;
pub mod error;
pub mod fields;
pub mod form;
pub mod image;
pub mod messages;
pub mod prompt;
pub mod provider;
pub mod save;
pub mod server;

pub use client::{ClientError, GenerationClient, HttpGenerationClient};
pub use config::{Config, ConfigError};
pub use error::GenerationError;
pub use fields::{CharacterField, CharacterFields};
pub use form::{FormController, FormError, FormState, ResultView};
pub use image::{ImageError, ImageMime, ReferenceImage};
pub use messages::{GenerateCharacterRequest, GenerationResult};
pub use prompt::{PromptTemplate, build_prompt};
pub use provider::{GatewayProvider, ImageProvider, ProviderRequest};
pub use save::{DOWNLOAD_FILE_NAME, DirectorySaver, ImageSaver, SaveError};
pub use server::{AppState, router};
