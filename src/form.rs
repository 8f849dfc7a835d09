use crate::{
    client::{ClientError, GenerationClient},
    fields::{CharacterField, CharacterFields},
    image::{ImageError, ReferenceImage},
    messages::GenerationResult,
    save::{DOWNLOAD_FILE_NAME, ImageSaver, SaveError},
};
use std::path::Path;

const FALLBACK_ERROR: &str = "Something went wrong";

/// Represents whether a generation attempt is in flight.
#[derive(Clone, Debug, PartialEq)]
pub enum FormState {
    /// Inputs are editable and a new attempt may start.
    Idle,
    /// One attempt is waiting on the server.
    Loading,
}

impl FormState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormState::Idle => "idle",
            FormState::Loading => "loading",
        }
    }
}

/// What the result area shows, in priority order.
#[derive(Clone, Debug, PartialEq)]
pub enum ResultView<'a> {
    Loading,
    Error(&'a str),
    Image(&'a str),
    Empty,
}

impl ResultView<'_> {
    pub fn headline(&self) -> &str {
        match self {
            ResultView::Loading => "Bringing history to life…",
            ResultView::Error(message) => *message,
            ResultView::Image(_) => "Generated character",
            ResultView::Empty => "Your character will appear here",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("Missing required fields: {}", field_list(.0))]
    Incomplete(Vec<CharacterField>),

    #[error("No reference image loaded")]
    MissingImage,

    #[error("A generation is already in progress")]
    Busy,

    /// The attempt ran and failed; the message is also kept on the form.
    #[error("{0}")]
    Generation(String),
}

fn field_list(fields: &[CharacterField]) -> String {
    fields
        .iter()
        .map(|field| field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Snapshot of the inputs a started attempt sends.
#[derive(Clone, Debug)]
pub struct PendingGeneration {
    pub fields: CharacterFields,
    pub image: ReferenceImage,
}

/// Client-side controller for the character form.
///
/// Holds the inputs, the last outcome and the debug view flag. An attempt is
/// split into [`FormController::begin`] and [`FormController::finish`];
/// [`FormController::generate`] runs both around a single client call.
#[derive(Debug, Default)]
pub struct FormController {
    fields: CharacterFields,
    image: Option<ReferenceImage>,
    loading: bool,
    result: Option<GenerationResult>,
    error: Option<String>,
    debug_open: bool,
}

impl FormController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &CharacterFields {
        &self.fields
    }

    pub fn update_field(&mut self, field: CharacterField, value: impl Into<String>) {
        self.fields.set(field, value);
    }

    /// Replaces the current reference image.
    pub fn select_image(&mut self, image: ReferenceImage) {
        self.image = Some(image);
    }

    /// Reads a file and selects it. The previous image is kept if reading fails.
    pub fn load_image(&mut self, path: impl AsRef<Path>) -> Result<(), ImageError> {
        let image = ReferenceImage::load(path)?;
        self.select_image(image);
        Ok(())
    }

    pub fn clear_image(&mut self) {
        self.image = None;
    }

    pub fn image(&self) -> Option<&ReferenceImage> {
        self.image.as_ref()
    }

    pub fn state(&self) -> FormState {
        if self.loading {
            FormState::Loading
        } else {
            FormState::Idle
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Checks every precondition of a new attempt.
    pub fn check_ready(&self) -> Result<(), FormError> {
        if self.loading {
            return Err(FormError::Busy);
        }
        let missing = self.fields.missing();
        if !missing.is_empty() {
            return Err(FormError::Incomplete(missing));
        }
        if self.image.is_none() {
            return Err(FormError::MissingImage);
        }
        Ok(())
    }

    /// Mirrors the enabled state of the generate button.
    pub fn can_generate(&self) -> bool {
        self.check_ready().is_ok()
    }

    /// Starts an attempt: enters loading and clears the previous outcome.
    pub fn begin(&mut self) -> Result<PendingGeneration, FormError> {
        self.check_ready()?;
        let image = self.image.clone().ok_or(FormError::MissingImage)?;

        self.loading = true;
        self.error = None;
        self.result = None;

        Ok(PendingGeneration {
            fields: self.fields.clone(),
            image,
        })
    }

    /// Records the outcome of the attempt started by [`FormController::begin`].
    pub fn finish(
        &mut self,
        outcome: Result<GenerationResult, ClientError>,
    ) -> Result<&GenerationResult, FormError> {
        self.loading = false;

        match outcome {
            Ok(result) => {
                log::info!("Character generated successfully!");
                Ok(self.result.insert(result))
            }
            Err(err) => {
                let message = Some(err.to_string())
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| FALLBACK_ERROR.to_string());
                log::warn!("Character generation failed: {message}");
                self.error = Some(message.clone());
                Err(FormError::Generation(message))
            }
        }
    }

    /// Runs one attempt against `client`.
    pub async fn generate<C>(&mut self, client: &C) -> Result<&GenerationResult, FormError>
    where
        C: GenerationClient + ?Sized,
    {
        let pending = self.begin()?;
        let outcome = client.generate(&pending.fields, &pending.image).await;
        self.finish(outcome)
    }

    pub fn image_url(&self) -> Option<&str> {
        self.result.as_ref().map(|r| r.image_url.as_str())
    }

    pub fn debug_prompt(&self) -> Option<&str> {
        self.result.as_ref().map(|r| r.debug_prompt.as_str())
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn result_view(&self) -> ResultView<'_> {
        if self.loading {
            ResultView::Loading
        } else if let Some(error) = &self.error {
            ResultView::Error(error)
        } else if let Some(url) = self.image_url() {
            ResultView::Image(url)
        } else {
            ResultView::Empty
        }
    }

    pub fn toggle_debug(&mut self) {
        self.debug_open = !self.debug_open;
    }

    pub fn debug_open(&self) -> bool {
        self.debug_open
    }

    pub fn debug_toggle_label(&self) -> &'static str {
        if self.debug_open {
            "Hide Debug Prompt"
        } else {
            "Show Debug Prompt"
        }
    }

    /// The prompt text, only while the debug view is open.
    pub fn visible_debug_prompt(&self) -> Option<&str> {
        self.debug_prompt().filter(|_| self.debug_open)
    }

    /// Offers the displayed image for saving. Returns `false` when there is none.
    pub async fn download<S>(&self, saver: &S) -> Result<bool, SaveError>
    where
        S: ImageSaver + ?Sized,
    {
        let Some(url) = self.image_url() else {
            return Ok(false);
        };
        saver.save(DOWNLOAD_FILE_NAME, url).await?;
        Ok(true)
    }
}
