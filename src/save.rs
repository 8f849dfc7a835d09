use crate::image::{ImageError, decode_data_uri};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Name the generated image is offered under.
pub const DOWNLOAD_FILE_NAME: &str = "dock-stories-character.png";

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error(transparent)]
    Image(#[from] ImageError),

    #[error("Failed to fetch image: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Unsupported image URL: {0}")]
    UnsupportedUrl(String),

    #[error("Failed to write image: {0}")]
    Io(#[from] std::io::Error),
}

/// Offers an image to the user for saving.
#[async_trait]
pub trait ImageSaver: Send + Sync {
    async fn save(&self, file_name: &str, image_url: &str) -> Result<(), SaveError>;
}

/// Writes images into a directory, decoding data URIs and fetching http(s) URLs.
#[derive(Clone, Debug)]
pub struct DirectorySaver {
    dir: PathBuf,
    http: reqwest::Client,
}

impl DirectorySaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            http: reqwest::Client::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn image_bytes(&self, image_url: &str) -> Result<Vec<u8>, SaveError> {
        let trimmed = image_url.trim();
        if trimmed.starts_with("data:") {
            let (_, bytes) = decode_data_uri(trimmed)?;
            return Ok(bytes);
        }
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            let response = self.http.get(trimmed).send().await?.error_for_status()?;
            return Ok(response.bytes().await?.to_vec());
        }
        Err(SaveError::UnsupportedUrl(trimmed.to_string()))
    }
}

#[async_trait]
impl ImageSaver for DirectorySaver {
    async fn save(&self, file_name: &str, image_url: &str) -> Result<(), SaveError> {
        let bytes = self.image_bytes(image_url).await?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.dir.join(file_name);
        tokio::fs::write(&path, &bytes).await?;
        log::info!("Saved {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}
