use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use std::{fmt, path::Path};

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_SOI: &[u8] = &[0xFF, 0xD8, 0xFF];

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Reference image must be a base64 data URI")]
    NotADataUri,

    #[error("Reference image is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Reference image is {size} bytes, exceeding the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },

    #[error("Reference image content does not match {0}")]
    SignatureMismatch(ImageMime),

    #[error("Failed to read image: {0}")]
    Io(#[from] std::io::Error),
}

/// The two image encodings a reference portrait may use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageMime {
    Jpeg,
    Png,
}

impl ImageMime {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageMime::Jpeg => "image/jpeg",
            ImageMime::Png => "image/png",
        }
    }

    pub fn parse(mime: &str) -> Result<Self, ImageError> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" => Ok(ImageMime::Jpeg),
            "image/png" => Ok(ImageMime::Png),
            other => Err(ImageError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "jpg" | "jpeg" => Some(ImageMime::Jpeg),
            "png" => Some(ImageMime::Png),
            _ => None,
        }
    }

    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(PNG_SIGNATURE) {
            Some(ImageMime::Png)
        } else if bytes.starts_with(JPEG_SOI) {
            Some(ImageMime::Jpeg)
        } else {
            None
        }
    }
}

impl fmt::Display for ImageMime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference portrait held in memory as a data URI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferenceImage {
    mime: ImageMime,
    data_uri: String,
}

impl ReferenceImage {
    pub fn from_bytes(bytes: &[u8], mime: ImageMime) -> Self {
        Self {
            mime,
            data_uri: format!("data:{};base64,{}", mime, BASE64.encode(bytes)),
        }
    }

    /// Reads a file fully into memory and encodes it.
    ///
    /// The format comes from the extension, or from the leading bytes when the
    /// extension is missing or unknown.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let mime = ImageMime::from_path(path)
            .or_else(|| ImageMime::sniff(&bytes))
            .ok_or_else(|| {
                let extension = path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .unwrap_or("unknown");
                ImageError::UnsupportedFormat(extension.to_string())
            })?;

        log::debug!("Loaded {} ({} bytes, {})", path.display(), bytes.len(), mime);
        Ok(Self::from_bytes(&bytes, mime))
    }

    /// Parses and checks an untrusted data URI.
    ///
    /// Only JPEG and PNG are accepted, the payload must decode, stay within
    /// `max_bytes` and start with the signature of its declared type.
    pub fn parse(data_uri: &str, max_bytes: usize) -> Result<Self, ImageError> {
        let (mime, bytes) = decode_data_uri(data_uri)?;
        let mime = ImageMime::parse(mime)?;

        if bytes.len() > max_bytes {
            return Err(ImageError::TooLarge {
                size: bytes.len(),
                limit: max_bytes,
            });
        }
        if ImageMime::sniff(&bytes) != Some(mime) {
            return Err(ImageError::SignatureMismatch(mime));
        }

        Ok(Self {
            mime,
            data_uri: data_uri.trim().to_string(),
        })
    }

    pub fn mime(&self) -> ImageMime {
        self.mime
    }

    pub fn as_data_uri(&self) -> &str {
        &self.data_uri
    }

    pub fn into_data_uri(self) -> String {
        self.data_uri
    }
}

/// Splits a `data:<mime>;base64,<payload>` URI and decodes its payload.
pub fn decode_data_uri(value: &str) -> Result<(&str, Vec<u8>), ImageError> {
    let (meta, payload) = value
        .trim()
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .ok_or(ImageError::NotADataUri)?;
    let mime = meta
        .strip_suffix(";base64")
        .ok_or(ImageError::NotADataUri)?;
    let bytes = BASE64.decode(payload.trim().as_bytes())?;
    Ok((mime, bytes))
}
