use crate::prompt::PromptTemplate;
use std::{fmt, time::Duration};

pub const API_KEY_VAR: &str = "AI_GATEWAY_API_KEY";

const DEFAULT_GATEWAY_URL: &str = "https://ai.gateway.lovable.dev/v1/chat/completions";
const DEFAULT_MODEL: &str = "google/gemini-2.5-flash-image";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got {value:?}")]
    InvalidValue {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Process configuration, built once at startup and handed to the router.
///
/// | Env var                            | Default                                             |
/// |------------------------------------|-----------------------------------------------------|
/// | `AI_GATEWAY_API_KEY`               | unset                                               |
/// | `AI_GATEWAY_URL`                   | `https://ai.gateway.lovable.dev/v1/chat/completions` |
/// | `AI_GATEWAY_MODEL`                 | `google/gemini-2.5-flash-image`                     |
/// | `AI_GATEWAY_TIMEOUT_SECS`          | unset                                               |
/// | `HOST`                             | `0.0.0.0`                                           |
/// | `PORT`                             | `3000`                                              |
/// | `MAX_REFERENCE_IMAGE_BYTES`        | `10485760`                                          |
/// | `PROMPT_INCLUDE_CHARACTER_CONTEXT` | `false`                                             |
#[derive(Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub gateway_url: String,
    pub model: String,
    pub provider_timeout: Option<Duration>,
    pub host: String,
    pub port: u16,
    pub max_image_bytes: usize,
    pub prompt: PromptTemplate,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            provider_timeout: None,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            prompt: PromptTemplate::default(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("gateway_url", &self.gateway_url)
            .field("model", &self.model)
            .field("provider_timeout", &self.provider_timeout)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("max_image_bytes", &self.max_image_bytes)
            .field("prompt", &self.prompt)
            .finish()
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => log::info!("Loaded environment from {}", path.display()),
            Err(_) => log::debug!("No .env file found, using process environment"),
        }
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let provider_timeout = match var("AI_GATEWAY_TIMEOUT_SECS") {
            Some(raw) => Some(Duration::from_secs(parse(
                "AI_GATEWAY_TIMEOUT_SECS",
                "a whole number of seconds",
                raw,
            )?)),
            None => None,
        };
        let port = match var("PORT") {
            Some(raw) => parse("PORT", "a valid port number", raw)?,
            None => defaults.port,
        };
        let max_image_bytes = match var("MAX_REFERENCE_IMAGE_BYTES") {
            Some(raw) => parse("MAX_REFERENCE_IMAGE_BYTES", "a byte count", raw)?,
            None => defaults.max_image_bytes,
        };
        let include_character_context = match var("PROMPT_INCLUDE_CHARACTER_CONTEXT") {
            Some(raw) => parse_flag("PROMPT_INCLUDE_CHARACTER_CONTEXT", raw)?,
            None => false,
        };

        Ok(Self {
            api_key: var(API_KEY_VAR),
            gateway_url: var("AI_GATEWAY_URL").unwrap_or(defaults.gateway_url),
            model: var("AI_GATEWAY_MODEL").unwrap_or(defaults.model),
            provider_timeout,
            host: var("HOST").unwrap_or(defaults.host),
            port,
            max_image_bytes,
            prompt: PromptTemplate::new().with_character_context(include_character_context),
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_gateway_url(mut self, url: impl Into<String>) -> Self {
        self.gateway_url = url.into();
        self
    }

    pub fn with_address(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    pub fn with_max_image_bytes(mut self, max_image_bytes: usize) -> Self {
        self.max_image_bytes = max_image_bytes;
        self
    }

    pub fn with_prompt(mut self, prompt: PromptTemplate) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T: std::str::FromStr>(
    var: &'static str,
    expected: &'static str,
    value: String,
) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            var,
            expected,
            value,
        })
}

fn parse_flag(var: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var,
            expected: "true or false",
            value,
        }),
    }
}
