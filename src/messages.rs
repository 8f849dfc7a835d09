use crate::fields::CharacterFields;
use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST /generate-character`.
///
/// Both members are optional on the wire so that a request missing either one
/// is answered with a validation error instead of a decoder error.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCharacterRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<CharacterFields>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_image_base64: Option<String>,
}

/// Successful answer: the produced image and the exact prompt sent for it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub image_url: String,
    pub debug_prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Reads an explicit JSON `null` the same way as an absent key.
///
/// Pair it with `#[serde(default)]` so both spellings land on `T::default()`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
