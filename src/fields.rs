use crate::messages::null_as_default;
use serde::{Deserialize, Serialize};

/// The descriptive text collected alongside the reference portrait.
///
/// Missing or `null` keys deserialize to empty strings so that completeness is decided by
/// [`CharacterFields::is_complete`] rather than by the JSON decoder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CharacterFields {
    /// The era the character belongs to, e.g. `Early 19th Century`.
    #[serde(deserialize_with = "null_as_default")]
    pub time_period: String,
    /// The character's role or occupation, e.g. `Prison Reformer`.
    #[serde(deserialize_with = "null_as_default")]
    pub role_occupation: String,
    /// Comma separated clothing keywords.
    #[serde(deserialize_with = "null_as_default")]
    pub clothing_descriptors: String,
    /// Optional free-form outfit sentence. Empty means omit.
    #[serde(deserialize_with = "null_as_default")]
    pub outfit_description_sentence: String,
}

/// Identifies one of the form's text inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharacterField {
    TimePeriod,
    RoleOccupation,
    ClothingDescriptors,
    OutfitDescriptionSentence,
}

impl CharacterField {
    pub const ALL: [CharacterField; 4] = [
        CharacterField::TimePeriod,
        CharacterField::RoleOccupation,
        CharacterField::ClothingDescriptors,
        CharacterField::OutfitDescriptionSentence,
    ];

    /// Returns the wire name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            CharacterField::TimePeriod => "timePeriod",
            CharacterField::RoleOccupation => "roleOccupation",
            CharacterField::ClothingDescriptors => "clothingDescriptors",
            CharacterField::OutfitDescriptionSentence => "outfitDescriptionSentence",
        }
    }

    pub fn is_required(&self) -> bool {
        !matches!(self, CharacterField::OutfitDescriptionSentence)
    }
}

impl CharacterFields {
    pub fn new(
        time_period: impl Into<String>,
        role_occupation: impl Into<String>,
        clothing_descriptors: impl Into<String>,
    ) -> Self {
        Self {
            time_period: time_period.into(),
            role_occupation: role_occupation.into(),
            clothing_descriptors: clothing_descriptors.into(),
            outfit_description_sentence: String::new(),
        }
    }

    pub fn with_outfit_description(mut self, sentence: impl Into<String>) -> Self {
        self.outfit_description_sentence = sentence.into();
        self
    }

    pub fn get(&self, field: CharacterField) -> &str {
        match field {
            CharacterField::TimePeriod => &self.time_period,
            CharacterField::RoleOccupation => &self.role_occupation,
            CharacterField::ClothingDescriptors => &self.clothing_descriptors,
            CharacterField::OutfitDescriptionSentence => &self.outfit_description_sentence,
        }
    }

    pub fn set(&mut self, field: CharacterField, value: impl Into<String>) {
        let slot = match field {
            CharacterField::TimePeriod => &mut self.time_period,
            CharacterField::RoleOccupation => &mut self.role_occupation,
            CharacterField::ClothingDescriptors => &mut self.clothing_descriptors,
            CharacterField::OutfitDescriptionSentence => &mut self.outfit_description_sentence,
        };
        *slot = value.into();
    }

    /// Returns the required fields that are still empty, in form order.
    pub fn missing(&self) -> Vec<CharacterField> {
        CharacterField::ALL
            .into_iter()
            .filter(|field| field.is_required() && self.get(*field).is_empty())
            .collect()
    }

    /// True when every required field is non-empty.
    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    pub fn outfit_description(&self) -> Option<&str> {
        Some(self.outfit_description_sentence.as_str()).filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completeness_requires_three_fields() {
        let mut fields = CharacterFields::default();
        assert_eq!(
            fields.missing(),
            vec![
                CharacterField::TimePeriod,
                CharacterField::RoleOccupation,
                CharacterField::ClothingDescriptors
            ]
        );

        fields.set(CharacterField::TimePeriod, "1800s");
        fields.set(CharacterField::RoleOccupation, "Nurse");
        assert!(!fields.is_complete());

        fields.set(CharacterField::ClothingDescriptors, "apron, bonnet");
        assert!(fields.is_complete());
        assert_eq!(fields.outfit_description(), None);
    }

    #[test]
    fn test_deserialize_missing_keys_as_empty() {
        let fields: CharacterFields =
            serde_json::from_str(r#"{"timePeriod":"1800s","roleOccupation":"Nurse"}"#).unwrap();
        assert_eq!(fields.time_period, "1800s");
        assert_eq!(fields.clothing_descriptors, "");
        assert_eq!(fields.missing(), vec![CharacterField::ClothingDescriptors]);
    }

    #[test]
    fn test_deserialize_null_as_empty() {
        let fields: CharacterFields = serde_json::from_str(
            r#"{"timePeriod":null,"roleOccupation":"Nurse","clothingDescriptors":"apron","outfitDescriptionSentence":null}"#,
        )
        .unwrap();
        assert_eq!(fields.missing(), vec![CharacterField::TimePeriod]);
        assert_eq!(fields.outfit_description(), None);
    }

    #[test]
    fn test_serialize_uses_wire_names() {
        let fields = CharacterFields::new("1800s", "Nurse", "apron")
            .with_outfit_description("Plain wartime uniform");
        let value = serde_json::to_value(&fields).unwrap();
        for field in CharacterField::ALL {
            assert_eq!(value[field.as_str()], fields.get(field));
        }
    }
}
