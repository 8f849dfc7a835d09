use crate::fields::CharacterFields;

const OPENING: &str = "Using the uploaded reference image for facial likeness, generate a full-body, photorealistic image.";

const CONSTRAINTS: [&str; 8] = [
    "Stand in a neutral upright position.",
    "Stand on a seamless plain white background.",
    "No objects.",
    "No modern elements.",
    "No logos.",
    "No text.",
    "Neutral studio lighting.",
    "High realism suitable for later 3D modelling.",
];

/// Controls how character fields are turned into a provider prompt.
///
/// The time period and role are collected by the form but left out of the
/// prompt unless `include_character_context` is set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PromptTemplate {
    pub include_character_context: bool,
}

impl PromptTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_character_context(mut self, enabled: bool) -> Self {
        self.include_character_context = enabled;
        self
    }

    pub fn build(&self, fields: &CharacterFields) -> String {
        let mut prompt = String::from(OPENING);
        prompt.push_str("\n\n");

        if self.include_character_context {
            prompt.push_str(&format!(
                "The character is a {} from {}.\n\n",
                fields.role_occupation, fields.time_period
            ));
        }

        prompt.push_str("The character must:\n");
        prompt.push_str("- Maintain consistent facial features from the reference image.\n");
        prompt.push_str(&format!(
            "- Wear historically accurate clothing including: {}.",
            fields.clothing_descriptors
        ));

        if let Some(sentence) = fields.outfit_description() {
            prompt.push_str("\n- ");
            prompt.push_str(sentence);
        }

        for line in CONSTRAINTS {
            prompt.push_str("\n- ");
            prompt.push_str(line);
        }

        prompt
    }
}

/// Builds the prompt with the default template.
pub fn build_prompt(fields: &CharacterFields) -> String {
    PromptTemplate::default().build(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nurse() -> CharacterFields {
        CharacterFields::new("1800s", "Nurse", "apron, bonnet")
    }

    #[test]
    fn test_prompt_without_outfit_sentence() {
        let prompt = build_prompt(&nurse());
        let expected = "Using the uploaded reference image for facial likeness, generate a full-body, photorealistic image.

The character must:
- Maintain consistent facial features from the reference image.
- Wear historically accurate clothing including: apron, bonnet.
- Stand in a neutral upright position.
- Stand on a seamless plain white background.
- No objects.
- No modern elements.
- No logos.
- No text.
- Neutral studio lighting.
- High realism suitable for later 3D modelling.";
        assert_eq!(prompt, expected);
    }

    #[test]
    fn test_outfit_sentence_follows_clothing_line() {
        let prompt = build_prompt(&nurse().with_outfit_description("Plain wartime uniform"));
        assert!(prompt.contains(
            "including: apron, bonnet.\n- Plain wartime uniform\n- Stand in a neutral upright position."
        ));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let fields = nurse().with_outfit_description("Plain wartime uniform");
        assert_eq!(build_prompt(&fields), build_prompt(&fields));
    }

    #[test]
    fn test_time_period_and_role_are_not_interpolated_by_default() {
        let prompt = build_prompt(&CharacterFields::new("Regency", "Smuggler", "coat"));
        assert!(!prompt.contains("Regency"));
        assert!(!prompt.contains("Smuggler"));
    }

    #[test]
    fn test_character_context_when_enabled() {
        let prompt = PromptTemplate::new()
            .with_character_context(true)
            .build(&nurse());
        assert!(prompt.contains(
            "photorealistic image.\n\nThe character is a Nurse from 1800s.\n\nThe character must:\n"
        ));
    }
}
