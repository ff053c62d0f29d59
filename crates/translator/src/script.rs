//! `script` target: turn a story idea into a structured panel breakdown.

use crate::non_blank;
use genrelay_core::error::RelayError;
use genrelay_core::types::gemini::{GeminiContent, GeminiPart, GeminiRequest, GenerationConfig};
use serde::Deserialize;
use serde_json::{Value, json};

pub const SYSTEM_INSTRUCTION: &str = "You are a professional comic book writer. \
Break the user's idea into a sequence of comic panels. For each panel give its number, \
a detailed visual description an illustrator can draw from, and the dialogue or caption \
(an empty string when the panel is silent). \
If the idea says a character should use the \"guide image\", every panel description in \
which that character appears must contain the exact phrase \"guide image\". \
If the idea says an object or vehicle should use the \"guide complement\", every panel \
description in which it appears must contain the exact phrase \"guide complement\". \
Respond only with JSON matching the provided schema.";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptRequest {
    pub prompt: String,
    #[serde(default)]
    pub arc: Option<String>,
    #[serde(default)]
    pub tone: Option<String>,
}

impl ScriptRequest {
    pub fn validate(&self) -> Result<(), RelayError> {
        if self.prompt.trim().is_empty() {
            return Err(RelayError::InvalidRequest("prompt must not be empty".into()));
        }
        Ok(())
    }

    /// The single user-turn prompt.
    pub fn user_text(&self) -> String {
        let mut text = format!(
            "Create a comic script for the following idea: \"{}\".",
            self.prompt.trim()
        );
        if let Some(arc) = non_blank(&self.arc) {
            text.push_str(&format!(" Story arc: {arc}."));
        }
        if let Some(tone) = non_blank(&self.tone) {
            text.push_str(&format!(" Tone: {tone}."));
        }
        text
    }
}

/// Structured output: `[{panel, description, dialogue}]`, all required.
pub fn response_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "panel": { "type": "NUMBER" },
                "description": { "type": "STRING" },
                "dialogue": { "type": "STRING" }
            },
            "required": ["panel", "description", "dialogue"]
        }
    })
}

pub fn build_payload(req: &ScriptRequest) -> GeminiRequest {
    GeminiRequest {
        contents: vec![GeminiContent::user(vec![GeminiPart::Text(req.user_text())])],
        system_instruction: Some(GeminiContent {
            role: None,
            parts: vec![GeminiPart::Text(SYSTEM_INSTRUCTION.to_string())],
        }),
        generation_config: Some(GenerationConfig {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(response_schema()),
            response_modalities: None,
        }),
        safety_settings: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_json_diff::assert_json_eq;

    fn request(prompt: &str, arc: Option<&str>, tone: Option<&str>) -> ScriptRequest {
        ScriptRequest {
            prompt: prompt.to_string(),
            arc: arc.map(String::from),
            tone: tone.map(String::from),
        }
    }

    #[test]
    fn test_idea_only() {
        let text = request("A hero finds a sword", None, None).user_text();
        assert!(text.contains("A hero finds a sword"));
        assert!(!text.contains("Story arc"));
        assert!(!text.contains("Tone"));
    }

    #[test]
    fn test_arc_and_tone_clauses() {
        let text = request("A hero finds a sword", Some("rise and fall"), Some("grim")).user_text();
        assert_eq!(
            text,
            "Create a comic script for the following idea: \"A hero finds a sword\". \
             Story arc: rise and fall. Tone: grim."
        );
    }

    #[test]
    fn test_blank_optionals_are_skipped() {
        let text = request("idea", Some(""), Some("   ")).user_text();
        assert!(!text.contains("Story arc"));
        assert!(!text.contains("Tone"));
    }

    #[test]
    fn test_payload_shape() {
        let payload = build_payload(&request("A hero finds a sword", None, None));
        let value = serde_json::to_value(&payload).unwrap();

        assert_json_eq!(
            value["contents"],
            json!([{
                "role": "user",
                "parts": [{"text": "Create a comic script for the following idea: \"A hero finds a sword\"."}]
            }])
        );
        assert_eq!(
            value["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_json_eq!(value["generationConfig"]["responseSchema"], response_schema());
        assert!(value.get("safetySettings").is_none());

        let instruction = value["systemInstruction"]["parts"][0]["text"].as_str().unwrap();
        assert!(instruction.contains("\"guide image\""));
        assert!(instruction.contains("\"guide complement\""));
    }
}
