//! `image` target: one comic panel, optionally steered by reference images.

use crate::non_blank;
use genrelay_core::types::gemini::{
    GeminiContent, GeminiPart, GeminiRequest, GenerationConfig, InlineData, SafetySetting,
};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

pub const DEFAULT_STYLE: &str = "classic American comic book";
const DEFAULT_MIME_TYPE: &str = "image/png";

const GUIDE_IMAGE_CLAUSE: &str = "Redraw the person from the first reference image with the \
exact same face, hairstyle and facial features, placing them naturally in the scene.";

pub const QUALITY_BOOSTER: &str = "Masterpiece, best quality, highly detailed, sharp focus, \
dramatic lighting, vibrant colors.";

const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];
const SAFETY_THRESHOLD: &str = "BLOCK_ONLY_HIGH";

static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)guide\s+(image|complement)").expect("valid marker regex"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRequest {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub use_guide_image: Option<bool>,
    #[serde(default)]
    pub guide_image: Option<String>,
    #[serde(default)]
    pub use_guide_complement: Option<bool>,
    #[serde(default)]
    pub guide_complement_image: Option<String>,
    #[serde(default)]
    pub use_booster: Option<bool>,
    #[serde(default)]
    pub negative_prompt: Option<String>,
}

impl ImageRequest {
    fn guide_image(&self) -> Option<&str> {
        attachment(self.use_guide_image, &self.guide_image)
    }

    fn guide_complement(&self) -> Option<&str> {
        attachment(self.use_guide_complement, &self.guide_complement_image)
    }

    /// Compose the natural-language prompt sent alongside the attachments.
    pub fn compose_prompt(&self) -> String {
        let style = non_blank(&self.style).unwrap_or(DEFAULT_STYLE);
        let mut sections = vec![format!(
            "Create a single comic book panel illustration in a {style} style. \
             Frame the scene cinematically with a clear composition and expressive characters."
        )];

        let has_guide = self.guide_image().is_some();
        if has_guide {
            sections.push(GUIDE_IMAGE_CLAUSE.to_string());
        }
        if self.guide_complement().is_some() {
            let ordinal = if has_guide { "second" } else { "first" };
            sections.push(format!(
                "Include the object or vehicle from the {ordinal} reference image, \
                 keeping its exact shape, colors and details."
            ));
        }

        let scene = strip_markers(self.description.as_deref().unwrap_or_default());
        if !scene.is_empty() {
            sections.push(format!("Scene: {scene}"));
        }

        if self.use_booster.unwrap_or(false) {
            sections.push(QUALITY_BOOSTER.to_string());
        }

        if let Some(negative) = non_blank(&self.negative_prompt) {
            sections.push(format!(
                "Avoid the following: {}.",
                negative.trim_end_matches('.')
            ));
        }

        sections.join(" ")
    }
}

fn attachment(flag: Option<bool>, image: &Option<String>) -> Option<&str> {
    if flag.unwrap_or(false) {
        non_blank(image)
    } else {
        None
    }
}

/// Remove every `guide image` / `guide complement` marker and collapse the
/// whitespace left behind.
pub fn strip_markers(description: &str) -> String {
    let stripped = MARKER_RE.replace_all(description, "");
    WHITESPACE_RE.replace_all(&stripped, " ").trim().to_string()
}

/// Split a data URI into an inline data part. The data is everything after
/// the first comma; the MIME type comes from the `data:<mime>;base64` header.
/// A string without a comma is taken as bare base64.
pub fn inline_data_from_uri(uri: &str) -> InlineData {
    match uri.split_once(',') {
        Some((header, data)) => {
            let mime_type = header
                .strip_prefix("data:")
                .and_then(|h| h.split(';').next())
                .filter(|m| !m.is_empty())
                .unwrap_or(DEFAULT_MIME_TYPE);
            InlineData {
                mime_type: mime_type.to_string(),
                data: data.to_string(),
            }
        }
        None => InlineData {
            mime_type: DEFAULT_MIME_TYPE.to_string(),
            data: uri.to_string(),
        },
    }
}

pub fn safety_settings() -> Vec<SafetySetting> {
    HARM_CATEGORIES
        .iter()
        .map(|category| SafetySetting {
            category: category.to_string(),
            threshold: SAFETY_THRESHOLD.to_string(),
        })
        .collect()
}

pub fn build_payload(req: &ImageRequest) -> GeminiRequest {
    let mut parts: Vec<GeminiPart> = [req.guide_image(), req.guide_complement()]
        .into_iter()
        .flatten()
        .map(|uri| GeminiPart::InlineData(inline_data_from_uri(uri)))
        .collect();
    parts.push(GeminiPart::Text(req.compose_prompt()));

    tracing::debug!(
        attachments = parts.len() - 1,
        booster = req.use_booster.unwrap_or(false),
        "Built image payload"
    );

    GeminiRequest {
        contents: vec![GeminiContent::user(parts)],
        system_instruction: None,
        generation_config: Some(GenerationConfig {
            response_mime_type: None,
            response_schema: None,
            response_modalities: Some(vec!["TEXT".to_string(), "IMAGE".to_string()]),
        }),
        safety_settings: Some(safety_settings()),
    }
}
