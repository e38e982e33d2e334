use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

/// Prefix carried by every visual-generation failure message.
pub const VISUAL_ERROR_PREFIX: &str = "Error generating AI visual";

/// Structured analysis of one uploaded document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentAnalysis {
    pub topics: Vec<String>,
    pub subtopics: Vec<String>,
    pub data_points: Vec<String>,
    pub quotes: Vec<String>,
    pub summary: String,
}

impl DocumentAnalysis {
    /// Empty analysis callers substitute when the analyzer fails.
    pub fn fallback() -> Self {
        Self {
            summary: "Error during analysis.".to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmartArtDensity {
    Low,
    #[default]
    Medium,
    High,
}

impl SmartArtDensity {
    pub fn as_str(&self) -> &'static str {
        match self {
            SmartArtDensity::Low => "low",
            SmartArtDensity::Medium => "medium",
            SmartArtDensity::High => "high",
        }
    }
}

impl fmt::Display for SmartArtDensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SmartArtDensity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(SmartArtDensity::Low),
            "medium" => Ok(SmartArtDensity::Medium),
            "high" => Ok(SmartArtDensity::High),
            other => Err(format!(
                "invalid smart art density '{other}' (expected low, medium or high)"
            )),
        }
    }
}

/// User-chosen knobs for presentation generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_slides: Option<NonZeroU32>,
    pub template: String,
    pub smart_art_density: SmartArtDensity,
    pub data_viz_preference: String,
    pub content_visual_ratio: String,
    pub tone_style: String,
}

impl Default for PresentationParameters {
    fn default() -> Self {
        Self {
            num_slides: None,
            template: "Modern".to_string(),
            smart_art_density: SmartArtDensity::Medium,
            data_viz_preference: "charts".to_string(),
            content_visual_ratio: "balanced".to_string(),
            tone_style: "professional".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePresentationRequest {
    pub analysis_data: DocumentAnalysis,
    #[serde(flatten)]
    pub parameters: PresentationParameters,
}

/// What a slide's visual prompt currently holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "camelCase")]
pub enum VisualPrompt {
    #[default]
    None,
    /// Image-search query or description for generative art.
    Prompt(String),
    /// Visual generation failed; the message starts with [`VISUAL_ERROR_PREFIX`].
    Error(String),
}

impl VisualPrompt {
    /// Build from an optional model-provided string, treating blank as absent.
    pub fn from_optional(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(text) if !text.is_empty() => VisualPrompt::Prompt(text.to_string()),
            _ => VisualPrompt::None,
        }
    }

    pub fn failed(prompt: &str, reason: &str) -> Self {
        VisualPrompt::Error(format!(
            "{VISUAL_ERROR_PREFIX} from prompt \"{prompt}\": {reason}"
        ))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, VisualPrompt::None)
    }

    pub fn prompt(&self) -> Option<&str> {
        match self {
            VisualPrompt::Prompt(text) => Some(text),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            VisualPrompt::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Trim the carried text; blank text collapses to `None`.
    pub fn normalized(self) -> Self {
        match self {
            VisualPrompt::None => VisualPrompt::None,
            VisualPrompt::Prompt(text) => match text.trim() {
                "" => VisualPrompt::None,
                t => VisualPrompt::Prompt(t.to_string()),
            },
            VisualPrompt::Error(message) => match message.trim() {
                "" => VisualPrompt::None,
                m => VisualPrompt::Error(m.to_string()),
            },
        }
    }
}

/// Where a slide's visual URI points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualKind {
    WebImage,
    Generated,
    Unrecognized,
}

impl VisualKind {
    pub fn classify(uri: &str) -> Self {
        if uri.starts_with("data:image") {
            VisualKind::Generated
        } else if uri.starts_with("http://") || uri.starts_with("https://") {
            VisualKind::WebImage
        } else {
            VisualKind::Unrecognized
        }
    }
}

impl fmt::Display for VisualKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisualKind::WebImage => f.write_str("web image"),
            VisualKind::Generated => f.write_str("generated visual"),
            VisualKind::Unrecognized => f.write_str("unrecognized visual"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    pub id: u32,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "VisualPrompt::is_none")]
    pub visual_prompt: VisualPrompt,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_data_uri: Option<String>,
}

impl Slide {
    pub fn visual_kind(&self) -> Option<VisualKind> {
        self.visual_data_uri.as_deref().map(VisualKind::classify)
    }

    /// Prompt-only slides are the ones that still need a generated visual.
    pub fn needs_generated_visual(&self) -> bool {
        self.visual_data_uri.is_none() && self.visual_prompt.prompt().is_some()
    }

    /// Trim optional visual fields and collapse blanks to absent.
    pub fn normalized(self) -> Self {
        let visual_data_uri = self
            .visual_data_uri
            .map(|uri| uri.trim().to_string())
            .filter(|uri| !uri.is_empty());
        Self {
            visual_prompt: self.visual_prompt.normalized(),
            visual_data_uri,
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationMetadata {
    pub template: String,
    pub tone_style: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presentation {
    pub slides: Vec<Slide>,
    pub metadata: PresentationMetadata,
}

impl Presentation {
    pub fn slide(&self, id: u32) -> Option<&Slide> {
        self.slides.iter().find(|slide| slide.id == id)
    }

    pub fn slide_mut(&mut self, id: u32) -> Option<&mut Slide> {
        self.slides.iter_mut().find(|slide| slide.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVisualRequest {
    pub prompt_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_details: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVisualResponse {
    pub visual_data_uri: String,
}

/// Style knobs applied when regenerating a single slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideStyle {
    pub smart_art_density: SmartArtDensity,
    pub data_visualization_preference: String,
    pub content_to_visual_ratio: String,
    pub tone_and_style: String,
}

impl Default for SlideStyle {
    fn default() -> Self {
        Self {
            smart_art_density: SmartArtDensity::Medium,
            data_visualization_preference: "charts".to_string(),
            content_to_visual_ratio: "balanced".to_string(),
            tone_and_style: "professional".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenerateSlideRequest {
    pub slide_content: String,
    pub template_details: String,
    #[serde(flatten)]
    pub style: SlideStyle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenerateSlideResponse {
    pub regenerated_slide: String,
}

/// One hit returned by a web search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}
