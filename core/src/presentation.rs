//! Presentation generation: structure phase, per-slide visual generation,
//! and the fallback to a single error slide.

use futures::future::join_all;
use pptmaker_common::{
    GeneratePresentationRequest, GenerateVisualRequest, Presentation, PresentationMetadata,
    Slide, VisualKind, VisualPrompt,
};
use pptmaker_gemini::ModelClient;
use pptmaker_protocol::{schemas, Part};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{FlowError, Result};
use crate::model_tools::{ToolBox, WebSearchTool};
use crate::prompts;
use crate::structured::{PromptRunner, StructuredPrompt};
use crate::visualizer::VisualGenerator;
use crate::web_search::WebSearch;

pub const ERROR_SLIDE_ID: u32 = 0;
pub const ERROR_SLIDE_TITLE: &str = "Error Generating Presentation";

const STRUCTURE_FLOW: &str = "presentation structure generation";

/// Slide as proposed by the model, before normalization.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProposedSlide {
    id: u32,
    title: String,
    content: String,
    #[serde(default)]
    visual_prompt: Option<String>,
    #[serde(default)]
    visual_data_uri: Option<String>,
}

impl From<ProposedSlide> for Slide {
    fn from(proposed: ProposedSlide) -> Self {
        Slide {
            id: proposed.id,
            title: proposed.title,
            content: proposed.content,
            visual_prompt: VisualPrompt::from_optional(proposed.visual_prompt.as_deref()),
            visual_data_uri: proposed.visual_data_uri,
        }
        .normalized()
    }
}

#[derive(Debug, Deserialize)]
struct ProposedStructure {
    #[serde(default)]
    slides: Option<Vec<ProposedSlide>>,
}

/// Trim visual fields and collapse blanks to absent, keeping order and count.
pub fn normalize_slides(slides: Vec<Slide>) -> Vec<Slide> {
    slides.into_iter().map(Slide::normalized).collect()
}

/// Generate a visual for every prompt-only slide, all at once.
///
/// Each failure is recorded on its own slide and never affects the others.
pub async fn attach_generated_visuals(
    visuals: &dyn VisualGenerator,
    slides: Vec<Slide>,
    template_details: &str,
) -> Vec<Slide> {
    let tasks = slides.into_iter().enumerate().map(|(index, slide)| async move {
        if !slide.needs_generated_visual() {
            return slide;
        }
        let prompt = slide.visual_prompt.prompt().unwrap_or_default().to_string();

        tracing::info!(
            "Slide {} ({}): generating AI visual from prompt \"{prompt}\"",
            index + 1,
            slide.title
        );
        let request = GenerateVisualRequest {
            prompt_text: prompt.clone(),
            template_details: Some(template_details.to_string()),
        };
        match visuals.generate_visual(&request).await {
            Ok(output) => Slide {
                visual_data_uri: Some(output.visual_data_uri),
                ..slide
            },
            Err(e) => {
                tracing::error!(
                    "Failed to generate AI visual for slide {} (\"{}\") from prompt \"{prompt}\": {e}",
                    index + 1,
                    slide.title
                );
                Slide {
                    visual_data_uri: None,
                    visual_prompt: VisualPrompt::failed(&prompt, &e.to_string()),
                    ..slide
                }
            }
        }
    });
    join_all(tasks).await
}

/// Human-readable explanation placed on the error slide.
pub fn failure_message(error: &FlowError) -> String {
    if error.is_schema_violation() {
        format!(
            "Failed to generate presentation: The AI model did not return data in the expected \
             format. Check server logs for details. Details: {error}"
        )
    } else if error.is_timeout() {
        "Failed to generate presentation: The request timed out. This might be due to a complex \
         request or network issues. Please try again."
            .to_string()
    } else {
        format!("Failed to generate presentation: {error}")
    }
}

/// Well-formed single-slide presentation reporting a total failure.
pub fn error_presentation(error: &FlowError, metadata: PresentationMetadata) -> Presentation {
    Presentation {
        slides: vec![Slide {
            id: ERROR_SLIDE_ID,
            title: ERROR_SLIDE_TITLE.to_string(),
            content: failure_message(error),
            visual_prompt: VisualPrompt::None,
            visual_data_uri: None,
        }],
        metadata,
    }
}

fn log_slide_outcomes(slides: &[Slide]) {
    for (index, slide) in slides.iter().enumerate() {
        let n = index + 1;
        match (slide.visual_kind(), &slide.visual_prompt) {
            (Some(VisualKind::Unrecognized), _) => tracing::warn!(
                "Slide {n} ({}) has a visual that is neither a data URI nor http(s): {}",
                slide.title,
                slide.visual_data_uri.as_deref().unwrap_or_default()
            ),
            (Some(kind), prompt) => tracing::info!(
                "Slide {n} ({}): has {kind}; prompt was \"{}\"",
                slide.title,
                prompt.prompt().unwrap_or("N/A")
            ),
            (None, VisualPrompt::Error(message)) => {
                tracing::warn!("Slide {n} ({}): {message}", slide.title)
            }
            (None, VisualPrompt::Prompt(prompt)) => tracing::info!(
                "Slide {n} ({}): had visual prompt \"{prompt}\" but no visual",
                slide.title
            ),
            (None, VisualPrompt::None) => {
                tracing::info!("Slide {n} ({}): no visual needed", slide.title)
            }
        }
    }
}

/// Orchestrates one presentation generation request.
pub struct PresentationGenerator {
    client: Arc<dyn ModelClient>,
    visuals: Arc<dyn VisualGenerator>,
    web_search: Option<Arc<dyn WebSearch>>,
    model: String,
    max_tool_rounds: usize,
    temperature: Option<f32>,
}

impl PresentationGenerator {
    pub fn new(
        client: Arc<dyn ModelClient>,
        visuals: Arc<dyn VisualGenerator>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            visuals,
            web_search: None,
            model: model.into(),
            max_tool_rounds: 5,
            temperature: None,
        }
    }

    /// Offer the `webSearch` tool to the structure prompt.
    pub fn with_web_search(mut self, search: Arc<dyn WebSearch>) -> Self {
        self.web_search = Some(search);
        self
    }

    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Never fails: a structure-phase error becomes a single error slide.
    pub async fn generate(&self, request: &GeneratePresentationRequest) -> Presentation {
        let metadata = PresentationMetadata {
            template: request.parameters.template.clone(),
            tone_style: request.parameters.tone_style.clone(),
        };

        match self.try_generate(request).await {
            Ok(slides) => {
                tracing::info!(
                    "Presentation generated: {} slides, {} with a visual",
                    slides.len(),
                    slides.iter().filter(|s| s.visual_data_uri.is_some()).count()
                );
                log_slide_outcomes(&slides);
                Presentation { slides, metadata }
            }
            Err(e) => {
                tracing::error!("Presentation generation failed: {e}");
                error_presentation(&e, metadata)
            }
        }
    }

    async fn try_generate(&self, request: &GeneratePresentationRequest) -> Result<Vec<Slide>> {
        let slides = normalize_slides(self.generate_structure(request).await?);
        tracing::info!(
            "Generated {} slide structure; {} slides have web images",
            slides.len(),
            slides.iter().filter(|s| s.visual_data_uri.is_some()).count()
        );

        let details = prompts::template_details(
            &request.parameters.template,
            &request.parameters.tone_style,
        );
        let slides = attach_generated_visuals(self.visuals.as_ref(), slides, &details).await;
        Ok(normalize_slides(slides))
    }

    async fn generate_structure(&self, request: &GeneratePresentationRequest) -> Result<Vec<Slide>> {
        let tools = match &self.web_search {
            Some(search) => ToolBox::new().with(Arc::new(WebSearchTool::new(search.clone()))),
            None => ToolBox::new(),
        };
        let searching = !tools.is_empty();
        let prompt = StructuredPrompt {
            name: STRUCTURE_FLOW,
            system: Some(
                if searching {
                    prompts::STRUCTURE_SYSTEM
                } else {
                    prompts::STRUCTURE_SYSTEM_NO_SEARCH
                }
                .to_string(),
            ),
            parts: vec![Part::text(prompts::structure_prompt(request, searching))],
            schema: schemas::presentation_structure(),
            temperature: self.temperature,
        };

        let structure: ProposedStructure =
            PromptRunner::new(self.client.as_ref(), &self.model, &tools)
                .with_max_tool_rounds(self.max_tool_rounds)
                .run(prompt)
                .await?;

        let slides = structure
            .slides
            .filter(|slides| !slides.is_empty())
            .ok_or(FlowError::EmptyOutput { flow: STRUCTURE_FLOW })?;

        let mut seen = HashSet::new();
        for slide in &slides {
            if !seen.insert(slide.id) {
                tracing::warn!("Model reused slide id {} in one presentation", slide.id);
            }
        }
        Ok(slides.into_iter().map(Slide::from).collect())
    }
}
