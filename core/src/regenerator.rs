use pptmaker_common::{RegenerateSlideRequest, RegenerateSlideResponse};
use pptmaker_gemini::ModelClient;
use pptmaker_protocol::{schemas, Part};
use std::sync::Arc;

use crate::error::Result;
use crate::model_tools::ToolBox;
use crate::prompts;
use crate::structured::{PromptRunner, StructuredPrompt};

/// Rewrites the text of a single slide; visuals are left alone.
pub struct SlideRegenerator {
    client: Arc<dyn ModelClient>,
    model: String,
    temperature: Option<f32>,
}

impl SlideRegenerator {
    pub fn new(client: Arc<dyn ModelClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub async fn regenerate(&self, request: &RegenerateSlideRequest) -> Result<RegenerateSlideResponse> {
        let prompt = StructuredPrompt {
            name: "slide regeneration",
            system: None,
            parts: vec![Part::text(prompts::regenerate_prompt(request))],
            schema: schemas::regenerated_slide(),
            temperature: self.temperature,
        };
        let tools = ToolBox::new();
        PromptRunner::new(self.client.as_ref(), &self.model, &tools)
            .run(prompt)
            .await
    }
}
