use async_trait::async_trait;
use pptmaker_common::{DataUri, GenerateVisualRequest, GenerateVisualResponse};
use pptmaker_gemini::ModelClient;
use pptmaker_protocol::{Content, GenerateContentRequest, GenerationConfig, Modality, Part};
use std::sync::Arc;

use crate::error::{FlowError, Result};
use crate::prompts;

/// Produces one image for a text description.
#[async_trait]
pub trait VisualGenerator: Send + Sync {
    async fn generate_visual(&self, request: &GenerateVisualRequest)
        -> Result<GenerateVisualResponse>;
}

/// Image generation through a model answering with TEXT and IMAGE parts.
pub struct Visualizer {
    client: Arc<dyn ModelClient>,
    model: String,
}

impl Visualizer {
    pub fn new(client: Arc<dyn ModelClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    fn build_request(request: &GenerateVisualRequest) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::user(vec![Part::text(prompts::visual_prompt(request))])],
            // The image model rejects IMAGE-only output; the text part is ignored.
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec![Modality::Text, Modality::Image]),
                ..GenerationConfig::default()
            }),
            ..GenerateContentRequest::default()
        }
    }
}

#[async_trait]
impl VisualGenerator for Visualizer {
    async fn generate_visual(
        &self,
        request: &GenerateVisualRequest,
    ) -> Result<GenerateVisualResponse> {
        tracing::debug!("Generating visual: {}", request.prompt_text);
        let response = self
            .client
            .generate_content(&self.model, &Self::build_request(request))
            .await?;
        let content = response.first_content().ok_or(FlowError::NoImage)?;

        if let Some(image) = content
            .inline_data()
            .find(|blob| blob.mime_type.starts_with("image/"))
        {
            if image.data.trim().is_empty() {
                return Err(FlowError::InvalidImage(format!(
                    "empty {} payload",
                    image.mime_type
                )));
            }
            let uri = DataUri::from_base64(&image.mime_type, image.data.trim());
            return Ok(GenerateVisualResponse {
                visual_data_uri: uri.to_string(),
            });
        }

        // An image handed back by reference instead of inline.
        if let Some(file) = content.file_data().next() {
            return Err(FlowError::InvalidImage(file.file_uri.clone()));
        }
        Err(FlowError::NoImage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{response_with, text_response, ScriptedModel};
    use pptmaker_protocol::FileData;

    fn request() -> GenerateVisualRequest {
        GenerateVisualRequest {
            prompt_text: "Bar chart: Q1 $50k, Q2 $75k".into(),
            template_details: Some("Template: Modern, Style: professional".into()),
        }
    }

    #[tokio::test]
    async fn returns_inline_image_as_data_uri() {
        let model = Arc::new(ScriptedModel::new(vec![Ok(response_with(vec![
            Part::text("Here is the chart."),
            Part::inline_data("image/png", "iVBORw0KGgo="),
        ]))]));
        let visualizer = Visualizer::new(model.clone(), "image-model");

        let output = visualizer.generate_visual(&request()).await.unwrap();
        assert_eq!(output.visual_data_uri, "data:image/png;base64,iVBORw0KGgo=");

        let sent = &model.requests()[0];
        let modalities = sent
            .generation_config
            .as_ref()
            .and_then(|c| c.response_modalities.clone())
            .unwrap();
        assert_eq!(modalities, vec![Modality::Text, Modality::Image]);
        assert!(sent.contents[0].text().contains("Bar chart: Q1 $50k, Q2 $75k"));
        assert_eq!(model.models(), vec!["image-model".to_string()]);
    }

    #[tokio::test]
    async fn text_only_answer_is_no_image() {
        let model = Arc::new(ScriptedModel::new(vec![Ok(text_response("I cannot draw."))]));
        let visualizer = Visualizer::new(model, "image-model");

        let err = visualizer.generate_visual(&request()).await.unwrap_err();
        assert!(matches!(err, FlowError::NoImage));
    }

    #[tokio::test]
    async fn file_reference_is_not_a_data_uri() {
        let model = Arc::new(ScriptedModel::new(vec![Ok(response_with(vec![Part::FileData {
            file_data: FileData {
                mime_type: Some("image/png".into()),
                file_uri: "gs://bucket/chart.png".into(),
            },
        }]))]));
        let visualizer = Visualizer::new(model, "image-model");

        let err = visualizer.generate_visual(&request()).await.unwrap_err();
        assert!(matches!(err, FlowError::InvalidImage(uri) if uri == "gs://bucket/chart.png"));
    }
}
