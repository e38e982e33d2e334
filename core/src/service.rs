use pptmaker_common::{
    DocumentAnalysis, GeneratePresentationRequest, GenerateVisualRequest, GenerateVisualResponse,
    Presentation, RegenerateSlideRequest, RegenerateSlideResponse, SlideStyle,
};
use pptmaker_gemini::{GeminiClient, ModelClient};
use std::sync::Arc;

use crate::analyzer::DocumentAnalyzer;
use crate::config::Config;
use crate::error::{FlowError, Result};
use crate::presentation::PresentationGenerator;
use crate::regenerator::SlideRegenerator;
use crate::visualizer::{VisualGenerator, Visualizer};
use crate::web_search::PlaceholderWebSearch;

/// Wires every flow to one model client and one configuration.
pub struct PresentationService {
    analyzer: DocumentAnalyzer,
    visualizer: Arc<Visualizer>,
    generator: PresentationGenerator,
    regenerator: SlideRegenerator,
}

impl PresentationService {
    /// Build a service talking to the Gemini REST API.
    pub fn from_config(config: Config) -> Result<Self> {
        let api_key = config.require_api_key()?;
        let mut client = GeminiClient::new(api_key).with_timeout(config.request_timeout())?;
        if let Some(base_url) = &config.base_url {
            client = client.with_base_url(base_url.as_str());
        }
        tracing::debug!("Using Gemini endpoint {}", client.base_url());
        Ok(Self::with_client(config, Arc::new(client)))
    }

    pub fn with_client(config: Config, client: Arc<dyn ModelClient>) -> Self {
        let visualizer = Arc::new(Visualizer::new(client.clone(), config.image_model.clone()));
        let analyzer = DocumentAnalyzer::new(client.clone(), config.model.clone())
            .with_temperature(config.temperature);
        let regenerator = SlideRegenerator::new(client.clone(), config.model.clone())
            .with_temperature(config.temperature);

        let visuals: Arc<dyn VisualGenerator> = visualizer.clone();
        let mut generator = PresentationGenerator::new(client, visuals, config.model.clone())
            .with_max_tool_rounds(config.max_tool_rounds)
            .with_temperature(config.temperature);
        if config.web_search {
            generator = generator.with_web_search(Arc::new(PlaceholderWebSearch));
        }

        Self {
            analyzer,
            visualizer,
            generator,
            regenerator,
        }
    }

    pub async fn analyze_document(&self, document_data_uri: &str) -> Result<DocumentAnalysis> {
        self.analyzer.analyze(document_data_uri).await
    }

    pub async fn generate_presentation(&self, request: &GeneratePresentationRequest) -> Presentation {
        self.generator.generate(request).await
    }

    pub async fn regenerate_slide(
        &self,
        request: &RegenerateSlideRequest,
    ) -> Result<RegenerateSlideResponse> {
        self.regenerator.regenerate(request).await
    }

    pub async fn generate_visual(
        &self,
        request: &GenerateVisualRequest,
    ) -> Result<GenerateVisualResponse> {
        self.visualizer.generate_visual(request).await
    }

    /// Rewrite the text of one slide in place, keeping its visual.
    pub async fn regenerate_slide_in(
        &self,
        presentation: &mut Presentation,
        slide_id: u32,
        style: SlideStyle,
    ) -> Result<()> {
        let slide = presentation
            .slide(slide_id)
            .ok_or(FlowError::SlideNotFound(slide_id))?;
        let request = RegenerateSlideRequest {
            slide_content: slide.content.clone(),
            template_details: presentation.metadata.template.clone(),
            style,
        };
        let output = self.regenerate_slide(&request).await?;

        if let Some(slide) = presentation.slide_mut(slide_id) {
            slide.content = output.regenerated_slide;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::testing::{response_with, text_response, ScriptedModel};
    use pptmaker_common::{PresentationMetadata, Slide, VisualPrompt};
    use pptmaker_protocol::Part;

    fn config() -> Config {
        Config {
            api_key: Some("test-key".into()),
            web_search: false,
            ..Config::default()
        }
    }

    fn presentation() -> Presentation {
        Presentation {
            slides: vec![Slide {
                id: 3,
                title: "Sales".into(),
                content: "Sales grew.".into(),
                visual_prompt: VisualPrompt::Prompt("Bar chart".into()),
                visual_data_uri: Some("data:image/png;base64,AAAA".into()),
            }],
            metadata: PresentationMetadata {
                template: "Corporate".into(),
                tone_style: "formal".into(),
            },
        }
    }

    #[test]
    fn missing_api_key_is_a_config_error() {
        let err = PresentationService::from_config(Config {
            api_key: None,
            ..Config::default()
        })
        .err()
        .unwrap();
        assert!(matches!(err, FlowError::Config(ConfigError::MissingApiKey)));
    }

    #[tokio::test]
    async fn regenerate_slide_in_replaces_only_content() {
        let model = Arc::new(ScriptedModel::new(vec![Ok(text_response(
            r#"{"regeneratedSlide":"Sales soared."}"#,
        ))]));
        let service = PresentationService::with_client(config(), model.clone());
        let mut deck = presentation();

        service
            .regenerate_slide_in(&mut deck, 3, SlideStyle::default())
            .await
            .unwrap();

        let slide = deck.slide(3).unwrap();
        assert_eq!(slide.content, "Sales soared.");
        assert_eq!(slide.visual_data_uri.as_deref(), Some("data:image/png;base64,AAAA"));
        assert!(model.requests()[0].contents[0]
            .text()
            .contains("The template details are: Corporate"));
    }

    #[tokio::test]
    async fn regenerate_unknown_slide_fails_without_model_call() {
        let model = Arc::new(ScriptedModel::new(vec![]));
        let service = PresentationService::with_client(config(), model.clone());
        let mut deck = presentation();

        let err = service
            .regenerate_slide_in(&mut deck, 9, SlideStyle::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::SlideNotFound(9)));
        assert!(model.requests().is_empty());
        assert_eq!(deck, presentation());
    }

    #[tokio::test]
    async fn flows_use_their_configured_models() {
        let model = Arc::new(ScriptedModel::new(vec![Ok(response_with(vec![
            Part::inline_data("image/jpeg", "/9j/4AAQ"),
        ]))]));
        let config = Config {
            image_model: "painter".into(),
            ..config()
        };
        let service = PresentationService::with_client(config, model.clone());

        let output = service
            .generate_visual(&GenerateVisualRequest {
                prompt_text: "Pie chart".into(),
                template_details: None,
            })
            .await
            .unwrap();
        assert_eq!(output.visual_data_uri, "data:image/jpeg;base64,/9j/4AAQ");
        assert_eq!(model.models(), vec!["painter".to_string()]);
    }

    #[tokio::test]
    async fn web_search_setting_controls_tools() {
        let model = Arc::new(ScriptedModel::new(vec![Ok(text_response(
            r#"{"slides":[{"id":1,"title":"T","content":"C"}]}"#,
        ))]));
        let service = PresentationService::with_client(
            Config {
                web_search: true,
                ..config()
            },
            model.clone(),
        );

        let deck = service
            .generate_presentation(&GeneratePresentationRequest {
                analysis_data: DocumentAnalysis::fallback(),
                parameters: Default::default(),
            })
            .await;
        assert_eq!(deck.slides.len(), 1);
        assert_eq!(model.requests()[0].tools.len(), 1);
    }
}
