use pptmaker_common::{DataUri, DocumentAnalysis};
use pptmaker_gemini::ModelClient;
use pptmaker_protocol::{schemas, Part};
use std::sync::Arc;

use crate::error::Result;
use crate::model_tools::ToolBox;
use crate::prompts;
use crate::structured::{PromptRunner, StructuredPrompt};

/// Extracts topics, data points, quotes and a summary from one document.
pub struct DocumentAnalyzer {
    client: Arc<dyn ModelClient>,
    model: String,
    temperature: Option<f32>,
}

impl DocumentAnalyzer {
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

    /// Analyze a `data:<mime>;base64,...` document.
    ///
    /// Errors propagate; callers decide whether to fall back to
    /// [`DocumentAnalysis::fallback`].
    pub async fn analyze(&self, document_data_uri: &str) -> Result<DocumentAnalysis> {
        let document = DataUri::parse(document_data_uri)?;
        tracing::info!(
            "Analyzing {} document ({} base64 bytes)",
            document.mime_type(),
            document.data().len()
        );

        let prompt = StructuredPrompt {
            name: "document analysis",
            system: None,
            parts: vec![
                Part::inline_data(document.mime_type(), document.data()),
                Part::text(prompts::ANALYSIS_INSTRUCTIONS),
            ],
            schema: schemas::document_analysis(),
            temperature: self.temperature,
        };
        let tools = ToolBox::new();
        let analysis: DocumentAnalysis = PromptRunner::new(self.client.as_ref(), &self.model, &tools)
            .run(prompt)
            .await?;

        tracing::info!(
            "Document analysis found {} topics, {} data points, {} quotes",
            analysis.topics.len(),
            analysis.data_points.len(),
            analysis.quotes.len()
        );
        Ok(analysis)
    }
}
