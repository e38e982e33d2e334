//! Runs one prompt that must answer with a JSON record of a known shape.
//!
//! Without tools the schema is enforced by the model (`responseSchema`). With
//! tools the schema is spelled out in the prompt instead and the JSON is
//! pulled out of the final text answer, because constrained JSON output and
//! function calling cannot be combined in one request.

use pptmaker_gemini::ModelClient;
use pptmaker_protocol::{Content, GenerateContentRequest, GenerationConfig, Part};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{FlowError, Result};
use crate::model_tools::ToolBox;

pub struct StructuredPrompt {
    /// Flow name used in logs and errors.
    pub name: &'static str,
    pub system: Option<String>,
    pub parts: Vec<Part>,
    pub schema: Value,
    pub temperature: Option<f32>,
}

pub struct PromptRunner<'a> {
    client: &'a dyn ModelClient,
    model: &'a str,
    tools: &'a ToolBox,
    max_tool_rounds: usize,
}

impl<'a> PromptRunner<'a> {
    pub fn new(client: &'a dyn ModelClient, model: &'a str, tools: &'a ToolBox) -> Self {
        Self {
            client,
            model,
            tools,
            max_tool_rounds: 5,
        }
    }

    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    fn build_request(&self, prompt: StructuredPrompt) -> GenerateContentRequest {
        let constrained = self.tools.is_empty();
        let mut parts = prompt.parts;
        let generation_config = if constrained {
            GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(prompt.schema),
                temperature: prompt.temperature,
                ..GenerationConfig::default()
            }
        } else {
            parts.push(Part::text(schema_instructions(&prompt.schema)));
            GenerationConfig {
                temperature: prompt.temperature,
                ..GenerationConfig::default()
            }
        };

        GenerateContentRequest {
            contents: vec![Content::user(parts)],
            system_instruction: prompt.system.map(Content::system),
            tools: self.tools.declarations(),
            generation_config: Some(generation_config),
        }
    }

    pub async fn run<T: DeserializeOwned>(&self, prompt: StructuredPrompt) -> Result<T> {
        let flow = prompt.name;
        let mut request = self.build_request(prompt);
        let mut rounds = 0;

        loop {
            let response = self.client.generate_content(self.model, &request).await?;
            let content = response
                .first_content()
                .ok_or(FlowError::EmptyOutput { flow })?;

            let calls = content.function_calls();
            if calls.is_empty() {
                return parse_output(flow, &content.text());
            }

            rounds += 1;
            if rounds > self.max_tool_rounds {
                return Err(FlowError::ToolLoopExceeded {
                    max: self.max_tool_rounds,
                });
            }

            let mut outputs = Vec::with_capacity(calls.len());
            for call in calls {
                tracing::info!("{flow}: model called tool {} with {}", call.name, call.args);
                let output = self.tools.invoke(call).await?;
                outputs.push(Part::function_response(call.name.clone(), output));
            }
            request.contents.push(Content::model(content.parts.clone()));
            request.contents.push(Content::user(outputs));
        }
    }
}

fn schema_instructions(schema: &Value) -> String {
    let rendered = serde_json::to_string_pretty(schema).unwrap_or_default();
    format!(
        "Output should be in JSON format and conform to the following schema:\n\n```\n{rendered}\n```\n"
    )
}

/// Locate the JSON object in a text answer, tolerating markdown fences and prose.
pub fn extract_json(text: &str) -> Option<&str> {
    let text = text.trim();
    let text = match text.find("```") {
        Some(start) => {
            let after = &text[start + 3..];
            let after = after.strip_prefix("json").unwrap_or(after);
            match after.find("```") {
                Some(end) => &after[..end],
                None => after,
            }
        }
        None => text,
    };
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end >= start).then(|| &text[start..=end])
}

pub fn parse_output<T: DeserializeOwned>(flow: &'static str, text: &str) -> Result<T> {
    let json = extract_json(text).ok_or(FlowError::EmptyOutput { flow })?;
    serde_json::from_str(json).map_err(|source| FlowError::SchemaValidation { flow, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model_tools::WebSearchTool;
    use crate::testing::{function_call_response, text_response, ScriptedModel};
    use crate::web_search::PlaceholderWebSearch;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::Arc;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Answer {
        value: u32,
    }

    fn prompt() -> StructuredPrompt {
        StructuredPrompt {
            name: "test flow",
            system: Some("be exact".into()),
            parts: vec![Part::text("give me a value")],
            schema: json!({"type": "OBJECT", "properties": {"value": {"type": "INTEGER"}}}),
            temperature: None,
        }
    }

    #[test]
    fn extracts_json_from_fenced_answer() {
        let text = "Sure!\n```json\n{\"value\": 3}\n```\nAnything else?";
        assert_eq!(extract_json(text), Some("{\"value\": 3}"));
        assert_eq!(extract_json("no json here"), None);
    }

    #[tokio::test]
    async fn constrained_prompt_sends_schema() {
        let model = ScriptedModel::new(vec![Ok(text_response(r#"{"value": 7}"#))]);
        let tools = ToolBox::new();
        let answer: Answer = PromptRunner::new(&model, "m", &tools).run(prompt()).await.unwrap();

        assert_eq!(answer, Answer { value: 7 });
        let requests = model.requests();
        let config = requests[0].generation_config.as_ref().unwrap();
        assert_eq!(config.response_mime_type.as_deref(), Some("application/json"));
        assert!(config.response_schema.is_some());
        assert!(requests[0].tools.is_empty());
    }

    #[tokio::test]
    async fn wrong_shape_is_schema_violation() {
        let model = ScriptedModel::new(vec![Ok(text_response(r#"{"value": "seven"}"#))]);
        let tools = ToolBox::new();
        let err = PromptRunner::new(&model, "m", &tools)
            .run::<Answer>(prompt())
            .await
            .unwrap_err();
        assert!(err.is_schema_violation());
        assert!(err.to_string().contains("Schema validation failed"));
    }

    #[tokio::test]
    async fn empty_answer_is_empty_output() {
        let model = ScriptedModel::new(vec![Ok(text_response("   "))]);
        let tools = ToolBox::new();
        let err = PromptRunner::new(&model, "m", &tools)
            .run::<Answer>(prompt())
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::EmptyOutput { flow: "test flow" }));
    }

    #[tokio::test]
    async fn services_tool_calls_then_parses_answer() {
        let model = ScriptedModel::new(vec![
            Ok(function_call_response("webSearch", json!({"query": "team photo"}))),
            Ok(text_response("```json\n{\"value\": 1}\n```")),
        ]);
        let tools =
            ToolBox::new().with(Arc::new(WebSearchTool::new(Arc::new(PlaceholderWebSearch))));
        let answer: Answer = PromptRunner::new(&model, "m", &tools).run(prompt()).await.unwrap();
        assert_eq!(answer.value, 1);

        let requests = model.requests();
        assert_eq!(requests.len(), 2);
        let first_config = requests[0].generation_config.as_ref().unwrap();
        assert!(first_config.response_schema.is_none());
        assert!(requests[0].contents[0].text().contains("conform to the following schema"));

        let follow_up = &requests[1].contents;
        assert_eq!(follow_up.len(), 3);
        assert_eq!(follow_up[1].role.as_deref(), Some("model"));
        match &follow_up[2].parts[0] {
            Part::FunctionResponse { function_response } => {
                assert_eq!(function_response.name, "webSearch");
                assert_eq!(
                    function_response.response["results"][0]["link"],
                    "https://picsum.photos/seed/team-photo/400/300"
                );
            }
            other => panic!("expected function response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn endless_tool_calls_are_cut_off() {
        let call = || Ok(function_call_response("webSearch", json!({"query": "x"})));
        let model = ScriptedModel::new(vec![call(), call(), call()]);
        let tools =
            ToolBox::new().with(Arc::new(WebSearchTool::new(Arc::new(PlaceholderWebSearch))));
        let err = PromptRunner::new(&model, "m", &tools)
            .with_max_tool_rounds(2)
            .run::<Answer>(prompt())
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::ToolLoopExceeded { max: 2 }));
    }
}
