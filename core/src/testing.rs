//! In-memory fakes shared by the unit tests.

use async_trait::async_trait;
use pptmaker_common::{GenerateVisualRequest, GenerateVisualResponse};
use pptmaker_gemini::{ModelClient, ModelError};
use pptmaker_protocol::{
    Candidate, Content, FunctionCall, GenerateContentRequest, GenerateContentResponse, Part,
};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::error::{FlowError, Result};
use crate::visualizer::VisualGenerator;

pub fn response_with(parts: Vec<Part>) -> GenerateContentResponse {
    GenerateContentResponse {
        candidates: vec![Candidate {
            content: Some(Content::model(parts)),
            finish_reason: Some("STOP".into()),
        }],
        ..GenerateContentResponse::default()
    }
}

pub fn text_response(text: &str) -> GenerateContentResponse {
    response_with(vec![Part::text(text)])
}

pub fn function_call_response(name: &str, args: Value) -> GenerateContentResponse {
    response_with(vec![Part::FunctionCall {
        function_call: FunctionCall {
            name: name.into(),
            args,
        },
        thought_signature: None,
    }])
}

/// Answers with queued responses in order and records every request.
pub struct ScriptedModel {
    responses: Mutex<VecDeque<std::result::Result<GenerateContentResponse, ModelError>>>,
    requests: Mutex<Vec<(String, GenerateContentRequest)>>,
}

impl ScriptedModel {
    pub fn new(
        responses: Vec<std::result::Result<GenerateContentResponse, ModelError>>,
    ) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<GenerateContentRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(_, request)| request.clone())
            .collect()
    }

    pub fn models(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(model, _)| model.clone())
            .collect()
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> std::result::Result<GenerateContentResponse, ModelError> {
        self.requests
            .lock()
            .unwrap()
            .push((model.to_string(), request.clone()));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(GenerateContentResponse::default()))
    }
}

/// Visual generator keyed by prompt text; unknown prompts get a fixed PNG.
#[derive(Default)]
pub struct RecordingVisuals {
    failures: HashMap<String, String>,
    calls: Mutex<Vec<GenerateVisualRequest>>,
}

impl RecordingVisuals {
    pub fn failing(mut self, prompt: &str, reason: &str) -> Self {
        self.failures.insert(prompt.to_string(), reason.to_string());
        self
    }

    pub fn calls(&self) -> Vec<GenerateVisualRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn uri_for(prompt: &str) -> String {
        format!("data:image/png;base64,{}", prompt.len())
    }
}

#[async_trait]
impl VisualGenerator for RecordingVisuals {
    async fn generate_visual(
        &self,
        request: &GenerateVisualRequest,
    ) -> Result<GenerateVisualResponse> {
        self.calls.lock().unwrap().push(request.clone());
        match self.failures.get(&request.prompt_text) {
            Some(reason) => Err(FlowError::Model(ModelError::Api {
                status: 429,
                message: reason.clone(),
            })),
            None => Ok(GenerateVisualResponse {
                visual_data_uri: Self::uri_for(&request.prompt_text),
            }),
        }
    }
}
