use pptmaker_common::DataUriError;
use pptmaker_gemini::ModelError;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Model call failed: {0}")]
    Model(#[from] ModelError),

    #[error("{flow} failed: model response was empty or invalid")]
    EmptyOutput { flow: &'static str },

    #[error("{flow}: Schema validation failed: {source}")]
    SchemaValidation {
        flow: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid document data URI: {0}")]
    InvalidDocument(#[from] DataUriError),

    #[error("Visual generation returned no image")]
    NoImage,

    #[error("Visual generation returned an image that is not a data URI: {0}")]
    InvalidImage(String),

    #[error("Model exceeded {max} rounds of tool calls")]
    ToolLoopExceeded { max: usize },

    #[error("Model called unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool {tool} failed: {reason}")]
    Tool { tool: String, reason: String },

    #[error("Slide {0} not found")]
    SlideNotFound(u32),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl FlowError {
    /// Deadline or timeout anywhere along the model call.
    pub fn is_timeout(&self) -> bool {
        matches!(self, FlowError::Model(e) if e.is_timeout())
    }

    /// The model answered, but not in the declared output shape.
    pub fn is_schema_violation(&self) -> bool {
        matches!(self, FlowError::SchemaValidation { .. })
    }
}

pub type Result<T> = std::result::Result<T, FlowError>;
