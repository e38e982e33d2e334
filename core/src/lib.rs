//! Core library: document analysis, presentation generation, slide
//! regeneration and visual generation on top of a Gemini model client.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod model_tools;
pub mod presentation;
pub mod prompts;
pub mod regenerator;
pub mod service;
pub mod structured;
pub mod visualizer;
pub mod web_search;

#[cfg(test)]
mod testing;

pub use analyzer::DocumentAnalyzer;
pub use config::{Config, ConfigError};
pub use error::{FlowError, Result};
pub use presentation::PresentationGenerator;
pub use regenerator::SlideRegenerator;
pub use service::PresentationService;
pub use visualizer::{VisualGenerator, Visualizer};
pub use web_search::{PlaceholderWebSearch, WebSearch};
