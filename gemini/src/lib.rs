//! HTTP client for the hosted Gemini model.

mod client;
mod error;

pub use client::{GeminiClient, ModelClient, DEFAULT_BASE_URL};
pub use error::{ModelError, Result};
