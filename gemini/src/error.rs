use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model request exceeded its deadline")]
    Timeout,

    #[error("model API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("invalid model response JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("prompt blocked by the model: {0}")]
    Blocked(String),
}

impl ModelError {
    pub fn is_timeout(&self) -> bool {
        match self {
            ModelError::Timeout => true,
            ModelError::Http(e) => e.is_timeout(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;
