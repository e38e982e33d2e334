use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.0-flash-preview-image-generation";
pub const DEFAULT_CONFIG_FILE: &str = "pptmaker.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },
    #[error("Failed to read config file: {source}")]
    IoError { source: std::io::Error },
    #[error("Failed to parse config file: {source}")]
    ParseError { source: serde_json::Error },
    #[error("Failed to parse TOML config: {source}")]
    TomlParseError { source: toml::de::Error },
    #[error("No API key configured (set GEMINI_API_KEY or GOOGLE_API_KEY)")]
    MissingApiKey,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Never written back to disk.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Text model used for analysis, structure and regeneration.
    pub model: String,
    /// Model able to answer with TEXT and IMAGE parts.
    pub image_model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub request_timeout_secs: u64,
    /// Upper bound on tool-call round trips in one structured prompt.
    pub max_tool_rounds: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Offer the placeholder web search tool to the structure prompt.
    pub web_search: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            base_url: None,
            request_timeout_secs: 120,
            max_tool_rounds: 5,
            temperature: None,
            web_search: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML or JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError { source: e })?;

        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError { source: e })
        } else {
            toml::from_str(&contents).map_err(|e| ConfigError::TomlParseError { source: e })
        }
    }

    /// Resolve the config file (explicit path, `PPTMAKER_CONFIG`, then
    /// `./pptmaker.toml`), then apply environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let candidate: Option<PathBuf> = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => std::env::var("PPTMAKER_CONFIG").ok().map(PathBuf::from),
        };

        let mut config = match candidate {
            Some(path) => {
                let config = Self::load_from_file(&path)?;
                tracing::info!("Loaded configuration from {}", path.display());
                config
            }
            None => {
                let local = Path::new(DEFAULT_CONFIG_FILE);
                if local.exists() {
                    match Self::load_from_file(local) {
                        Ok(config) => {
                            tracing::info!("Loaded configuration from {DEFAULT_CONFIG_FILE}");
                            config
                        }
                        Err(e) => {
                            tracing::warn!("Failed to load config from {DEFAULT_CONFIG_FILE}: {e}");
                            Self::default()
                        }
                    }
                } else {
                    tracing::debug!("Using default configuration");
                    Self::default()
                }
            }
        };

        config.apply_env();
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an environment-like lookup; blank values are ignored.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("GEMINI_API_KEY").or_else(|| get("GOOGLE_API_KEY")) {
            self.api_key = Some(key);
        }
        if let Some(model) = get("PPTMAKER_MODEL") {
            self.model = model;
        }
        if let Some(model) = get("PPTMAKER_IMAGE_MODEL") {
            self.image_model = model;
        }
        if let Some(url) = get("PPTMAKER_BASE_URL") {
            self.base_url = Some(url);
        }
    }

    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("GOOGLE_API_KEY", "google-key"),
            ("PPTMAKER_MODEL", "gemini-2.5-pro"),
            ("PPTMAKER_IMAGE_MODEL", "  "),
        ]);
        let mut config = Config::default();
        config.apply_env_from(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.api_key.as_deref(), Some("google-key"));
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.image_model, DEFAULT_IMAGE_MODEL);
    }

    #[test]
    fn test_gemini_key_wins_over_google_key() {
        let env: HashMap<&str, &str> =
            HashMap::from([("GEMINI_API_KEY", "g1"), ("GOOGLE_API_KEY", "g2")]);
        let mut config = Config::default();
        config.apply_env_from(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.require_api_key().unwrap(), "g1");
    }

    #[test]
    fn test_missing_api_key() {
        let config = Config::default();
        assert!(matches!(config.require_api_key(), Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn test_toml_file_fills_missing_fields_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pptmaker.toml");
        std::fs::write(&path, "model = \"gemini-2.5-flash\"\nweb_search = false\n").unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert!(!config.web_search);
        assert_eq!(config.max_tool_rounds, 5);
        assert_eq!(config.image_model, DEFAULT_IMAGE_MODEL);
    }

    #[test]
    fn test_json_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"request_timeout_secs": 30, "api_key": "from-file"}"#).unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = Config::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }
}
