use anyhow::{bail, Context, Result};
use pptmaker_common::DataUri;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Extensions the analyzer accepts.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["pdf", "docx", "txt"];

/// MIME type for a supported document, guessed from its extension.
pub fn document_mime_type(path: &Path) -> Result<String> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        bail!(
            "Unsupported document type '{}' (expected one of: {})",
            path.display(),
            SUPPORTED_EXTENSIONS.join(", ")
        );
    }
    Ok(mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string())
}

/// Read a document from disk as a base64 data URI.
pub async fn read_document(path: &Path) -> Result<String> {
    let mime_type = document_mime_type(path)?;
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    tracing::debug!("Read {} ({mime_type}, {} bytes)", path.display(), bytes.len());
    Ok(DataUri::encode(mime_type, &bytes).to_string())
}

pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Pretty JSON to `output`, or to stdout when no path is given.
pub async fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Saved {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
