use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use kmc_core::{InferenceResult, Result};

pub const EXPORT_PREFIX: &str = "kmc_inferencia_";
pub const EXPORT_CONTENT_TYPE: &str = "application/json";

/// A named, downloadable copy of a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Writes the artifact into `dir` and returns the full path.
    pub async fn save_in(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&self.file_name);
        tokio::fs::write(&path, &self.bytes).await?;
        tracing::info!("Saved result to {}", path.display());
        Ok(path)
    }
}

pub fn export(result: &InferenceResult) -> ExportArtifact {
    export_at(result, Utc::now())
}

pub fn export_at(result: &InferenceResult, at: DateTime<Utc>) -> ExportArtifact {
    // Strings, numbers and a string-keyed map; an error here is a serde bug
    let bytes = match serde_json::to_vec_pretty(result) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!("Failed to serialize result for export: {}", e);
            Vec::new()
        }
    };
    ExportArtifact {
        file_name: format!("{}{}.json", EXPORT_PREFIX, at.timestamp_millis()),
        content_type: EXPORT_CONTENT_TYPE,
        bytes,
    }
}

/// Reads back an artifact produced by `export`.
pub fn import(bytes: &[u8]) -> Result<InferenceResult> {
    Ok(serde_json::from_slice(bytes)?)
}
