//! Typed view of the merged YAML configuration.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::defaults::*;
use crate::core::errors::ApiError;
use crate::rag::ChunkerConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub rag: RagSettings,
    pub embedder: EmbedderSettings,
    pub upload: UploadSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub request_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cors_allowed_origins: default_cors_origins(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    /// Vector dimension shared by the embedder and the store.
    pub embedding_dim: usize,
    /// Sources retrieved per question when the request does not say.
    pub top_k: usize,
    /// Upper bound for a request's `max_sources`.
    pub max_sources: usize,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            top_k: DEFAULT_TOP_K,
            max_sources: DEFAULT_MAX_SOURCES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedderSettings {
    /// `hash` or `http`
    pub provider: String,
    pub url: String,
    pub timeout_secs: u64,
    /// Informational model name reported by `/api/config`.
    pub model: Option<String>,
    pub api_key: Option<String>,
}

impl Default for EmbedderSettings {
    fn default() -> Self {
        Self {
            provider: DEFAULT_EMBEDDER_PROVIDER.to_string(),
            url: DEFAULT_EMBEDDER_URL.to_string(),
            timeout_secs: DEFAULT_EMBEDDER_TIMEOUT_SECS,
            model: None,
            api_key: None,
        }
    }
}

impl EmbedderSettings {
    pub fn model_label(&self) -> String {
        match &self.model {
            Some(model) => model.clone(),
            None if self.provider == "hash" => "sha256-feature-hashing".to_string(),
            None => self.url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    pub max_file_size: u64,
    pub max_request_size: u64,
    pub allowed_extensions: Vec<String>,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_request_size: DEFAULT_MAX_REQUEST_SIZE,
            allowed_extensions: default_allowed_extensions(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl UploadSettings {
    pub fn chunker_config(&self) -> ChunkerConfig {
        ChunkerConfig {
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
        }
    }

    /// Case-insensitive check of `filename` against the allowed extensions.
    pub fn is_allowed(&self, filename: &str) -> bool {
        let lower = filename.to_lowercase();
        self.allowed_extensions
            .iter()
            .any(|ext| lower.ends_with(&ext.to_lowercase()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Settings {
    /// Deserializes an already validated config tree. Sections and keys left
    /// empty in YAML (`server:` with nothing below) fall back to defaults.
    pub fn from_value(config: &Value) -> Result<Self, ApiError> {
        let mut config = config.clone();
        if let Some(root) = config.as_object_mut() {
            root.retain(|_, section| !section.is_null());
            for section in root.values_mut() {
                if let Some(fields) = section.as_object_mut() {
                    fields.retain(|_, value| !value.is_null());
                }
            }
        }
        serde_json::from_value(config)
            .map_err(|err| ApiError::BadRequest(format!("Invalid config: {}", err)))
    }
}
