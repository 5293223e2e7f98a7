use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::core::config::{AppPaths, ConfigService, EmbedderSettings, Settings};
use crate::rag::{
    DocumentChunker, Embedder, HashEmbedder, HttpEmbedder, PlaceholderGenerator,
    RetrievalPipeline, VectorStore,
};

pub mod error;

use error::InitializationError;

/// Application state shared across all routes.
///
/// Everything is built once at start-up and handed to handlers through axum
/// state; there is no global singleton.
#[derive(Clone)]
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub settings: Arc<Settings>,
    pub pipeline: Arc<RetrievalPipeline>,
    pub chunker: DocumentChunker,
    pub started_at: DateTime<Utc>,
}

/// Creates the data directories and loads the validated configuration.
///
/// Runs before logging is installed so the configured level can be applied.
pub fn load_settings(paths: Arc<AppPaths>) -> Result<Settings, InitializationError> {
    paths
        .ensure_dirs()
        .map_err(|e| InitializationError::Config(e.into()))?;
    ConfigService::new(paths)
        .load_settings()
        .map_err(|e| InitializationError::Config(e.into()))
}

impl AppState {
    /// Builds the configured embedder and wires it, a fresh store and the
    /// placeholder generator into the retrieval pipeline.
    pub fn from_settings(
        paths: Arc<AppPaths>,
        settings: Settings,
    ) -> Result<Arc<Self>, InitializationError> {
        let embedder = build_embedder(&settings.embedder, settings.rag.embedding_dim)?;
        let pipeline = RetrievalPipeline::new(
            embedder,
            VectorStore::new(settings.rag.embedding_dim),
            Arc::new(PlaceholderGenerator),
            settings.rag.top_k,
        )
        .map_err(|e| InitializationError::Pipeline(e.into()))?;

        Self::with_pipeline(paths, settings, pipeline)
    }

    /// Assembles state around an existing pipeline.
    pub fn with_pipeline(
        paths: Arc<AppPaths>,
        settings: Settings,
        pipeline: RetrievalPipeline,
    ) -> Result<Arc<Self>, InitializationError> {
        let chunker = DocumentChunker::new(settings.upload.chunker_config())
            .map_err(|e| InitializationError::Config(e.into()))?;

        Ok(Arc::new(AppState {
            paths,
            settings: Arc::new(settings),
            pipeline: Arc::new(pipeline),
            chunker,
            started_at: Utc::now(),
        }))
    }
}

fn build_embedder(
    settings: &EmbedderSettings,
    dimension: usize,
) -> Result<Arc<dyn Embedder>, InitializationError> {
    match settings.provider.as_str() {
        "hash" => Ok(Arc::new(HashEmbedder::new(dimension))),
        "http" => {
            let embedder = HttpEmbedder::new(
                settings.url.clone(),
                dimension,
                Duration::from_secs(settings.timeout_secs),
                settings.api_key.clone(),
            )
            .map_err(|e| InitializationError::Embedder(e.into()))?;
            Ok(Arc::new(embedder))
        }
        other => Err(InitializationError::Embedder(anyhow::anyhow!(
            "Unknown embedder provider: {}",
            other
        ))),
    }
}
