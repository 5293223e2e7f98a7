use thiserror::Error;

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("Failed to load configuration: {0}")]
    Config(#[source] anyhow::Error),

    #[error("Failed to initialize embedder: {0}")]
    Embedder(#[source] anyhow::Error),

    #[error("Failed to build retrieval pipeline: {0}")]
    Pipeline(#[source] anyhow::Error),
}
