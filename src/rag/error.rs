use thiserror::Error;

/// Errors raised by the retrieval core.
///
/// The core never recovers from these; they propagate to the caller, which
/// decides how to present them.
#[derive(Debug, Error)]
pub enum RagError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("No documents provided for ingestion.")]
    EmptyInput,

    #[error("Query must not be empty.")]
    EmptyQuery,

    #[error("Embedding dimension mismatch. Expected {expected}, got {actual}.")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedding failed: {0}")]
    Embedding(#[source] anyhow::Error),

    #[error("Generation failed: {0}")]
    Generation(#[source] anyhow::Error),
}

impl RagError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        RagError::InvalidInput(message.into())
    }

    pub fn embedding<E: Into<anyhow::Error>>(err: E) -> Self {
        RagError::Embedding(err.into())
    }
}
