//! Retrieval pipeline: ingestion and question answering over the store.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::context_builder::build_prompt;
use super::embedder::Embedder;
use super::error::RagError;
use super::generator::Generator;
use super::store::VectorStore;

/// Result of [`RetrievalPipeline::answer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    /// Retrieved documents, most similar first.
    pub sources: Vec<String>,
    /// Similarity of the top source clamped to `[0, 1]`; `None` without sources.
    pub confidence: Option<f32>,
}

pub struct RetrievalPipeline {
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    store: VectorStore,
    top_k: usize,
}

impl RetrievalPipeline {
    /// Wires an embedder, a store and a generator together.
    ///
    /// The embedder and the store must agree on the vector dimension.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: VectorStore,
        generator: Arc<dyn Generator>,
        top_k: usize,
    ) -> Result<Self, RagError> {
        if embedder.dimension() != store.dimension() {
            return Err(RagError::DimensionMismatch {
                expected: store.dimension(),
                actual: embedder.dimension(),
            });
        }
        if top_k == 0 {
            return Err(RagError::invalid_input("top_k must be a positive integer."));
        }

        Ok(Self {
            embedder,
            generator,
            store,
            top_k,
        })
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn dimension(&self) -> usize {
        self.store.dimension()
    }

    pub fn embedder_name(&self) -> &str {
        self.embedder.name()
    }

    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    pub fn document_count(&self) -> usize {
        self.store.len()
    }

    /// Embeds `texts` and appends them to the store.
    ///
    /// The batch is rejected as a whole if it is empty or holds blank text.
    pub async fn ingest_documents(&self, texts: Vec<String>) -> Result<(), RagError> {
        if texts.is_empty() || texts.iter().any(|text| text.trim().is_empty()) {
            return Err(RagError::EmptyInput);
        }

        let vectors = self.embedder.embed(&texts).await?;
        if vectors.len() != texts.len() {
            return Err(RagError::Embedding(anyhow::anyhow!(
                "Embedder returned {} vectors for {} texts",
                vectors.len(),
                texts.len()
            )));
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != self.store.dimension()) {
            return Err(RagError::DimensionMismatch {
                expected: self.store.dimension(),
                actual: bad.len(),
            });
        }

        let count = texts.len();
        self.store.add(vectors, texts)?;

        tracing::info!(
            "Ingested {} documents ({} stored)",
            count,
            self.store.len()
        );
        Ok(())
    }

    /// Answers `query` from the `top_k` most similar documents.
    ///
    /// `session_id` is only logged; no conversation state is kept.
    pub async fn answer(&self, query: &str, session_id: Option<&str>) -> Result<Answer, RagError> {
        self.answer_with_limit(query, session_id, self.top_k).await
    }

    pub async fn answer_with_limit(
        &self,
        query: &str,
        session_id: Option<&str>,
        k: usize,
    ) -> Result<Answer, RagError> {
        if query.trim().is_empty() {
            return Err(RagError::EmptyQuery);
        }

        let query_vector = self
            .embedder
            .embed(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RagError::Embedding(anyhow::anyhow!("Embedder returned no vector")))?;

        let scored = self.store.search_scored(&query_vector, k)?;
        let confidence = scored.first().map(|top| top.score.clamp(0.0, 1.0));
        let sources: Vec<String> = scored.into_iter().map(|s| s.document).collect();

        tracing::debug!(
            session_id = session_id.unwrap_or("-"),
            "Retrieved {} sources (k = {})",
            sources.len(),
            k
        );

        let prompt = build_prompt(query, sources);
        let text = self.generator.generate(&prompt).await?;

        Ok(Answer {
            text,
            sources: prompt.sources,
            confidence,
        })
    }
}
