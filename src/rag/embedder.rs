//! Embedding backends.
//!
//! The pipeline only sees the [`Embedder`] trait. Two adapters ship with the
//! server: a deterministic lexical [`HashEmbedder`] that needs no model, and
//! an [`HttpEmbedder`] that talks to a llama.cpp-style `/embedding` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use super::error::RagError;

/// Maps texts to fixed-dimension vectors, one per input, in input order.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Short backend name for logs and status output.
    fn name(&self) -> &str;

    /// Dimension of every vector this embedder returns.
    fn dimension(&self) -> usize;

    /// Embeds a non-empty batch of texts. An empty batch is rejected with
    /// [`RagError::EmptyInput`].
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError>;
}

/// Feature-hashing embedder over lowercase alphanumeric tokens.
///
/// Each token lands in one of `dimension` buckets chosen by its SHA-256
/// digest, with a digest-derived sign. Identical texts produce identical
/// vectors and texts sharing vocabulary point in similar directions.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dimension];
        if self.dimension == 0 {
            return vector;
        }

        for token in tokenize(text) {
            let digest = Sha256::digest(token.as_bytes());
            let mut bucket_bytes = [0u8; 8];
            bucket_bytes.copy_from_slice(&digest[..8]);
            let bucket = (u64::from_le_bytes(bucket_bytes) % self.dimension as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        vector
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn name(&self) -> &str {
        "hash"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        if texts.is_empty() {
            return Err(RagError::EmptyInput);
        }
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_lowercase())
}

/// Embedder backed by an external embedding server.
///
/// Sends `{"content": text}` per input and reads the `embedding` array from
/// the response, the request shape used by llama.cpp's server.
pub struct HttpEmbedder {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    dimension: usize,
}

impl HttpEmbedder {
    pub fn new(
        url: impl Into<String>,
        dimension: usize,
        timeout: Duration,
        api_key: Option<String>,
    ) -> Result<Self, RagError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RagError::embedding)?;

        Ok(Self {
            client,
            url: url.into(),
            api_key,
            dimension,
        })
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, RagError> {
        let mut request = self.client.post(&self.url).json(&json!({ "content": text }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let res = request.send().await.map_err(RagError::embedding)?;
        if !res.status().is_success() {
            return Err(RagError::Embedding(anyhow::anyhow!(
                "Embedding server error: {}",
                res.status()
            )));
        }

        let data: Value = res.json().await.map_err(RagError::embedding)?;
        let embedding: Vec<f32> = data
            .get("embedding")
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Invalid embedding response: missing 'embedding'"))
            .and_then(|value| {
                serde_json::from_value(value)
                    .map_err(|_| anyhow::anyhow!("Invalid embedding response"))
            })
            .map_err(RagError::Embedding)?;

        if embedding.len() != self.dimension {
            return Err(RagError::DimensionMismatch {
                expected: self.dimension,
                actual: embedding.len(),
            });
        }

        Ok(embedding)
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    fn name(&self) -> &str {
        "http"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        if texts.is_empty() {
            return Err(RagError::EmptyInput);
        }

        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed_one(text).await?);
        }
        tracing::debug!("Embedded {} texts via {}", results.len(), self.url);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::post;
    use axum::{Json, Router};
    use tokio::net::TcpListener;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
        let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        dot / (na * nb)
    }

    #[tokio::test]
    async fn hash_embedder_is_deterministic() {
        let embedder = HashEmbedder::new(64);
        let texts = vec!["The sky is blue.".to_string(), "The sky is blue.".to_string()];
        let vectors = embedder.embed(&texts).await.unwrap();
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0], vectors[1]);
        assert_eq!(vectors[0].len(), 64);
    }

    #[tokio::test]
    async fn hash_embedder_ignores_case_and_punctuation() {
        let embedder = HashEmbedder::new(32);
        let vectors = embedder
            .embed(&["Blue, SKY!".to_string(), "blue sky".to_string()])
            .await
            .unwrap();
        assert_eq!(vectors[0], vectors[1]);
    }

    #[tokio::test]
    async fn hash_embedder_prefers_shared_vocabulary() {
        let embedder = HashEmbedder::new(4096);
        let vectors = embedder
            .embed(&[
                "rust ownership and borrowing".to_string(),
                "borrowing rules in rust".to_string(),
                "banana bread recipe".to_string(),
            ])
            .await
            .unwrap();
        assert!(cosine(&vectors[0], &vectors[1]) > cosine(&vectors[0], &vectors[2]));
    }

    #[tokio::test]
    async fn hash_embedder_rejects_empty_batch() {
        let embedder = HashEmbedder::new(8);
        let err = embedder.embed(&[]).await.unwrap_err();
        assert!(matches!(err, RagError::EmptyInput));
    }

    async fn spawn_embedding_server(response: Value) -> String {
        let app = Router::new().route(
            "/embedding",
            post(move |Json(body): Json<Value>| {
                let response = response.clone();
                async move {
                    assert!(body.get("content").is_some());
                    Json(response)
                }
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/embedding", addr)
    }

    #[tokio::test]
    async fn http_embedder_reads_embedding_field() {
        let url = spawn_embedding_server(json!({ "embedding": [0.5, 0.25, 1.0] })).await;
        let embedder = HttpEmbedder::new(url, 3, Duration::from_secs(5), None).unwrap();

        let vectors = embedder
            .embed(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert_eq!(vectors, vec![vec![0.5, 0.25, 1.0], vec![0.5, 0.25, 1.0]]);
    }

    #[tokio::test]
    async fn http_embedder_checks_dimension() {
        let url = spawn_embedding_server(json!({ "embedding": [0.5, 0.25] })).await;
        let embedder = HttpEmbedder::new(url, 3, Duration::from_secs(5), None).unwrap();

        let err = embedder.embed(&["a".to_string()]).await.unwrap_err();
        assert!(matches!(
            err,
            RagError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[tokio::test]
    async fn http_embedder_rejects_malformed_body() {
        let url = spawn_embedding_server(json!({ "data": [] })).await;
        let embedder = HttpEmbedder::new(url, 3, Duration::from_secs(5), None).unwrap();

        let err = embedder.embed(&["a".to_string()]).await.unwrap_err();
        assert!(matches!(err, RagError::Embedding(_)));
    }

    #[tokio::test]
    async fn http_embedder_surfaces_unreachable_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let embedder = HttpEmbedder::new(
            format!("http://{}/embedding", addr),
            3,
            Duration::from_secs(2),
            None,
        )
        .unwrap();
        let err = embedder.embed(&["a".to_string()]).await.unwrap_err();
        assert!(matches!(err, RagError::Embedding(_)));
    }
}
