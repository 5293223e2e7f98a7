//! In-memory vector store for the retrieval pipeline.
//!
//! Entries are `(unit vector, document)` pairs kept in insertion order.
//! Search is a brute-force inner-product scan; since every stored vector and
//! every query is normalized first, the score is the cosine similarity.

use std::sync::{PoisonError, RwLock};

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::error::RagError;
use crate::vector_math::{inner_product, normalize_l2, rank_descending};

/// A document returned by a similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub document: String,
    /// Cosine similarity to the query (higher = better).
    pub score: f32,
}

#[derive(Debug)]
struct StoreEntry {
    vector: Array1<f32>,
    document: String,
}

/// Append-only store of embedded documents with a fixed dimension.
#[derive(Debug)]
pub struct VectorStore {
    dimension: usize,
    entries: RwLock<Vec<StoreEntry>>,
}

impl VectorStore {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends `documents` with their embedding `vectors`.
    ///
    /// The whole batch is validated and normalized before the write lock is
    /// taken, so a rejected call leaves the store untouched and readers never
    /// see half of a batch. Adding the same batch twice stores it twice.
    pub fn add(&self, vectors: Vec<Vec<f32>>, documents: Vec<String>) -> Result<(), RagError> {
        if vectors.len() != documents.len() {
            return Err(RagError::invalid_input(format!(
                "Number of embeddings must match number of documents. Got {} embeddings and {} documents.",
                vectors.len(),
                documents.len()
            )));
        }

        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dimension) {
            return Err(RagError::invalid_input(format!(
                "Embeddings must have dimension {}. Got {}.",
                self.dimension,
                bad.len()
            )));
        }

        let prepared: Vec<StoreEntry> = vectors
            .into_iter()
            .zip(documents)
            .map(|(vector, document)| {
                let mut vector = Array1::from(vector);
                normalize_l2(&mut vector);
                StoreEntry { vector, document }
            })
            .collect();

        let added = prepared.len();
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        entries.extend(prepared);
        tracing::debug!("Vector store: added {} entries ({} total)", added, entries.len());

        Ok(())
    }

    /// Returns up to `k` documents ordered from most to least similar.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<String>, RagError> {
        Ok(self
            .search_scored(query, k)?
            .into_iter()
            .map(|scored| scored.document)
            .collect())
    }

    /// Like [`VectorStore::search`], keeping the similarity scores.
    ///
    /// An empty store yields no results for any query. Ties keep insertion
    /// order.
    pub fn search_scored(&self, query: &[f32], k: usize) -> Result<Vec<ScoredDocument>, RagError> {
        if k == 0 {
            return Err(RagError::invalid_input("k must be a positive integer."));
        }

        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        if query.len() != self.dimension {
            return Err(RagError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut query = Array1::from(query.to_vec());
        normalize_l2(&mut query);

        let mut scores: Vec<(usize, f32)> = entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| (idx, inner_product(query.view(), entry.vector.view())))
            .collect();
        rank_descending(&mut scores);
        scores.truncate(k);

        Ok(scores
            .into_iter()
            .map(|(idx, score)| ScoredDocument {
                document: entries[idx].document.clone(),
                score,
            })
            .collect())
    }
}
