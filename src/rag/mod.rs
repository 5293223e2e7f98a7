//! RAG (Retrieval-Augmented Generation) module.
//!
//! This module provides:
//! - `VectorStore`: append-only in-memory store searched by cosine similarity
//! - `Embedder` / `Generator`: pluggable backends for vectors and answer text
//! - `RetrievalPipeline`: ingestion and question answering over the store
//! - `DocumentChunker`: cleaning and chunking of uploaded files

mod chunker;
mod context_builder;
mod embedder;
mod error;
mod generator;
mod pipeline;
mod store;

pub use chunker::{chunk_text, clean_text, extract_text, ChunkerConfig, DocumentChunker};
pub use context_builder::{build_context, build_prompt, Prompt};
pub use embedder::{Embedder, HashEmbedder, HttpEmbedder};
pub use error::RagError;
pub use generator::{Generator, PlaceholderGenerator};
pub use pipeline::{Answer, RetrievalPipeline};
pub use store::{ScoredDocument, VectorStore};
