//! Text preparation for uploaded documents.
//!
//! Uploaded files are decoded, cleaned and split into overlapping word
//! windows before they reach the pipeline.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::error::RagError;

/// Configuration for document chunking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkerConfig {
    /// Words per chunk
    pub chunk_size: usize,
    /// Words shared by consecutive chunks
    pub chunk_overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 300,
            chunk_overlap: 50,
        }
    }
}

/// Splits uploaded documents into ingestible chunks.
#[derive(Debug, Clone)]
pub struct DocumentChunker {
    config: ChunkerConfig,
}

impl DocumentChunker {
    pub fn new(config: ChunkerConfig) -> Result<Self, RagError> {
        check_window(config.chunk_size, config.chunk_overlap)?;
        Ok(Self { config })
    }

    /// Cleans and chunks plain text.
    pub fn collect_from_text(&self, text: &str) -> Vec<String> {
        let cleaned = clean_text(text);
        split_words(&cleaned, self.config.chunk_size, self.config.chunk_overlap)
    }

    /// Decodes an uploaded file and chunks its text.
    ///
    /// Files that are not UTF-8 text yield no chunks.
    pub fn collect_from_bytes(&self, filename: &str, contents: &[u8]) -> Vec<String> {
        match extract_text(contents) {
            Some(text) => self.collect_from_text(&text),
            None => {
                tracing::warn!("Could not decode file as UTF-8: {}", filename);
                Vec::new()
            }
        }
    }
}

/// Returns the file contents as text when they are valid UTF-8.
pub fn extract_text(contents: &[u8]) -> Option<String> {
    std::str::from_utf8(contents).ok().map(str::to_string)
}

/// Collapses whitespace and strips characters outside printable ASCII.
pub fn clean_text(text: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    static NON_PRINTABLE: OnceLock<Regex> = OnceLock::new();

    if text.is_empty() {
        return String::new();
    }

    let whitespace = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"));
    let non_printable =
        NON_PRINTABLE.get_or_init(|| Regex::new(r"[^\x20-\x7E\n]").expect("valid regex"));

    let collapsed = whitespace.replace_all(text.trim(), " ");
    non_printable.replace_all(&collapsed, "").into_owned()
}

/// Splits `text` into windows of `chunk_size` words, each starting
/// `chunk_size - overlap` words after the previous one.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>, RagError> {
    if text.is_empty() {
        return Ok(Vec::new());
    }
    check_window(chunk_size, overlap)?;
    Ok(split_words(text, chunk_size, overlap))
}

fn check_window(chunk_size: usize, overlap: usize) -> Result<(), RagError> {
    if overlap >= chunk_size {
        return Err(RagError::invalid_input(
            "overlap must be smaller than chunk_size",
        ));
    }
    Ok(())
}

fn split_words(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let step = chunk_size - overlap;

    (0..words.len())
        .step_by(step)
        .map(|start| {
            let end = (start + chunk_size).min(words.len());
            words[start..end].join(" ")
        })
        .filter(|chunk| !chunk.is_empty())
        .collect()
}
