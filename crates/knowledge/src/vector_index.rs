//! In-memory vector index over embedded chunks.
//!
//! An index is immutable once built. Growing it means building a new value
//! with [`VectorIndex::merge`], so holders of the old value keep a
//! consistent snapshot.

use crate::chunk::Chunk;
use crate::embeddings::EmbeddingProvider;
use crate::progress::ProgressReporter;
use scholar_core::{AppError, AppResult};
use serde::Serialize;
use std::cmp::Ordering;

/// Chunks embedded per provider call while building.
const BUILD_BATCH_SIZE: usize = 64;

/// A chunk with its embedding.
#[derive(Debug, Clone)]
pub struct IndexedChunk {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

/// A chunk returned by a similarity query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    /// Cosine similarity in `[-1, 1]`; higher is more similar
    pub score: f32,
}

#[derive(Debug, Clone)]
pub struct VectorIndex {
    entries: Vec<IndexedChunk>,
    dimensions: usize,
}

impl VectorIndex {
    /// Assemble an index from embedded chunks.
    ///
    /// Returns `Ok(None)` when there are no entries, and an error when the
    /// embeddings do not share one length.
    pub fn from_entries(entries: Vec<IndexedChunk>) -> AppResult<Option<Self>> {
        let Some(first) = entries.first() else {
            return Ok(None);
        };
        let dimensions = first.embedding.len();

        if dimensions == 0 {
            return Err(AppError::Knowledge("Embeddings must not be empty".to_string()));
        }
        if let Some(bad) = entries.iter().find(|e| e.embedding.len() != dimensions) {
            return Err(AppError::Knowledge(format!(
                "Dimension mismatch: expected {}, got {} for chunk {}",
                dimensions,
                bad.embedding.len(),
                bad.chunk.id
            )));
        }

        Ok(Some(Self {
            entries,
            dimensions,
        }))
    }

    /// Embed chunks and build a new index.
    ///
    /// No chunks means no index (`Ok(None)`), which callers treat as
    /// "nothing to search". Any embedding failure aborts the build.
    pub async fn build(
        chunks: Vec<Chunk>,
        provider: &dyn EmbeddingProvider,
        progress: &ProgressReporter,
    ) -> AppResult<Option<Self>> {
        if chunks.is_empty() {
            return Ok(None);
        }

        let total = chunks.len();
        tracing::info!(
            "Embedding {} chunks with {} ({})",
            total,
            provider.provider_name(),
            provider.model_name()
        );

        let mut entries = Vec::with_capacity(total);
        for batch in chunks.chunks(BUILD_BATCH_SIZE) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let embeddings = provider.embed_batch(&texts).await?;

            if embeddings.len() != batch.len() {
                return Err(AppError::EmbeddingService(format!(
                    "Expected {} embeddings, got {}",
                    batch.len(),
                    embeddings.len()
                )));
            }

            entries.extend(
                batch
                    .iter()
                    .cloned()
                    .zip(embeddings)
                    .map(|(chunk, embedding)| IndexedChunk { chunk, embedding }),
            );
            progress.embedded(entries.len(), total, provider.model_name());
        }

        let index = Self::from_entries(entries)?;
        if let Some(ref index) = index {
            progress.ready(index.len(), index.sources().len());
            tracing::debug!(
                "Built index with {} chunks of dimension {}",
                index.len(),
                index.dimensions
            );
        }
        Ok(index)
    }

    /// A new index holding this index's chunks followed by `other`'s.
    pub fn merge(&self, other: &VectorIndex) -> AppResult<VectorIndex> {
        if self.dimensions != other.dimensions {
            return Err(AppError::Knowledge(format!(
                "Cannot merge indices with different dimensions ({} vs {})",
                self.dimensions, other.dimensions
            )));
        }

        let mut entries = Vec::with_capacity(self.entries.len() + other.entries.len());
        entries.extend(self.entries.iter().cloned());
        entries.extend(other.entries.iter().cloned());

        Ok(VectorIndex {
            entries,
            dimensions: self.dimensions,
        })
    }

    /// Top `k` chunks by cosine similarity, highest first.
    ///
    /// Equal scores keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<ScoredChunk>> {
        if query.len() != self.dimensions {
            return Err(AppError::Knowledge(format!(
                "Query has {} dimensions, index has {}",
                query.len(),
                self.dimensions
            )));
        }

        let mut scored: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|entry| ScoredChunk {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(query, &entry.embedding),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }

    /// Embed `text` and search for it.
    pub async fn query(
        &self,
        provider: &dyn EmbeddingProvider,
        text: &str,
        k: usize,
    ) -> AppResult<Vec<ScoredChunk>> {
        let vector = provider.embed(text).await?;
        self.search(&vector, k)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Distinct source names, in first-seen order.
    pub fn sources(&self) -> Vec<String> {
        let mut sources: Vec<String> = Vec::new();
        for entry in &self.entries {
            if !sources.contains(&entry.chunk.source) {
                sources.push(entry.chunk.source.clone());
            }
        }
        sources
    }
}

/// Cosine similarity; zero for empty, zero-norm or mismatched vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
