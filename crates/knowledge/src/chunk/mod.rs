//! Chunking of loaded documents into overlapping windows.
//!
//! Windows prefer to end on a paragraph break, then a sentence boundary,
//! then a word boundary, then a grapheme boundary, falling back to a hard
//! character cut. Lengths are counted in characters.

mod metadata;
mod splitter;

pub use splitter::{ChunkConfig, RecursiveSplitter};

use crate::types::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A window of a document's text, the unit of embedding and retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique identifier (UUID v4)
    pub id: String,

    /// Source file name inherited from the document
    pub source: String,

    /// Page inherited from the document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Chunk position in its document (0-indexed)
    pub position: u32,

    /// Chunk text content
    pub text: String,

    pub metadata: ChunkMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Character range in the document text, end exclusive
    pub char_range: (usize, usize),

    /// Character count
    pub char_count: usize,

    /// SHA-256 hash of chunk text
    pub hash: String,

    /// Timestamp when chunk was created
    pub created_at: DateTime<Utc>,
}

impl Chunk {
    /// Create a chunk with generated ID and timestamp.
    pub fn new(
        document: &Document,
        position: u32,
        text: String,
        char_range: (usize, usize),
    ) -> Self {
        let char_count = text.chars().count();
        let hash = metadata::calculate_hash(&text);

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            source: document.source.clone(),
            page: document.page,
            position,
            text,
            metadata: ChunkMetadata {
                char_range,
                char_count,
                hash,
                created_at: Utc::now(),
            },
        }
    }

    /// Human-readable origin, e.g. `notes.pdf (page 3)`.
    pub fn location(&self) -> String {
        match self.page {
            Some(page) => format!("{} (page {})", self.source, page),
            None => self.source.clone(),
        }
    }
}
