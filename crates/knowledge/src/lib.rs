//! Knowledge and retrieval for the Scholar tutor.
//!
//! Documents are loaded from a corpus directory or from uploads, split into
//! overlapping chunks, embedded, and kept in in-memory vector indices. Each
//! question is answered from exactly one context source: the uploaded
//! index, the default index, or a web search.

pub mod chunk;
pub mod embeddings;
pub mod indexer;
pub mod loader;
pub mod progress;
pub mod rag;
pub mod search;
pub mod session;
pub mod types;
pub mod upload;
pub mod vector_index;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use chunk::{Chunk, ChunkConfig, RecursiveSplitter};
pub use embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
pub use indexer::{index_corpus, load_and_index};
pub use loader::{DocumentLoader, LoaderRegistry, PdfLoader, TextLoader};
pub use progress::{IndexPhase, ProgressEvent, ProgressReporter};
pub use rag::{ChatResponder, Reply, RetrievalFunnel, RetrievedContext, Tier};
pub use search::{format_hits, GoogleSearchClient, SearchHit, WebSearch};
pub use session::{Session, SessionIndices, Transcript, TurnOutcome, UploadReport};
pub use types::{Document, IndexStats, LoadReport, SkippedFile};
pub use upload::Upload;
pub use vector_index::{ScoredChunk, VectorIndex};
