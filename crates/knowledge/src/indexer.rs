//! Building an index from a corpus directory.

use crate::chunk::RecursiveSplitter;
use crate::embeddings::EmbeddingProvider;
use crate::loader::LoaderRegistry;
use crate::progress::ProgressReporter;
use crate::types::IndexStats;
use crate::vector_index::VectorIndex;
use scholar_core::AppResult;
use std::path::Path;
use std::time::Instant;

/// Load, chunk and embed the top-level files of `dir`.
///
/// Files that cannot be loaded are skipped. When nothing loadable remains
/// the index is `None` and the embedder is never called. An embedding
/// failure aborts the build.
pub async fn index_corpus(
    dir: &Path,
    registry: &LoaderRegistry,
    splitter: &RecursiveSplitter,
    embedder: &dyn EmbeddingProvider,
    progress: &ProgressReporter,
) -> AppResult<(Option<VectorIndex>, IndexStats)> {
    let start = Instant::now();
    tracing::info!("Indexing corpus {:?}", dir);

    let report = registry.load_dir(dir)?;
    progress.loaded(
        report.files_loaded,
        report.skipped.len(),
        report.documents.len(),
        &dir.display().to_string(),
    );

    let chunks = splitter.split_documents(&report.documents);
    progress.split(report.documents.len(), chunks.len());

    let mut stats = IndexStats {
        files_loaded: report.files_loaded,
        files_skipped: report.skipped.len(),
        documents: report.documents.len(),
        chunks: chunks.len(),
        duration_secs: 0.0,
    };

    let index = VectorIndex::build(chunks, embedder, progress).await?;
    stats.duration_secs = start.elapsed().as_secs_f64();

    match index {
        Some(ref index) => tracing::info!(
            "Indexed {} chunks from {} documents in {:.2}s",
            index.len(),
            stats.documents,
            stats.duration_secs
        ),
        None => tracing::info!("Nothing to index in {:?}", dir),
    }

    Ok((index, stats))
}

/// [`index_corpus`] without statistics or progress.
pub async fn load_and_index(
    dir: &Path,
    registry: &LoaderRegistry,
    splitter: &RecursiveSplitter,
    embedder: &dyn EmbeddingProvider,
) -> AppResult<Option<VectorIndex>> {
    let (index, _) = index_corpus(
        dir,
        registry,
        splitter,
        embedder,
        &ProgressReporter::noop(),
    )
    .await?;
    Ok(index)
}
