//! Index command handler.
//!
//! Builds the default index once and reports what went into it.

use crate::bootstrap::{build_embedder, index_default_corpus, stderr_progress};
use clap::Args;
use scholar_core::{AppConfig, AppResult};
use scholar_knowledge::ProgressReporter;

/// Index the default document folder and report statistics
#[derive(Args, Debug)]
pub struct IndexCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IndexCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let corpus = config.corpus_path();
        tracing::info!("Executing index command for {:?}", corpus);

        let embedder = build_embedder(config)?;
        let progress = if self.json {
            ProgressReporter::noop()
        } else {
            stderr_progress()
        };

        let (index, stats) = index_default_corpus(config, embedder.as_ref(), &progress).await?;

        if self.json {
            let output = serde_json::json!({
                "corpus": corpus.display().to_string(),
                "indexed": index.is_some(),
                "stats": stats,
                "sources": index.as_ref().map(|i| i.sources()).unwrap_or_default(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else if index.is_some() {
            println!(
                "Indexed {} chunks from {} documents ({} files, {} skipped) in {:.2}s",
                stats.chunks,
                stats.documents,
                stats.files_loaded,
                stats.files_skipped,
                stats.duration_secs
            );
        } else {
            println!("No .pdf or .txt documents found in {}", corpus.display());
        }

        Ok(())
    }
}
