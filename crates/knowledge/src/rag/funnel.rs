//! Three-tier retrieval funnel.
//!
//! Tiers are tried in a fixed order, uploaded documents first, then the
//! default corpus, then the web. The first tier that yields anything at or
//! above the score threshold supplies the whole context; tiers are never
//! mixed.

use crate::embeddings::EmbeddingProvider;
use crate::rag::types::{apply_threshold, LocalTier, RetrievedContext};
use crate::search::WebSearch;
use crate::vector_index::VectorIndex;
use scholar_core::{AppResult, RetrievalConfig};
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
enum Strategy {
    Local(LocalTier),
    Web,
}

/// Order in which context sources are consulted.
const STRATEGIES: [Strategy; 3] = [
    Strategy::Local(LocalTier::Uploaded),
    Strategy::Local(LocalTier::Default),
    Strategy::Web,
];

/// Picks one context source per question.
#[derive(Clone)]
pub struct RetrievalFunnel {
    embedder: Arc<dyn EmbeddingProvider>,
    web: Arc<dyn WebSearch>,
    config: RetrievalConfig,
}

impl RetrievalFunnel {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        web: Arc<dyn WebSearch>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            embedder,
            web,
            config,
        }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    /// Retrieve context for `question`.
    ///
    /// The question is embedded at most once, and only if some local index
    /// exists. Embedding and search failures are returned to the caller.
    pub async fn retrieve(
        &self,
        question: &str,
        uploaded: Option<&VectorIndex>,
        default: Option<&VectorIndex>,
    ) -> AppResult<RetrievedContext> {
        let mut query_vector: Option<Vec<f32>> = None;

        for strategy in STRATEGIES {
            let tier = match strategy {
                Strategy::Local(tier) => tier,
                Strategy::Web => return self.search_web(question).await,
            };
            let index = match tier {
                LocalTier::Uploaded => uploaded,
                LocalTier::Default => default,
            };

            let Some(index) = index else {
                tracing::debug!("No {} index, skipping tier", tier);
                continue;
            };

            let vector = match query_vector.take() {
                Some(vector) => vector,
                None => self.embedder.embed(question).await?,
            };
            let results = index.search(&vector, self.config.top_k)?;
            query_vector = Some(vector);
            tracing::debug!(
                "{} index scores: {:?}",
                tier,
                results.iter().map(|r| r.score).collect::<Vec<_>>()
            );

            let kept = apply_threshold(results, self.config.score_threshold);
            if !kept.is_empty() {
                tracing::info!(
                    "Using {} index ({} chunks, top score {:.3})",
                    tier,
                    kept.len(),
                    kept[0].score
                );
                return Ok(RetrievedContext::local(tier, kept));
            }

            tracing::info!(
                "No {} chunks at or above {:.2}, falling through",
                tier,
                self.config.score_threshold
            );
        }

        self.search_web(question).await
    }

    async fn search_web(&self, question: &str) -> AppResult<RetrievedContext> {
        let hits = self.web.search(question, self.config.web_results).await?;
        tracing::info!("Using web search ({}): {} results", self.web.name(), hits.len());
        Ok(RetrievedContext::Web { hits })
    }
}
