//! Retrieval result types.

use crate::search::{format_hits, SearchHit};
use crate::vector_index::ScoredChunk;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the ordered context sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Documents the user uploaded this session
    Uploaded,
    /// The corpus indexed at startup
    Default,
    /// Live web search
    Web,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uploaded => "uploaded",
            Self::Default => "default",
            Self::Web => "web",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The tiers backed by a vector index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalTier {
    Uploaded,
    Default,
}

impl From<LocalTier> for Tier {
    fn from(tier: LocalTier) -> Self {
        match tier {
            LocalTier::Uploaded => Tier::Uploaded,
            LocalTier::Default => Tier::Default,
        }
    }
}

impl fmt::Display for LocalTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Tier::from(*self).as_str())
    }
}

/// The context chosen for one question.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tier", rename_all = "lowercase")]
pub enum RetrievedContext {
    Uploaded { chunks: Vec<ScoredChunk> },
    Default { chunks: Vec<ScoredChunk> },
    Web { hits: Vec<SearchHit> },
}

impl RetrievedContext {
    pub fn local(tier: LocalTier, chunks: Vec<ScoredChunk>) -> Self {
        match tier {
            LocalTier::Uploaded => Self::Uploaded { chunks },
            LocalTier::Default => Self::Default { chunks },
        }
    }

    pub fn tier(&self) -> Tier {
        match self {
            Self::Uploaded { .. } => Tier::Uploaded,
            Self::Default { .. } => Tier::Default,
            Self::Web { .. } => Tier::Web,
        }
    }

    /// Label introducing the context in the prompt.
    pub fn heading(&self) -> &'static str {
        match self {
            Self::Web { .. } => "Web Search Results",
            _ => "Context",
        }
    }

    /// Context text: chunk texts one per line, or formatted web hits.
    pub fn render(&self) -> String {
        match self {
            Self::Uploaded { chunks } | Self::Default { chunks } => chunks
                .iter()
                .map(|c| c.chunk.text.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            Self::Web { hits } => format_hits(hits),
        }
    }

    /// Where the context came from, for display.
    pub fn citations(&self) -> Vec<String> {
        match self {
            Self::Uploaded { chunks } | Self::Default { chunks } => {
                let mut seen: Vec<String> = Vec::new();
                for chunk in chunks {
                    let location = chunk.chunk.location();
                    if !seen.contains(&location) {
                        seen.push(location);
                    }
                }
                seen
            }
            Self::Web { hits } => hits.iter().map(|h| h.link.clone()).collect(),
        }
    }
}

/// Keep results scoring at least `threshold`, preserving their order.
pub fn apply_threshold(results: Vec<ScoredChunk>, threshold: f32) -> Vec<ScoredChunk> {
    results
        .into_iter()
        .filter(|result| result.score >= threshold)
        .collect()
}
