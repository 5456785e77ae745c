//! Knowledge system type definitions.

use serde::{Deserialize, Serialize};

/// Raw text loaded from one file (or one page of a PDF).
///
/// Immutable once loaded; chunks copy the source metadata they need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Extracted text
    pub text: String,

    /// Display name of the originating file
    pub source: String,

    /// 1-based page number for paginated formats
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl Document {
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
            page: None,
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Human-readable origin, e.g. `notes.pdf (page 3)`.
    pub fn location(&self) -> String {
        match self.page {
            Some(page) => format!("{} (page {})", self.source, page),
            None => self.source.clone(),
        }
    }
}

/// A file the loader could not use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedFile {
    pub name: String,
    pub reason: String,
}

/// Everything read from a corpus directory.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub documents: Vec<Document>,
    pub files_loaded: usize,
    pub skipped: Vec<SkippedFile>,
}

/// Statistics from building an index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    pub files_loaded: usize,
    pub files_skipped: usize,
    pub documents: usize,
    pub chunks: usize,
    pub duration_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_location() {
        let doc = Document::new("text", "notes.pdf").with_page(3);
        assert_eq!(doc.location(), "notes.pdf (page 3)");
        assert_eq!(Document::new("text", "a.txt").location(), "a.txt");
    }

    #[test]
    fn test_index_stats_serialization() {
        let stats = IndexStats {
            files_loaded: 2,
            chunks: 7,
            ..Default::default()
        };

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["filesLoaded"], 2);
        assert_eq!(json["chunks"], 7);
    }
}
