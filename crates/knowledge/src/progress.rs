//! Progress reporting while a document set is turned into an index.
//!
//! Indexing runs in four phases: files are loaded into documents, documents
//! are split into chunks, chunks are embedded in batches, and the finished
//! index becomes ready for questions. Each phase reports through an optional
//! callback so the shell can print feedback for large corpora and uploads.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Indexing phase, in the order the phases run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexPhase {
    Load,
    Split,
    Embed,
    Ready,
}

impl IndexPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Split => "split",
            Self::Embed => "embed",
            Self::Ready => "ready",
        }
    }
}

impl fmt::Display for IndexPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of indexing progress.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent {
    pub phase: IndexPhase,

    /// Units finished so far: files, documents or chunks depending on phase
    pub done: u64,

    /// Units expected, when known up front (only while embedding)
    pub total: Option<u64>,

    pub detail: String,

    /// Seconds since the reporter was created
    pub elapsed_secs: f64,
}

impl ProgressEvent {
    /// Share of the phase finished, when the total is known.
    pub fn fraction(&self) -> Option<f64> {
        self.total
            .map(|total| if total == 0 { 1.0 } else { self.done as f64 / total as f64 })
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.total, self.fraction()) {
            (Some(total), Some(fraction)) => write!(
                f,
                "[{}] {}/{} chunks ({:.0}%) {}",
                self.phase,
                self.done,
                total,
                fraction * 100.0,
                self.detail
            ),
            _ => write!(f, "[{}] {}", self.phase, self.detail),
        }
    }
}

/// Callback receiving progress events.
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Sends indexing progress to an optional callback.
#[derive(Clone)]
pub struct ProgressReporter {
    callback: Option<ProgressCallback>,
    started: Instant,
}

impl ProgressReporter {
    pub fn new(callback: ProgressCallback) -> Self {
        Self {
            callback: Some(callback),
            started: Instant::now(),
        }
    }

    /// A reporter that drops every event.
    pub fn noop() -> Self {
        Self {
            callback: None,
            started: Instant::now(),
        }
    }

    fn emit(&self, phase: IndexPhase, done: u64, total: Option<u64>, detail: String) {
        let Some(callback) = &self.callback else {
            return;
        };

        let event = ProgressEvent {
            phase,
            done,
            total,
            detail,
            elapsed_secs: self.started.elapsed().as_secs_f64(),
        };
        tracing::debug!(phase = %event.phase, done, total = ?total, "{}", event.detail);
        callback(event);
    }

    /// Files read from `origin`, with the documents (pages) they produced.
    pub fn loaded(&self, files: usize, skipped: usize, documents: usize, origin: &str) {
        let mut detail = format!(
            "{} files from {} gave {} documents",
            files, origin, documents
        );
        if skipped > 0 {
            detail.push_str(&format!(", {} skipped", skipped));
        }
        self.emit(IndexPhase::Load, files as u64, None, detail);
    }

    pub fn split(&self, documents: usize, chunks: usize) {
        self.emit(
            IndexPhase::Split,
            documents as u64,
            None,
            format!("{} documents split into {} chunks", documents, chunks),
        );
    }

    /// One embedding batch finished.
    pub fn embedded(&self, done: usize, total: usize, model: &str) {
        self.emit(
            IndexPhase::Embed,
            done as u64,
            Some(total as u64),
            format!("embedded with {}", model),
        );
    }

    pub fn ready(&self, chunks: usize, sources: usize) {
        self.emit(
            IndexPhase::Ready,
            chunks as u64,
            None,
            format!("{} chunks from {} sources searchable", chunks, sources),
        );
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::noop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recording() -> (ProgressReporter, Arc<Mutex<Vec<ProgressEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let reporter = ProgressReporter::new(Arc::new(move |event: ProgressEvent| {
            sink.lock().unwrap().push(event);
        }));
        (reporter, events)
    }

    #[test]
    fn test_embed_event_shows_chunk_progress() {
        let (reporter, events) = recording();
        reporter.embedded(50, 200, "text-embedding-004");

        let events = events.lock().unwrap();
        assert_eq!(events[0].phase, IndexPhase::Embed);
        assert_eq!(events[0].fraction(), Some(0.25));
        assert_eq!(
            events[0].to_string(),
            "[embed] 50/200 chunks (25%) embedded with text-embedding-004"
        );
    }

    #[test]
    fn test_load_event_mentions_skipped_files() {
        let (reporter, events) = recording();
        reporter.loaded(3, 1, 7, "docs");
        reporter.loaded(2, 0, 2, "upload");

        let events = events.lock().unwrap();
        assert_eq!(events[0].to_string(), "[load] 3 files from docs gave 7 documents, 1 skipped");
        assert_eq!(events[1].detail, "2 files from upload gave 2 documents");
        assert!(events[1].elapsed_secs >= events[0].elapsed_secs);
    }

    #[test]
    fn test_phases_are_ordered() {
        assert!(IndexPhase::Load < IndexPhase::Split);
        assert!(IndexPhase::Embed < IndexPhase::Ready);
        assert_eq!(serde_json::to_value(IndexPhase::Ready).unwrap(), "ready");
    }

    #[test]
    fn test_noop_reporter() {
        ProgressReporter::noop().ready(1, 1);
    }
}
