//! Recursive character splitter.

use super::Chunk;
use crate::types::Document;
use scholar_core::{AppError, AppResult, ChunkingConfig};
use unicode_segmentation::UnicodeSegmentation;

/// Window size and overlap, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl ChunkConfig {
    /// Validated configuration; requires `0 <= overlap < size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> AppResult<Self> {
        if chunk_size == 0 {
            return Err(AppError::Config(
                "chunk size must be greater than zero".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(AppError::Config(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                chunk_overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl TryFrom<&ChunkingConfig> for ChunkConfig {
    type Error = AppError;

    fn try_from(config: &ChunkingConfig) -> AppResult<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }
}

// Boundary levels, most preferred first.
const PARAGRAPH: usize = 0;
const SENTENCE: usize = 1;
const WORD: usize = 2;
const GRAPHEME: usize = 3;

/// Character-indexed view of one text with its candidate cut points.
struct TextLayout<'a> {
    text: &'a str,
    /// Byte offset of every char, plus `text.len()`
    offsets: Vec<usize>,
    /// Ascending char indices where a cut may happen, per level
    levels: [Vec<usize>; 4],
}

impl<'a> TextLayout<'a> {
    fn new(text: &'a str) -> Self {
        let mut offsets: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        offsets.push(text.len());

        let to_char = |byte: usize| offsets.binary_search(&byte).ok();
        let inner = |byte: &usize| *byte > 0 && *byte < text.len();

        let paragraphs: Vec<usize> = text
            .match_indices("\n\n")
            .map(|(b, m)| b + m.len())
            .filter(inner)
            .filter_map(to_char)
            .collect();
        let sentences: Vec<usize> = text
            .split_sentence_bound_indices()
            .map(|(b, _)| b)
            .filter(inner)
            .filter_map(to_char)
            .collect();
        let words: Vec<usize> = text
            .split_word_bound_indices()
            .map(|(b, _)| b)
            .filter(inner)
            .filter_map(to_char)
            .collect();
        let graphemes: Vec<usize> = text
            .grapheme_indices(true)
            .map(|(b, _)| b)
            .filter(inner)
            .filter_map(to_char)
            .collect();

        Self {
            text,
            offsets,
            levels: [paragraphs, sentences, words, graphemes],
        }
    }

    fn char_len(&self) -> usize {
        self.offsets.len() - 1
    }

    fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.text[self.offsets[start]..self.offsets[end]]
    }

    /// Largest boundary of `level` inside `(lo, hi]`.
    fn last_in(&self, level: usize, lo: usize, hi: usize) -> Option<usize> {
        let bounds = &self.levels[level];
        let idx = bounds.partition_point(|&b| b <= hi);
        let candidate = *bounds.get(idx.checked_sub(1)?)?;
        (candidate > lo).then_some(candidate)
    }

    /// Best cut inside `(lo, hi]`, trying each level in order of preference.
    fn best_cut(&self, lo: usize, hi: usize) -> Option<usize> {
        [PARAGRAPH, SENTENCE, WORD, GRAPHEME]
            .into_iter()
            .find_map(|level| self.last_in(level, lo, hi))
    }
}

/// Splits documents into windows of at most `chunk_size` characters where
/// neighbouring windows share at least `chunk_overlap` characters.
///
/// Windows holding only whitespace are not emitted, since they cannot be
/// embedded. Across such a run the surrounding chunks share nothing, and
/// the text between them is whitespace only.
#[derive(Debug, Clone, Default)]
pub struct RecursiveSplitter {
    config: ChunkConfig,
}

impl RecursiveSplitter {
    pub fn new(config: ChunkConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> ChunkConfig {
        self.config
    }

    /// Split every document, preserving document order.
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        documents
            .iter()
            .flat_map(|doc| self.split_document(doc))
            .collect()
    }

    /// Split one document. Blank documents produce no chunks.
    ///
    /// A window `[start, end)` ends at the best boundary in
    /// `(start + overlap, start + size]`; the next window starts at or
    /// before `end - overlap`, pulled back to a word boundary when one is
    /// available. The final window runs to the end of the text. Blank
    /// windows are dropped, so a whitespace run longer than the window
    /// breaks the overlap between the chunks on either side.
    pub fn split_document(&self, document: &Document) -> Vec<Chunk> {
        if document.text.trim().is_empty() {
            return Vec::new();
        }

        let ChunkConfig {
            chunk_size: size,
            chunk_overlap: overlap,
        } = self.config;
        let layout = TextLayout::new(&document.text);
        let len = layout.char_len();

        let mut chunks = Vec::new();
        let mut start = 0;

        loop {
            let hard_end = (start + size).min(len);
            let end = if hard_end == len {
                len
            } else {
                layout.best_cut(start + overlap, hard_end).unwrap_or(hard_end)
            };

            let piece = layout.slice(start, end);
            if !piece.trim().is_empty() {
                let position = chunks.len() as u32;
                chunks.push(Chunk::new(document, position, piece.to_string(), (start, end)));
            }

            if end == len {
                break;
            }

            let target = end - overlap;
            start = layout.last_in(WORD, start, target).unwrap_or(target);
        }

        tracing::debug!(
            "Split {} ({} chars) into {} chunks",
            document.location(),
            len,
            chunks.len()
        );

        chunks
    }
}
