//! Document loaders dispatched by file extension.
//!
//! A [`LoaderRegistry`] maps lowercase extensions onto [`DocumentLoader`]
//! implementations. Loading a directory is best-effort: a file that cannot
//! be read or has no loader is logged and skipped.

use crate::types::{Document, LoadReport, SkippedFile};
use crate::upload::Upload;
use scholar_core::{AppError, AppResult};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use walkdir::WalkDir;

/// Turns one file into zero or more documents.
pub trait DocumentLoader: Send + Sync {
    /// Loader name for logging
    fn name(&self) -> &str;

    /// Lowercase extensions (without the dot) this loader accepts
    fn extensions(&self) -> &[&'static str];

    /// Load `path`, tagging every document with `source`.
    fn load(&self, path: &Path, source: &str) -> AppResult<Vec<Document>>;
}

/// Plain text, one document per file.
#[derive(Debug, Default)]
pub struct TextLoader;

impl DocumentLoader for TextLoader {
    fn name(&self) -> &str {
        "text"
    }

    fn extensions(&self) -> &[&'static str] {
        &["txt"]
    }

    fn load(&self, path: &Path, source: &str) -> AppResult<Vec<Document>> {
        let bytes = std::fs::read(path).map_err(|e| AppError::DocumentParse {
            name: source.to_string(),
            reason: e.to_string(),
        })?;

        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!("{} is not valid UTF-8, decoding lossily", source);
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };

        if text.trim().is_empty() {
            tracing::debug!("{} contains no text", source);
            return Ok(Vec::new());
        }

        Ok(vec![Document::new(text, source)])
    }
}

/// PDF, one document per page with text.
#[derive(Debug, Default)]
pub struct PdfLoader;

impl DocumentLoader for PdfLoader {
    fn name(&self) -> &str {
        "pdf"
    }

    fn extensions(&self) -> &[&'static str] {
        &["pdf"]
    }

    fn load(&self, path: &Path, source: &str) -> AppResult<Vec<Document>> {
        let pdf = lopdf::Document::load(path).map_err(|e| AppError::DocumentParse {
            name: source.to_string(),
            reason: e.to_string(),
        })?;

        let mut documents = Vec::new();
        for page_number in pdf.get_pages().keys().copied() {
            match pdf.extract_text(&[page_number]) {
                Ok(text) if !text.trim().is_empty() => {
                    documents.push(Document::new(text, source).with_page(page_number));
                }
                Ok(_) => tracing::debug!("{} page {} has no text", source, page_number),
                Err(e) => tracing::warn!(
                    "Skipping page {} of {}: {}",
                    page_number,
                    source,
                    e
                ),
            }
        }

        tracing::debug!("Extracted {} pages from {}", documents.len(), source);
        Ok(documents)
    }
}

/// Extension to loader lookup.
#[derive(Clone, Default)]
pub struct LoaderRegistry {
    loaders: HashMap<String, Arc<dyn DocumentLoader>>,
}

impl LoaderRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the text and PDF loaders.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(TextLoader));
        registry.register(Arc::new(PdfLoader));
        registry
    }

    /// Register a loader for each of its extensions, replacing earlier ones.
    pub fn register(&mut self, loader: Arc<dyn DocumentLoader>) {
        for ext in loader.extensions() {
            self.loaders.insert(ext.to_lowercase(), Arc::clone(&loader));
        }
    }

    /// Supported extensions, sorted.
    pub fn extensions(&self) -> Vec<String> {
        let mut exts: Vec<String> = self.loaders.keys().cloned().collect();
        exts.sort();
        exts
    }

    fn loader_for(&self, name: &str) -> Option<&Arc<dyn DocumentLoader>> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())?
            .to_lowercase();
        self.loaders.get(&ext)
    }

    /// Whether a file name has a registered loader.
    pub fn supports(&self, name: &str) -> bool {
        self.loader_for(name).is_some()
    }

    /// Load one file, naming documents after the file.
    pub fn load_path(&self, path: &Path) -> AppResult<Vec<Document>> {
        let name = display_name(path);
        self.load_as(path, &name)
    }

    /// Load one file, dispatching and naming by `source` instead of `path`.
    pub fn load_as(&self, path: &Path, source: &str) -> AppResult<Vec<Document>> {
        let loader = self
            .loader_for(source)
            .ok_or_else(|| AppError::UnsupportedFileType {
                name: source.to_string(),
            })?;

        tracing::debug!("Loading {} with {} loader", source, loader.name());
        loader.load(path, source)
    }

    /// Load an in-memory upload.
    ///
    /// The bytes are staged in a temporary file carrying the original
    /// extension so they take the same path as corpus files. The file is
    /// removed when loading finishes.
    pub fn load_upload(&self, upload: &Upload) -> AppResult<Vec<Document>> {
        let name = upload.display_name();
        if !self.supports(&name) {
            return Err(AppError::UnsupportedFileType { name });
        }

        let suffix = upload
            .extension()
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();

        let mut staged = tempfile::Builder::new()
            .prefix("scholar-upload-")
            .suffix(&suffix)
            .tempfile()?;
        staged.write_all(&upload.bytes)?;
        staged.flush()?;

        tracing::debug!("Staged upload {} at {:?}", name, staged.path());
        self.load_as(staged.path(), &name)
    }

    /// Load the top-level files of a directory, in file-name order.
    ///
    /// Unsupported and unreadable files, including entries the directory
    /// walk cannot stat, are skipped with a warning. Symlinks are followed.
    /// A missing directory yields an empty report.
    pub fn load_dir(&self, dir: &Path) -> AppResult<LoadReport> {
        let mut report = LoadReport::default();

        if !dir.is_dir() {
            tracing::warn!("Corpus directory {:?} does not exist", dir);
            return Ok(report);
        }

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let name = e
                        .path()
                        .map(display_name)
                        .unwrap_or_else(|| dir.display().to_string());
                    tracing::warn!("Skipping {}: {}", name, e);
                    report.skipped.push(SkippedFile {
                        name,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let name = display_name(path);

            match self.load_as(path, &name) {
                Ok(documents) => {
                    report.files_loaded += 1;
                    report.documents.extend(documents);
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", name, e);
                    report.skipped.push(SkippedFile {
                        name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "Loaded {} documents from {} files in {:?} ({} skipped)",
            report.documents.len(),
            report.files_loaded,
            dir,
            report.skipped.len()
        );

        Ok(report)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_text_loader_reads_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("notes.txt");
        fs::write(&path, "Photosynthesis converts light into energy.").unwrap();

        let docs = LoaderRegistry::with_defaults().load_path(&path).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].source, "notes.txt");
        assert_eq!(docs[0].page, None);
        assert!(docs[0].text.starts_with("Photosynthesis"));
    }

    #[test]
    fn test_text_loader_lossy_fallback() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("latin1.txt");
        fs::write(&path, [b'c', b'a', b'f', 0xE9, b'!']).unwrap();

        let docs = TextLoader.load(&path, "latin1.txt").unwrap();
        assert_eq!(docs[0].text, "caf\u{FFFD}!");
    }

    #[test]
    fn test_extension_match_is_case_insensitive() {
        let registry = LoaderRegistry::with_defaults();
        assert!(registry.supports("NOTES.TXT"));
        assert!(registry.supports("Paper.Pdf"));
        assert!(!registry.supports("slides.pptx"));
        assert!(!registry.supports("README"));
    }

    #[test]
    fn test_unsupported_file_type_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.csv");
        fs::write(&path, "a,b").unwrap();

        let err = LoaderRegistry::with_defaults().load_path(&path).unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFileType { .. }));
    }

    #[test]
    fn test_broken_pdf_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.pdf");
        fs::write(&path, "this is not a pdf").unwrap();

        let err = LoaderRegistry::with_defaults().load_path(&path).unwrap_err();
        assert!(matches!(err, AppError::DocumentParse { .. }));
    }

    /// Writes a PDF whose pages hold the given text; `None` is a blank page.
    fn write_pdf(path: &Path, pages: &[Option<&str>]) {
        use lopdf::content::{Content, Operation};
        use lopdf::{dictionary, Object, Stream};

        let mut pdf = lopdf::Document::with_version("1.5");
        let pages_id = pdf.new_object_id();
        let font_id = pdf.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = pdf.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let operations = match text {
                Some(text) => vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
                None => Vec::new(),
            };
            let content = Content { operations };
            let content_id =
                pdf.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = pdf.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        pdf.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = pdf.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        pdf.trailer.set("Root", catalog_id);
        pdf.save(path).unwrap();
    }

    #[test]
    fn test_pdf_loader_one_document_per_page() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("biology.pdf");
        write_pdf(
            &path,
            &[Some("Cells divide by mitosis"), None, Some("DNA stores genes")],
        );

        let docs = LoaderRegistry::with_defaults().load_path(&path).unwrap();

        let pages: Vec<Option<u32>> = docs.iter().map(|d| d.page).collect();
        assert_eq!(pages, vec![Some(1), Some(3)]);
        assert!(docs.iter().all(|d| d.source == "biology.pdf"));
        assert!(docs[0].text.contains("Cells divide by mitosis"));
        assert!(docs[1].text.contains("DNA stores genes"));
        assert!(!docs[0].text.contains("DNA"));
    }

    #[test]
    fn test_pdf_upload_keeps_page_numbers() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("staged.pdf");
        write_pdf(&path, &[Some("Only page")]);

        let upload = Upload::new("lecture.pdf", fs::read(&path).unwrap());
        let docs = LoaderRegistry::with_defaults().load_upload(&upload).unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].source, "lecture.pdf");
        assert_eq!(docs[0].page, Some(1));
        assert_eq!(docs[0].location(), "lecture.pdf (page 1)");
    }

    #[cfg(unix)]
    #[test]
    fn test_load_dir_reports_unreadable_entries() {
        use std::os::unix::fs::symlink;

        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.txt"), "Readable").unwrap();
        symlink(temp.path().join("gone.txt"), temp.path().join("dangling.txt")).unwrap();

        let report = LoaderRegistry::with_defaults().load_dir(temp.path()).unwrap();

        assert_eq!(report.files_loaded, 1);
        assert_eq!(report.documents[0].source, "a.txt");
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].name, "dangling.txt");
    }

    #[test]
    fn test_load_dir_skips_bad_files_and_sorts() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("b.txt"), "Second file").unwrap();
        fs::write(temp.path().join("a.txt"), "First file").unwrap();
        fs::write(temp.path().join("c.docx"), "unsupported").unwrap();
        fs::write(temp.path().join("d.pdf"), "corrupt").unwrap();
        fs::create_dir(temp.path().join("nested")).unwrap();
        fs::write(temp.path().join("nested").join("e.txt"), "ignored").unwrap();

        let report = LoaderRegistry::with_defaults().load_dir(temp.path()).unwrap();

        let sources: Vec<&str> = report.documents.iter().map(|d| d.source.as_str()).collect();
        assert_eq!(sources, vec!["a.txt", "b.txt"]);
        assert_eq!(report.files_loaded, 2);
        assert_eq!(report.skipped.len(), 2);
    }

    #[test]
    fn test_load_missing_dir_is_empty() {
        let temp = TempDir::new().unwrap();
        let report = LoaderRegistry::with_defaults()
            .load_dir(&temp.path().join("missing"))
            .unwrap();
        assert!(report.documents.is_empty());
    }

    #[test]
    fn test_load_upload_uses_display_name() {
        let upload = Upload::new("lecture.TXT", b"Mitochondria are the powerhouse.".to_vec());

        let docs = LoaderRegistry::with_defaults().load_upload(&upload).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].source, "lecture.TXT");
    }

    #[test]
    fn test_load_upload_rejects_unknown_extension() {
        let upload = Upload::new("image.png", vec![0, 1, 2]);
        let err = LoaderRegistry::with_defaults().load_upload(&upload).unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFileType { .. }));
    }
}
