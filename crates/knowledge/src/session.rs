//! Per-user conversation state.
//!
//! A [`Session`] owns the transcript, the persona, and the two indices. It
//! is created when a conversation starts and dropped when it ends; nothing
//! is persisted.

use crate::chunk::{ChunkConfig, RecursiveSplitter};
use crate::loader::LoaderRegistry;
use crate::progress::ProgressReporter;
use crate::rag::{ChatResponder, Reply, RetrievalFunnel, Tier};
use crate::types::SkippedFile;
use crate::upload::Upload;
use crate::vector_index::VectorIndex;
use scholar_core::AppResult;
use scholar_llm::ChatMessage;
use scholar_prompt::{build_system_prompt, Persona, PromptDefinition, ResponseMode};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Append-only record of the conversation.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

/// The default and uploaded indices of one session.
///
/// The default index is fixed at creation. The uploaded index is replaced
/// wholesale on every merge, so a query holding the previous `Arc` keeps
/// searching a consistent snapshot.
#[derive(Debug, Default)]
pub struct SessionIndices {
    default: Option<Arc<VectorIndex>>,
    uploaded: RwLock<Option<Arc<VectorIndex>>>,
}

impl SessionIndices {
    pub fn new(default: Option<VectorIndex>) -> Self {
        Self {
            default: default.map(Arc::new),
            uploaded: RwLock::new(None),
        }
    }

    pub fn default_index(&self) -> Option<Arc<VectorIndex>> {
        self.default.clone()
    }

    pub async fn uploaded_index(&self) -> Option<Arc<VectorIndex>> {
        self.uploaded.read().await.clone()
    }

    /// Merge `index` into the uploaded index, creating it if needed.
    ///
    /// Returns the number of chunks in the uploaded index afterwards.
    pub async fn merge_uploaded(&self, index: VectorIndex) -> AppResult<usize> {
        let mut uploaded = self.uploaded.write().await;
        let merged = match uploaded.as_deref() {
            Some(existing) => existing.merge(&index)?,
            None => index,
        };
        let total = merged.len();
        *uploaded = Some(Arc::new(merged));
        Ok(total)
    }
}

/// Result of one question.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub reply: Reply,

    /// Tier that supplied the context; `None` when retrieval failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,

    /// Where the context came from
    pub citations: Vec<String>,
}

impl TurnOutcome {
    pub fn is_error(&self) -> bool {
        self.reply.is_error
    }
}

/// Result of adding files to the uploaded index.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReport {
    pub files_loaded: usize,
    pub skipped: Vec<SkippedFile>,
    pub documents: usize,
    pub chunks: usize,
    /// Chunks in the uploaded index after the merge
    pub total_chunks: usize,
}

pub struct Session {
    funnel: RetrievalFunnel,
    responder: ChatResponder,
    prompt: PromptDefinition,
    persona: Persona,
    registry: LoaderRegistry,
    splitter: RecursiveSplitter,
    progress: ProgressReporter,
    indices: Arc<SessionIndices>,
    transcript: Transcript,
}

impl Session {
    pub fn new(
        funnel: RetrievalFunnel,
        responder: ChatResponder,
        prompt: PromptDefinition,
        default_index: Option<VectorIndex>,
    ) -> Self {
        Self {
            funnel,
            responder,
            prompt,
            persona: Persona::default(),
            registry: LoaderRegistry::with_defaults(),
            splitter: RecursiveSplitter::new(ChunkConfig::default()),
            progress: ProgressReporter::noop(),
            indices: Arc::new(SessionIndices::new(default_index)),
            transcript: Transcript::new(),
        }
    }

    pub fn with_persona(mut self, persona: Persona) -> Self {
        self.persona = persona;
        self
    }

    pub fn with_loaders(mut self, registry: LoaderRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_splitter(mut self, splitter: RecursiveSplitter) -> Self {
        self.splitter = splitter;
        self
    }

    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    pub fn set_persona(&mut self, persona: Persona) {
        self.persona = persona;
    }

    pub fn set_mode(&mut self, mode: ResponseMode) {
        self.persona.mode = mode;
    }

    pub fn set_interest(&mut self, interest: &str) {
        self.persona.set_interest(interest);
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn clear_history(&mut self) {
        tracing::info!("Clearing {} messages of chat history", self.transcript.len());
        self.transcript.clear();
    }

    pub fn indices(&self) -> Arc<SessionIndices> {
        self.indices.clone()
    }

    pub fn responder(&self) -> &ChatResponder {
        &self.responder
    }

    /// Answer one question.
    ///
    /// The question and the reply are both appended to the transcript.
    /// Service failures become a visible error reply; only unrecoverable
    /// errors (missing credentials, bad configuration) are returned, and
    /// those leave the transcript untouched.
    pub async fn ask(&mut self, question: &str) -> AppResult<TurnOutcome> {
        let question = question.trim();
        if question.is_empty() {
            return Err(scholar_core::AppError::Other(
                "Question must not be empty".to_string(),
            ));
        }

        let system_prompt = build_system_prompt(&self.prompt, &self.persona)?.system;

        let uploaded = self.indices.uploaded_index().await;
        let default = self.indices.default_index();
        let retrieved = self
            .funnel
            .retrieve(question, uploaded.as_deref(), default.as_deref())
            .await;

        let context = match retrieved {
            Ok(context) => context,
            Err(e) if e.is_recoverable() => {
                tracing::warn!("Retrieval failed: {}", e);
                let reply = Reply::failure(e);
                self.transcript.push(ChatMessage::user(question));
                self.transcript.push(ChatMessage::assistant(&reply.content));
                return Ok(TurnOutcome {
                    reply,
                    tier: None,
                    citations: Vec::new(),
                });
            }
            Err(e) => return Err(e),
        };

        self.transcript.push(ChatMessage::user(question));
        let reply = self
            .responder
            .respond(&system_prompt, self.transcript.messages(), question, &context)
            .await;
        self.transcript.push(ChatMessage::assistant(&reply.content));

        Ok(TurnOutcome {
            reply,
            tier: Some(context.tier()),
            citations: context.citations(),
        })
    }

    /// Add files to the uploaded index.
    ///
    /// Unsupported or unreadable files are skipped and reported. If nothing
    /// usable was uploaded the index is unchanged. An embedding failure
    /// leaves the existing index as it was.
    pub async fn upload(&self, uploads: &[Upload]) -> AppResult<UploadReport> {
        let mut report = UploadReport::default();
        let mut documents = Vec::new();

        for upload in uploads {
            let name = upload.display_name();
            match self.registry.load_upload(upload) {
                Ok(loaded) => {
                    tracing::info!("Loaded {} documents from {}", loaded.len(), name);
                    report.files_loaded += 1;
                    documents.extend(loaded);
                }
                Err(e) => {
                    tracing::warn!("Skipping upload {}: {}", name, e);
                    report.skipped.push(SkippedFile {
                        name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        report.documents = documents.len();
        self.progress
            .loaded(report.files_loaded, report.skipped.len(), documents.len(), "upload");
        let chunks = self.splitter.split_documents(&documents);
        report.chunks = chunks.len();
        self.progress.split(documents.len(), chunks.len());

        let index =
            VectorIndex::build(chunks, self.funnel.embedder().as_ref(), &self.progress).await?;
        report.total_chunks = match index {
            Some(index) => self.indices.merge_uploaded(index).await?,
            None => {
                tracing::info!("Nothing to add to the uploaded index");
                self.indices
                    .uploaded_index()
                    .await
                    .map(|index| index.len())
                    .unwrap_or(0)
            }
        };

        Ok(report)
    }
}
