//! Session assembly from configuration.
//!
//! Every command builds its services here so `chat` and `ask` answer the
//! same way.

use scholar_core::{AppConfig, AppError, AppResult};
use scholar_knowledge::{
    create_provider, index_corpus, ChatResponder, ChunkConfig, EmbeddingConfig,
    EmbeddingProvider, GoogleSearchClient, IndexStats, LoaderRegistry, ProgressEvent,
    ProgressReporter, RecursiveSplitter, RetrievalFunnel, Session, Upload, UploadReport,
    VectorIndex,
};
use scholar_llm::create_client;
use scholar_prompt::{load_prompt_or_default, Persona, ResponseMode, DEFAULT_PROMPT_ID};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_CHAT_TIMEOUT_SECS: u64 = 60;

/// Persona from optional `--mode` / `--interest` flags.
pub fn persona_from_flags(mode: Option<&str>, interest: Option<&str>) -> AppResult<Persona> {
    let mode = match mode {
        Some(mode) => ResponseMode::parse(mode)?,
        None => ResponseMode::default(),
    };
    Ok(Persona::new(mode, interest.unwrap_or_default()))
}

pub fn build_embedder(config: &AppConfig) -> AppResult<Arc<dyn EmbeddingProvider>> {
    let embedding_config = EmbeddingConfig::from_app_config(config);
    tracing::debug!(
        "Embedding provider: {} ({})",
        embedding_config.provider,
        embedding_config.model
    );
    create_provider(&embedding_config)
}

pub fn build_splitter(config: &AppConfig) -> AppResult<RecursiveSplitter> {
    Ok(RecursiveSplitter::new(ChunkConfig::try_from(&config.chunking)?))
}

/// Reporter that prints indexing progress to stderr.
pub fn stderr_progress() -> ProgressReporter {
    ProgressReporter::new(Arc::new(|event: ProgressEvent| {
        eprintln!("{}", event);
    }))
}

/// Build the index over the configured corpus.
pub async fn index_default_corpus(
    config: &AppConfig,
    embedder: &dyn EmbeddingProvider,
    progress: &ProgressReporter,
) -> AppResult<(Option<VectorIndex>, IndexStats)> {
    let splitter = build_splitter(config)?;
    index_corpus(
        &config.corpus_path(),
        &LoaderRegistry::with_defaults(),
        &splitter,
        embedder,
        progress,
    )
    .await
}

/// Create a session with the default index already built.
///
/// A corpus that cannot be indexed is reported and the session starts
/// without a default index. Missing credentials and configuration errors
/// are returned.
pub async fn build_session(
    config: &AppConfig,
    persona: Persona,
    progress: ProgressReporter,
) -> AppResult<Session> {
    let provider_config = config.get_provider_config(&config.provider);
    let endpoint = provider_config.and_then(|pc| pc.endpoint());
    let timeout = provider_config
        .and_then(|pc| pc.timeout())
        .unwrap_or(DEFAULT_CHAT_TIMEOUT_SECS);
    let api_key = config.resolve_api_key(&config.provider)?;
    let client = create_client(
        &config.provider,
        endpoint,
        api_key.as_deref(),
        Duration::from_secs(timeout),
    )?;
    let responder = ChatResponder::new(client, &config.model)
        .with_temperature(config.temperature)
        .with_max_tokens(config.max_tokens);

    let embedder = build_embedder(config)?;

    let default_index = match index_default_corpus(config, embedder.as_ref(), &progress).await {
        Ok((index, _)) => index,
        Err(e) if e.is_recoverable() => {
            tracing::warn!("Default corpus could not be indexed: {}", e);
            eprintln!("Warning: default documents unavailable ({})", e);
            None
        }
        Err(e) => return Err(e),
    };

    let web = Arc::new(GoogleSearchClient::from_config(&config.search)?);
    let funnel = RetrievalFunnel::new(embedder, web, config.retrieval.clone());

    let prompt = load_prompt_or_default(&config.workspace, DEFAULT_PROMPT_ID)?;
    tracing::debug!("Using prompt {}", prompt.id);

    Ok(Session::new(funnel, responder, prompt, default_index)
        .with_persona(persona)
        .with_splitter(build_splitter(config)?)
        .with_progress(progress))
}

/// Read files from disk and add them to the session's uploaded index.
///
/// Files that cannot be read are reported and skipped.
pub async fn upload_files(session: &Session, paths: &[PathBuf]) -> AppResult<UploadReport> {
    let mut uploads = Vec::with_capacity(paths.len());
    for path in paths {
        match Upload::from_path(path) {
            Ok(upload) => uploads.push(upload),
            Err(e) => {
                tracing::warn!("Cannot read {:?}: {}", path, e);
                eprintln!("Skipping {}: {}", path.display(), e);
            }
        }
    }

    if uploads.is_empty() {
        return Err(AppError::Other("No readable files to upload".to_string()));
    }

    let report = session.upload(&uploads).await?;
    for skipped in &report.skipped {
        eprintln!("Skipped {}: {}", skipped.name, skipped.reason);
    }
    Ok(report)
}
