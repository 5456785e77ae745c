//! Ask command handler.
//!
//! Answers a single question through a fresh session.

use crate::bootstrap::{build_session, persona_from_flags, upload_files};
use clap::Args;
use scholar_core::{AppConfig, AppResult};
use scholar_knowledge::ProgressReporter;
use std::path::PathBuf;

/// Ask a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Files to upload before asking (.pdf or .txt)
    #[arg(short, long)]
    pub upload: Vec<PathBuf>,

    /// Response mode (concise, detailed)
    #[arg(long)]
    pub mode: Option<String>,

    /// Topic to draw examples from
    #[arg(short, long)]
    pub interest: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let persona = persona_from_flags(self.mode.as_deref(), self.interest.as_deref())?;
        let mut session = build_session(config, persona, ProgressReporter::noop()).await?;

        if !self.upload.is_empty() {
            let report = upload_files(&session, &self.upload).await?;
            tracing::info!(
                "Uploaded {} files ({} chunks)",
                report.files_loaded,
                report.chunks
            );
        }

        let outcome = session.ask(&self.question).await?;

        if self.json {
            let output = serde_json::json!({
                "answer": outcome.reply.content,
                "tier": outcome.tier,
                "model": outcome.reply.model.as_deref().unwrap_or(session.responder().model()),
                "provider": session.responder().provider_name(),
                "sources": outcome.citations,
                "error": outcome.is_error(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", outcome.reply.content);
            if let Some(tier) = outcome.tier {
                tracing::debug!("Answered from {} tier", tier);
            }
        }

        Ok(())
    }
}
