//! Chat command handler.
//!
//! Interactive conversation on stdin. Lines starting with `/` are session
//! commands; everything else is a question.

use crate::bootstrap::{build_session, persona_from_flags, stderr_progress, upload_files};
use clap::Args;
use scholar_core::{AppConfig, AppResult};
use scholar_knowledge::{Session, Tier, TurnOutcome};
use scholar_prompt::ResponseMode;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Commands:
  /upload <file>...     add .pdf or .txt files to your documents
  /mode <concise|detailed>
  /interest <topic>     topic for examples (blank resets to General)
  /clear                clear the chat history
  /help                 show this help
  /quit                 leave";

/// Start an interactive study session
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Response mode (concise, detailed)
    #[arg(long)]
    pub mode: Option<String>,

    /// Topic to draw examples from
    #[arg(short, long)]
    pub interest: Option<String>,

    /// Files to upload at start (.pdf or .txt)
    #[arg(short, long)]
    pub upload: Vec<PathBuf>,
}

/// A parsed input line.
#[derive(Debug, PartialEq)]
enum Input {
    Question(String),
    Upload(Vec<PathBuf>),
    Mode(String),
    Interest(String),
    Clear,
    Help,
    Quit,
    Unknown(String),
    Empty,
}

impl Input {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }

        let Some(command) = line.strip_prefix('/') else {
            return Self::Question(line.to_string());
        };

        let (name, rest) = match command.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (command, ""),
        };

        match name {
            "upload" => Self::Upload(rest.split_whitespace().map(PathBuf::from).collect()),
            "mode" => Self::Mode(rest.to_string()),
            "interest" => Self::Interest(rest.to_string()),
            "clear" => Self::Clear,
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let persona = persona_from_flags(self.mode.as_deref(), self.interest.as_deref())?;
        let mut session = build_session(config, persona, stderr_progress()).await?;

        if !self.upload.is_empty() {
            self.report_upload(&session, &self.upload).await;
        }

        println!(
            "Scholar ({} answers, examples from {}). Type /help for commands.",
            session.persona().mode,
            session.persona().interest
        );

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            match Input::parse(&line) {
                Input::Empty => continue,
                Input::Quit => break,
                Input::Help => println!("{}", HELP),
                Input::Clear => {
                    session.clear_history();
                    println!("Chat history cleared.");
                }
                Input::Mode(mode) => match ResponseMode::parse(&mode) {
                    Ok(mode) => {
                        session.set_mode(mode);
                        println!("Response mode: {}", mode);
                    }
                    Err(e) => println!("{}", e),
                },
                Input::Interest(interest) => {
                    session.set_interest(&interest);
                    println!("Examples will relate to {}.", session.persona().interest);
                }
                Input::Upload(paths) if paths.is_empty() => println!("Usage: /upload <file>..."),
                Input::Upload(paths) => self.report_upload(&session, &paths).await,
                Input::Unknown(name) => println!("Unknown command /{}. Type /help.", name),
                Input::Question(question) => {
                    let outcome = session.ask(&question).await?;
                    print_outcome(&outcome);
                }
            }
        }

        tracing::info!(
            "Chat ended after {} messages",
            session.transcript().len()
        );
        Ok(())
    }

    async fn report_upload(&self, session: &Session, paths: &[PathBuf]) {
        match upload_files(session, paths).await {
            Ok(report) if report.files_loaded > 0 => println!(
                "Added {} files ({} chunks). Your documents now hold {} chunks.",
                report.files_loaded, report.chunks, report.total_chunks
            ),
            Ok(_) => println!("Nothing was added."),
            Err(e) => {
                tracing::warn!("Upload failed: {}", e);
                println!("Upload failed: {}", e);
            }
        }
    }
}

fn print_outcome(outcome: &TurnOutcome) {
    println!("{}", outcome.reply.content);

    let label = match outcome.tier {
        Some(Tier::Uploaded) => "your documents",
        Some(Tier::Default) => "default documents",
        Some(Tier::Web) => "web search",
        None => return,
    };
    if outcome.citations.is_empty() {
        println!("  [source: {}]", label);
    } else {
        println!("  [source: {}: {}]", label, outcome.citations.join(", "));
    }
}
