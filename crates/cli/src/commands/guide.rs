//! Guide command handler.

use clap::Args;
use scholar_core::{AppConfig, AppResult};
use scholar_prompt::{list_prompts, DEFAULT_PROMPT_ID, SUGGESTED_INTERESTS};

/// Show how to use the study assistant
#[derive(Args, Debug)]
pub struct GuideCommand;

impl GuideCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        println!("{}", guide_text());

        let prompts = list_prompts(&config.workspace)?;
        if prompts.iter().any(|id| id == DEFAULT_PROMPT_ID) {
            println!(
                "\nUsing the system prompt from .scholar/prompts/{}.yml",
                DEFAULT_PROMPT_ID
            );
        }
        Ok(())
    }
}

fn guide_text() -> String {
    format!(
        "\
How to use Scholar

1. Start a conversation with `scholar chat`, or ask once with `scholar ask \"...\"`.
2. Upload your own notes (.pdf or .txt) with `--upload FILE` or `/upload FILE` in chat.
   Uploaded documents are searched first.
3. Documents in the default folder (`data/` unless --corpus is given) are searched next.
4. When neither contains a close enough match, the answer draws on a web search.
5. Pick a response mode with `--mode concise|detailed` or `/mode`.
6. Pick an interest for examples with `--interest` or `/interest` ({}, or anything else).
7. Clear the conversation with `/clear`; uploaded documents stay available.

Credentials are read from the environment (or a .env file) when first needed:
  GEMINI_API_KEY   chat and embeddings
  GOOGLE_API_KEY   web search
  GOOGLE_CSE_ID    web search engine id",
        SUGGESTED_INTERESTS.join(", ")
    )
}
