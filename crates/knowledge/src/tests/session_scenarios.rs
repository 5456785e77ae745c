//! End-to-end turns through a session with stubbed services.

use crate::rag::{ChatResponder, RetrievalFunnel, Tier};
use crate::session::Session;
use crate::tests::doubles::{local_index, FailingChat, FixedEmbedder, StubChat, StubSearch};
use crate::upload::Upload;
use crate::vector_index::VectorIndex;
use scholar_core::{AppError, RetrievalConfig};
use scholar_llm::{ChatClient, ChatMessage, ChatRole};
use scholar_prompt::{default_prompt, ResponseMode};
use std::sync::Arc;

fn session(
    embedder: Arc<FixedEmbedder>,
    chat: Arc<dyn ChatClient>,
    web: Arc<StubSearch>,
    default: Option<VectorIndex>,
) -> Session {
    let funnel = RetrievalFunnel::new(embedder, web, RetrievalConfig::default());
    let responder = ChatResponder::new(chat, "test-model").with_temperature(0.7);
    Session::new(funnel, responder, default_prompt(), default)
}

fn upload(name: &str, text: &str) -> Upload {
    Upload::new(name, text.as_bytes().to_vec())
}

#[tokio::test]
async fn test_turn_records_question_and_answer() {
    let chat = Arc::new(StubChat::new("Photosynthesis turns light into sugar."));
    let default = local_index(&[("bio.txt", "Plants photosynthesise.", vec![1.0, 0.0])]);
    let mut session = session(
        Arc::new(FixedEmbedder::new(vec![1.0, 0.0])),
        chat.clone(),
        Arc::new(StubSearch::with_hits(3)),
        Some(default),
    );

    let outcome = session.ask("What is photosynthesis?").await.unwrap();

    assert_eq!(outcome.tier, Some(Tier::Default));
    assert_eq!(outcome.citations, vec!["bio.txt".to_string()]);
    assert!(!outcome.is_error());
    assert_eq!(
        session.transcript().messages(),
        &[
            ChatMessage::user("What is photosynthesis?"),
            ChatMessage::assistant("Photosynthesis turns light into sugar."),
        ]
    );

    let request = chat.last_request().unwrap();
    assert_eq!(request.messages.len(), 2);
    assert_eq!(
        request.messages[0].content,
        "You are a friendly learning assistant. Provide concise answers with examples related to General.\n\
         What is photosynthesis?\n\nContext:\nPlants photosynthesise."
    );
}

#[tokio::test]
async fn test_history_is_sent_with_each_turn() {
    let chat = Arc::new(StubChat::new("ok"));
    let mut session = session(
        Arc::new(FixedEmbedder::new(vec![1.0, 0.0])),
        chat.clone(),
        Arc::new(StubSearch::with_hits(1)),
        None,
    );

    session.ask("first").await.unwrap();
    session.ask("second").await.unwrap();

    let request = chat.last_request().unwrap();
    let roles: Vec<ChatRole> = request.messages.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![ChatRole::System, ChatRole::User, ChatRole::Assistant, ChatRole::User]
    );
    assert_eq!(request.messages[3].content, "second");
    assert_eq!(chat.request_count(), 2);
}

#[tokio::test]
async fn test_chat_timeout_becomes_visible_reply() {
    let mut session = session(
        Arc::new(FixedEmbedder::new(vec![1.0, 0.0])),
        Arc::new(FailingChat),
        Arc::new(StubSearch::with_hits(3)),
        None,
    );

    let outcome = session.ask("What is X?").await.unwrap();

    assert!(outcome.is_error());
    assert!(outcome.reply.content.starts_with("Error getting response: "));
    let messages = session.transcript().messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0], ChatMessage::user("What is X?"));
    assert_eq!(messages[1].role, ChatRole::Assistant);
    assert_eq!(messages[1].content, outcome.reply.content);

    // The session keeps working after a failed turn
    let again = session.ask("Still there?").await.unwrap();
    assert!(again.is_error());
    assert_eq!(session.transcript().len(), 4);
}

#[tokio::test]
async fn test_web_failure_keeps_session_usable() {
    let mut session = session(
        Arc::new(FixedEmbedder::new(vec![1.0, 0.0])),
        Arc::new(StubChat::new("unused")),
        Arc::new(StubSearch::failing()),
        None,
    );

    let outcome = session.ask("q").await.unwrap();

    assert!(outcome.is_error());
    assert_eq!(outcome.tier, None);
    assert!(outcome.reply.content.contains("HTTP 503"));
    assert_eq!(session.transcript().len(), 2);
}

#[tokio::test]
async fn test_missing_credential_propagates() {
    let default = local_index(&[("a.txt", "text", vec![1.0, 0.0])]);
    let mut session = session(
        Arc::new(FixedEmbedder::missing_key()),
        Arc::new(StubChat::new("unused")),
        Arc::new(StubSearch::with_hits(1)),
        Some(default),
    );

    let err = session.ask("q").await.unwrap_err();

    assert!(matches!(err, AppError::MissingCredential { .. }));
    assert!(session.transcript().is_empty());
}

#[tokio::test]
async fn test_second_upload_merges() {
    let embedder = Arc::new(
        FixedEmbedder::new(vec![0.0, 1.0])
            .with("Alpha facts.", vec![1.0, 0.0])
            .with("about alpha", vec![1.0, 0.0]),
    );
    let mut session = session(
        embedder,
        Arc::new(StubChat::new("ok")),
        Arc::new(StubSearch::with_hits(1)),
        None,
    );

    let first = session.upload(&[upload("alpha.txt", "Alpha facts.")]).await.unwrap();
    let second = session.upload(&[upload("beta.txt", "Beta facts.")]).await.unwrap();

    assert_eq!(first.total_chunks, 1);
    assert_eq!(second.total_chunks, 2);
    let uploaded = session.indices().uploaded_index().await.unwrap();
    assert_eq!(uploaded.sources(), vec!["alpha.txt", "beta.txt"]);

    let outcome = session.ask("about alpha").await.unwrap();
    assert_eq!(outcome.tier, Some(Tier::Uploaded));
    assert_eq!(outcome.citations, vec!["alpha.txt".to_string()]);
}

#[tokio::test]
async fn test_unsupported_upload_is_skipped() {
    let embedder = Arc::new(FixedEmbedder::new(vec![1.0, 0.0]));
    let session = session(
        embedder.clone(),
        Arc::new(StubChat::new("ok")),
        Arc::new(StubSearch::with_hits(1)),
        None,
    );

    let report = session
        .upload(&[upload("slides.pptx", "not really slides")])
        .await
        .unwrap();

    assert_eq!(report.files_loaded, 0);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].name, "slides.pptx");
    assert_eq!(report.total_chunks, 0);
    assert!(session.indices().uploaded_index().await.is_none());
    assert_eq!(embedder.calls(), 0);
}

#[tokio::test]
async fn test_failed_upload_leaves_index_unchanged() {
    let session = session(
        Arc::new(FixedEmbedder::new(vec![1.0, 0.0]).poisoned("Lost.")),
        Arc::new(StubChat::new("ok")),
        Arc::new(StubSearch::with_hits(1)),
        None,
    );
    session.upload(&[upload("a.txt", "Kept.")]).await.unwrap();

    let result = session.upload(&[upload("b.txt", "Lost.")]).await;

    assert!(matches!(result, Err(AppError::EmbeddingService(_))));
    let uploaded = session.indices().uploaded_index().await.unwrap();
    assert_eq!(uploaded.sources(), vec!["a.txt"]);
}

#[tokio::test]
async fn test_persona_shapes_system_prompt() {
    let chat = Arc::new(StubChat::new("ok"));
    let mut session = session(
        Arc::new(FixedEmbedder::new(vec![1.0, 0.0])),
        chat.clone(),
        Arc::new(StubSearch::with_hits(1)),
        None,
    );

    session.set_mode(ResponseMode::Detailed);
    session.set_interest("Cricket");
    session.ask("Explain averages").await.unwrap();

    let request = chat.last_request().unwrap();
    assert!(request.messages[0]
        .content
        .starts_with("You are a friendly learning assistant. Provide detailed answers with examples related to Cricket."));
    assert!(request.messages[0].content.contains("Web Search Results:"));
}

#[tokio::test]
async fn test_clear_history_keeps_indices() {
    let mut session = session(
        Arc::new(FixedEmbedder::new(vec![1.0, 0.0])),
        Arc::new(StubChat::new("ok")),
        Arc::new(StubSearch::with_hits(1)),
        None,
    );
    session.upload(&[upload("a.txt", "Kept.")]).await.unwrap();
    session.ask("q").await.unwrap();

    session.clear_history();

    assert!(session.transcript().is_empty());
    assert!(session.indices().uploaded_index().await.is_some());
}

#[tokio::test]
async fn test_blank_question_rejected() {
    let mut session = session(
        Arc::new(FixedEmbedder::new(vec![1.0, 0.0])),
        Arc::new(StubChat::new("ok")),
        Arc::new(StubSearch::with_hits(1)),
        None,
    );

    assert!(session.ask("   ").await.is_err());
    assert!(session.transcript().is_empty());
}
