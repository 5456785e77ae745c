//! Tier selection scenarios for the retrieval funnel.

use crate::rag::{RetrievalFunnel, Tier};
use crate::tests::doubles::{local_index, FixedEmbedder, StubSearch};
use scholar_core::{AppError, RetrievalConfig};
use std::sync::Arc;

fn funnel(embedder: Arc<FixedEmbedder>, web: Arc<StubSearch>, threshold: f32) -> RetrievalFunnel {
    RetrievalFunnel::new(
        embedder,
        web,
        RetrievalConfig {
            score_threshold: threshold,
            ..RetrievalConfig::default()
        },
    )
}

#[tokio::test]
async fn test_default_tier_used_when_nothing_uploaded() {
    let embedder = Arc::new(FixedEmbedder::new(vec![0.0, 1.0]).with("What is X?", vec![1.0, 0.0]));
    let web = Arc::new(StubSearch::with_hits(3));
    let funnel = funnel(embedder, web.clone(), 0.75);
    let default = local_index(&[("x.txt", "X is a letter.", vec![0.9, 0.435_889_9])]);

    let context = funnel
        .retrieve("What is X?", None, Some(&default))
        .await
        .unwrap();

    assert_eq!(context.tier(), Tier::Default);
    assert_eq!(context.render(), "X is a letter.");
    assert_eq!(web.calls(), 0);
}

#[tokio::test]
async fn test_below_threshold_upload_falls_through_to_web() {
    let embedder = Arc::new(FixedEmbedder::new(vec![0.0, 1.0]).with("What is X?", vec![1.0, 0.0]));
    let web = Arc::new(StubSearch::with_hits(3));
    let funnel = funnel(embedder, web.clone(), 0.75);
    // cosine([1, 0], [3, 4]) == 0.6
    let uploaded = local_index(&[("up.txt", "Loosely related.", vec![3.0, 4.0])]);
    let default = local_index(&[("d.txt", "Unrelated.", vec![0.0, 1.0])]);

    let context = funnel
        .retrieve("What is X?", Some(&uploaded), Some(&default))
        .await
        .unwrap();

    assert_eq!(context.tier(), Tier::Web);
    assert_eq!(context.heading(), "Web Search Results");
    assert!(context.render().starts_with("Result 1: https://example.com/1\nSnippet 1"));
    assert_eq!(web.calls(), 1);
}

#[tokio::test]
async fn test_score_equal_to_threshold_is_kept() {
    let embedder = Arc::new(FixedEmbedder::new(vec![1.0, 0.0]));
    let web = Arc::new(StubSearch::with_hits(3));
    let uploaded = local_index(&[("up.txt", "Exactly at the line.", vec![3.0, 4.0])]);

    let at = funnel(embedder.clone(), web.clone(), 0.6)
        .retrieve("q", Some(&uploaded), None)
        .await
        .unwrap();
    let above = funnel(embedder, web.clone(), 0.6001)
        .retrieve("q", Some(&uploaded), None)
        .await
        .unwrap();

    assert_eq!(at.tier(), Tier::Uploaded);
    assert_eq!(above.tier(), Tier::Web);
}

#[tokio::test]
async fn test_tiers_are_never_mixed() {
    let embedder = Arc::new(FixedEmbedder::new(vec![1.0, 0.0]));
    let web = Arc::new(StubSearch::with_hits(3));
    let funnel = funnel(embedder, web, 0.75);
    // cosine([1, 0], [4, 3]) == 0.8
    let uploaded = local_index(&[
        ("up.txt", "Relevant upload.", vec![4.0, 3.0]),
        ("up.txt", "Weak upload.", vec![3.0, 4.0]),
    ]);
    let default = local_index(&[("d.txt", "Perfect default.", vec![1.0, 0.0])]);

    let context = funnel
        .retrieve("q", Some(&uploaded), Some(&default))
        .await
        .unwrap();

    assert_eq!(context.tier(), Tier::Uploaded);
    assert_eq!(context.render(), "Relevant upload.");
}

#[tokio::test]
async fn test_same_question_same_context() {
    let embedder = Arc::new(FixedEmbedder::new(vec![1.0, 0.0]));
    let web = Arc::new(StubSearch::with_hits(3));
    let funnel = funnel(embedder, web, 0.75);
    let default = local_index(&[
        ("a.txt", "First.", vec![1.0, 0.0]),
        ("b.txt", "Second.", vec![4.0, 3.0]),
        ("c.txt", "Third.", vec![1.0, 0.0]),
    ]);

    let first = funnel.retrieve("q", None, Some(&default)).await.unwrap();
    let second = funnel.retrieve("q", None, Some(&default)).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.render(), "First.\nThird.\nSecond.");
}

#[tokio::test]
async fn test_empty_web_results_are_not_an_error() {
    let embedder = Arc::new(FixedEmbedder::new(vec![1.0, 0.0]));
    let web = Arc::new(StubSearch::with_hits(0));
    let funnel = funnel(embedder, web, 0.75);

    let context = funnel.retrieve("q", None, None).await.unwrap();

    assert_eq!(context.tier(), Tier::Web);
    assert_eq!(context.render(), "");
}

#[tokio::test]
async fn test_web_failure_is_reported() {
    let embedder = Arc::new(FixedEmbedder::new(vec![1.0, 0.0]));
    let web = Arc::new(StubSearch::failing());
    let funnel = funnel(embedder, web, 0.75);

    let err = funnel.retrieve("q", None, None).await.unwrap_err();

    assert!(matches!(err, AppError::WebSearch(_)));
    assert!(err.is_recoverable());
}
