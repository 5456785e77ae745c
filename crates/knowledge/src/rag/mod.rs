//! Retrieval-augmented answering.
//!
//! The funnel picks exactly one context source per question; the responder
//! folds that context into the system prompt and asks the chat model.

pub mod funnel;
pub mod responder;
pub mod types;

pub use funnel::RetrievalFunnel;
pub use responder::{ChatResponder, Reply};
pub use types::{apply_threshold, LocalTier, RetrievedContext, Tier};
