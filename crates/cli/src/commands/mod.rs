//! Command handlers for the Scholar CLI.

pub mod ask;
pub mod chat;
pub mod guide;
pub mod index;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use guide::GuideCommand;
pub use index::IndexCommand;
