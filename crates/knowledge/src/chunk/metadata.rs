//! Chunk fingerprinting.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of the chunk text.
pub fn calculate_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
