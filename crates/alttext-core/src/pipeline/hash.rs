//! Content hashing used to correlate log lines for the same upload.

use blake3::Hasher as Blake3Hasher;

/// BLAKE3 content hashing.
pub struct Hasher;

impl Hasher {
    /// Generate a BLAKE3 hash from an in-memory byte buffer.
    pub fn content_hash(data: &[u8]) -> String {
        let mut hasher = Blake3Hasher::new();
        hasher.update(data);
        hasher.finalize().to_hex().to_string()
    }

    /// First 12 hex characters of the content hash, for log lines.
    pub fn short_hash(data: &[u8]) -> String {
        let mut hash = Self::content_hash(data);
        hash.truncate(12);
        hash
    }
}
