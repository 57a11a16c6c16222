//! Content digest of a definition file

use sha2::{Digest, Sha256};

/// SHA256 of the raw definition bytes, hex encoded
pub fn compute_definition_digest(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}
