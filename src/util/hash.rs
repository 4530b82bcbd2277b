//! Hashing for target fingerprints.

use sha2::{Digest, Sha256};

/// Compute the SHA256 hash of a string, hex encoded.
pub fn sha256_str(s: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    hex::encode(hasher.finalize())
}

/// Incremental fingerprint over a sequence of string components.
///
/// Components are NUL separated so `["ab", "c"]` and `["a", "bc"]` differ.
#[derive(Default)]
pub struct Fingerprint {
    hasher: Sha256,
}

impl Fingerprint {
    pub fn new() -> Self {
        Fingerprint {
            hasher: Sha256::new(),
        }
    }

    /// Add a string component.
    pub fn update_str(&mut self, s: &str) -> &mut Self {
        self.hasher.update(s.as_bytes());
        self.hasher.update(b"\0");
        self
    }

    /// Add several string components in order.
    pub fn update_strs<'a>(&mut self, items: impl IntoIterator<Item = &'a str>) -> &mut Self {
        for s in items {
            self.update_str(s);
        }
        self
    }

    /// Finish and return the full hex digest.
    pub fn finish(self) -> String {
        hex::encode(self.hasher.finalize())
    }

    /// Finish and return the first 16 hex characters.
    pub fn finish_short(self) -> String {
        let mut full = self.finish();
        full.truncate(16);
        full
    }
}
