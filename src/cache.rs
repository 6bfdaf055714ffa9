//! Content-hash-keyed embedding cache.
//!
//! Embedding calls dominate chunking cost, and real corpora repeat
//! themselves: re-chunking an edited document re-embeds mostly unchanged
//! context groups. The cache memoizes vectors keyed by a SHA-256 digest of
//! the group text, so the key set stays bounded in size regardless of how
//! long the cached texts are, while lookups remain exact-match only.
//!
//! ## Approximate Eviction
//!
//! When the cache reaches `max_size`, roughly a quarter of the entries are
//! removed in map iteration order. Iteration order of a hash map correlates
//! with neither insertion nor access recency, so this is **not** LRU — it is
//! a cheap batch eviction that only guarantees the size bound. Callers
//! should assert the bound, never which entries survive.

use std::collections::HashMap;
use std::sync::Mutex;

use sha2::{Digest, Sha256};

/// Fraction of the cache removed per eviction pass (1/4).
const EVICTION_DIVISOR: usize = 4;

/// Bounded, concurrent-safe store of previously computed embeddings.
///
/// One cache lives inside each chunker instance; it is shared across calls
/// to that instance but never global.
#[derive(Debug, Default)]
pub struct EmbeddingCache {
    entries: Mutex<HashMap<String, Vec<f64>>>,
}

impl EmbeddingCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the embedding for `text`, if present.
    #[must_use]
    pub fn get(&self, text: &str) -> Option<Vec<f64>> {
        let key = Self::content_hash(text);
        self.entries
            .lock()
            .map(|entries| entries.get(&key).cloned())
            .unwrap_or(None)
    }

    /// Store the embedding for `text`, evicting first if at capacity.
    pub fn put(&self, text: &str, vector: Vec<f64>, max_size: usize) {
        if max_size == 0 {
            return;
        }
        let key = Self::content_hash(text);
        if let Ok(mut entries) = self.entries.lock() {
            if entries.len() >= max_size && !entries.contains_key(&key) {
                Self::evict(&mut entries, max_size);
            }
            entries.insert(key, vector);
        }
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all entries.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    /// Remove about a quarter of the entries, in map iteration order.
    fn evict(entries: &mut HashMap<String, Vec<f64>>, max_size: usize) {
        let count = (max_size / EVICTION_DIVISOR).max(1);
        let victims: Vec<String> = entries.keys().take(count).cloned().collect();
        for key in victims {
            entries.remove(&key);
        }
    }

    /// Collision-safe, non-reversible key for a cached text.
    fn content_hash(text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        hex::encode(hasher.finalize())
    }
}
