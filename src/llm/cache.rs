//! In-memory TTL cache for raw generation responses.
//!
//! Identical prompts inside the TTL window short-circuit the network call
//! entirely. The cache is bounded two ways: expired entries are swept when
//! the map grows past its cap, and if the sweep is not enough the oldest
//! entries are evicted until the cap holds.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};

/// Number of prompt characters that participate in the cache key.
const KEY_PROMPT_CHARS: usize = 100;

/// A cached response with its creation time.
struct CacheEntry {
    value: String,
    created_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() >= ttl
    }
}

/// Bounded TTL cache for generation responses.
pub struct ResponseCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    max_entries: usize,
    hits: AtomicU64,
}

impl ResponseCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            max_entries: max_entries.max(1),
            hits: AtomicU64::new(0),
        }
    }

    /// Build a cache key from the request parameters.
    ///
    /// Only the prompt prefix participates: generation prompts embed entire
    /// document sets, and the first 100 characters together with the model
    /// and token budget are enough to identify a request.
    pub fn key(model: &str, prompt: &str, max_tokens: u32) -> String {
        let prefix: String = prompt.chars().take(KEY_PROMPT_CHARS).collect();
        let mut hasher = Sha256::new();
        hasher.update(model.as_bytes());
        hasher.update([0u8]);
        hasher.update(prefix.as_bytes());
        hasher.update([0u8]);
        hasher.update(max_tokens.to_le_bytes());
        hex::encode(hasher.finalize())
    }

    /// Get a cached response younger than the TTL.
    pub fn get(&self, key: &str) -> Option<String> {
        let guard = self.entries.read().ok()?;
        let entry = guard.get(key)?;
        if entry.is_expired(self.ttl) {
            return None;
        }
        self.hits.fetch_add(1, Ordering::Relaxed);
        Some(entry.value.clone())
    }

    /// Insert a response, evicting as needed to stay bounded.
    pub fn insert(&self, key: String, value: String) {
        let Ok(mut guard) = self.entries.write() else {
            return;
        };
        guard.insert(
            key,
            CacheEntry {
                value,
                created_at: Instant::now(),
            },
        );

        if guard.len() > self.max_entries {
            let ttl = self.ttl;
            guard.retain(|_, entry| !entry.is_expired(ttl));
        }
        while guard.len() > self.max_entries {
            let oldest = guard
                .iter()
                .min_by_key(|(_, entry)| entry.created_at)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => guard.remove(&key),
                None => break,
            };
        }
    }

    /// Number of entries currently held (including not-yet-swept expired ones).
    pub fn len(&self) -> usize {
        self.entries.read().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of cache hits served since construction.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Drop every cached response.
    pub fn clear(&self) {
        if let Ok(mut guard) = self.entries.write() {
            guard.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_within_ttl() {
        let cache = ResponseCache::new(Duration::from_secs(60), 16);
        let key = ResponseCache::key("m", "prompt", 512);
        cache.insert(key.clone(), "cached".to_string());
        assert_eq!(cache.get(&key).as_deref(), Some("cached"));
        assert_eq!(cache.hits(), 1);
    }

    #[test]
    fn test_expired_entry_misses() {
        let cache = ResponseCache::new(Duration::ZERO, 16);
        let key = ResponseCache::key("m", "prompt", 512);
        cache.insert(key.clone(), "cached".to_string());
        assert!(cache.get(&key).is_none());
        assert_eq!(cache.hits(), 0);
    }

    #[test]
    fn test_key_depends_on_all_parts() {
        let base = ResponseCache::key("m", "prompt", 512);
        assert_ne!(base, ResponseCache::key("other", "prompt", 512));
        assert_ne!(base, ResponseCache::key("m", "different", 512));
        assert_ne!(base, ResponseCache::key("m", "prompt", 256));
    }

    #[test]
    fn test_key_ignores_prompt_tail() {
        let long_a = format!("{}{}", "x".repeat(100), "tail one");
        let long_b = format!("{}{}", "x".repeat(100), "another tail");
        assert_eq!(
            ResponseCache::key("m", &long_a, 512),
            ResponseCache::key("m", &long_b, 512)
        );
    }

    #[test]
    fn test_eviction_keeps_cache_bounded() {
        let cache = ResponseCache::new(Duration::from_secs(60), 4);
        for i in 0..20 {
            cache.insert(
                ResponseCache::key("m", &format!("prompt {i}"), 512),
                format!("value {i}"),
            );
        }
        assert!(cache.len() <= 4);
    }

    #[test]
    fn test_clear() {
        let cache = ResponseCache::new(Duration::from_secs(60), 4);
        cache.insert("k".to_string(), "v".to_string());
        cache.clear();
        assert!(cache.is_empty());
    }
}
