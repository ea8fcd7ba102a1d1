//! In-memory transformation cache with a fixed TTL.
//!
//! Key: blake3 hash of (tone identifier | exact input text). Expiry is checked
//! on lookup only; there is no background sweep.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

/// Source of "now" for expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Fingerprint of a `(text, tone identifier)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey([u8; 32]);

impl CacheKey {
    pub fn new(text: &str, tone: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        // Length prefix keeps (tone, text) boundaries unambiguous.
        hasher.update(&(tone.len() as u64).to_le_bytes());
        hasher.update(tone.as_bytes());
        hasher.update(b"|");
        hasher.update(text.as_bytes());
        Self(*hasher.finalize().as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub converted_text: String,
    pub inserted_at: Instant,
}

pub struct TransformCache {
    inner: Mutex<HashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TransformCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up an entry. Returns None if absent or expired; expired entries
    /// are removed. Reads never extend the TTL.
    pub fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        let now = self.clock.now();
        let mut map = self.inner.lock();
        if let Some(entry) = map.get(key) {
            if now.saturating_duration_since(entry.inserted_at) < self.ttl {
                return Some(entry.clone());
            }
            map.remove(key);
        }
        None
    }

    /// Insert or overwrite, restarting the TTL from now.
    pub fn put(&self, key: CacheKey, converted_text: String) {
        let entry = CacheEntry {
            key,
            converted_text,
            inserted_at: self.clock.now(),
        };
        self.inner.lock().insert(key, entry);
    }

    /// Number of stored entries, including expired ones not yet read.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TransformCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}


#[cfg(test)]
mod tests {
    use super::test_clock::ManualClock;
    use super::*;

    fn cache_with_clock() -> (TransformCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let cache = TransformCache::with_clock(DEFAULT_TTL, clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_key_is_deterministic() {
        assert_eq!(
            CacheKey::new("Hey", "casual-formal"),
            CacheKey::new("Hey", "casual-formal")
        );
    }

    #[test]
    fn test_key_is_exact_match() {
        let base = CacheKey::new("Hey there", "casual-formal");
        assert_ne!(base, CacheKey::new("Hey there ", "casual-formal"));
        assert_ne!(base, CacheKey::new("hey there", "casual-formal"));
        assert_ne!(base, CacheKey::new("Hey there", "casual-friendly"));
    }

    #[test]
    fn test_key_separates_tone_and_text() {
        assert_ne!(CacheKey::new("b|c", "a"), CacheKey::new("c", "a|b"));
    }

    #[test]
    fn test_miss_on_empty_cache() {
        let (cache, _) = cache_with_clock();
        assert!(cache.get(&CacheKey::new("x", "formal-casual")).is_none());
    }

    #[test]
    fn test_hit_within_ttl() {
        let (cache, clock) = cache_with_clock();
        let key = CacheKey::new("x", "formal-casual");
        cache.put(key, "y".to_string());
        clock.advance(Duration::from_secs(599));

        let entry = cache.get(&key).unwrap();
        assert_eq!(entry.converted_text, "y");
        assert_eq!(entry.key, key);
    }

    #[test]
    fn test_expired_entry_is_removed_on_read() {
        let (cache, clock) = cache_with_clock();
        let key = CacheKey::new("x", "formal-casual");
        cache.put(key, "y".to_string());
        clock.advance(Duration::from_secs(600));

        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_read_does_not_refresh_ttl() {
        let (cache, clock) = cache_with_clock();
        let key = CacheKey::new("x", "formal-casual");
        cache.put(key, "y".to_string());

        clock.advance(Duration::from_secs(400));
        assert!(cache.get(&key).is_some());
        clock.advance(Duration::from_secs(300));
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn test_put_overwrites_and_restarts_ttl() {
        let (cache, clock) = cache_with_clock();
        let key = CacheKey::new("x", "formal-casual");
        cache.put(key, "first".to_string());
        clock.advance(Duration::from_secs(500));
        cache.put(key, "second".to_string());
        clock.advance(Duration::from_secs(500));

        assert_eq!(cache.get(&key).unwrap().converted_text, "second");
        assert_eq!(cache.len(), 1);
    }
}
