//! TTL cache with an injectable clock.
//!
//! Used by the asynchronous caster classifier to remember rules-content
//! lookups. The clock is a trait object so tests can move time forward
//! without sleeping.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Source of the current time.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// System clock - uses real time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(start.timestamp_millis()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let delta = i64::try_from(by.as_millis()).unwrap_or(i64::MAX);
        self.millis.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst)).unwrap_or_default()
    }
}

/// A cache whose entries expire a fixed time after insertion.
///
/// Expired entries are invisible to `get` but stay in memory until
/// `cleanup_expired()` runs.
pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, TtlEntry<V>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

struct TtlEntry<V> {
    value: V,
    inserted_at: DateTime<Utc>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    /// Create a cache that reads time from the system clock.
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    fn is_fresh(&self, entry: &TtlEntry<V>, now: DateTime<Utc>) -> bool {
        // A clock that moved backwards leaves the entry fresh.
        (now - entry.inserted_at)
            .to_std()
            .map_or(true, |elapsed| elapsed < self.ttl)
    }

    /// Insert a value, replacing any existing entry and resetting the TTL.
    pub async fn insert(&self, key: K, value: V) {
        let entry = TtlEntry {
            value,
            inserted_at: self.clock.now(),
        };
        self.entries.write().await.insert(key, entry);
    }

    /// Get a value if it exists and hasn't expired.
    pub async fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let guard = self.entries.read().await;
        guard
            .get(key)
            .filter(|entry| self.is_fresh(entry, now))
            .map(|entry| entry.value.clone())
    }

    /// Remove and return a value if it exists (regardless of expiration).
    pub async fn remove(&self, key: &K) -> Option<V> {
        self.entries.write().await.remove(key).map(|e| e.value)
    }

    /// Remove all expired entries and return how many were dropped.
    pub async fn cleanup_expired(&self) -> usize {
        let now = self.clock.now();
        let mut guard = self.entries.write().await;
        let before_count = guard.len();
        guard.retain(|_, entry| self.is_fresh(entry, now));
        before_count - guard.len()
    }

    /// Number of entries, including expired ones not yet cleaned.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl<K, V> std::fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache").field("ttl", &self.ttl).finish()
    }
}
