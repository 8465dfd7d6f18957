use std::{
    collections::HashMap,
    hash::Hash,
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::NaiveDate;
use tokio::sync::RwLock;

use crate::dto::reports::RevenueReport;

/// Last good revenue reports keyed by `(from, to)`, served when the
/// database cannot be reached.
pub type ReportCache = TtlCache<(NaiveDate, NaiveDate), RevenueReport>;

#[derive(Clone)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Arc<RwLock<HashMap<K, (Instant, V)>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn insert(&self, key: K, value: V) {
        let mut entries = self.entries.write().await;
        let ttl = self.ttl;
        entries.retain(|_, (stored_at, _)| stored_at.elapsed() < ttl);
        entries.insert(key, (Instant::now(), value));
    }

    /// Returns the value only while it is younger than the TTL.
    pub async fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|(stored_at, _)| stored_at.elapsed() < self.ttl)
            .map(|(_, value)| value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fresh_entries_are_returned() {
        let cache: TtlCache<&str, i64> = TtlCache::new(Duration::from_secs(30));
        cache.insert("march", 120_000).await;
        assert_eq!(cache.get(&"march").await, Some(120_000));
        assert_eq!(cache.get(&"april").await, None);
    }

    #[tokio::test]
    async fn stale_entries_are_ignored() {
        let cache: TtlCache<&str, i64> = TtlCache::new(Duration::ZERO);
        cache.insert("march", 120_000).await;
        assert_eq!(cache.get(&"march").await, None);
    }

    #[tokio::test]
    async fn clones_share_storage() {
        let cache: TtlCache<u8, &str> = TtlCache::new(Duration::from_secs(30));
        let other = cache.clone();
        other.insert(1, "shared").await;
        assert_eq!(cache.get(&1).await, Some("shared"));
    }
}
