//! Argument-keyed memoization with per-category TTLs.
//!
//! Each computation is fully self-contained and side-effect free, so a
//! miss simply recomputes; there is no partial-result invalidation.
//! Payloads are stored as JSON, keyed by category plus the serialized
//! call arguments.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Cache tiers matching how quickly the underlying data moves.
#[derive(Debug, Clone, Copy)]
pub enum CacheCategory {
    /// New prediction batches can land at any time.
    Predictions,
    /// Historical aggregates only change when the store is reloaded.
    Analytics,
    /// Dropdown option lists move slowest of all.
    FilterOptions,
}

impl CacheCategory {
    fn name(&self) -> &'static str {
        match self {
            CacheCategory::Predictions => "predictions",
            CacheCategory::Analytics => "analytics",
            CacheCategory::FilterOptions => "filter_options",
        }
    }
}

struct Entry {
    cached_at: DateTime<Utc>,
    payload: Value,
}

pub struct QueryCache {
    predictions_ttl: Duration,
    analytics_ttl: Duration,
    options_ttl: Duration,
    entries: Mutex<HashMap<String, Entry>>,
}

impl QueryCache {
    /// `predictions_ttl_secs` comes from configuration; the slower tiers
    /// scale from the defaults.
    pub fn new(predictions_ttl_secs: u64) -> Self {
        Self {
            predictions_ttl: Duration::seconds(predictions_ttl_secs as i64),
            analytics_ttl: Duration::seconds(600),
            options_ttl: Duration::seconds(1800),
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn ttl(&self, category: CacheCategory) -> Duration {
        match category {
            CacheCategory::Predictions => self.predictions_ttl,
            CacheCategory::Analytics => self.analytics_ttl,
            CacheCategory::FilterOptions => self.options_ttl,
        }
    }

    fn key(category: CacheCategory, args: &impl Serialize) -> Option<String> {
        let serialized = serde_json::to_string(args).ok()?;
        Some(format!("{}:{}", category.name(), serialized))
    }

    /// Fresh cached value for these arguments, if any. Expired entries
    /// are dropped on the way out.
    pub fn get<T: DeserializeOwned>(
        &self,
        category: CacheCategory,
        args: &impl Serialize,
    ) -> Option<T> {
        let key = Self::key(category, args)?;
        let mut entries = self.entries.lock().ok()?;

        let fresh = match entries.get(&key) {
            Some(entry) => Utc::now() - entry.cached_at <= self.ttl(category),
            None => return None,
        };
        if !fresh {
            entries.remove(&key);
            return None;
        }
        entries
            .get(&key)
            .and_then(|entry| serde_json::from_value(entry.payload.clone()).ok())
    }

    pub fn put(&self, category: CacheCategory, args: &impl Serialize, value: &impl Serialize) {
        let Some(key) = Self::key(category, args) else {
            return;
        };
        let Ok(payload) = serde_json::to_value(value) else {
            return;
        };
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(
                key,
                Entry {
                    cached_at: Utc::now(),
                    payload,
                },
            );
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FilterSet;

    #[test]
    fn test_hit_and_miss() {
        let cache = QueryCache::new(300);
        let filters = FilterSet::default();

        assert_eq!(cache.get::<i64>(CacheCategory::Analytics, &filters), None);
        cache.put(CacheCategory::Analytics, &filters, &42i64);
        assert_eq!(cache.get::<i64>(CacheCategory::Analytics, &filters), Some(42));
    }

    #[test]
    fn test_key_includes_arguments() {
        let cache = QueryCache::new(300);
        let a = FilterSet {
            leagues: vec!["Premier League".to_string()],
            ..Default::default()
        };
        let b = FilterSet::default();

        cache.put(CacheCategory::Analytics, &a, &1i64);
        assert_eq!(cache.get::<i64>(CacheCategory::Analytics, &b), None);
        assert_eq!(cache.get::<i64>(CacheCategory::Analytics, &a), Some(1));
    }

    #[test]
    fn test_categories_do_not_collide() {
        let cache = QueryCache::new(300);
        let filters = FilterSet::default();

        cache.put(CacheCategory::Analytics, &filters, &1i64);
        assert_eq!(cache.get::<i64>(CacheCategory::Predictions, &filters), None);
    }

    #[test]
    fn test_expired_entry_is_dropped() {
        let cache = QueryCache::new(0);
        let filters = FilterSet::default();

        cache.put(CacheCategory::Predictions, &filters, &7i64);
        assert_eq!(cache.len(), 1);
        // Zero TTL: any elapsed time expires the entry
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert_eq!(cache.get::<i64>(CacheCategory::Predictions, &filters), None);
        assert_eq!(cache.len(), 0);
    }
}
