// src/services/cache.rs
// DOCUMENTATION: In-memory TTL cache for geocoding responses
// PURPOSE: Avoid repeated Google Geocoding calls for the same address or point

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Clone, Debug)]
struct CacheEntry {
    data: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// Thread-safe cache of serialized responses keyed by lookup
pub struct GeocodeCache {
    store: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl GeocodeCache {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
            ttl: Duration::from_secs(ttl_seconds),
        }
    }

    /// Key for a forward lookup; whitespace and case do not matter
    pub fn address_key(address: &str) -> String {
        let normalized = address
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        format!("geocode:{}", normalized)
    }

    /// Key for a reverse lookup, rounded to ~10 m
    pub fn point_key(lat: f64, lng: f64) -> String {
        format!(
            "reverse:{}:{}",
            (lat * 10000.0).round() as i64,
            (lng * 10000.0).round() as i64
        )
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        let store = self.store.read().await;

        match store.get(key) {
            Some(entry) if !entry.is_expired() => {
                log::debug!("Geocode cache HIT for key: {}", key);
                Some(entry.data.clone())
            }
            Some(_) => {
                log::debug!("Geocode cache EXPIRED for key: {}", key);
                None
            }
            None => {
                log::debug!("Geocode cache MISS for key: {}", key);
                None
            }
        }
    }

    pub async fn set(&self, key: String, value: String) {
        let mut store = self.store.write().await;
        store.insert(
            key,
            CacheEntry {
                data: value,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Drop expired entries; returns how many were removed
    pub async fn cleanup(&self) -> usize {
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|_, entry| !entry.is_expired());
        let removed = before - store.len();

        if removed > 0 {
            log::info!(
                "Geocode cache cleanup: removed {} expired entries ({} remaining)",
                removed,
                store.len()
            );
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }
}

/// Start background cleanup task
/// DOCUMENTATION: Periodically removes expired entries
pub fn start_cleanup_task(cache: Arc<GeocodeCache>, interval_seconds: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));

        loop {
            interval.tick().await;
            cache.cleanup().await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cache_set_get() {
        let cache = GeocodeCache::new(60);
        let key = GeocodeCache::address_key("12 MG Road, Pune");

        cache.set(key.clone(), "{\"city\":\"Pune\"}".to_string()).await;
        assert_eq!(cache.get(&key).await.as_deref(), Some("{\"city\":\"Pune\"}"));
    }

    #[tokio::test]
    async fn test_cache_expiration() {
        let cache = GeocodeCache::new(1);
        cache.set("k".to_string(), "v".to_string()).await;
        assert!(cache.get("k").await.is_some());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(cache.get("k").await.is_none());

        assert_eq!(cache.cleanup().await, 1);
        assert_eq!(cache.len().await, 0);
    }

    #[test]
    fn test_address_key_normalized() {
        assert_eq!(
            GeocodeCache::address_key("  12  MG Road,  PUNE "),
            GeocodeCache::address_key("12 mg road, pune")
        );
    }

    #[test]
    fn test_point_key_rounding() {
        let key1 = GeocodeCache::point_key(18.52041, 73.85671);
        let key2 = GeocodeCache::point_key(18.52039, 73.85669);
        let key3 = GeocodeCache::point_key(18.5214, 73.8567);

        assert_eq!(key1, key2);
        assert_ne!(key1, key3);
    }
}
