use crate::core::types::{VinCacheStats, VinDecodeResult};
use moka::future::Cache;
use std::time::Duration;

/// Eviction settings. Both unset means entries live until [`VinCache::clear`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VinCacheConfig {
    pub max_entries: Option<u64>,
    pub ttl: Option<Duration>,
}

/// Decode results keyed by normalized VIN.
///
/// Cheap to clone; clones share storage. Construct a fresh instance for
/// isolation.
#[derive(Clone)]
pub struct VinCache {
    inner: Cache<String, VinDecodeResult>,
    config: VinCacheConfig,
}

impl std::fmt::Debug for VinCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VinCache")
            .field("config", &self.config)
            .field("entries", &self.inner.entry_count())
            .finish()
    }
}

impl VinCache {
    pub fn new(config: VinCacheConfig) -> Self {
        let mut builder = Cache::builder();
        if let Some(max) = config.max_entries {
            builder = builder.max_capacity(max);
        }
        if let Some(ttl) = config.ttl {
            builder = builder.time_to_live(ttl);
        }
        Self {
            inner: builder.build(),
            config,
        }
    }

    pub fn unbounded() -> Self {
        Self::new(VinCacheConfig::default())
    }

    pub fn config(&self) -> VinCacheConfig {
        self.config
    }

    pub async fn get(&self, vin: &str) -> Option<VinDecodeResult> {
        self.inner.get(vin).await
    }

    pub async fn insert(&self, vin: String, result: VinDecodeResult) {
        self.inner.insert(vin, result).await;
    }

    pub fn contains(&self, vin: &str) -> bool {
        self.inner.contains_key(vin)
    }

    pub async fn clear(&self) {
        self.inner.invalidate_all();
        self.inner.run_pending_tasks().await;
    }

    pub async fn stats(&self) -> VinCacheStats {
        self.inner.run_pending_tasks().await;
        VinCacheStats {
            entries: self.inner.entry_count(),
            max_entries: self.config.max_entries,
            ttl_secs: self.config.ttl.map(|d| d.as_secs()),
        }
    }
}

impl Default for VinCache {
    fn default() -> Self {
        Self::unbounded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(vin: &str) -> VinDecodeResult {
        VinDecodeResult {
            vin: vin.to_string(),
            make: Some("Honda".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn insert_get_and_clear() {
        let cache = VinCache::unbounded();
        cache.insert("1HGCM82633A004352".into(), sample("1HGCM82633A004352")).await;

        let hit = cache.get("1HGCM82633A004352").await.expect("cached");
        assert_eq!(hit.make.as_deref(), Some("Honda"));
        assert_eq!(cache.stats().await.entries, 1);

        cache.clear().await;
        assert!(cache.get("1HGCM82633A004352").await.is_none());
        assert_eq!(cache.stats().await.entries, 0);
    }

    #[tokio::test]
    async fn separate_instances_are_isolated() {
        let a = VinCache::unbounded();
        let b = VinCache::unbounded();
        a.insert("VIN00000000000001".into(), sample("VIN00000000000001")).await;
        assert!(b.get("VIN00000000000001").await.is_none());
    }

    #[tokio::test]
    async fn ttl_expires_entries() {
        let cache = VinCache::new(VinCacheConfig {
            max_entries: None,
            ttl: Some(Duration::from_millis(50)),
        });
        cache.insert("1HGCM82633A004352".into(), sample("1HGCM82633A004352")).await;
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(cache.get("1HGCM82633A004352").await.is_none());
    }

    #[tokio::test]
    async fn stats_report_eviction_settings() {
        let cache = VinCache::new(VinCacheConfig {
            max_entries: Some(100),
            ttl: Some(Duration::from_secs(3600)),
        });
        let stats = cache.stats().await;
        assert_eq!(stats.max_entries, Some(100));
        assert_eq!(stats.ttl_secs, Some(3600));
    }
}
