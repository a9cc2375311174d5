//! Engine cache for reusing engines across requests.
//!
//! The cache provides:
//! - LRU eviction above a fixed capacity
//! - Time-based expiry of idle entries
//! - Shared `Arc` handles so callers never hold the lock while rendering
//!
//! Entries are keyed by organization name only. Two configurations for the
//! same organization that differ in default quality or format share one
//! engine: the first one built wins until it expires or is invalidated.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use lru::LruCache;
use tracing::{debug, warn};

use crate::error::ConfigError;

use super::{EngineConfig, ImageEngine};

// =============================================================================
// Configuration
// =============================================================================

/// Default number of cached engines.
pub const DEFAULT_ENGINE_CACHE_CAPACITY: usize = 10;

/// Default idle time after which an engine is dropped.
pub const DEFAULT_ENGINE_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

struct CacheEntry {
    instance: Arc<ImageEngine>,
    last_access: Instant,
}

// =============================================================================
// EngineCache
// =============================================================================

/// Bounded, time-expiring registry of engines.
///
/// Constructed explicitly and shared by reference (or `Arc`); there is no
/// process-wide instance.
///
/// # Example
///
/// ```
/// use pixelway::engine::{EngineCache, EngineConfig};
///
/// let cache = EngineCache::new();
/// let first = cache.get_or_create(&EngineConfig::new("acme"))?;
/// let second = cache.get_or_create(&EngineConfig::new("acme"))?;
///
/// assert!(std::sync::Arc::ptr_eq(&first, &second));
/// assert_eq!(cache.len(), 1);
/// # Ok::<(), pixelway::error::ConfigError>(())
/// ```
pub struct EngineCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
}

impl EngineCache {
    /// Create a cache with the default capacity (10) and TTL (5 minutes).
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_ENGINE_CACHE_CAPACITY, DEFAULT_ENGINE_CACHE_TTL)
    }

    /// Create a cache with a custom capacity and TTL.
    ///
    /// A capacity of zero is treated as one.
    pub fn with_limits(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Return the cached engine for this configuration's organization, or
    /// build and cache a new one.
    ///
    /// The configuration is validated first, so an invalid configuration is
    /// rejected even when an engine for its organization is cached.
    pub fn get_or_create(&self, config: &EngineConfig) -> Result<Arc<ImageEngine>, ConfigError> {
        self.get_or_create_at(config, Instant::now())
    }

    pub(crate) fn get_or_create_at(
        &self,
        config: &EngineConfig,
        now: Instant,
    ) -> Result<Arc<ImageEngine>, ConfigError> {
        config.validate()?;

        let key = config.cache_key();
        let mut entries = self.lock();
        self.evict_expired(&mut entries, now);

        if let Some(entry) = entries.get_mut(key) {
            entry.last_access = now;
            let cached = entry.instance.config();
            if cached.default_quality != config.default_quality
                || cached.default_format != config.default_format
                || cached.base_url != config.base_url
                || cached.resource_root != config.resource_root
            {
                warn!(
                    organization = key,
                    cached_quality = cached.default_quality,
                    requested_quality = config.default_quality,
                    cached_format = %cached.default_format,
                    requested_format = %config.default_format,
                    "Reusing cached engine with different settings"
                );
            }
            debug!(organization = key, "Engine cache hit");
            return Ok(Arc::clone(&entry.instance));
        }

        debug!(organization = key, "Engine cache miss");
        let instance = Arc::new(ImageEngine::new(config.clone())?);
        entries.put(
            key.to_string(),
            CacheEntry {
                instance: Arc::clone(&instance),
                last_access: now,
            },
        );

        Ok(instance)
    }

    /// Drop the engine cached under `key`. Returns whether one was present.
    pub fn invalidate(&self, key: &str) -> bool {
        self.lock().pop(key).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of cached engines, expired entries included until the next lookup.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn evict_expired(&self, entries: &mut LruCache<String, CacheEntry>, now: Instant) {
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| now.saturating_duration_since(entry.last_access) > self.ttl)
            .map(|(key, _)| key.clone())
            .collect();

        for key in expired {
            debug!(organization = %key, "Engine cache entry expired");
            entries.pop(&key);
        }
    }
}

impl Default for EngineCache {
    fn default() -> Self {
        Self::new()
    }
}
