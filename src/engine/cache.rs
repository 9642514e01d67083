// ============================================================================
// Snapshot Cache
// Read-through cache of aggregated levels per asset
// ============================================================================

use crate::domain::{AssetId, BookLevels};
use crate::error::{EngineError, EngineResult};
use crate::interfaces::{LiquiditySource, OrderStore};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Default)]
struct CacheSlot {
    /// Bumped by every invalidation
    generation: u64,
    /// Store book version the cached levels were loaded at
    version: u64,
    levels: Option<Arc<BookLevels>>,
}

/// Hit/miss counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub invalidations: u64,
    /// Loads discarded because an invalidation landed while they ran
    pub stale_loads: u64,
    /// Cached books dropped because the store's book version moved
    pub expired: u64,
}

/// Per-asset cache of full aggregated books.
///
/// Every entry is tagged with the store's book version read before the load.
/// A lookup presenting a different version misses, so changes committed by
/// any writer, not only this engine, are picked up on the next read.
///
/// A load also records the asset's generation and only installs its result
/// if no invalidation happened in between, so a reader that raced a mutation
/// can never re-populate the cache with pre-mutation levels.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    slots: RwLock<HashMap<AssetId, CacheSlot>>,
    hits: AtomicU64,
    misses: AtomicU64,
    invalidations: AtomicU64,
    stale_loads: AtomicU64,
    expired: AtomicU64,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, asset_id: &AssetId) -> Option<Arc<BookLevels>> {
        self.slots
            .read()
            .get(asset_id)
            .and_then(|slot| slot.levels.clone())
    }

    /// Return the levels cached at `version` or run `load` and cache its result
    pub fn get_or_load<F>(
        &self,
        asset_id: &AssetId,
        version: u64,
        load: F,
    ) -> EngineResult<Arc<BookLevels>>
    where
        F: FnOnce() -> EngineResult<Arc<BookLevels>>,
    {
        let generation = {
            let slots = self.slots.read();
            match slots.get(asset_id) {
                Some(CacheSlot {
                    levels: Some(levels),
                    version: cached,
                    ..
                }) if *cached == version => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return Ok(Arc::clone(levels));
                },
                Some(slot) => {
                    if slot.levels.is_some() {
                        self.expired.fetch_add(1, Ordering::Relaxed);
                    }
                    slot.generation
                },
                None => 0,
            }
        };

        self.misses.fetch_add(1, Ordering::Relaxed);
        let levels = load()?;

        let mut slots = self.slots.write();
        let slot = slots.entry(asset_id.clone()).or_default();
        if slot.generation != generation {
            self.stale_loads.fetch_add(1, Ordering::Relaxed);
            debug!(asset = %asset_id, "discarding levels loaded across an invalidation");
        } else if slot.levels.is_none() || version >= slot.version {
            slot.version = version;
            slot.levels = Some(Arc::clone(&levels));
        }
        Ok(levels)
    }

    pub fn invalidate(&self, asset_id: &AssetId) {
        let mut slots = self.slots.write();
        let slot = slots.entry(asset_id.clone()).or_default();
        slot.generation += 1;
        slot.levels = None;
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            stale_loads: self.stale_loads.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
        }
    }
}

/// Liquidity source that consults a [`SnapshotCache`] before the inner source,
/// keyed on the order store's book version
pub struct CachedLiquidity {
    inner: Arc<dyn LiquiditySource>,
    orders: Arc<dyn OrderStore>,
    cache: SnapshotCache,
}

impl CachedLiquidity {
    pub fn new(inner: Arc<dyn LiquiditySource>, orders: Arc<dyn OrderStore>) -> Self {
        Self {
            inner,
            orders,
            cache: SnapshotCache::new(),
        }
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }
}

impl LiquiditySource for CachedLiquidity {
    fn book_levels(&self, asset_id: &AssetId) -> EngineResult<Arc<BookLevels>> {
        // Read before loading: a change committed mid-load leaves a newer
        // version in the store and the next read reloads.
        let version = self
            .orders
            .book_version(asset_id)
            .map_err(|e| EngineError::read_failed("book_version", e))?;
        self.cache
            .get_or_load(asset_id, version, || self.inner.book_levels(asset_id))
    }

    fn invalidate(&self, asset_id: &AssetId) {
        self.inner.invalidate(asset_id);
        self.cache.invalidate(asset_id);
    }

    fn name(&self) -> &str {
        "cached"
    }
}
