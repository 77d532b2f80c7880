use std::collections::HashMap;
use std::sync::Arc;

use crate::mask::shape::{Mask, ViewportShape, generate_mask};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct MaskKey {
    kind: u8,
    params: [u64; 4],
    w: u32,
    h: u32,
}

impl MaskKey {
    fn new(shape: &ViewportShape, w: u32, h: u32) -> Self {
        let (kind, params) = match *shape {
            ViewportShape::Rect { width, height } => (0, [width.to_bits(), height.to_bits(), 0, 0]),
            ViewportShape::Circle { radius } => (1, [radius.to_bits(), 0, 0, 0]),
            ViewportShape::Ellipse { rx, ry } => (2, [rx.to_bits(), ry.to_bits(), 0, 0]),
            ViewportShape::Dome {
                width,
                height,
                arch_height,
                segments,
            } => (
                3,
                [
                    width.to_bits(),
                    height.to_bits(),
                    arch_height.to_bits(),
                    u64::from(segments),
                ],
            ),
        };
        Self {
            kind,
            params,
            w,
            h,
        }
    }
}

/// Default [`MaskCache`] entry cap.
pub const DEFAULT_MASK_CACHE_ENTRIES: usize = 256;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MaskCacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Number of wholesale clears (resizes).
    pub invalidations: u64,
    /// Number of times the entry cap was reached and the cache emptied.
    pub evictions: u64,
}

/// Content-addressed mask store, keyed by shape kind, exact parameters and raster size.
///
/// Entries are immutable once generated and otherwise live until [`MaskCache::clear`]. A viewport
/// whose shape changes every frame adds a new entry every frame, so the cache empties itself
/// wholesale once it holds `max_entries` masks. The cache is owned by a compositor; there is no
/// shared global instance.
#[derive(Debug)]
pub struct MaskCache {
    entries: HashMap<MaskKey, Arc<Mask>>,
    stats: MaskCacheStats,
    max_entries: usize,
}

impl Default for MaskCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MaskCache {
    pub fn new() -> Self {
        Self::with_max_entries(DEFAULT_MASK_CACHE_ENTRIES)
    }

    /// Cache holding at most `max_entries` masks (at least one).
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            stats: MaskCacheStats::default(),
            max_entries: max_entries.max(1),
        }
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn get_or_generate(&mut self, shape: &ViewportShape, w: u32, h: u32) -> Arc<Mask> {
        let key = MaskKey::new(shape, w, h);
        if let Some(m) = self.entries.get(&key) {
            self.stats.hits += 1;
            return Arc::clone(m);
        }
        self.stats.misses += 1;
        if self.entries.len() >= self.max_entries {
            tracing::debug!(entries = self.entries.len(), "mask cache full, emptying");
            self.entries.clear();
            self.stats.evictions += 1;
        }
        let m = Arc::new(generate_mask(shape, w, h));
        self.entries.insert(key, Arc::clone(&m));
        m
    }

    pub fn clear(&mut self) {
        tracing::debug!(entries = self.entries.len(), "mask cache invalidated");
        self.entries.clear();
        self.stats.invalidations += 1;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> MaskCacheStats {
        self.stats
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mask/cache.rs"]
mod tests;
