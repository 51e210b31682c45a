use std::collections::HashMap;

use egui::{ColorImage, Context, TextureHandle, TextureId, TextureOptions};
use uuid::Uuid;

/// Caches GPU textures for overlay thumbnails and editor images,
/// keyed by (owner key, version), with LRU pruning.
pub struct TextureCache {
    cache: HashMap<(u64, u64), TextureHandle>,
    /// Tracks when each texture was last used
    last_used: HashMap<(u64, u64), u64>,
    /// Current frame counter for LRU tracking
    current_frame: u64,
    max_cache_size: usize,
}

/// Cache key for a stored overlay
pub fn overlay_key(id: &Uuid) -> u64 {
    id.as_u128() as u64
}

impl TextureCache {
    pub fn new(max_cache_size: usize) -> Self {
        Self {
            cache: HashMap::new(),
            last_used: HashMap::new(),
            current_frame: 0,
            max_cache_size,
        }
    }

    /// Increments the frame counter, should be called at the start of each frame
    pub fn begin_frame(&mut self) {
        self.current_frame += 1;
    }

    /// Gets or creates a texture for the given owner/version pair.
    pub fn get_or_create<F>(&mut self, key: u64, version: u64, generator: F, ctx: &Context) -> TextureId
    where
        F: FnOnce() -> ColorImage,
    {
        let cache_key = (key, version);

        if let Some(handle) = self.cache.get(&cache_key) {
            self.last_used.insert(cache_key, self.current_frame);
            return handle.id();
        }

        self.prune_if_needed();

        let name = format!("raster_{key}_v{version}");
        let handle = ctx.load_texture(&name, generator(), TextureOptions::LINEAR);

        self.cache.insert(cache_key, handle.clone());
        self.last_used.insert(cache_key, self.current_frame);
        handle.id()
    }

    /// Drop every cached texture for one owner.
    pub fn invalidate(&mut self, key: u64) {
        let stale: Vec<(u64, u64)> = self
            .cache
            .keys()
            .filter(|(k, _)| *k == key)
            .cloned()
            .collect();
        for cache_key in stale {
            self.cache.remove(&cache_key);
            self.last_used.remove(&cache_key);
        }
    }

    fn prune_if_needed(&mut self) {
        if self.cache.len() <= self.max_cache_size {
            return;
        }

        let mut entries: Vec<((u64, u64), u64)> =
            self.last_used.iter().map(|(k, v)| (*k, *v)).collect();
        entries.sort_by_key(|(_, frame)| *frame);

        let to_remove = entries.len() - self.max_cache_size;
        for (cache_key, _) in entries.iter().take(to_remove) {
            self.cache.remove(cache_key);
            self.last_used.remove(cache_key);
        }
    }

    pub fn clear(&mut self) {
        self.cache.clear();
        self.last_used.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    #[cfg(test)]
    fn contains(&self, key: u64, version: u64) -> bool {
        self.cache.contains_key(&(key, version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_image() -> ColorImage {
        ColorImage::new([4, 4], egui::Color32::WHITE)
    }

    #[test]
    fn cache_hit_returns_same_texture() {
        let ctx = Context::default();
        let mut cache = TextureCache::new(8);

        let first = cache.get_or_create(1, 0, test_image, &ctx);
        let second = cache.get_or_create(1, 0, test_image, &ctx);

        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn invalidation_drops_all_versions() {
        let ctx = Context::default();
        let mut cache = TextureCache::new(8);

        cache.get_or_create(1, 0, test_image, &ctx);
        cache.get_or_create(1, 1, test_image, &ctx);
        cache.get_or_create(2, 0, test_image, &ctx);

        cache.invalidate(1);
        assert!(!cache.contains(1, 0));
        assert!(!cache.contains(1, 1));
        assert!(cache.contains(2, 0));
    }

    #[test]
    fn lru_prunes_oldest_entry() {
        let ctx = Context::default();
        let mut cache = TextureCache::new(2);

        cache.get_or_create(1, 0, test_image, &ctx);
        cache.begin_frame();
        cache.get_or_create(2, 0, test_image, &ctx);
        cache.begin_frame();
        cache.get_or_create(3, 0, test_image, &ctx);

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(1, 0));
        assert!(cache.contains(2, 0));
        assert!(cache.contains(3, 0));
    }
}
