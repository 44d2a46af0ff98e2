//! Unified cache trait for coordinated invalidation
//!
//! Every on-disk cache implements [`CacheLayer`] so `draftmeta cache clear`
//! can wipe them all in one pass.

/// Common interface for cache layers
pub trait CacheLayer: Send + Sync {
    /// Name of this cache layer (for logging)
    fn name(&self) -> &str;

    /// Check if this cache has any data
    fn is_populated(&self) -> bool;

    /// Remove all cached data, returning how many entries were dropped
    fn invalidate_all(&mut self) -> usize;
}

/// Coordinates invalidation across multiple cache layers
pub struct CacheCoordinator {
    layers: Vec<Box<dyn CacheLayer>>,
}

impl CacheCoordinator {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    pub fn register(&mut self, layer: Box<dyn CacheLayer>) {
        tracing::debug!("Registered cache layer: {}", layer.name());
        self.layers.push(layer);
    }

    /// Invalidate all data across all cache layers.
    /// Returns (layer name, dropped entries) per layer.
    pub fn invalidate_all(&mut self) -> Vec<(String, usize)> {
        self.layers
            .iter_mut()
            .map(|layer| {
                let dropped = layer.invalidate_all();
                tracing::debug!("Invalidated {} entries in cache layer: {}", dropped, layer.name());
                (layer.name().to_string(), dropped)
            })
            .collect()
    }

    /// Check if all layers are populated (warm cache)
    pub fn all_populated(&self) -> bool {
        self.layers.iter().all(|l| l.is_populated())
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Default for CacheCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
