//! Model fetching with a cache in front

use log::debug;

use super::cache::{AssetCache, CacheEntry, Clock, SystemClock, FRESHNESS_WINDOW_MS};
use super::glb::{self, RenderableModel};
use crate::error::AssetLoadError;

/// Where model bytes come from (HTTP in the browser, a map in tests)
#[allow(async_fn_in_trait)]
pub trait AssetSource {
    /// Fetch the whole file, reporting `(loaded_bytes, total_bytes)` as it
    /// arrives. `total_bytes` is 0 when the size is unknown.
    async fn fetch(&self, url: &str, on_progress: &dyn Fn(u64, u64)) -> Result<Vec<u8>, AssetLoadError>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadProgress {
    pub loaded: u64,
    pub total: u64,
    pub from_cache: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetMetadata {
    pub url: String,
    pub byte_len: usize,
    pub from_cache: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedAsset {
    pub model: RenderableModel,
    pub metadata: AssetMetadata,
}

pub struct AssetProvider<S, C = SystemClock> {
    source: S,
    cache: Option<Box<dyn AssetCache>>,
    clock: C,
    freshness_ms: u64,
}

impl<S: AssetSource> AssetProvider<S> {
    pub fn new(source: S) -> Self {
        Self::with_clock(source, SystemClock)
    }
}

impl<S: AssetSource, C: Clock> AssetProvider<S, C> {
    pub fn with_clock(source: S, clock: C) -> Self {
        Self {
            source,
            cache: None,
            clock,
            freshness_ms: FRESHNESS_WINDOW_MS,
        }
    }

    pub fn with_cache(mut self, cache: Box<dyn AssetCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Load one model, from the cache when a fresh copy exists
    pub async fn resolve(
        &self,
        url: &str,
        on_progress: &dyn Fn(LoadProgress),
    ) -> Result<LoadedAsset, AssetLoadError> {
        if let Some(bytes) = self.cached(url) {
            let len = bytes.len() as u64;
            on_progress(LoadProgress { loaded: len, total: len, from_cache: true });
            return self.finish(url, bytes, true);
        }

        let report = |loaded: u64, total: u64| on_progress(LoadProgress { loaded, total, from_cache: false });
        let bytes = self.source.fetch(url, &report).await?;
        let asset = self.finish(url, bytes, false)?;
        self.store(url, &asset.model.bytes);
        Ok(asset)
    }

    fn finish(&self, url: &str, bytes: Vec<u8>, from_cache: bool) -> Result<LoadedAsset, AssetLoadError> {
        let byte_len = bytes.len();
        let model = glb::inspect(url, bytes)?;
        Ok(LoadedAsset {
            model,
            metadata: AssetMetadata {
                url: url.to_string(),
                byte_len,
                from_cache,
            },
        })
    }

    fn cached(&self, url: &str) -> Option<Vec<u8>> {
        let cache = self.cache.as_ref()?;
        match cache.get(url) {
            Ok(Some(entry)) if entry.is_fresh(self.clock.now_ms(), self.freshness_ms) => {
                debug!("Cache hit for {}", url);
                Some(entry.bytes)
            }
            Ok(Some(_)) => {
                debug!("Cached copy of {} expired", url);
                None
            }
            Ok(None) => {
                debug!("Cache miss for {}", url);
                None
            }
            Err(e) => {
                debug!("{}; fetching {} from network", e, url);
                None
            }
        }
    }

    fn store(&self, url: &str, bytes: &[u8]) {
        let Some(cache) = &self.cache else {
            return;
        };
        let entry = CacheEntry {
            bytes: bytes.to_vec(),
            stored_at_ms: self.clock.now_ms(),
        };
        if let Err(e) = cache.put(url, entry) {
            debug!("Could not cache {}: {}", url, e);
        }
    }
}
