//! Model loading
//!
//! - `provider`: one model through the cache or the network
//! - `loader`: the whole chain, primary first
//! - `glb`: container validation and material counting
//! - `cache`: freshness-windowed byte cache

pub mod cache;
pub mod glb;
pub mod loader;
pub mod provider;

pub use cache::{AssetCache, CacheEntry, Clock, ManualClock, MemoryCache, SystemClock, FRESHNESS_WINDOW_MS};
pub use glb::RenderableModel;
pub use loader::{load_models, LoadReport};
pub use provider::{AssetMetadata, AssetProvider, AssetSource, LoadProgress, LoadedAsset};

#[cfg(test)]
pub(crate) use test_source::StubSource;
