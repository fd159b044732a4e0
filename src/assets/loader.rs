//! Loading the whole chain: the first model alone, then the rest together

use futures::future::join_all;
use log::{info, warn};

use super::cache::Clock;
use super::provider::{AssetProvider, AssetSource, LoadProgress, LoadedAsset};
use crate::error::AssetLoadError;

/// Outcome of loading every level's model
#[derive(Debug, Default)]
pub struct LoadReport {
    /// One slot per requested URL; `None` where the load failed
    pub assets: Vec<Option<LoadedAsset>>,
    pub failures: Vec<AssetLoadError>,
}

impl LoadReport {
    pub fn loaded_count(&self) -> usize {
        self.assets.iter().filter(|a| a.is_some()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Load `urls[0]` first, then every other URL concurrently.
///
/// A failure on the first model is returned as the error. Failures on the
/// rest are recorded in the report and do not stop the others. Progress is
/// reported with the index of the URL it belongs to.
pub async fn load_models<S: AssetSource, C: Clock>(
    provider: &AssetProvider<S, C>,
    urls: &[String],
    on_progress: &dyn Fn(usize, LoadProgress),
) -> Result<LoadReport, AssetLoadError> {
    let Some(primary_url) = urls.first() else {
        return Ok(LoadReport::default());
    };

    let primary = provider.resolve(primary_url, &|p| on_progress(0, p)).await?;
    info!("Loaded {} ({} bytes)", primary_url, primary.metadata.byte_len);

    let pending = urls.iter().enumerate().skip(1).map(|(index, url)| async move {
        let report = move |p: LoadProgress| on_progress(index, p);
        provider.resolve(url, &report).await
    });
    let settled = join_all(pending).await;

    let mut report = LoadReport {
        assets: Vec::with_capacity(urls.len()),
        failures: Vec::new(),
    };
    report.assets.push(Some(primary));
    for result in settled {
        match result {
            Ok(asset) => report.assets.push(Some(asset)),
            Err(e) => {
                warn!("{}", e);
                report.assets.push(None);
                report.failures.push(e);
            }
        }
    }

    info!("Loaded {} of {} models", report.loaded_count(), urls.len());
    Ok(report)
}
