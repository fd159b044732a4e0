//! Browser adapters: DOM status line and buttons, `fetch` model source,
//! `localStorage` model cache

use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::debug;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlButtonElement, HtmlElement, Response, Storage};

use crate::assets::{AssetCache, AssetSource, CacheEntry};
use crate::error::{AssetLoadError, CacheUnavailable};
use crate::status::{Controls, StatusSink};

fn js_reason(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

/// Element ids the status sink looks up
#[derive(Debug, Clone, Copy)]
pub struct DomIds<'a> {
    pub status: &'a str,
    pub start: &'a str,
    pub reset: &'a str,
    /// Gets the `active` class while a transition runs
    pub overlay: &'a str,
}

/// Status text, buttons and busy overlay found by element id.
///
/// Missing elements are skipped; the demo still runs without them.
pub struct DomStatus {
    status: Option<HtmlElement>,
    start_button: Option<HtmlButtonElement>,
    reset_button: Option<HtmlButtonElement>,
    overlay: Option<HtmlElement>,
}

impl DomStatus {
    pub fn from_document(ids: DomIds<'_>) -> Self {
        let document = web_sys::window().and_then(|w| w.document());
        let find = |id: &str| document.as_ref().and_then(|d| d.get_element_by_id(id));

        Self {
            status: find(ids.status).and_then(|e| e.dyn_into::<HtmlElement>().ok()),
            start_button: find(ids.start).and_then(|e| e.dyn_into::<HtmlButtonElement>().ok()),
            reset_button: find(ids.reset).and_then(|e| e.dyn_into::<HtmlButtonElement>().ok()),
            overlay: find(ids.overlay).and_then(|e| e.dyn_into::<HtmlElement>().ok()),
        }
    }
}

impl StatusSink for DomStatus {
    fn set_status(&mut self, text: &str) {
        if let Some(el) = &self.status {
            el.set_text_content(Some(text));
        }
    }

    fn set_controls(&mut self, controls: Controls) {
        if let Some(button) = &self.start_button {
            button.set_disabled(!controls.start_enabled);
        }
        if let Some(button) = &self.reset_button {
            button.set_disabled(!controls.reset_enabled);
            let display = if controls.reset_enabled { "inline-block" } else { "none" };
            if let Err(e) = button.style().set_property("display", display) {
                debug!("could not toggle reset button: {}", js_reason(&e));
            }
        }
        if let Some(overlay) = &self.overlay {
            if let Err(e) = overlay.class_list().toggle_with_force("active", controls.busy) {
                debug!("could not toggle overlay: {}", js_reason(&e));
            }
        }
    }
}

/// Downloads models with the page's `fetch`
#[derive(Debug, Default, Clone, Copy)]
pub struct FetchAssetSource;

impl AssetSource for FetchAssetSource {
    async fn fetch(&self, url: &str, on_progress: &dyn Fn(u64, u64)) -> Result<Vec<u8>, AssetLoadError> {
        let network = |e: JsValue| AssetLoadError::Network {
            url: url.to_string(),
            reason: js_reason(&e),
        };

        let window = web_sys::window().ok_or_else(|| AssetLoadError::Network {
            url: url.to_string(),
            reason: "no window".to_string(),
        })?;

        let response: Response = JsFuture::from(window.fetch_with_str(url))
            .await
            .map_err(network)?
            .dyn_into()
            .map_err(network)?;

        if !response.ok() {
            return Err(AssetLoadError::Http {
                url: url.to_string(),
                status: response.status(),
            });
        }

        let total = response
            .headers()
            .get("content-length")
            .ok()
            .flatten()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);
        on_progress(0, total);

        let buffer = JsFuture::from(response.array_buffer().map_err(network)?)
            .await
            .map_err(network)?;
        let bytes = js_sys::Uint8Array::new(&buffer).to_vec();

        let len = bytes.len() as u64;
        on_progress(len, total.max(len));
        Ok(bytes)
    }
}

/// Serialized form of a cache entry in `localStorage`
#[derive(Serialize, Deserialize)]
struct StoredEntry {
    stored_at_ms: u64,
    data: String,
}

pub(crate) fn encode_entry(entry: &CacheEntry) -> Result<String, CacheUnavailable> {
    let stored = StoredEntry {
        stored_at_ms: entry.stored_at_ms,
        data: STANDARD.encode(&entry.bytes),
    };
    serde_json::to_string(&stored).map_err(|e| CacheUnavailable(e.to_string()))
}

pub(crate) fn decode_entry(text: &str) -> Option<CacheEntry> {
    let stored: StoredEntry = serde_json::from_str(text).ok()?;
    let bytes = STANDARD.decode(stored.data).ok()?;
    Some(CacheEntry {
        bytes,
        stored_at_ms: stored.stored_at_ms,
    })
}

/// Model cache in `window.localStorage`, base64 encoded under a key prefix
pub struct LocalStorageCache {
    storage: Storage,
    prefix: String,
}

impl LocalStorageCache {
    /// Fails when storage is disabled (private mode, sandboxed frames)
    pub fn open(prefix: &str) -> Result<Self, CacheUnavailable> {
        let window = web_sys::window().ok_or_else(|| CacheUnavailable("no window".into()))?;
        let storage = window
            .local_storage()
            .map_err(|e| CacheUnavailable(js_reason(&e)))?
            .ok_or_else(|| CacheUnavailable("localStorage disabled".into()))?;
        Ok(Self {
            storage,
            prefix: prefix.to_string(),
        })
    }

    fn key(&self, url: &str) -> String {
        format!("{}{}", self.prefix, url)
    }
}

impl AssetCache for LocalStorageCache {
    fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheUnavailable> {
        let key = self.key(key);
        let Some(text) = self.storage.get_item(&key).map_err(|e| CacheUnavailable(js_reason(&e)))? else {
            return Ok(None);
        };
        match decode_entry(&text) {
            Some(entry) => Ok(Some(entry)),
            None => {
                debug!("discarding unreadable cache entry {}", key);
                if let Err(e) = self.storage.remove_item(&key) {
                    debug!("could not remove cache entry {}: {}", key, js_reason(&e));
                }
                Ok(None)
            }
        }
    }

    fn put(&self, key: &str, entry: CacheEntry) -> Result<(), CacheUnavailable> {
        let text = encode_entry(&entry)?;
        self.storage
            .set_item(&self.key(key), &text)
            .map_err(|e| CacheUnavailable(js_reason(&e)))
    }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use wasm_bindgen_test::*;

    use super::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_local_storage_round_trip() {
        let cache = LocalStorageCache::open("creature-evolution-test:").unwrap();
        let entry = CacheEntry { bytes: vec![9, 8, 7], stored_at_ms: 1 };
        cache.put("model.glb", entry.clone()).unwrap();
        assert_eq!(cache.get("model.glb").unwrap(), Some(entry));
        assert_eq!(cache.get("other.glb").unwrap(), None);
    }

    #[wasm_bindgen_test]
    fn test_unreadable_entry_removed() {
        let cache = LocalStorageCache::open("creature-evolution-test:").unwrap();
        cache.storage.set_item("creature-evolution-test:bad.glb", "not json").unwrap();
        assert_eq!(cache.get("bad.glb").unwrap(), None);
        assert_eq!(cache.storage.get_item("creature-evolution-test:bad.glb").unwrap(), None);
    }

    const TEST_IDS: DomIds<'static> = DomIds {
        status: "test-status",
        start: "test-evolve",
        reset: "test-reset",
        overlay: "test-overlay",
    };

    fn mount(tag: &str, id: &str) -> HtmlElement {
        let document = web_sys::window().unwrap().document().unwrap();
        let el = document.create_element(tag).unwrap();
        el.set_id(id);
        document.body().unwrap().append_child(&el).unwrap();
        el.dyn_into().unwrap()
    }

    #[wasm_bindgen_test]
    fn test_dom_status_without_elements() {
        let mut status = DomStatus::from_document(DomIds {
            status: "no-such-status",
            start: "no-such-start",
            reset: "no-such-reset",
            overlay: "no-such-overlay",
        });
        status.set_status("hello");
        status.set_controls(Controls { start_enabled: true, reset_enabled: true, busy: true });
    }

    #[wasm_bindgen_test]
    fn test_dom_status_drives_buttons_and_overlay() {
        let text = mount("div", TEST_IDS.status);
        let start = mount("button", TEST_IDS.start);
        let reset = mount("button", TEST_IDS.reset);
        let overlay = mount("div", TEST_IDS.overlay);
        let mut status = DomStatus::from_document(TEST_IDS);

        status.set_status("Evolving...");
        status.set_controls(Controls { start_enabled: false, reset_enabled: false, busy: true });
        assert_eq!(text.text_content().as_deref(), Some("Evolving..."));
        assert!(start.has_attribute("disabled"));
        assert_eq!(reset.style().get_property_value("display").unwrap(), "none");
        assert!(overlay.class_list().contains("active"));

        status.set_controls(Controls { start_enabled: false, reset_enabled: true, busy: false });
        assert!(!reset.has_attribute("disabled"));
        assert_eq!(reset.style().get_property_value("display").unwrap(), "inline-block");
        assert!(!overlay.class_list().contains("active"));

        for el in [text, start, reset, overlay] {
            el.remove();
        }
    }
}
