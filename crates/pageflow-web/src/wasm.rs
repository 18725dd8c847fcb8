#![forbid(unsafe_code)]

//! `wasm-bindgen` exports for [`WebSite`].
//!
//! Everything crosses the boundary as JSON strings or numbers. Only compiled
//! on `wasm32` targets.

use core::time::Duration;

use pageflow_core::{PageIndex, SiteConfig};
use wasm_bindgen::prelude::*;

use crate::host::{HostEvent, WebSite};

fn js_error(err: impl core::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn duration_from_ms(ms: f64) -> Option<Duration> {
    (ms.is_finite() && ms >= 0.0).then(|| Duration::from_secs_f64(ms / 1000.0))
}

#[wasm_bindgen]
pub struct PageflowSite {
    inner: WebSite,
}

#[wasm_bindgen]
impl PageflowSite {
    /// Build a site from a JSON [`SiteConfig`]. `initial` is the 1-based
    /// ordinal of the page the document was loaded on.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, initial: u32, url: String) -> Result<PageflowSite, JsValue> {
        let config = SiteConfig::from_json_str(config_json).map_err(js_error)?;
        let initial = PageIndex::new(initial as usize)
            .ok_or_else(|| JsValue::from_str("initial page must be at least 1"))?;
        let inner = WebSite::new(config, initial, url).map_err(js_error)?;
        Ok(Self { inner })
    }

    /// Handle a JSON-encoded event now. Returns whether the originating
    /// click's default action must be prevented.
    pub fn dispatch(&mut self, json: &str) -> Result<bool, JsValue> {
        let event = HostEvent::from_json(json).map_err(js_error)?;
        self.inner.dispatch(event).map_err(js_error)
    }

    /// Queue a JSON-encoded event for the next step.
    #[wasm_bindgen(js_name = pushEvent)]
    pub fn push_event(&mut self, json: &str) -> bool {
        self.inner.push_encoded_event(json)
    }

    /// Advance the deterministic clock. Invalid inputs are ignored.
    #[wasm_bindgen(js_name = advanceTime)]
    pub fn advance_time(&mut self, dt_ms: f64) {
        if let Some(dt) = duration_from_ms(dt_ms) {
            self.inner.advance_time(dt);
        }
    }

    /// Process queued events and fire due timers. Returns the number of
    /// timers fired.
    pub fn step(&mut self) -> Result<u32, JsValue> {
        let result = self.inner.step().map_err(js_error)?;
        Ok(result.timers_fired as u32)
    }

    /// Drain pending surface operations as a JSON array.
    #[wasm_bindgen(js_name = takeOps)]
    pub fn take_ops(&mut self) -> Result<String, JsValue> {
        serde_json::to_string(&self.inner.take_ops()).map_err(js_error)
    }

    /// Drain pending content requests as a JSON array.
    #[wasm_bindgen(js_name = takeRequests)]
    pub fn take_requests(&mut self) -> Result<String, JsValue> {
        serde_json::to_string(&self.inner.take_requests()).map_err(js_error)
    }

    /// Ordinal of the active page.
    #[wasm_bindgen(js_name = activePage)]
    pub fn active_page(&self) -> u32 {
        self.inner.site().active().get() as u32
    }

    /// Surface checksum as `fnv1a64:<hex>`.
    pub fn checksum(&self) -> String {
        format!("fnv1a64:{:016x}", self.inner.surface().checksum())
    }
}
