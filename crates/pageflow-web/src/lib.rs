#![forbid(unsafe_code)]

//! `pageflow-web` embeds the pageflow state machines in a browser host.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding environment (JS) pushes clicks,
//!   history moves and fetch results, and drains style operations and
//!   content requests.
//! - **Deterministic time**: the host advances a monotonic clock explicitly;
//!   timers fire only inside [`host::WebSite::step`].
//! - **No blocking / no threads**: suitable for `wasm32-unknown-unknown`.
//!
//! The `wasm-bindgen` facade is compiled only on `wasm32`; everything else
//! runs natively so sessions can be recorded and replayed in tests.

pub mod content;
pub mod history;
pub mod host;
pub mod session_record;
pub mod surface;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::PageflowSite;

pub use content::PendingContent;
pub use history::MemoryHistory;
pub use host::{ContentOutcome, HostEvent, StepResult, WebSite};
pub use surface::{PageView, RecordingSurface, SurfaceOp};

use core::time::Duration;

use pageflow_core::{ConfigError, SiteError};

/// Web embedding error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebError {
    /// A navigation was rejected by the site.
    Site(SiteError),
    /// The site configuration could not be loaded.
    Config(String),
    /// A host message was not valid JSON for its schema.
    Json(String),
}

impl core::fmt::Display for WebError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Site(e) => write!(f, "site error: {e}"),
            Self::Config(msg) => write!(f, "config error: {msg}"),
            Self::Json(msg) => write!(f, "JSON error: {msg}"),
        }
    }
}

impl std::error::Error for WebError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Site(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SiteError> for WebError {
    fn from(e: SiteError) -> Self {
        Self::Site(e)
    }
}

impl From<ConfigError> for WebError {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Invalid(site) => Self::Site(site),
            other => Self::Config(other.to_string()),
        }
    }
}

/// Deterministic monotonic clock controlled by the host.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    /// Current monotonic time.
    #[inline]
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Set current monotonic time.
    pub fn set(&mut self, now: Duration) {
        self.now = now;
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_advances_and_saturates() {
        let mut clock = DeterministicClock::new();
        clock.advance(Duration::from_millis(16));
        assert_eq!(clock.now(), Duration::from_millis(16));
        clock.set(Duration::MAX);
        clock.advance(Duration::from_secs(1));
        assert_eq!(clock.now(), Duration::MAX);
    }

    #[test]
    fn invalid_config_maps_to_site_error() {
        let err: WebError = ConfigError::Invalid(SiteError::EmptyRegistry).into();
        assert_eq!(err, WebError::Site(SiteError::EmptyRegistry));
        assert_eq!(err.to_string(), "site error: page list is empty");
    }
}
