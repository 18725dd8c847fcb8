#![forbid(unsafe_code)]

//! Host-driven site runner.
//!
//! [`WebSite`] owns a [`Site`] wired to the in-memory collaborators of this
//! crate and a [`DeterministicClock`]. The embedding environment pushes
//! [`HostEvent`]s (directly or as JSON), advances the clock, and calls
//! [`WebSite::step`]; afterwards it drains surface operations and content
//! requests and applies them to the real document.
//!
//! # Usage
//!
//! ```ignore
//! let mut web = WebSite::new(SiteConfig::new(["home", "archives"]), PageIndex::FIRST, "/")?;
//! let prevent = web.dispatch(HostEvent::MenuLink { page_id: "archives".into(), href: "/archives".into() })?;
//! web.advance_time(Duration::from_millis(250));
//! web.step()?;
//! for op in web.take_ops() { /* apply to DOM */ }
//! ```

use core::time::Duration;
use std::collections::VecDeque;

use pageflow_core::{
    ContentError, ContentTicket, HistoryEntry, LinkTarget, PageIndex, Site, SiteConfig,
};
use serde::{Deserialize, Serialize};

use crate::content::PendingContent;
use crate::history::MemoryHistory;
use crate::surface::{RecordingSurface, SurfaceOp};
use crate::{DeterministicClock, WebError};

/// Site assembled from the recording collaborators.
pub type WebSiteInner = Site<RecordingSurface, MemoryHistory, PendingContent>;

/// Result of a content fetch as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ContentOutcome {
    Loaded { markup: String },
    NotFound,
    Failed { reason: String },
}

/// One input from the embedding environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HostEvent {
    /// A navigation-menu link was clicked.
    MenuLink { page_id: String, href: String },
    /// A link inside page content was clicked.
    BodyLink {
        href: String,
        #[serde(default)]
        target: Option<String>,
    },
    /// Browser back, served from the in-memory history.
    Back,
    /// Browser forward, served from the in-memory history.
    Forward,
    /// A history entry restored by the host's own history.
    Popstate { item: PageIndex, url: String },
    MenuToggle,
    OutsideClick,
    ContentLoaded {
        ticket: ContentTicket,
        outcome: ContentOutcome,
    },
}

impl HostEvent {
    /// Parse a JSON-encoded event.
    pub fn from_json(json: &str) -> Result<Self, WebError> {
        serde_json::from_str(json).map_err(|e| WebError::Json(e.to_string()))
    }
}

/// Outcome of processing queued events and due timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepResult {
    pub events_processed: usize,
    pub timers_fired: usize,
    /// Whether any surface operations are waiting to be drained.
    pub dirty: bool,
}

pub struct WebSite {
    site: WebSiteInner,
    clock: DeterministicClock,
    queue: VecDeque<HostEvent>,
}

impl core::fmt::Debug for WebSite {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WebSite")
            .field("site", &self.site)
            .field("clock", &self.clock)
            .field("queued", &self.queue.len())
            .finish()
    }
}

impl WebSite {
    /// Build and start a site whose page `initial` was loaded at `url`.
    pub fn new(
        config: SiteConfig,
        initial: PageIndex,
        url: impl Into<String>,
    ) -> Result<Self, WebError> {
        let page_count = config.page_list().len();
        let surface = RecordingSurface::new(page_count, initial);
        let mut site = Site::new(
            config,
            initial,
            url,
            surface,
            MemoryHistory::new(),
            PendingContent::new(),
        )?;
        site.start();
        tracing::debug!(target: "pageflow.web", page_count, initial = initial.get(), "site started");
        Ok(Self {
            site,
            clock: DeterministicClock::new(),
            queue: VecDeque::new(),
        })
    }

    /// Queue an event for the next [`step`](Self::step).
    pub fn push_event(&mut self, event: HostEvent) {
        self.queue.push_back(event);
    }

    /// Parse and queue a JSON-encoded event. Returns `false` when malformed.
    pub fn push_encoded_event(&mut self, json: &str) -> bool {
        match HostEvent::from_json(json) {
            Ok(event) => {
                self.push_event(event);
                true
            }
            Err(err) => {
                tracing::warn!(target: "pageflow.web", error = %err, "malformed host event");
                false
            }
        }
    }

    /// Handle one event immediately.
    ///
    /// Returns whether the host must prevent the browser's default action
    /// for the click that produced it.
    pub fn dispatch(&mut self, event: HostEvent) -> Result<bool, WebError> {
        let prevent_default = match event {
            HostEvent::MenuLink { page_id, href } => {
                self.site.on_menu_link(&page_id, &href)?.prevents_default()
            }
            HostEvent::BodyLink { href, target } => {
                let target = LinkTarget::from_attr(target.as_deref());
                self.site.on_body_link(&href, target)?.prevents_default()
            }
            HostEvent::Back => {
                if let Some(entry) = self.site.history_mut().back() {
                    self.site.on_history_replay(&entry)?;
                }
                false
            }
            HostEvent::Forward => {
                if let Some(entry) = self.site.history_mut().forward() {
                    self.site.on_history_replay(&entry)?;
                }
                false
            }
            HostEvent::Popstate { item, url } => {
                self.site.on_history_replay(&HistoryEntry::new(item, url))?;
                false
            }
            HostEvent::MenuToggle => {
                self.site.on_menu_toggle();
                true
            }
            HostEvent::OutsideClick => {
                self.site.on_outside_click();
                false
            }
            HostEvent::ContentLoaded { ticket, outcome } => {
                let result = match outcome {
                    ContentOutcome::Loaded { markup } => Ok(markup),
                    ContentOutcome::NotFound => {
                        let path = self.last_requested_path(ticket);
                        Err(ContentError::NotFound(path))
                    }
                    ContentOutcome::Failed { reason } => Err(ContentError::Failed(reason)),
                };
                self.site.on_content_loaded(ticket, result);
                false
            }
        };
        Ok(prevent_default)
    }

    /// Fire timers up to the clock, then process every queued event.
    ///
    /// Events that fail are logged and skipped; the first error is returned
    /// after the queue is drained.
    pub fn step(&mut self) -> Result<StepResult, WebError> {
        let mut result = StepResult::default();
        let dt = self.clock.now().saturating_sub(self.site.now());
        result.timers_fired = self.site.advance(dt);

        let mut first_error = None;
        while let Some(event) = self.queue.pop_front() {
            result.events_processed += 1;
            if let Err(err) = self.dispatch(event) {
                tracing::warn!(target: "pageflow.web", error = %err, "host event rejected");
                first_error.get_or_insert(err);
            }
        }
        result.dirty = !self.site.surface().pending_ops().is_empty();
        match first_error {
            Some(err) => Err(err),
            None => Ok(result),
        }
    }

    /// Advance the host clock. Timers fire on the next step.
    pub fn advance_time(&mut self, dt: Duration) {
        self.clock.advance(dt);
    }

    /// Set the host clock to an absolute time. Time never runs backwards.
    pub fn set_time(&mut self, now: Duration) {
        if now >= self.clock.now() {
            self.clock.set(now);
        }
    }

    /// Drain surface operations for the host to apply.
    pub fn take_ops(&mut self) -> Vec<SurfaceOp> {
        self.site.surface_mut().take_ops()
    }

    /// Drain content requests for the host to fetch.
    pub fn take_requests(&mut self) -> Vec<pageflow_core::ContentRequest> {
        self.site.content_mut().take_requests()
    }

    #[must_use]
    pub fn clock(&self) -> &DeterministicClock {
        &self.clock
    }

    #[must_use]
    pub fn site(&self) -> &WebSiteInner {
        &self.site
    }

    pub fn site_mut(&mut self) -> &mut WebSiteInner {
        &mut self.site
    }

    #[must_use]
    pub fn surface(&self) -> &RecordingSurface {
        self.site.surface()
    }

    #[must_use]
    pub fn history(&self) -> &MemoryHistory {
        self.site.history()
    }

    #[must_use]
    pub fn queued_events(&self) -> usize {
        self.queue.len()
    }

    fn last_requested_path(&self, ticket: ContentTicket) -> String {
        self.site
            .synchronizer()
            .awaiting_path(ticket)
            .or_else(|| self.site.content().find(ticket).map(|r| r.path.as_str()))
            .unwrap_or(self.site.last_entry().url.as_str())
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn idx(n: usize) -> PageIndex {
        PageIndex::new(n).unwrap()
    }

    fn web() -> WebSite {
        WebSite::new(
            SiteConfig::new(["home", "projects", "archives", "contact"]),
            PageIndex::FIRST,
            "/",
        )
        .unwrap()
    }

    #[test]
    fn event_json_uses_kind_tag() {
        let event = HostEvent::from_json(r#"{"kind":"menu_link","page_id":"archives","href":"/archives"}"#)
            .unwrap();
        assert_eq!(
            event,
            HostEvent::MenuLink {
                page_id: "archives".into(),
                href: "/archives".into()
            }
        );

        let body = HostEvent::from_json(r#"{"kind":"body_link","href":"/x"}"#).unwrap();
        assert_eq!(
            body,
            HostEvent::BodyLink {
                href: "/x".into(),
                target: None
            }
        );
    }

    #[test]
    fn popstate_rejects_zero_item() {
        assert!(HostEvent::from_json(r#"{"kind":"popstate","item":0,"url":"/"}"#).is_err());
    }

    #[test]
    fn malformed_event_is_refused() {
        let mut web = web();
        assert!(!web.push_encoded_event("not json"));
        assert!(!web.push_encoded_event(r#"{"kind":"teleport"}"#));
        assert_eq!(web.queued_events(), 0);
    }

    #[test]
    fn timers_fire_only_on_step() {
        let mut web = web();
        web.dispatch(HostEvent::MenuLink {
            page_id: "projects".into(),
            href: "/projects".into(),
        })
        .unwrap();
        web.advance_time(Duration::from_millis(250));
        assert_eq!(web.surface().visible_pages(), vec![idx(1), idx(2)]);

        let result = web.step().unwrap();
        assert_eq!(result.events_processed, 0);
        assert_eq!(result.timers_fired, 2);
        assert_eq!(web.surface().visible_pages(), vec![idx(2)]);
    }

    #[test]
    fn not_found_names_the_requested_path() {
        let mut web = web();
        web.dispatch(HostEvent::BodyLink {
            href: "/a.html".into(),
            target: None,
        })
        .unwrap();
        web.advance_time(Duration::from_millis(100));
        web.step().unwrap();
        let requests = web.take_requests();
        assert_eq!(requests.len(), 1);

        // The host already drained the queue; the path still resolves.
        assert_eq!(web.last_requested_path(requests[0].ticket), "/a.html");
    }

    #[test]
    fn set_time_never_rewinds() {
        let mut web = web();
        web.set_time(Duration::from_millis(500));
        web.set_time(Duration::from_millis(100));
        assert_eq!(web.clock().now(), Duration::from_millis(500));
    }

    #[test]
    fn step_reports_first_error_after_draining() {
        let mut web = web();
        web.push_event(HostEvent::Popstate {
            item: idx(9),
            url: "/gone".into(),
        });
        web.push_event(HostEvent::MenuToggle);
        let err = web.step().unwrap_err();
        assert!(matches!(err, WebError::Site(_)));
        assert_eq!(web.queued_events(), 0);
        assert!(web.site().menu().is_open());
    }
}
