#![forbid(unsafe_code)]

//! The assembled site: every state machine plus its collaborators.
//!
//! [`Site`] owns the page registry, the transition engine, the history
//! synchronizer, the menu toggle and the timer queue, and routes host events
//! and fired timers to them. It is plain single-threaded data: no locks, no
//! threads, nothing that blocks.
//!
//! # Usage
//!
//! ```ignore
//! let config = SiteConfig::new(["home", "projects", "archives", "contact"]);
//! let mut site = Site::new(config, PageIndex::FIRST, "/", surface, history, content)?;
//! site.start();
//!
//! site.on_menu_link("archives", "/archives")?;
//! site.advance(Duration::from_millis(250));
//! ```

use core::time::Duration;

use crate::config::SiteConfig;
use crate::content::{ContentSource, ContentTicket};
use crate::error::{ContentError, SiteError};
use crate::history::{
    Collaborators, HistoryEntry, HistoryStack, HistorySynchronizer, LinkOutcome, LinkTarget,
    NavigationKind, ReplayOutcome,
};
use crate::menu::{MenuPhase, MenuToggle};
use crate::page::{PageIndex, PageRegistry};
use crate::surface::{PostProcess, RenderSurface};
use crate::timer::{TimerHandle, TimerKind, TimerQueue};
use crate::transition::TransitionEngine;

pub struct Site<S, H, C> {
    registry: PageRegistry,
    engine: TransitionEngine,
    sync: HistorySynchronizer,
    menu: MenuToggle,
    timers: TimerQueue<TimerKind>,
    surface: S,
    history: H,
    content: C,
    hooks: Vec<Box<dyn PostProcess>>,
}

impl<S, H, C> core::fmt::Debug for Site<S, H, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Site")
            .field("page_count", &self.registry.len())
            .field("active", &self.sync.state().active())
            .field("menu", &self.menu.phase())
            .field("pending_timers", &self.timers.len())
            .field("now", &self.timers.now())
            .finish_non_exhaustive()
    }
}

impl<S, H, C> Site<S, H, C>
where
    S: RenderSurface,
    H: HistoryStack,
    C: ContentSource,
{
    /// Assemble a site whose page `initial` was loaded at `initial_url`.
    pub fn new(
        config: SiteConfig,
        initial: PageIndex,
        initial_url: impl Into<String>,
        surface: S,
        history: H,
        content: C,
    ) -> Result<Self, SiteError> {
        let registry = config.registry()?;
        if !registry.contains(initial) {
            return Err(SiteError::UnknownPage {
                index: initial.get(),
                page_count: registry.len(),
            });
        }
        let window = config.transition.page_duration;
        let menu = MenuToggle::new(config.menu, registry.len());
        Ok(Self {
            engine: TransitionEngine::new(config.transition),
            sync: HistorySynchronizer::new(initial, initial_url, config.content, window),
            menu,
            registry,
            timers: TimerQueue::new(),
            surface,
            history,
            content,
            hooks: Vec::new(),
        })
    }

    /// Record the initial page in the current history entry.
    pub fn start(&mut self) {
        self.sync.start(&mut self.history);
    }

    /// Register a post-processing hook run after every content insertion.
    pub fn add_post_process(&mut self, hook: Box<dyn PostProcess>) {
        self.hooks.push(hook);
    }

    /// Navigate directly, bypassing the link guards.
    pub fn navigate(
        &mut self,
        target: PageIndex,
        url: impl Into<String>,
        is_replay: bool,
    ) -> Result<NavigationKind, SiteError> {
        let mut cx = Collaborators {
            registry: &self.registry,
            engine: &mut self.engine,
            surface: &mut self.surface,
            history: &mut self.history,
            timers: &mut self.timers,
        };
        self.sync.navigate(&mut cx, target, url, is_replay)
    }

    pub fn on_menu_link(&mut self, page_id: &str, href: &str) -> Result<LinkOutcome, SiteError> {
        let mut cx = Collaborators {
            registry: &self.registry,
            engine: &mut self.engine,
            surface: &mut self.surface,
            history: &mut self.history,
            timers: &mut self.timers,
        };
        self.sync.on_menu_link(&mut cx, page_id, href)
    }

    pub fn on_body_link(
        &mut self,
        href: &str,
        target: LinkTarget,
    ) -> Result<LinkOutcome, SiteError> {
        let mut cx = Collaborators {
            registry: &self.registry,
            engine: &mut self.engine,
            surface: &mut self.surface,
            history: &mut self.history,
            timers: &mut self.timers,
        };
        self.sync.on_body_link(&mut cx, href, target)
    }

    pub fn on_history_replay(&mut self, entry: &HistoryEntry) -> Result<ReplayOutcome, SiteError> {
        let mut cx = Collaborators {
            registry: &self.registry,
            engine: &mut self.engine,
            surface: &mut self.surface,
            history: &mut self.history,
            timers: &mut self.timers,
        };
        self.sync.on_history_replay(&mut cx, entry)
    }

    pub fn on_menu_toggle(&mut self) -> MenuPhase {
        self.menu.toggle(&mut self.surface, &mut self.timers)
    }

    /// A click landed outside the menu region.
    pub fn on_outside_click(&mut self) -> bool {
        self.menu.on_outside_click(&mut self.surface, &mut self.timers)
    }

    /// Deliver a content fetch result.
    pub fn on_content_loaded(
        &mut self,
        ticket: ContentTicket,
        result: Result<String, ContentError>,
    ) -> bool {
        self.sync
            .on_content_loaded(ticket, result, &mut self.surface, &mut self.hooks)
    }

    /// Advance the clock by `dt`, firing every timer that falls due.
    ///
    /// Returns the number of timers fired.
    pub fn advance(&mut self, dt: Duration) -> usize {
        let horizon = self.timers.now().saturating_add(dt);
        let mut fired = 0;
        while let Some((handle, kind)) = self.timers.pop_due(horizon) {
            self.fire(handle, kind);
            fired += 1;
        }
        self.timers.settle(horizon);
        fired
    }

    fn fire(&mut self, handle: TimerHandle, kind: TimerKind) {
        let handled = match kind {
            TimerKind::TransitionCleanup => {
                self.engine.on_cleanup_timer(handle, &mut self.surface)
            }
            TimerKind::UserDebounce | TimerKind::ReplayDebounce => {
                self.sync.on_debounce_timer(kind, handle)
            }
            TimerKind::ContentSwap => self
                .sync
                .on_swap_timer(handle, &mut self.content)
                .is_some(),
            TimerKind::MenuFadeIn | TimerKind::MenuRemoval => {
                self.menu.on_timer(kind, handle, &mut self.surface)
            }
        };
        if !handled {
            tracing::trace!(target: "pageflow.timer", ?kind, "timer had no effect");
        }
    }

    // -- accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn active(&self) -> PageIndex {
        self.sync.state().active()
    }

    #[must_use]
    pub fn last_entry(&self) -> &HistoryEntry {
        self.sync.state().last_entry()
    }

    #[must_use]
    pub fn registry(&self) -> &PageRegistry {
        &self.registry
    }

    #[must_use]
    pub fn engine(&self) -> &TransitionEngine {
        &self.engine
    }

    #[must_use]
    pub fn synchronizer(&self) -> &HistorySynchronizer {
        &self.sync
    }

    #[must_use]
    pub fn menu(&self) -> &MenuToggle {
        &self.menu
    }

    #[must_use]
    pub fn timers(&self) -> &TimerQueue<TimerKind> {
        &self.timers
    }

    #[inline]
    #[must_use]
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    #[must_use]
    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut H {
        &mut self.history
    }

    #[must_use]
    pub fn content(&self) -> &C {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut C {
        &mut self.content
    }
}
