#![forbid(unsafe_code)]

//! History synchronizer: navigation actions to transitions.
//!
//! Maps menu clicks, in-body link clicks and browser back/forward replays to
//! [`TransitionEngine`] invocations, keeps the browser history stack in step
//! with the visually active page, and debounces overlapping triggers.
//!
//! # Debounce protocol
//!
//! - User actions (menu and in-body links) share one guard. While it is set,
//!   further clicks are swallowed. It clears itself one page duration after
//!   being armed.
//! - History replays have their own guard. A replay that arrives while it is
//!   set is an *override*: the pending cleanup is cancelled, the navigation
//!   runs again, and its cleanup is performed synchronously so the final
//!   state matches the latest replay immediately.
//! - Guards are only ever cleared by their own timer.
//!
//! # Content swaps
//!
//! Navigating to the page that is already active swaps its body in place:
//! fade out, wait the swap delay, request new content, insert it and fade
//! back in. Every step re-validates that the page is still active and that
//! the completion belongs to the latest request.

use core::time::Duration;

use crate::config::ContentConfig;
use crate::content::{ContentRequest, ContentSource, ContentTicket};
use crate::error::{ContentError, SiteError};
use crate::page::{PageIndex, PageRegistry};
use crate::surface::{ContentRegion, PostProcess, RenderSurface};
use crate::timer::{TimerHandle, TimerKind, TimerQueue, TimerSlot};
use crate::transition::TransitionEngine;

// ---------------------------------------------------------------------------
// History stack
// ---------------------------------------------------------------------------

/// State stored with each history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HistoryEntry {
    pub item: PageIndex,
    pub url: String,
}

impl HistoryEntry {
    #[must_use]
    pub fn new(item: PageIndex, url: impl Into<String>) -> Self {
        Self {
            item,
            url: url.into(),
        }
    }
}

/// The hosting environment's session history.
///
/// Replay notifications travel the other way: the host hands the stored
/// entry to [`HistorySynchronizer::on_history_replay`].
pub trait HistoryStack {
    /// Overwrite the current entry (initial load).
    fn replace_current_entry(&mut self, entry: &HistoryEntry);

    /// Push a new entry, making `entry.url` the visible address.
    fn push_entry(&mut self, entry: &HistoryEntry);
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Which page is active, plus the last known history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    last_entry: HistoryEntry,
}

impl NavigationState {
    #[must_use]
    pub fn new(active: PageIndex, url: impl Into<String>) -> Self {
        Self {
            last_entry: HistoryEntry::new(active, url),
        }
    }

    #[inline]
    #[must_use]
    pub fn active(&self) -> PageIndex {
        self.last_entry.item
    }

    #[must_use]
    pub fn last_entry(&self) -> &HistoryEntry {
        &self.last_entry
    }

    fn set(&mut self, entry: HistoryEntry) {
        self.last_entry = entry;
    }
}

/// User-action and replay guards, each cleared only by its own timer.
#[derive(Debug, Clone, Default)]
pub struct DebounceGuard {
    user_action: bool,
    replay: bool,
    user_timer: TimerSlot,
    replay_timer: TimerSlot,
}

impl DebounceGuard {
    #[inline]
    #[must_use]
    pub fn user_action_blocked(&self) -> bool {
        self.user_action
    }

    #[inline]
    #[must_use]
    pub fn replay_blocked(&self) -> bool {
        self.replay
    }

    fn arm_user_action(&mut self, timers: &mut TimerQueue<TimerKind>, window: Duration) {
        self.user_action = true;
        self.user_timer.arm(timers, window, TimerKind::UserDebounce);
    }

    fn arm_replay(&mut self, timers: &mut TimerQueue<TimerKind>, window: Duration) {
        self.replay = true;
        self.replay_timer.arm(timers, window, TimerKind::ReplayDebounce);
    }

    /// Clear the guard whose timer fired. Returns `false` for unrelated or
    /// stale handles.
    pub fn on_timer(&mut self, kind: TimerKind, handle: TimerHandle) -> bool {
        match kind {
            TimerKind::UserDebounce if self.user_timer.take_if(handle) => {
                self.user_action = false;
                true
            }
            TimerKind::ReplayDebounce if self.replay_timer.take_if(handle) => {
                self.replay = false;
                true
            }
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Event vocabulary
// ---------------------------------------------------------------------------

/// A link's `target` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LinkTarget {
    #[default]
    SameWindow,
    /// `target="_blank"`: never intercepted.
    NewWindow,
}

impl LinkTarget {
    /// Interpret a raw `target` attribute value.
    #[must_use]
    pub fn from_attr(attr: Option<&str>) -> Self {
        match attr {
            Some("_blank") => Self::NewWindow,
            _ => Self::SameWindow,
        }
    }
}

/// What the host should do with the click that produced a link event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// Navigation performed; prevent the default action.
    Intercepted,
    /// Swallowed by the user-action guard; still prevent the default action.
    Debounced,
    /// Not ours; let the browser follow the link.
    PassThrough,
}

impl LinkOutcome {
    #[must_use]
    pub fn prevents_default(self) -> bool {
        !matches!(self, Self::PassThrough)
    }
}

/// How a navigation was carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    /// A full depth transition to another page.
    Transition,
    /// The target was already active; its content is swapped in place.
    ContentSwap,
}

/// How a history replay was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayOutcome {
    /// Normal replay with the full animation.
    Animated,
    /// Arrived inside the replay window; cleanup was forced immediately.
    Overridden,
}

/// Mutable collaborators a navigation needs.
pub struct Collaborators<'a, S: ?Sized, H: ?Sized> {
    pub registry: &'a PageRegistry,
    pub engine: &'a mut TransitionEngine,
    pub surface: &'a mut S,
    pub history: &'a mut H,
    pub timers: &'a mut TimerQueue<TimerKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SwapStyle {
    region: ContentRegion,
    fade: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingSwap {
    page: PageIndex,
    path: String,
    style: SwapStyle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AwaitingContent {
    ticket: ContentTicket,
    page: PageIndex,
    path: String,
    style: SwapStyle,
}

// ---------------------------------------------------------------------------
// Synchronizer
// ---------------------------------------------------------------------------

/// Owns [`NavigationState`] and [`DebounceGuard`]; the only writer of either.
#[derive(Debug, Clone)]
pub struct HistorySynchronizer {
    nav: NavigationState,
    guard: DebounceGuard,
    content: ContentConfig,
    window: Duration,
    swap_timer: TimerSlot,
    pending_swap: Option<PendingSwap>,
    awaiting: Option<AwaitingContent>,
    next_ticket: u64,
}

impl HistorySynchronizer {
    /// `window` is the page duration: debounce window and standard fade.
    #[must_use]
    pub fn new(
        active: PageIndex,
        url: impl Into<String>,
        content: ContentConfig,
        window: Duration,
    ) -> Self {
        Self {
            nav: NavigationState::new(active, url),
            guard: DebounceGuard::default(),
            content,
            window,
            swap_timer: TimerSlot::new(),
            pending_swap: None,
            awaiting: None,
            next_ticket: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> &NavigationState {
        &self.nav
    }

    #[must_use]
    pub fn guard(&self) -> &DebounceGuard {
        &self.guard
    }

    /// Whether a content swap is waiting on its delay or its fetch.
    #[must_use]
    pub fn swap_in_flight(&self) -> bool {
        self.pending_swap.is_some() || self.awaiting.is_some()
    }

    /// Path requested under `ticket`, while that fetch is still awaited.
    #[must_use]
    pub fn awaiting_path(&self, ticket: ContentTicket) -> Option<&str> {
        self.awaiting
            .as_ref()
            .filter(|a| a.ticket == ticket)
            .map(|a| a.path.as_str())
    }

    /// Initial load: record the current page in the current history entry.
    pub fn start<H: HistoryStack + ?Sized>(&mut self, history: &mut H) {
        history.replace_current_entry(self.nav.last_entry());
        tracing::debug!(
            target: "pageflow.history",
            item = self.nav.active().get(),
            url = %self.nav.last_entry().url,
            "history initialised"
        );
    }

    /// Navigate to `target`, pushing a history entry unless `is_replay`.
    pub fn navigate<S, H>(
        &mut self,
        cx: &mut Collaborators<'_, S, H>,
        target: PageIndex,
        url: impl Into<String>,
        is_replay: bool,
    ) -> Result<NavigationKind, SiteError>
    where
        S: RenderSurface + ?Sized,
        H: HistoryStack + ?Sized,
    {
        if !cx.registry.contains(target) {
            return Err(SiteError::UnknownPage {
                index: target.get(),
                page_count: cx.registry.len(),
            });
        }
        let entry = HistoryEntry::new(target, url);

        let kind = if target != self.nav.active() {
            // Any swap in progress belongs to the page being left.
            self.swap_timer.cancel(cx.timers);
            self.pending_swap = None;
            self.awaiting = None;
            cx.engine
                .animate_to(cx.registry, target, &mut *cx.surface, &mut *cx.timers)?;
            NavigationKind::Transition
        } else {
            self.begin_swap(cx, &entry);
            NavigationKind::ContentSwap
        };

        if !is_replay {
            if &entry == self.nav.last_entry() {
                tracing::debug!(
                    target: "pageflow.history",
                    url = %entry.url,
                    "duplicate entry not pushed"
                );
            } else {
                cx.history.push_entry(&entry);
            }
        }

        tracing::debug!(
            target: "pageflow.history",
            item = entry.item.get(),
            url = %entry.url,
            replay = is_replay,
            kind = ?kind,
            "navigated"
        );
        self.nav.set(entry);
        Ok(kind)
    }

    /// A link inside the navigation menu was activated.
    ///
    /// `page_id` is the link's declared page identifier; unknown identifiers
    /// fall back to the active page.
    pub fn on_menu_link<S, H>(
        &mut self,
        cx: &mut Collaborators<'_, S, H>,
        page_id: &str,
        href: &str,
    ) -> Result<LinkOutcome, SiteError>
    where
        S: RenderSurface + ?Sized,
        H: HistoryStack + ?Sized,
    {
        if self.guard.user_action_blocked() {
            tracing::debug!(target: "pageflow.history", href, "menu click debounced");
            return Ok(LinkOutcome::Debounced);
        }
        let target = cx.registry.resolve(page_id).unwrap_or_else(|| {
            tracing::warn!(
                target: "pageflow.history",
                page_id,
                "unknown page identifier, staying on active page"
            );
            self.nav.active()
        });
        self.navigate(cx, target, href, false)?;
        self.guard.arm_user_action(cx.timers, self.window);
        Ok(LinkOutcome::Intercepted)
    }

    /// A link inside page content was activated.
    ///
    /// Internal links stay within the active page's context.
    pub fn on_body_link<S, H>(
        &mut self,
        cx: &mut Collaborators<'_, S, H>,
        href: &str,
        target: LinkTarget,
    ) -> Result<LinkOutcome, SiteError>
    where
        S: RenderSurface + ?Sized,
        H: HistoryStack + ?Sized,
    {
        if target == LinkTarget::NewWindow {
            return Ok(LinkOutcome::PassThrough);
        }
        if self.guard.user_action_blocked() {
            tracing::debug!(target: "pageflow.history", href, "body click debounced");
            return Ok(LinkOutcome::Debounced);
        }
        let active = self.nav.active();
        self.navigate(cx, active, href, false)?;
        self.guard.arm_user_action(cx.timers, self.window);
        Ok(LinkOutcome::Intercepted)
    }

    /// The browser moved back or forward to `entry`.
    pub fn on_history_replay<S, H>(
        &mut self,
        cx: &mut Collaborators<'_, S, H>,
        entry: &HistoryEntry,
    ) -> Result<ReplayOutcome, SiteError>
    where
        S: RenderSurface + ?Sized,
        H: HistoryStack + ?Sized,
    {
        if !cx.registry.contains(entry.item) {
            return Err(SiteError::UnknownPage {
                index: entry.item.get(),
                page_count: cx.registry.len(),
            });
        }
        if !self.guard.replay_blocked() {
            self.navigate(cx, entry.item, entry.url.as_str(), true)?;
            self.guard.arm_replay(cx.timers, self.window);
            return Ok(ReplayOutcome::Animated);
        }

        // Replays faster than one transition: skip the animation tail so
        // nothing from the previous transition stays on screen.
        cx.engine.cancel_cleanup(cx.timers);
        self.navigate(cx, entry.item, entry.url.as_str(), true)?;
        cx.engine.force_cleanup(&mut *cx.surface, &mut *cx.timers);
        tracing::debug!(
            target: "pageflow.history",
            item = entry.item.get(),
            "replay override: cleanup forced"
        );
        Ok(ReplayOutcome::Overridden)
    }

    /// Route a fired debounce timer.
    pub fn on_debounce_timer(&mut self, kind: TimerKind, handle: TimerHandle) -> bool {
        self.guard.on_timer(kind, handle)
    }

    /// The swap delay elapsed: request the replacement content.
    pub fn on_swap_timer<C: ContentSource + ?Sized>(
        &mut self,
        handle: TimerHandle,
        source: &mut C,
    ) -> Option<ContentTicket> {
        if !self.swap_timer.take_if(handle) {
            return None;
        }
        let swap = self.pending_swap.take()?;
        if swap.page != self.nav.active() {
            tracing::debug!(
                target: "pageflow.history",
                page = swap.page.get(),
                "swap dropped: page no longer active"
            );
            return None;
        }
        let ticket = ContentTicket(self.next_ticket);
        self.next_ticket += 1;
        self.awaiting = Some(AwaitingContent {
            ticket,
            page: swap.page,
            path: swap.path.clone(),
            style: swap.style,
        });
        source.request(ContentRequest {
            ticket,
            page: swap.page,
            path: swap.path,
            selector: self.content.body_selector.clone(),
        });
        Some(ticket)
    }

    /// Content for `ticket` arrived (or failed).
    ///
    /// Returns `true` when the result was applied to the page. Stale tickets
    /// and completions for a page that is no longer active are discarded.
    pub fn on_content_loaded<S: RenderSurface>(
        &mut self,
        ticket: ContentTicket,
        result: Result<String, ContentError>,
        surface: &mut S,
        hooks: &mut [Box<dyn PostProcess>],
    ) -> bool {
        let Some(awaiting) = self.awaiting.take_if(|a| a.ticket == ticket) else {
            tracing::debug!(
                target: "pageflow.history",
                ticket = ticket.0,
                "stale content completion discarded"
            );
            return false;
        };
        if awaiting.page != self.nav.active() {
            tracing::debug!(
                target: "pageflow.history",
                ticket = ticket.0,
                "content completion for inactive page discarded"
            );
            return false;
        }

        let page = awaiting.page;
        let SwapStyle { region, fade } = awaiting.style;
        match result {
            Ok(markup) => {
                surface.insert_content(page, &markup);
                surface.fade_content(page, region, 1.0, fade);
                for hook in hooks.iter_mut() {
                    tracing::trace!(target: "pageflow.history", hook = hook.name(), "post-process");
                    hook.apply(page, surface);
                }
                surface.scroll_to_top();
                true
            }
            Err(err) => {
                tracing::warn!(
                    target: "pageflow.history",
                    ticket = ticket.0,
                    error = %err,
                    "content swap failed, keeping previous content"
                );
                surface.fade_content(page, region, 1.0, fade);
                false
            }
        }
    }

    fn begin_swap<S, H>(&mut self, cx: &mut Collaborators<'_, S, H>, entry: &HistoryEntry)
    where
        S: RenderSurface + ?Sized,
        H: HistoryStack + ?Sized,
    {
        let page = entry.item;
        let on_submenu_page = match (&self.content.submenu_page, cx.registry.id(page)) {
            (Some(submenu), Some(id)) => id.as_str() == submenu,
            _ => false,
        };
        let style = if on_submenu_page {
            SwapStyle {
                region: ContentRegion::FadeInner,
                fade: self.content.submenu_fade,
            }
        } else {
            SwapStyle {
                region: ContentRegion::Whole,
                fade: self.window,
            }
        };
        // The region is fading out for the new path; an older fetch must
        // not land on it.
        self.awaiting = None;
        cx.surface.fade_content(page, style.region, 0.0, style.fade);
        self.swap_timer
            .arm(cx.timers, self.content.swap_delay, TimerKind::ContentSwap);
        self.pending_swap = Some(PendingSwap {
            page,
            path: entry.url.clone(),
            style,
        });
    }
}
