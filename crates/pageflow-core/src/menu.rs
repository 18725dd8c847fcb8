#![forbid(unsafe_code)]

//! Navigation menu show/hide state machine.
//!
//! Each activation of the toggle control flips between open and closed.
//! Opening puts the links in layout at zero opacity and, after a short
//! delay, fades them in with growing durations. Closing fades them out with
//! shrinking durations and removes them from layout once the longest fade
//! is over. Reopening during that window cancels the removal.

use core::time::Duration;

use crate::config::MenuConfig;
use crate::surface::RenderSurface;
use crate::timer::{TimerHandle, TimerKind, TimerQueue, TimerSlot};

/// Logical menu state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuPhase {
    Closed,
    Open,
}

#[derive(Debug, Clone)]
pub struct MenuToggle {
    config: MenuConfig,
    item_count: usize,
    open: bool,
    /// A close is in progress: the removal timer is armed.
    kill_pending: bool,
    fade_in: TimerSlot,
    removal: TimerSlot,
}

impl MenuToggle {
    /// `item_count` is the number of menu links (the toggle icon excluded).
    #[must_use]
    pub fn new(config: MenuConfig, item_count: usize) -> Self {
        Self {
            config,
            item_count,
            open: false,
            kill_pending: false,
            fade_in: TimerSlot::new(),
            removal: TimerSlot::new(),
        }
    }

    #[must_use]
    pub fn phase(&self) -> MenuPhase {
        if self.open {
            MenuPhase::Open
        } else {
            MenuPhase::Closed
        }
    }

    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Whether a close is still waiting to remove the links from layout.
    #[inline]
    #[must_use]
    pub fn closing(&self) -> bool {
        self.kill_pending
    }

    /// The toggle control was activated.
    pub fn toggle<S: RenderSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        timers: &mut TimerQueue<TimerKind>,
    ) -> MenuPhase {
        if self.open {
            self.begin_close(surface, timers);
        } else {
            if self.kill_pending {
                self.removal.cancel(timers);
                self.kill_pending = false;
                tracing::debug!(target: "pageflow.menu", "reopened during close");
            }
            self.begin_open(surface, timers);
        }
        self.phase()
    }

    /// A click landed outside the menu. Closes an open menu; returns whether
    /// it did.
    pub fn on_outside_click<S: RenderSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        timers: &mut TimerQueue<TimerKind>,
    ) -> bool {
        if !self.open {
            return false;
        }
        self.begin_close(surface, timers);
        true
    }

    /// Route a fired menu timer. Returns `false` for stale handles.
    pub fn on_timer<S: RenderSurface + ?Sized>(
        &mut self,
        kind: TimerKind,
        handle: TimerHandle,
        surface: &mut S,
    ) -> bool {
        match kind {
            TimerKind::MenuFadeIn if self.fade_in.take_if(handle) => {
                for position in 1..=self.item_count {
                    let duration = self.fade_in_duration(position);
                    surface.set_menu_item_opacity(position, 1.0, duration);
                }
                true
            }
            TimerKind::MenuRemoval if self.removal.take_if(handle) => {
                surface.set_menu_items_displayed(false);
                self.kill_pending = false;
                tracing::debug!(target: "pageflow.menu", "menu removed from layout");
                true
            }
            _ => false,
        }
    }

    /// Fade-in duration of the link at 1-based `position`.
    #[must_use]
    pub fn fade_in_duration(&self, position: usize) -> Duration {
        let steps = position.saturating_sub(1) as u32;
        self.config
            .fade_in_first
            .saturating_add(self.config.fade_in_step.saturating_mul(steps))
    }

    /// Fade-out duration of the link at 1-based `position`; never negative.
    #[must_use]
    pub fn fade_out_duration(&self, position: usize) -> Duration {
        let steps = position.saturating_sub(1) as u32;
        self.config
            .fade_out_first
            .saturating_sub(self.config.fade_out_step.saturating_mul(steps))
    }

    fn begin_open<S: RenderSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        timers: &mut TimerQueue<TimerKind>,
    ) {
        surface.set_menu_items_displayed(true);
        for position in 1..=self.item_count {
            surface.set_menu_item_opacity(position, 0.0, Duration::ZERO);
        }
        self.fade_in
            .arm(timers, self.config.fade_in_delay, TimerKind::MenuFadeIn);
        self.open = true;
        tracing::debug!(target: "pageflow.menu", items = self.item_count, "menu opening");
    }

    fn begin_close<S: RenderSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        timers: &mut TimerQueue<TimerKind>,
    ) {
        // A fade-in that has not started yet must not resurrect the links.
        self.fade_in.cancel(timers);
        for position in 1..=self.item_count {
            surface.set_menu_item_opacity(position, 0.0, self.fade_out_duration(position));
        }
        self.removal
            .arm(timers, self.config.removal_delay, TimerKind::MenuRemoval);
        self.open = false;
        self.kill_pending = true;
        tracing::debug!(target: "pageflow.menu", "menu closing");
    }
}
