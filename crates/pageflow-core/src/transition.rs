#![forbid(unsafe_code)]

//! Transition engine: depth-stacked page transitions.
//!
//! [`TransitionPlan::compute`] is a pure function from (page count, target)
//! to one [`PageStep`] per page. [`TransitionEngine::animate_to`] applies a
//! plan to the surface and arms the single cleanup timer that hides every
//! page the plan marked for hiding.
//!
//! # Placement
//!
//! For a page at ordinal `j` and a target `t`:
//!
//! | case    | opacity           | depth                 | z-index     |
//! |---------|-------------------|-----------------------|-------------|
//! | `j == t` | 1                | 0                     | 0           |
//! | `j < t`  | 0                | `disp * (t - j)`      | `-t + j - 1`|
//! | `j > t`  | `ahead / (j - t)`| `disp * (t - j)`      | `-j`        |
//!
//! # Invariants
//!
//! 1. Exactly one step is [`Placement::Front`], and it is never hidden.
//! 2. At most one cleanup timer is armed. A new transition replaces the
//!    pending cleanup and its hide-list.
//! 3. A stale cleanup handle never applies a hide-list.

use core::time::Duration;

use crate::config::TransitionConfig;
use crate::error::SiteError;
use crate::page::{PageIndex, PageRegistry};
use crate::surface::{Display, RenderSurface, Visual};
use crate::timer::{TimerHandle, TimerKind, TimerQueue, TimerSlot};

/// Where a page sits relative to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The target page, brought to the front.
    Front,
    /// Already navigated past; fades out behind the target.
    Behind,
    /// Not yet reached; faintly visible in the background.
    Ahead,
}

/// Visual plan for one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageStep {
    pub page: PageIndex,
    pub placement: Placement,
    pub visual: Visual,
    /// Hide the page once the transition completes.
    pub hide_after: bool,
}

/// Per-page plan for one transition.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionPlan {
    target: PageIndex,
    steps: Vec<PageStep>,
}

impl TransitionPlan {
    /// Compute the plan for `target` across `page_count` pages.
    #[must_use]
    pub fn compute(page_count: usize, target: PageIndex, config: &TransitionConfig) -> Self {
        let t = target.get();
        let steps = (1..=page_count)
            .filter_map(PageIndex::new)
            .map(|page| {
                let j = page.get();
                let depth = config.displacement * (t as f32 - j as f32);
                if j == t {
                    PageStep {
                        page,
                        placement: Placement::Front,
                        visual: Visual::FRONT,
                        hide_after: false,
                    }
                } else if j < t {
                    PageStep {
                        page,
                        placement: Placement::Behind,
                        visual: Visual {
                            opacity: 0.0,
                            depth,
                            z_index: -(t as i32) + j as i32 - 1,
                        },
                        hide_after: true,
                    }
                } else {
                    PageStep {
                        page,
                        placement: Placement::Ahead,
                        visual: Visual {
                            opacity: config.ahead_opacity / (j - t) as f32,
                            depth,
                            z_index: -(j as i32),
                        },
                        hide_after: true,
                    }
                }
            })
            .collect();
        Self { target, steps }
    }

    #[inline]
    #[must_use]
    pub fn target(&self) -> PageIndex {
        self.target
    }

    #[must_use]
    pub fn steps(&self) -> &[PageStep] {
        &self.steps
    }

    /// Step for one page.
    #[must_use]
    pub fn step(&self, page: PageIndex) -> Option<&PageStep> {
        self.steps.get(page.get() - 1)
    }

    /// Pages to hide once the transition completes.
    pub fn hide_list(&self) -> impl Iterator<Item = PageIndex> + '_ {
        self.steps.iter().filter(|s| s.hide_after).map(|s| s.page)
    }
}

/// Applies transition plans and owns the single cleanup timer.
#[derive(Debug, Clone)]
pub struct TransitionEngine {
    config: TransitionConfig,
    cleanup: TimerSlot,
    hide_list: Vec<PageIndex>,
}

impl TransitionEngine {
    #[must_use]
    pub fn new(config: TransitionConfig) -> Self {
        Self {
            config,
            cleanup: TimerSlot::new(),
            hide_list: Vec::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &TransitionConfig {
        &self.config
    }

    /// Duration of one transition.
    #[inline]
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.config.page_duration
    }

    /// Whether a cleanup is waiting to run.
    #[inline]
    #[must_use]
    pub fn cleanup_pending(&self) -> bool {
        self.cleanup.is_armed()
    }

    /// Pages the pending (or last) cleanup hides.
    #[must_use]
    pub fn hide_list(&self) -> &[PageIndex] {
        &self.hide_list
    }

    /// Bring `target` to the front and push every other page back.
    ///
    /// All visual mutations are issued before the cleanup timer is armed. A
    /// pending cleanup from an earlier transition is cancelled and its
    /// hide-list discarded.
    pub fn animate_to<S: RenderSurface + ?Sized>(
        &mut self,
        registry: &PageRegistry,
        target: PageIndex,
        surface: &mut S,
        timers: &mut TimerQueue<TimerKind>,
    ) -> Result<TransitionPlan, SiteError> {
        if !registry.contains(target) {
            return Err(SiteError::UnknownPage {
                index: target.get(),
                page_count: registry.len(),
            });
        }
        let _span = tracing::debug_span!(
            "transition.animate",
            target = target.get(),
            page_count = registry.len()
        )
        .entered();

        surface.set_scroll_suppressed(true);

        let duration = self.config.page_duration;
        let plan = TransitionPlan::compute(registry.len(), target, &self.config);
        for step in plan.steps() {
            match step.placement {
                Placement::Front => {
                    surface.set_display(step.page, Display::Rendered);
                    surface.set_z_index(step.page, 0);
                    surface.apply_visual(step.page, step.visual, duration);
                    surface.highlight_menu_item(step.page);
                }
                Placement::Behind | Placement::Ahead => {
                    surface.apply_visual(step.page, step.visual, duration);
                    surface.set_z_index(step.page, step.visual.z_index);
                }
            }
        }

        self.hide_list = plan.hide_list().collect();
        let replaced = self.cleanup.is_armed();
        self.cleanup.arm(timers, duration, TimerKind::TransitionCleanup);

        tracing::debug!(
            target: "pageflow.transition",
            target_page = target.get(),
            hidden = self.hide_list.len(),
            replaced_pending = replaced,
            "transition started"
        );
        Ok(plan)
    }

    /// Handle a fired cleanup timer. Returns `false` for a stale handle.
    pub fn on_cleanup_timer<S: RenderSurface + ?Sized>(
        &mut self,
        handle: TimerHandle,
        surface: &mut S,
    ) -> bool {
        if !self.cleanup.take_if(handle) {
            tracing::trace!(target: "pageflow.transition", "stale cleanup ignored");
            return false;
        }
        self.run_cleanup(surface);
        true
    }

    /// Cancel the pending cleanup without running it.
    pub fn cancel_cleanup(&mut self, timers: &mut TimerQueue<TimerKind>) -> bool {
        self.cleanup.cancel(timers)
    }

    /// Cancel the pending cleanup and perform it right now.
    pub fn force_cleanup<S: RenderSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        timers: &mut TimerQueue<TimerKind>,
    ) {
        self.cleanup.cancel(timers);
        self.run_cleanup(surface);
    }

    fn run_cleanup<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) {
        for page in &self.hide_list {
            surface.set_display(*page, Display::Hidden);
        }
        surface.set_scroll_suppressed(false);
        tracing::debug!(
            target: "pageflow.transition",
            hidden = self.hide_list.len(),
            "transition cleanup"
        );
    }
}
