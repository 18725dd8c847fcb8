#![forbid(unsafe_code)]

//! Recording render surface.
//!
//! [`RecordingSurface`] keeps the full visual state of every page and the
//! menu in memory and appends each style operation to an outbound
//! [`SurfaceOp`] log. The JS host drains the log once per step and applies
//! it to the real elements; tests and session traces read the state
//! directly.
//!
//! # Invariants
//!
//! - `pages.len()` equals the page count the surface was created with.
//! - Operations addressing a page outside that range are dropped and logged.
//! - [`RecordingSurface::checksum`] depends only on the current state, never
//!   on the pending operation log.

use core::time::Duration;

use pageflow_core::{ContentRegion, Display, PageIndex, RenderSurface, Visual};
use serde::{Deserialize, Serialize};

// FNV-1a constants.
const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

pub(crate) fn fnv1a64_bytes(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

fn fnv1a64_u64(hash: u64, v: u64) -> u64 {
    fnv1a64_bytes(hash, &v.to_le_bytes())
}

pub(crate) fn fnv1a64_pair(prev: u64, next: u64) -> u64 {
    let hash = FNV_OFFSET_BASIS;
    let hash = fnv1a64_u64(hash, prev);
    fnv1a64_u64(hash, next)
}

/// One style operation for the host to apply, in issue order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SurfaceOp {
    Display {
        page: PageIndex,
        display: Display,
    },
    ZIndex {
        page: PageIndex,
        z_index: i32,
    },
    Visual {
        page: PageIndex,
        opacity: f32,
        depth: f32,
        transition_ms: u64,
    },
    ScrollSuppressed {
        suppressed: bool,
    },
    Highlight {
        page: PageIndex,
    },
    FadeContent {
        page: PageIndex,
        region: ContentRegion,
        opacity: f32,
        transition_ms: u64,
    },
    InsertContent {
        page: PageIndex,
        markup: String,
    },
    ScrollToTop,
    MenuDisplayed {
        displayed: bool,
    },
    MenuItemOpacity {
        position: usize,
        opacity: f32,
        transition_ms: u64,
    },
}

/// Recorded state of one page element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageView {
    pub display: Display,
    pub visual: Visual,
    pub content_opacity: f32,
    pub inner_opacity: f32,
    pub markup: String,
}

impl PageView {
    fn hidden() -> Self {
        Self {
            display: Display::Hidden,
            visual: Visual::FRONT,
            content_opacity: 1.0,
            inner_opacity: 1.0,
            markup: String::new(),
        }
    }
}

/// In-memory [`RenderSurface`] with an outbound operation log.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    pages: Vec<PageView>,
    scroll_suppressed: bool,
    highlighted: Option<PageIndex>,
    menu_displayed: bool,
    menu_items: Vec<f32>,
    scroll_resets: u64,
    ops: Vec<SurfaceOp>,
}

impl RecordingSurface {
    /// A surface with `page_count` pages where only `initial` is rendered.
    #[must_use]
    pub fn new(page_count: usize, initial: PageIndex) -> Self {
        let mut pages = vec![PageView::hidden(); page_count];
        if let Some(view) = pages.get_mut(initial.get() - 1) {
            view.display = Display::Rendered;
        }
        Self {
            pages,
            scroll_suppressed: false,
            highlighted: Some(initial),
            menu_displayed: false,
            menu_items: vec![0.0; page_count],
            scroll_resets: 0,
            ops: Vec::new(),
        }
    }

    #[must_use]
    pub fn page(&self, page: PageIndex) -> Option<&PageView> {
        self.pages.get(page.get() - 1)
    }

    #[must_use]
    pub fn pages(&self) -> &[PageView] {
        &self.pages
    }

    /// Ordinals of all rendered pages, ascending.
    #[must_use]
    pub fn visible_pages(&self) -> Vec<PageIndex> {
        self.pages
            .iter()
            .enumerate()
            .filter(|(_, v)| v.display == Display::Rendered)
            .filter_map(|(i, _)| PageIndex::new(i + 1))
            .collect()
    }

    #[inline]
    #[must_use]
    pub fn scroll_suppressed(&self) -> bool {
        self.scroll_suppressed
    }

    #[inline]
    #[must_use]
    pub fn highlighted(&self) -> Option<PageIndex> {
        self.highlighted
    }

    #[inline]
    #[must_use]
    pub fn menu_displayed(&self) -> bool {
        self.menu_displayed
    }

    #[must_use]
    pub fn menu_item_opacities(&self) -> &[f32] {
        &self.menu_items
    }

    #[must_use]
    pub fn scroll_resets(&self) -> u64 {
        self.scroll_resets
    }

    /// Operations issued since the last drain.
    #[must_use]
    pub fn pending_ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    /// Drain the operation log.
    pub fn take_ops(&mut self) -> Vec<SurfaceOp> {
        std::mem::take(&mut self.ops)
    }

    /// FNV-1a hash over the full visual state.
    #[must_use]
    pub fn checksum(&self) -> u64 {
        let mut hash = FNV_OFFSET_BASIS;
        for view in &self.pages {
            hash = fnv1a64_u64(hash, matches!(view.display, Display::Rendered) as u64);
            hash = fnv1a64_u64(hash, u64::from(view.visual.opacity.to_bits()));
            hash = fnv1a64_u64(hash, u64::from(view.visual.depth.to_bits()));
            hash = fnv1a64_u64(hash, view.visual.z_index as u32 as u64);
            hash = fnv1a64_u64(hash, u64::from(view.content_opacity.to_bits()));
            hash = fnv1a64_u64(hash, u64::from(view.inner_opacity.to_bits()));
            hash = fnv1a64_bytes(hash, view.markup.as_bytes());
            hash = fnv1a64_u64(hash, view.markup.len() as u64);
        }
        hash = fnv1a64_u64(hash, self.scroll_suppressed as u64);
        hash = fnv1a64_u64(hash, self.highlighted.map_or(0, PageIndex::get) as u64);
        hash = fnv1a64_u64(hash, self.menu_displayed as u64);
        for opacity in &self.menu_items {
            hash = fnv1a64_u64(hash, u64::from(opacity.to_bits()));
        }
        fnv1a64_u64(hash, self.scroll_resets)
    }

    fn view_mut(&mut self, page: PageIndex) -> Option<&mut PageView> {
        let view = self.pages.get_mut(page.get() - 1);
        if view.is_none() {
            tracing::warn!(target: "pageflow.web", page = page.get(), "operation on unknown page dropped");
        }
        view
    }
}

fn millis(d: Duration) -> u64 {
    d.as_millis().min(u128::from(u64::MAX)) as u64
}

impl RenderSurface for RecordingSurface {
    fn set_display(&mut self, page: PageIndex, display: Display) {
        if let Some(view) = self.view_mut(page) {
            view.display = display;
            self.ops.push(SurfaceOp::Display { page, display });
        }
    }

    fn set_z_index(&mut self, page: PageIndex, z_index: i32) {
        if let Some(view) = self.view_mut(page) {
            view.visual.z_index = z_index;
            self.ops.push(SurfaceOp::ZIndex { page, z_index });
        }
    }

    fn apply_visual(&mut self, page: PageIndex, visual: Visual, transition: Duration) {
        if let Some(view) = self.view_mut(page) {
            view.visual.opacity = visual.opacity;
            view.visual.depth = visual.depth;
            self.ops.push(SurfaceOp::Visual {
                page,
                opacity: visual.opacity,
                depth: visual.depth,
                transition_ms: millis(transition),
            });
        }
    }

    fn is_visible(&self, page: PageIndex) -> bool {
        self.page(page)
            .is_some_and(|v| v.display == Display::Rendered)
    }

    fn set_scroll_suppressed(&mut self, suppressed: bool) {
        self.scroll_suppressed = suppressed;
        self.ops.push(SurfaceOp::ScrollSuppressed { suppressed });
    }

    fn highlight_menu_item(&mut self, page: PageIndex) {
        self.highlighted = Some(page);
        self.ops.push(SurfaceOp::Highlight { page });
    }

    fn fade_content(
        &mut self,
        page: PageIndex,
        region: ContentRegion,
        opacity: f32,
        transition: Duration,
    ) {
        if let Some(view) = self.view_mut(page) {
            match region {
                ContentRegion::Whole => view.content_opacity = opacity,
                ContentRegion::FadeInner => view.inner_opacity = opacity,
            }
            self.ops.push(SurfaceOp::FadeContent {
                page,
                region,
                opacity,
                transition_ms: millis(transition),
            });
        }
    }

    fn insert_content(&mut self, page: PageIndex, markup: &str) {
        if let Some(view) = self.view_mut(page) {
            view.markup = markup.to_string();
            self.ops.push(SurfaceOp::InsertContent {
                page,
                markup: markup.to_string(),
            });
        }
    }

    fn scroll_to_top(&mut self) {
        self.scroll_resets += 1;
        self.ops.push(SurfaceOp::ScrollToTop);
    }

    fn set_menu_items_displayed(&mut self, displayed: bool) {
        self.menu_displayed = displayed;
        self.ops.push(SurfaceOp::MenuDisplayed { displayed });
    }

    fn set_menu_item_opacity(&mut self, position: usize, opacity: f32, transition: Duration) {
        let Some(slot) = position
            .checked_sub(1)
            .and_then(|i| self.menu_items.get_mut(i))
        else {
            tracing::warn!(target: "pageflow.web", position, "unknown menu item dropped");
            return;
        };
        *slot = opacity;
        self.ops.push(SurfaceOp::MenuItemOpacity {
            position,
            opacity,
            transition_ms: millis(transition),
        });
    }
}
