#![forbid(unsafe_code)]

//! Rendering surface capability set.
//!
//! The state machines never touch markup or styles directly. They drive an
//! implementation of [`RenderSurface`], which the host maps onto its real
//! elements (one per page, plus a content region inside each page and the
//! menu's link items).

use core::time::Duration;

use crate::page::PageIndex;

/// Whether an element participates in rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Display {
    #[default]
    Hidden,
    Rendered,
}

/// Animated visual properties of one page.
///
/// `depth` is the simulated z-axis offset in displacement units; positive
/// values push the page away from the viewer.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Visual {
    pub opacity: f32,
    pub depth: f32,
    pub z_index: i32,
}

impl Visual {
    /// Fully opaque, no depth offset, front layer.
    pub const FRONT: Self = Self {
        opacity: 1.0,
        depth: 0.0,
        z_index: 0,
    };
}

/// Addressable sub-region of a page's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ContentRegion {
    /// The page's whole content block.
    Whole,
    /// Only the inner fade block, leaving a submenu in place.
    FadeInner,
}

/// Style operations the state machines issue against the host.
///
/// Menu items are addressed by 1-based link position; the toggle icon that
/// precedes them is never addressed.
pub trait RenderSurface {
    /// Set whether a page is rendered at all.
    fn set_display(&mut self, page: PageIndex, display: Display);

    /// Set a page's stacking order without touching its transition.
    fn set_z_index(&mut self, page: PageIndex, z_index: i32);

    /// Animate a page to `visual` over `transition`.
    fn apply_visual(&mut self, page: PageIndex, visual: Visual, transition: Duration);

    /// Whether the page is currently rendered.
    fn is_visible(&self, page: PageIndex) -> bool;

    /// Toggle the document-level flag that suppresses scrolling mid-transition.
    fn set_scroll_suppressed(&mut self, suppressed: bool);

    /// Mark the menu link for `page` as the active one (and only that one).
    ///
    /// In list terms this is item `page + 1`: the toggle icon comes first.
    fn highlight_menu_item(&mut self, page: PageIndex);

    /// Animate a content region's opacity.
    fn fade_content(
        &mut self,
        page: PageIndex,
        region: ContentRegion,
        opacity: f32,
        transition: Duration,
    );

    /// Replace a page's body markup with freshly fetched content.
    fn insert_content(&mut self, page: PageIndex, markup: &str);

    /// Reset the window scroll position.
    fn scroll_to_top(&mut self);

    /// Make every menu link participate in layout, or remove them all.
    fn set_menu_items_displayed(&mut self, displayed: bool);

    /// Animate one menu link's opacity.
    fn set_menu_item_opacity(&mut self, position: usize, opacity: f32, transition: Duration);
}

/// Post-processing run over freshly inserted content (syntax highlighting,
/// math typesetting).
pub trait PostProcess {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Process the content now present in `page`.
    fn apply(&mut self, page: PageIndex, surface: &mut dyn RenderSurface);
}
