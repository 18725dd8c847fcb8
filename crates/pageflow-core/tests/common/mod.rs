//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use core::time::Duration;

use pageflow_core::{
    ContentRegion, ContentRequest, ContentSource, Display, HistoryEntry, HistoryStack, PageIndex,
    RenderSurface, Site, SiteConfig, Visual,
};

pub const PAGES: [&str; 4] = ["home", "projects", "archives", "contact"];
pub const PAGE_MS: Duration = Duration::from_millis(250);

pub fn idx(n: usize) -> PageIndex {
    PageIndex::new(n).unwrap()
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageState {
    pub display: Display,
    pub visual: Visual,
    pub transition: Duration,
    pub whole_opacity: f32,
    pub inner_opacity: f32,
    pub markup: String,
}

#[derive(Debug, Clone, Default)]
pub struct MockSurface {
    pub pages: Vec<PageState>,
    pub scroll_suppressed: bool,
    pub highlighted: Option<PageIndex>,
    pub menu_displayed: bool,
    pub menu_items: Vec<(f32, Duration)>,
    pub scroll_resets: usize,
}

impl MockSurface {
    /// `initial` rendered at the front, everything else hidden.
    pub fn new(page_count: usize, initial: PageIndex) -> Self {
        let pages = (1..=page_count)
            .map(|n| PageState {
                display: if n == initial.get() {
                    Display::Rendered
                } else {
                    Display::Hidden
                },
                visual: Visual::FRONT,
                transition: Duration::ZERO,
                whole_opacity: 1.0,
                inner_opacity: 1.0,
                markup: String::new(),
            })
            .collect();
        Self {
            pages,
            menu_items: vec![(0.0, Duration::ZERO); page_count],
            ..Self::default()
        }
    }

    pub fn page(&self, n: usize) -> &PageState {
        &self.pages[n - 1]
    }

    pub fn visible_pages(&self) -> Vec<usize> {
        self.pages
            .iter()
            .enumerate()
            .filter(|(_, p)| p.display == Display::Rendered)
            .map(|(i, _)| i + 1)
            .collect()
    }

    fn page_mut(&mut self, page: PageIndex) -> &mut PageState {
        &mut self.pages[page.get() - 1]
    }
}

impl RenderSurface for MockSurface {
    fn set_display(&mut self, page: PageIndex, display: Display) {
        self.page_mut(page).display = display;
    }

    fn set_z_index(&mut self, page: PageIndex, z_index: i32) {
        self.page_mut(page).visual.z_index = z_index;
    }

    fn apply_visual(&mut self, page: PageIndex, visual: Visual, transition: Duration) {
        let state = self.page_mut(page);
        state.visual = visual;
        state.transition = transition;
    }

    fn is_visible(&self, page: PageIndex) -> bool {
        self.pages[page.get() - 1].display == Display::Rendered
    }

    fn set_scroll_suppressed(&mut self, suppressed: bool) {
        self.scroll_suppressed = suppressed;
    }

    fn highlight_menu_item(&mut self, page: PageIndex) {
        self.highlighted = Some(page);
    }

    fn fade_content(
        &mut self,
        page: PageIndex,
        region: ContentRegion,
        opacity: f32,
        _transition: Duration,
    ) {
        let state = self.page_mut(page);
        match region {
            ContentRegion::Whole => state.whole_opacity = opacity,
            ContentRegion::FadeInner => state.inner_opacity = opacity,
        }
    }

    fn insert_content(&mut self, page: PageIndex, markup: &str) {
        self.page_mut(page).markup = markup.to_string();
    }

    fn scroll_to_top(&mut self) {
        self.scroll_resets += 1;
    }

    fn set_menu_items_displayed(&mut self, displayed: bool) {
        self.menu_displayed = displayed;
    }

    fn set_menu_item_opacity(&mut self, position: usize, opacity: f32, transition: Duration) {
        self.menu_items[position - 1] = (opacity, transition);
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockHistory {
    pub replaced: Option<HistoryEntry>,
    pub pushed: Vec<HistoryEntry>,
}

impl HistoryStack for MockHistory {
    fn replace_current_entry(&mut self, entry: &HistoryEntry) {
        self.replaced = Some(entry.clone());
    }

    fn push_entry(&mut self, entry: &HistoryEntry) {
        self.pushed.push(entry.clone());
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockContent {
    pub requests: Vec<ContentRequest>,
}

impl ContentSource for MockContent {
    fn request(&mut self, request: ContentRequest) {
        self.requests.push(request);
    }
}

pub type TestSite = Site<MockSurface, MockHistory, MockContent>;

pub fn site_with(pages: &[&str], initial: usize) -> TestSite {
    let config = SiteConfig::new(pages.iter().copied());
    let surface = MockSurface::new(pages.len(), idx(initial));
    let mut site = Site::new(
        config,
        idx(initial),
        "/",
        surface,
        MockHistory::default(),
        MockContent::default(),
    )
    .unwrap();
    site.start();
    site
}

pub fn site() -> TestSite {
    site_with(&PAGES, 1)
}
