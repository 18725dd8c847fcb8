#![forbid(unsafe_code)]

//! Core: page transitions, history synchronization and the navigation menu.
//!
//! # Role in pageflow
//! `pageflow-core` holds every state machine of the site front end and none
//! of its I/O. Styles, history and content fetching are reached through the
//! [`RenderSurface`], [`HistoryStack`] and [`ContentSource`] traits; time is
//! a host-driven [`TimerQueue`].
//!
//! # Primary responsibilities
//! - **TransitionEngine**: depth/opacity plan across all pages, one cleanup
//!   timer at a time.
//! - **HistorySynchronizer**: link clicks and back/forward replays to
//!   transitions, with debounce and rapid-replay override.
//! - **MenuToggle**: staggered show/hide of the navigation menu.
//! - **Site**: owns all of the above and routes events and fired timers.
//!
//! # How it fits in the system
//! `pageflow-web` implements the collaborator traits for a host-driven
//! browser embedding and records deterministic session traces.

pub mod config;
pub mod content;
pub mod error;
pub mod history;
pub mod menu;
pub mod page;
pub mod site;
pub mod surface;
pub mod timer;
pub mod transition;

pub use config::{ContentConfig, MenuConfig, SiteConfig, TransitionConfig};
#[cfg(feature = "site-config")]
pub use config::ConfigError;
pub use content::{ContentRequest, ContentSource, ContentTicket, NoContent};
pub use error::{ContentError, SiteError};
pub use history::{
    HistoryEntry, HistoryStack, HistorySynchronizer, LinkOutcome, LinkTarget, NavigationKind,
    NavigationState, ReplayOutcome,
};
pub use menu::{MenuPhase, MenuToggle};
pub use page::{PageId, PageIndex, PageRegistry};
pub use site::Site;
pub use surface::{ContentRegion, Display, PostProcess, RenderSurface, Visual};
pub use timer::{TimerHandle, TimerKind, TimerQueue, TimerSlot};
pub use transition::{PageStep, Placement, TransitionEngine, TransitionPlan};
