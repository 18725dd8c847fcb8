#![forbid(unsafe_code)]

//! Asynchronous content source for in-place content swaps.
//!
//! Requests go out through [`ContentSource::request`]; the host delivers the
//! result later, tagged with the request's [`ContentTicket`]. Only the most
//! recently issued ticket is honoured, so a slow fetch that completes after a
//! newer navigation cannot overwrite the page.

use crate::page::PageIndex;

/// Monotonic id tying a completion back to its request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ContentTicket(pub u64);

/// One fetch of replacement markup.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContentRequest {
    pub ticket: ContentTicket,
    pub page: PageIndex,
    /// Path of the document to fetch.
    pub path: String,
    /// Selector of the fragment inside that document.
    pub selector: String,
}

/// Host-provided fetcher.
pub trait ContentSource {
    fn request(&mut self, request: ContentRequest);
}

/// A source that drops every request. The swap then simply never completes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoContent;

impl ContentSource for NoContent {
    fn request(&mut self, request: ContentRequest) {
        tracing::debug!(
            target: "pageflow.history",
            ticket = request.ticket.0,
            path = %request.path,
            "content request dropped: no source"
        );
    }
}
