#![forbid(unsafe_code)]

//! Queue of outbound content requests for the host to fetch.

use std::collections::VecDeque;

use pageflow_core::{ContentRequest, ContentSource, ContentTicket};

/// [`ContentSource`] that parks requests until the host drains them.
///
/// The host fetches each request's `path`, extracts `selector`, and reports
/// back with the request's ticket.
#[derive(Debug, Clone, Default)]
pub struct PendingContent {
    queue: VecDeque<ContentRequest>,
    issued: u64,
}

impl PendingContent {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Total requests ever issued.
    #[must_use]
    pub fn issued(&self) -> u64 {
        self.issued
    }

    #[must_use]
    pub fn peek(&self) -> Option<&ContentRequest> {
        self.queue.front()
    }

    /// Queued request issued under `ticket`.
    #[must_use]
    pub fn find(&self, ticket: ContentTicket) -> Option<&ContentRequest> {
        self.queue.iter().find(|r| r.ticket == ticket)
    }

    /// Drain all queued requests in issue order.
    pub fn take_requests(&mut self) -> Vec<ContentRequest> {
        self.queue.drain(..).collect()
    }
}

impl ContentSource for PendingContent {
    fn request(&mut self, request: ContentRequest) {
        tracing::debug!(
            target: "pageflow.web",
            ticket = request.ticket.0,
            path = %request.path,
            "content request queued"
        );
        self.issued += 1;
        self.queue.push_back(request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pageflow_core::PageIndex;

    fn request(ticket: u64, path: &str) -> ContentRequest {
        ContentRequest {
            ticket: ContentTicket(ticket),
            page: PageIndex::FIRST,
            path: path.to_string(),
            selector: ".ajaxHook".to_string(),
        }
    }

    #[test]
    fn requests_drain_in_order() {
        let mut content = PendingContent::new();
        content.request(request(0, "/a"));
        content.request(request(1, "/b"));
        assert_eq!(content.len(), 2);

        let drained = content.take_requests();
        assert_eq!(drained[0].path, "/a");
        assert_eq!(drained[1].path, "/b");
        assert!(content.is_empty());
        assert_eq!(content.issued(), 2);
    }

    #[test]
    fn find_looks_past_the_front() {
        let mut content = PendingContent::new();
        content.request(request(0, "/a"));
        content.request(request(1, "/b"));
        assert_eq!(content.find(ContentTicket(1)).map(|r| r.path.as_str()), Some("/b"));
        assert!(content.find(ContentTicket(7)).is_none());
    }
}
