#![forbid(unsafe_code)]

//! In-memory session history with a cursor.
//!
//! Models the browser's joint session history for one document: pushing
//! discards any forward entries, back/forward move the cursor and hand the
//! stored entry back for replay.

use pageflow_core::{HistoryEntry, HistoryStack};

#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
    entries: Vec<HistoryEntry>,
    cursor: usize,
}

impl MemoryHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    #[must_use]
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.cursor)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    #[must_use]
    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Step back one entry and return it, or `None` at the start.
    pub fn back(&mut self) -> Option<HistoryEntry> {
        if !self.can_go_back() {
            return None;
        }
        self.cursor -= 1;
        self.current().cloned()
    }

    /// Step forward one entry and return it, or `None` at the end.
    pub fn forward(&mut self) -> Option<HistoryEntry> {
        if !self.can_go_forward() {
            return None;
        }
        self.cursor += 1;
        self.current().cloned()
    }
}

impl HistoryStack for MemoryHistory {
    fn replace_current_entry(&mut self, entry: &HistoryEntry) {
        match self.entries.get_mut(self.cursor) {
            Some(slot) => *slot = entry.clone(),
            None => {
                self.entries.push(entry.clone());
                self.cursor = self.entries.len() - 1;
            }
        }
    }

    fn push_entry(&mut self, entry: &HistoryEntry) {
        if self.entries.is_empty() {
            self.entries.push(entry.clone());
            self.cursor = 0;
            return;
        }
        self.entries.truncate(self.cursor + 1);
        self.entries.push(entry.clone());
        self.cursor = self.entries.len() - 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pageflow_core::PageIndex;
    use pretty_assertions::assert_eq;

    fn entry(n: usize, url: &str) -> HistoryEntry {
        HistoryEntry::new(PageIndex::new(n).unwrap(), url)
    }

    #[test]
    fn replace_on_empty_creates_first_entry() {
        let mut history = MemoryHistory::new();
        history.replace_current_entry(&entry(1, "/"));
        assert_eq!(history.entries(), &[entry(1, "/")]);
        assert_eq!(history.current(), Some(&entry(1, "/")));
    }

    #[test]
    fn back_and_forward_walk_the_stack() {
        let mut history = MemoryHistory::new();
        history.replace_current_entry(&entry(1, "/"));
        history.push_entry(&entry(2, "/projects"));
        history.push_entry(&entry(3, "/archives"));

        assert_eq!(history.back(), Some(entry(2, "/projects")));
        assert_eq!(history.back(), Some(entry(1, "/")));
        assert_eq!(history.back(), None);
        assert_eq!(history.forward(), Some(entry(2, "/projects")));
        assert_eq!(history.forward(), Some(entry(3, "/archives")));
        assert_eq!(history.forward(), None);
    }

    #[test]
    fn push_discards_forward_entries() {
        let mut history = MemoryHistory::new();
        history.replace_current_entry(&entry(1, "/"));
        history.push_entry(&entry(2, "/projects"));
        history.push_entry(&entry(3, "/archives"));
        history.back();
        history.back();

        history.push_entry(&entry(4, "/contact"));
        assert_eq!(history.entries(), &[entry(1, "/"), entry(4, "/contact")]);
        assert!(!history.can_go_forward());
    }
}
