#![forbid(unsafe_code)]

//! Typed page registry.
//!
//! Pages are addressed by a 1-based ordinal ([`PageIndex`]) into the fixed,
//! ordered list of identifiers supplied at startup. The registry never
//! changes after construction; only the visual state of each page mutates.

use core::num::NonZeroUsize;

use crate::error::SiteError;

/// 1-based ordinal of a page in the configured page list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PageIndex(NonZeroUsize);

impl PageIndex {
    /// The first page.
    pub const FIRST: Self = Self(NonZeroUsize::MIN);

    /// Build an index from a 1-based ordinal. Returns `None` for `0`.
    #[must_use]
    pub const fn new(ordinal: usize) -> Option<Self> {
        match NonZeroUsize::new(ordinal) {
            Some(n) => Some(Self(n)),
            None => None,
        }
    }

    /// The 1-based ordinal.
    #[inline]
    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }

    /// Signed step count from `self` to `other` (`other - self`).
    #[inline]
    #[must_use]
    pub fn steps_to(self, other: Self) -> i64 {
        other.get() as i64 - self.get() as i64
    }
}

impl core::fmt::Display for PageIndex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier string of a page (`"home"`, `"archives"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageId(String);

impl PageId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for PageId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fixed ordered mapping between ordinals and page identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRegistry {
    ids: Vec<PageId>,
}

impl PageRegistry {
    /// Build the registry from the ordered identifier list.
    ///
    /// Rejects an empty list, empty identifiers and duplicates.
    pub fn new<I, S>(ids: I) -> Result<Self, SiteError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<PageId> = Vec::new();
        for (position, id) in ids.into_iter().enumerate() {
            let id = id.into();
            if id.is_empty() {
                return Err(SiteError::EmptyPageId {
                    position: position + 1,
                });
            }
            if out.iter().any(|existing| existing.0 == id) {
                return Err(SiteError::DuplicatePage(id));
            }
            out.push(PageId(id));
        }
        if out.is_empty() {
            return Err(SiteError::EmptyRegistry);
        }
        Ok(Self { ids: out })
    }

    /// Number of pages.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Always `false`; construction rejects empty lists.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Resolve an identifier to its ordinal.
    #[must_use]
    pub fn resolve(&self, id: &str) -> Option<PageIndex> {
        self.ids
            .iter()
            .position(|p| p.0 == id)
            .and_then(|pos| PageIndex::new(pos + 1))
    }

    /// Identifier of the page at `index`.
    #[must_use]
    pub fn id(&self, index: PageIndex) -> Option<&PageId> {
        self.ids.get(index.get() - 1)
    }

    /// Whether `index` addresses a configured page.
    #[inline]
    #[must_use]
    pub fn contains(&self, index: PageIndex) -> bool {
        index.get() <= self.ids.len()
    }

    /// Validate a raw ordinal against the registry.
    pub fn index(&self, ordinal: usize) -> Result<PageIndex, SiteError> {
        PageIndex::new(ordinal)
            .filter(|idx| self.contains(*idx))
            .ok_or(SiteError::UnknownPage {
                index: ordinal,
                page_count: self.ids.len(),
            })
    }

    /// Iterate pages in ordinal order.
    pub fn iter(&self) -> impl Iterator<Item = (PageIndex, &PageId)> + '_ {
        self.ids
            .iter()
            .enumerate()
            .filter_map(|(pos, id)| PageIndex::new(pos + 1).map(|idx| (idx, id)))
    }

    /// All ordinals, `1..=len`.
    pub fn indices(&self) -> impl Iterator<Item = PageIndex> + '_ {
        (1..=self.ids.len()).filter_map(PageIndex::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> PageRegistry {
        PageRegistry::new(["home", "projects", "archives", "contact"]).unwrap()
    }

    #[test]
    fn resolves_in_configured_order() {
        let reg = site();
        assert_eq!(reg.len(), 4);
        assert_eq!(reg.resolve("home"), PageIndex::new(1));
        assert_eq!(reg.resolve("archives"), PageIndex::new(3));
        assert_eq!(reg.resolve("blog"), None);
        assert_eq!(reg.id(PageIndex::new(4).unwrap()).unwrap().as_str(), "contact");
    }

    #[test]
    fn zero_ordinal_is_not_an_index() {
        assert!(PageIndex::new(0).is_none());
        assert_eq!(
            site().index(0),
            Err(SiteError::UnknownPage {
                index: 0,
                page_count: 4
            })
        );
    }

    #[test]
    fn out_of_range_is_rejected() {
        let reg = site();
        assert!(!reg.contains(PageIndex::new(5).unwrap()));
        assert!(reg.index(5).is_err());
        assert_eq!(reg.index(4).unwrap().get(), 4);
    }

    #[test]
    fn rejects_bad_lists() {
        assert_eq!(
            PageRegistry::new(Vec::<String>::new()),
            Err(SiteError::EmptyRegistry)
        );
        assert_eq!(
            PageRegistry::new(["home", "home"]),
            Err(SiteError::DuplicatePage("home".into()))
        );
        assert_eq!(
            PageRegistry::new(["home", ""]),
            Err(SiteError::EmptyPageId { position: 2 })
        );
    }

    #[test]
    fn steps_are_signed() {
        let one = PageIndex::FIRST;
        let three = PageIndex::new(3).unwrap();
        assert_eq!(one.steps_to(three), 2);
        assert_eq!(three.steps_to(one), -2);
    }

    #[test]
    fn iter_pairs_index_with_id() {
        let reg = site();
        let ids: Vec<_> = reg.iter().map(|(i, id)| (i.get(), id.as_str())).collect();
        assert_eq!(ids[2], (3, "archives"));
        assert_eq!(reg.indices().count(), 4);
    }
}
