#![forbid(unsafe_code)]

//! Error types shared across the pageflow state machines.
//!
//! Nothing here is fatal. The site is purely presentational, so every error
//! is reported to the caller and the visual state is left as it was.

/// Errors raised while building the page registry or addressing pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteError {
    /// An ordinal outside `1..=page_count` was requested.
    UnknownPage { index: usize, page_count: usize },
    /// The configured page list is empty.
    EmptyRegistry,
    /// The same identifier appears twice in the page list.
    DuplicatePage(String),
    /// A page identifier is the empty string.
    EmptyPageId { position: usize },
}

impl core::fmt::Display for SiteError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnknownPage { index, page_count } => {
                write!(f, "page {index} is outside 1..={page_count}")
            }
            Self::EmptyRegistry => write!(f, "page list is empty"),
            Self::DuplicatePage(id) => write!(f, "duplicate page identifier: {id}"),
            Self::EmptyPageId { position } => {
                write!(f, "page identifier at position {position} is empty")
            }
        }
    }
}

impl std::error::Error for SiteError {}

/// Failure reported by a content source for an in-place content swap.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ContentError {
    /// The requested path does not exist.
    NotFound(String),
    /// Any other fetch failure (network, parse, host refusal).
    Failed(String),
}

impl core::fmt::Display for ContentError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "content not found: {path}"),
            Self::Failed(msg) => write!(f, "content fetch failed: {msg}"),
        }
    }
}

impl std::error::Error for ContentError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unknown_page() {
        let err = SiteError::UnknownPage {
            index: 7,
            page_count: 4,
        };
        assert_eq!(err.to_string(), "page 7 is outside 1..=4");
    }

    #[test]
    fn content_error_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(ContentError::NotFound("/x".into()));
        assert!(err.to_string().contains("/x"));
    }
}
