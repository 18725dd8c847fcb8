#![forbid(unsafe_code)]

//! Site configuration.
//!
//! Captures the page list and every tunable timing as a single
//! [`SiteConfig`]. Defaults match the constants the site theme has always
//! used, so `SiteConfig::new(pages)` behaves exactly like the stock theme.
//!
//! # Loading
//!
//! With the `site-config` feature the config can be read from JSON or TOML
//! at startup. Besides an explicit `pages` list, the JSON form accepts the
//! static-site generator's `menuitems` object; its keys, in document order,
//! become the page list.
//!
//! ```toml
//! pages = ["home", "projects", "archives", "contact"]
//!
//! [transition]
//! page_duration_ms = 250
//! displacement = 100.0
//! ```
//!
//! ```rust,ignore
//! let config = SiteConfig::from_toml_file("pageflow.toml")?;
//! let config = SiteConfig::from_json_str(r#"{"menuitems": {"home": "", "blog": "blog"}}"#)?;
//! ```

use core::time::Duration;

#[cfg(feature = "site-config")]
use std::path::Path;

#[cfg(feature = "site-config")]
use serde::{Deserialize, Serialize};

use crate::error::SiteError;
use crate::page::PageRegistry;

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Page transition parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "site-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "site-config", serde(default))]
pub struct TransitionConfig {
    /// Duration of one page transition; also the debounce window.
    #[cfg_attr(
        feature = "site-config",
        serde(rename = "page_duration_ms", with = "duration_ms")
    )]
    pub page_duration: Duration,
    /// Depth units per ordinal step.
    pub displacement: f32,
    /// Opacity of the page directly ahead of the target; further pages get
    /// `ahead_opacity / steps`.
    pub ahead_opacity: f32,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            page_duration: Duration::from_millis(250),
            displacement: 100.0,
            ahead_opacity: 0.1,
        }
    }
}

/// In-place content swap parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "site-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "site-config", serde(default))]
pub struct ContentConfig {
    /// Fade-out used on the submenu page, where only the inner block fades.
    #[cfg_attr(
        feature = "site-config",
        serde(rename = "submenu_fade_ms", with = "duration_ms")
    )]
    pub submenu_fade: Duration,
    /// Delay between starting the fade-out and requesting new content.
    #[cfg_attr(
        feature = "site-config",
        serde(rename = "swap_delay_ms", with = "duration_ms")
    )]
    pub swap_delay: Duration,
    /// Page whose own submenu must survive a content swap.
    pub submenu_page: Option<String>,
    /// Fragment selector requested from the content source.
    pub body_selector: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            submenu_fade: Duration::from_millis(100),
            swap_delay: Duration::from_millis(100),
            submenu_page: Some("archives".to_string()),
            body_selector: ".ajaxHook".to_string(),
        }
    }
}

/// Navigation menu animation parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "site-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "site-config", serde(default))]
pub struct MenuConfig {
    /// Gap between putting items in layout and starting their fade-in.
    #[cfg_attr(
        feature = "site-config",
        serde(rename = "fade_in_delay_ms", with = "duration_ms")
    )]
    pub fade_in_delay: Duration,
    /// Fade-in duration of the first link.
    #[cfg_attr(
        feature = "site-config",
        serde(rename = "fade_in_first_ms", with = "duration_ms")
    )]
    pub fade_in_first: Duration,
    /// Added per following link.
    #[cfg_attr(
        feature = "site-config",
        serde(rename = "fade_in_step_ms", with = "duration_ms")
    )]
    pub fade_in_step: Duration,
    /// Fade-out duration of the first link.
    #[cfg_attr(
        feature = "site-config",
        serde(rename = "fade_out_first_ms", with = "duration_ms")
    )]
    pub fade_out_first: Duration,
    /// Subtracted per following link.
    #[cfg_attr(
        feature = "site-config",
        serde(rename = "fade_out_step_ms", with = "duration_ms")
    )]
    pub fade_out_step: Duration,
    /// When the faded-out links leave layout.
    #[cfg_attr(
        feature = "site-config",
        serde(rename = "removal_delay_ms", with = "duration_ms")
    )]
    pub removal_delay: Duration,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            fade_in_delay: Duration::from_millis(10),
            fade_in_first: Duration::from_millis(100),
            fade_in_step: Duration::from_millis(100),
            fade_out_first: Duration::from_millis(600),
            fade_out_step: Duration::from_millis(100),
            removal_delay: Duration::from_millis(600),
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level SiteConfig
// ---------------------------------------------------------------------------

/// Everything the site needs at startup.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "site-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "site-config", serde(default))]
pub struct SiteConfig {
    /// Ordered page identifiers; ordinal `n` is `pages[n - 1]`.
    pub pages: Vec<String>,
    /// Generator-style menu: ordered keys become `pages` when `pages` is empty.
    #[cfg_attr(
        feature = "site-config",
        serde(
            skip_serializing,
            deserialize_with = "menu_items::deserialize",
            default
        )
    )]
    pub menuitems: Vec<String>,
    pub transition: TransitionConfig,
    pub content: ContentConfig,
    pub menu: MenuConfig,
}

impl SiteConfig {
    /// Config with the given pages and default timings.
    #[must_use]
    pub fn new<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pages: pages.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// The effective page list (`pages`, or `menuitems` keys as fallback).
    #[must_use]
    pub fn page_list(&self) -> &[String] {
        if self.pages.is_empty() {
            &self.menuitems
        } else {
            &self.pages
        }
    }

    /// Build the page registry from the effective page list.
    pub fn registry(&self) -> Result<PageRegistry, SiteError> {
        PageRegistry::new(self.page_list().iter().cloned())
    }

    /// Load from a JSON string.
    #[cfg(feature = "site-config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(ConfigError::Json)?;
        config.validate()
    }

    /// Load from a TOML string.
    #[cfg(feature = "site-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(ConfigError::Toml)?;
        config.validate()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "site-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Serialize to pretty JSON.
    #[cfg(feature = "site-config")]
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(ConfigError::Json)
    }

    #[cfg(feature = "site-config")]
    fn validate(self) -> Result<Self, ConfigError> {
        self.registry().map_err(ConfigError::Invalid)?;
        Ok(self)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from loading a [`SiteConfig`].
#[cfg(feature = "site-config")]
#[derive(Debug)]
pub enum ConfigError {
    Json(serde_json::Error),
    Toml(toml::de::Error),
    Io(std::io::Error),
    /// Parsed, but the page list is unusable.
    Invalid(SiteError),
}

#[cfg(feature = "site-config")]
impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Json(e) => write!(f, "invalid JSON config: {e}"),
            Self::Toml(e) => write!(f, "invalid TOML config: {e}"),
            Self::Io(e) => write!(f, "cannot read config: {e}"),
            Self::Invalid(e) => write!(f, "invalid site config: {e}"),
        }
    }
}

#[cfg(feature = "site-config")]
impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::Toml(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Invalid(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Serde helpers
// ---------------------------------------------------------------------------

#[cfg(feature = "site-config")]
mod duration_ms {
    use core::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

/// `menuitems` is an object whose keys, in document order, name the pages.
#[cfg(feature = "site-config")]
mod menu_items {
    use serde::Deserializer;
    use serde::de::{IgnoredAny, MapAccess, Visitor};

    struct KeysInOrder;

    impl<'de> Visitor<'de> for KeysInOrder {
        type Value = Vec<String>;

        fn expecting(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            f.write_str("a map of menu item names")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut keys = Vec::new();
            while let Some((key, _)) = map.next_entry::<String, IgnoredAny>()? {
                keys.push(key);
            }
            Ok(keys)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        d.deserialize_map(KeysInOrder)
    }
}
