//! Theme State - active section theme
//!
//! Pages are built from full-height sections, each declaring the theme the
//! chrome should take while that section dominates the viewport. The
//! [`observer::ThemeObserver`] is the only writer of the active theme; the
//! rest of the crate (and the host) reads it through [`active_theme`] or
//! subscribes via [`theme_signal`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use spark_signals::{signal, Signal};

pub mod observer;

pub use observer::ThemeObserver;

// =============================================================================
// SECTION THEME
// =============================================================================

/// Visual theme a section requests for the surrounding chrome.
///
/// Serialized in lowercase, matching the section configuration format.
///
/// # Example
///
/// ```
/// use scrollstage::theme::SectionTheme;
///
/// let theme: SectionTheme = "green".parse().unwrap();
/// assert_eq!(theme, SectionTheme::Green);
/// assert_eq!(theme.as_str(), "green");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionTheme {
    Dark,
    Green,
    Light,
}

impl SectionTheme {
    /// The lowercase name used in section configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            SectionTheme::Dark => "dark",
            SectionTheme::Green => "green",
            SectionTheme::Light => "light",
        }
    }
}

impl fmt::Display for SectionTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a section theme name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown section theme: {0:?}")]
pub struct ParseThemeError(String);

impl FromStr for SectionTheme {
    type Err = ParseThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dark" => Ok(SectionTheme::Dark),
            "green" => Ok(SectionTheme::Green),
            "light" => Ok(SectionTheme::Light),
            other => Err(ParseThemeError(other.to_string())),
        }
    }
}

// =============================================================================
// ACTIVE THEME STORE
// =============================================================================

thread_local! {
    static ACTIVE_THEME: Signal<Option<SectionTheme>> = signal(None);
}

/// The currently active section theme, `None` before any section has
/// claimed the viewport.
pub fn active_theme() -> Option<SectionTheme> {
    ACTIVE_THEME.with(|t| t.get())
}

/// Signal tracking the active section theme.
pub fn theme_signal() -> Signal<Option<SectionTheme>> {
    ACTIVE_THEME.with(|t| t.clone())
}

/// Set the active theme. Writes only on change, so theme subscribers do
/// not churn while the same section keeps the viewport.
pub(crate) fn set_active_theme(theme: SectionTheme) {
    ACTIVE_THEME.with(|t| {
        if t.get() != Some(theme) {
            t.set(Some(theme));
        }
    });
}

/// Clear the active theme back to `None`.
pub(crate) fn clear_active_theme() {
    ACTIVE_THEME.with(|t| {
        if t.get().is_some() {
            t.set(None);
        }
    });
}

/// Reset the theme store (for testing).
pub fn reset_theme_state() {
    ACTIVE_THEME.with(|t| t.set(None));
}

// =============================================================================
// TESTS
// =============================================================================
