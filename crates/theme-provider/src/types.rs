//! Core theme types

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ThemeError;

/// A theme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    /// Follow the OS/environment preference
    #[default]
    System,
}

impl Theme {
    /// All valid theme preferences
    pub const ALL: [Theme; 3] = [Theme::Light, Theme::Dark, Theme::System];

    /// The persisted name of this preference
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }

    /// Parse a persisted value, returning `None` for anything that is not an
    /// exact theme name.
    pub fn from_persisted(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|theme| theme.as_str() == value)
    }

    /// Resolve this preference against the system dark mode preference
    pub fn resolve(&self, prefers_dark: bool) -> ResolvedTheme {
        match self {
            Theme::Light => ResolvedTheme::Light,
            Theme::Dark => ResolvedTheme::Dark,
            Theme::System => ResolvedTheme::from_prefers_dark(prefers_dark),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_persisted(s).ok_or_else(|| ThemeError::InvalidTheme(s.to_string()))
    }
}

/// The concrete appearance applied to the root element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedTheme {
    Light,
    Dark,
}

impl ResolvedTheme {
    /// Every indicator class this crate ever applies
    pub const ALL: [ResolvedTheme; 2] = [ResolvedTheme::Light, ResolvedTheme::Dark];

    pub fn from_prefers_dark(prefers_dark: bool) -> Self {
        if prefers_dark {
            ResolvedTheme::Dark
        } else {
            ResolvedTheme::Light
        }
    }

    /// CSS class name placed on the root element
    pub fn class_name(&self) -> &'static str {
        match self {
            ResolvedTheme::Light => "light",
            ResolvedTheme::Dark => "dark",
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            ResolvedTheme::Light => ResolvedTheme::Dark,
            ResolvedTheme::Dark => ResolvedTheme::Light,
        }
    }
}

impl From<ResolvedTheme> for Theme {
    fn from(resolved: ResolvedTheme) -> Self {
        match resolved {
            ResolvedTheme::Light => Theme::Light,
            ResolvedTheme::Dark => Theme::Dark,
        }
    }
}

impl fmt::Display for ResolvedTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

/// Snapshot handed to consumers and listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeState {
    /// Current preference
    pub theme: Theme,
    /// Indicator currently applied to the root element
    pub resolved: ResolvedTheme,
}
