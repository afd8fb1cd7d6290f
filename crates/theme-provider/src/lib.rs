//! Theme preference management for web front ends
//!
//! This crate keeps a `light`/`dark`/`system` theme preference, persists it to a
//! key/value preference store, and keeps a theme class on the document root in
//! sync with it. The [`ThemeController`] owns the state; a [`ThemeContext`]
//! hands it to consumers.

pub mod config;
pub mod context;
pub mod controller;
pub mod error;
pub mod indicator;
pub mod storage;
pub mod types;
#[cfg(feature = "web")]
pub mod web;

pub use crate::config::{ThemeProviderConfig, DEFAULT_STORAGE_KEY};
pub use context::{use_theme, ThemeContext};
pub use controller::{ListenerId, ThemeController, ThemeEnvironment};
pub use error::{Result, ThemeError};
pub use indicator::{sync_indicator, ClassList, FixedPreference, MemoryClassList, SystemPreference};
pub use storage::{FileStorage, MemoryStorage, PreferenceStorage};
pub use types::{ResolvedTheme, Theme, ThemeState};
