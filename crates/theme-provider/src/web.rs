//! Browser collaborators backed by `web-sys`.
//!
//! These wrap `localStorage`, the class list of `<html>` and the
//! `(prefers-color-scheme: dark)` media query. Requires a browser environment.

use wasm_bindgen::JsValue;
use web_sys::{DomTokenList, MediaQueryList, Storage, Window};

use crate::{
    error::{Result, ThemeError},
    indicator::{ClassList, SystemPreference},
    storage::PreferenceStorage,
};

const DARK_SCHEME_QUERY: &str = "(prefers-color-scheme: dark)";

fn js_message(value: &JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}

fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| ThemeError::Storage("No window available".to_string()))
}

/// `window.localStorage`
pub struct LocalStorage {
    storage: Storage,
}

impl LocalStorage {
    pub fn new() -> Result<Self> {
        let storage = window()?
            .local_storage()
            .map_err(|e| ThemeError::Storage(js_message(&e)))?
            .ok_or_else(|| ThemeError::Storage("localStorage is disabled".to_string()))?;
        Ok(Self { storage })
    }
}

impl PreferenceStorage for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| ThemeError::Storage(js_message(&e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.storage
            .set_item(key, value)
            .map_err(|e| ThemeError::Storage(js_message(&e)))
    }
}

/// `document.documentElement.classList`
pub struct DocumentRootClasses {
    class_list: DomTokenList,
}

impl DocumentRootClasses {
    pub fn new() -> Result<Self> {
        let root = window()?
            .document()
            .and_then(|doc| doc.document_element())
            .ok_or_else(|| ThemeError::Indicator("No document root element".to_string()))?;
        Ok(Self {
            class_list: root.class_list(),
        })
    }
}

impl ClassList for DocumentRootClasses {
    fn add(&self, class: &str) -> Result<()> {
        self.class_list
            .add_1(class)
            .map_err(|e| ThemeError::Indicator(js_message(&e)))
    }

    fn remove(&self, class: &str) -> Result<()> {
        self.class_list
            .remove_1(class)
            .map_err(|e| ThemeError::Indicator(js_message(&e)))
    }

    fn contains(&self, class: &str) -> bool {
        self.class_list.contains(class)
    }
}

/// `window.matchMedia("(prefers-color-scheme: dark)")`
///
/// Browsers without media query support report a light preference.
pub struct MediaQueryPreference {
    query: Option<MediaQueryList>,
}

impl MediaQueryPreference {
    pub fn new() -> Result<Self> {
        let query = window()?.match_media(DARK_SCHEME_QUERY).ok().flatten();
        Ok(Self { query })
    }
}

impl SystemPreference for MediaQueryPreference {
    fn prefers_dark(&self) -> bool {
        self.query.as_ref().is_some_and(MediaQueryList::matches)
    }
}
