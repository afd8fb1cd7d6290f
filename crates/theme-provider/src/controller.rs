//! Theme controller: the single source of truth for the active theme

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

use crate::{
    config::ThemeProviderConfig,
    error::Result,
    indicator::{sync_indicator, ClassList, FixedPreference, MemoryClassList, SystemPreference},
    storage::{MemoryStorage, PreferenceStorage},
    types::{ResolvedTheme, Theme, ThemeState},
};

/// Type alias for theme listeners
type ThemeListener = Rc<dyn Fn(&ThemeState)>;

/// Handle returned when registering a listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Collaborators a controller reads from and writes to
#[derive(Clone)]
pub struct ThemeEnvironment {
    /// Persisted preference store
    pub storage: Rc<dyn PreferenceStorage>,
    /// Class list of the document root element
    pub root_classes: Rc<dyn ClassList>,
    /// OS/environment dark mode preference
    pub system_preference: Rc<dyn SystemPreference>,
}

impl ThemeEnvironment {
    pub fn new(
        storage: Rc<dyn PreferenceStorage>,
        root_classes: Rc<dyn ClassList>,
        system_preference: Rc<dyn SystemPreference>,
    ) -> Self {
        Self {
            storage,
            root_classes,
            system_preference,
        }
    }

    /// Fresh in-memory storage and class list with a fixed system preference
    pub fn in_memory(prefers_dark: bool) -> Self {
        Self::new(
            Rc::new(MemoryStorage::new()),
            Rc::new(MemoryClassList::new()),
            Rc::new(FixedPreference::new(prefers_dark)),
        )
    }

    /// Browser `localStorage`, `<html>` class list and `matchMedia`
    #[cfg(feature = "web")]
    pub fn browser() -> Result<Self> {
        use crate::web::{DocumentRootClasses, LocalStorage, MediaQueryPreference};

        Ok(Self::new(
            Rc::new(LocalStorage::new()?),
            Rc::new(DocumentRootClasses::new()?),
            Rc::new(MediaQueryPreference::new()?),
        ))
    }
}

impl fmt::Debug for ThemeEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeEnvironment").finish_non_exhaustive()
    }
}

struct Inner {
    config: ThemeProviderConfig,
    environment: ThemeEnvironment,
    /// Current preference
    theme: Cell<Theme>,
    /// Indicator applied by the last synchronization
    resolved: Cell<ResolvedTheme>,
    /// Theme change listeners
    listeners: RefCell<Vec<(ListenerId, ThemeListener)>>,
    next_listener_id: Cell<u64>,
}

/// Owns the current theme, persists changes and keeps the root class in sync.
///
/// Cloning yields another handle to the same controller. Separate controllers
/// never share in-memory state; they only meet in storage, where the last
/// write wins.
#[derive(Clone)]
pub struct ThemeController {
    inner: Rc<Inner>,
}

impl fmt::Debug for ThemeController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeController")
            .field("storage_key", &self.inner.config.storage_key)
            .field("theme", &self.inner.theme.get())
            .field("resolved", &self.inner.resolved.get())
            .finish()
    }
}

impl ThemeController {
    /// Resolve the initial theme from storage and apply its indicator.
    ///
    /// Absent or unrecognized stored values fall back to the configured
    /// default. Storage and class list failures are returned.
    pub fn new(config: ThemeProviderConfig, environment: ThemeEnvironment) -> Result<Self> {
        config.validate()?;

        let stored = environment.storage.get(&config.storage_key)?;
        let theme = match stored.as_deref() {
            Some(value) => Theme::from_persisted(value).unwrap_or_else(|| {
                tracing::warn!(
                    storage_key = %config.storage_key,
                    value,
                    "ignoring invalid persisted theme"
                );
                config.default_theme
            }),
            None => config.default_theme,
        };

        let resolved = sync_indicator(
            environment.root_classes.as_ref(),
            theme,
            environment.system_preference.as_ref(),
        )?;

        tracing::debug!(
            storage_key = %config.storage_key,
            %theme,
            %resolved,
            "theme controller initialized"
        );

        Ok(Self {
            inner: Rc::new(Inner {
                config,
                environment,
                theme: Cell::new(theme),
                resolved: Cell::new(resolved),
                listeners: RefCell::new(Vec::new()),
                next_listener_id: Cell::new(0),
            }),
        })
    }

    /// Controller with default configuration over in-memory collaborators
    pub fn in_memory(prefers_dark: bool) -> Result<Self> {
        Self::new(
            ThemeProviderConfig::default(),
            ThemeEnvironment::in_memory(prefers_dark),
        )
    }

    /// Get the current theme
    pub fn theme(&self) -> Theme {
        self.inner.theme.get()
    }

    /// Get the indicator currently applied to the root element
    pub fn resolved_theme(&self) -> ResolvedTheme {
        self.inner.resolved.get()
    }

    pub fn state(&self) -> ThemeState {
        ThemeState {
            theme: self.theme(),
            resolved: self.resolved_theme(),
        }
    }

    pub fn config(&self) -> &ThemeProviderConfig {
        &self.inner.config
    }

    pub fn environment(&self) -> &ThemeEnvironment {
        &self.inner.environment
    }

    /// Persist `next`, make it current, resynchronize the indicator and
    /// notify listeners, in that order.
    ///
    /// A failed storage write leaves the controller unchanged. A failed
    /// indicator sync restores the previous theme in memory and in storage
    /// before the error is returned.
    pub fn set_theme(&self, next: Theme) -> Result<()> {
        let inner = &self.inner;
        let key = &inner.config.storage_key;
        inner.environment.storage.set(key, next.as_str())?;

        let previous = inner.theme.replace(next);
        if let Err(err) = self.sync() {
            inner.theme.set(previous);
            if let Err(rollback) = inner.environment.storage.set(key, previous.as_str()) {
                tracing::warn!(
                    storage_key = %key,
                    %previous,
                    error = %rollback,
                    "failed to restore persisted theme"
                );
            }
            return Err(err);
        }

        tracing::debug!(
            storage_key = %inner.config.storage_key,
            %previous,
            theme = %next,
            "theme changed"
        );

        self.notify();
        Ok(())
    }

    /// Parse `name` and switch to it; unknown names are rejected untouched
    pub fn set_theme_str(&self, name: &str) -> Result<()> {
        let theme = name.parse::<Theme>()?;
        self.set_theme(theme)
    }

    /// Switch to the opposite of the currently resolved appearance
    pub fn toggle(&self) -> Result<Theme> {
        let next = Theme::from(self.resolved_theme().opposite());
        self.set_theme(next)?;
        Ok(next)
    }

    /// Reapply the indicator class for the current theme
    pub fn sync(&self) -> Result<ResolvedTheme> {
        let inner = &self.inner;
        let resolved = sync_indicator(
            inner.environment.root_classes.as_ref(),
            inner.theme.get(),
            inner.environment.system_preference.as_ref(),
        )?;
        inner.resolved.set(resolved);
        Ok(resolved)
    }

    /// Re-read the system preference. Listeners hear about it only when the
    /// resolved appearance actually changed.
    pub fn refresh_system_preference(&self) -> Result<ResolvedTheme> {
        let before = self.resolved_theme();
        let after = self.sync()?;
        if before != after {
            tracing::debug!(theme = %self.theme(), resolved = %after, "system preference changed");
            self.notify();
        }
        Ok(after)
    }

    /// Register a listener for theme changes
    pub fn on_theme_changed<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&ThemeState) + 'static,
    {
        let id = ListenerId(self.inner.next_listener_id.get());
        self.inner.next_listener_id.set(id.0 + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));
        id
    }

    /// Unregister a listener, returning whether it was registered
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.inner.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    fn notify(&self) {
        // Snapshot so listeners can (un)register or set the theme themselves
        let listeners: Vec<ThemeListener> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();

        let state = self.state();
        for listener in listeners {
            listener(&state);
        }
    }
}
