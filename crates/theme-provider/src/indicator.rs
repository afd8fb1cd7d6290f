//! Root element indicator class synchronization

use std::{
    cell::{Cell, RefCell},
    collections::BTreeSet,
};

use crate::{
    error::Result,
    types::{ResolvedTheme, Theme},
};

/// Mutable class set of the document root element
pub trait ClassList {
    fn add(&self, class: &str) -> Result<()>;

    fn remove(&self, class: &str) -> Result<()>;

    fn contains(&self, class: &str) -> bool;
}

/// Source of the OS/environment dark mode preference
pub trait SystemPreference {
    fn prefers_dark(&self) -> bool;
}

impl<F> SystemPreference for F
where
    F: Fn() -> bool,
{
    fn prefers_dark(&self) -> bool {
        self()
    }
}

/// A system preference that only changes when told to
#[derive(Debug, Default)]
pub struct FixedPreference {
    prefers_dark: Cell<bool>,
}

impl FixedPreference {
    pub fn new(prefers_dark: bool) -> Self {
        Self {
            prefers_dark: Cell::new(prefers_dark),
        }
    }

    pub fn set(&self, prefers_dark: bool) {
        self.prefers_dark.set(prefers_dark);
    }
}

impl SystemPreference for FixedPreference {
    fn prefers_dark(&self) -> bool {
        self.prefers_dark.get()
    }
}

/// In-memory class set standing in for the document root
#[derive(Debug, Default)]
pub struct MemoryClassList {
    classes: RefCell<BTreeSet<String>>,
}

impl MemoryClassList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with the given classes already present
    pub fn with_classes<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            classes: RefCell::new(classes.into_iter().map(Into::into).collect()),
        }
    }

    /// Sorted snapshot of the current classes
    pub fn classes(&self) -> Vec<String> {
        self.classes.borrow().iter().cloned().collect()
    }
}

impl ClassList for MemoryClassList {
    fn add(&self, class: &str) -> Result<()> {
        self.classes.borrow_mut().insert(class.to_string());
        Ok(())
    }

    fn remove(&self, class: &str) -> Result<()> {
        self.classes.borrow_mut().remove(class);
        Ok(())
    }

    fn contains(&self, class: &str) -> bool {
        self.classes.borrow().contains(class)
    }
}

/// Apply the indicator class for `theme` to `classes`.
///
/// The new class is added before the other theme class is removed, so a
/// failed `add` leaves the previous indicator in place. The system preference
/// is only consulted for [`Theme::System`].
pub fn sync_indicator(
    classes: &dyn ClassList,
    theme: Theme,
    preference: &dyn SystemPreference,
) -> Result<ResolvedTheme> {
    let resolved = match theme {
        Theme::System => ResolvedTheme::from_prefers_dark(preference.prefers_dark()),
        Theme::Light => ResolvedTheme::Light,
        Theme::Dark => ResolvedTheme::Dark,
    };
    classes.add(resolved.class_name())?;

    for class in ResolvedTheme::ALL {
        if class != resolved {
            classes.remove(class.class_name())?;
        }
    }

    tracing::trace!(%theme, %resolved, "synchronized root theme class");
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn theme_strategy() -> impl Strategy<Value = Theme> {
        prop_oneof![Just(Theme::Light), Just(Theme::Dark), Just(Theme::System)]
    }

    fn theme_class_count(classes: &MemoryClassList) -> usize {
        ResolvedTheme::ALL
            .iter()
            .filter(|class| classes.contains(class.class_name()))
            .count()
    }

    #[test]
    fn test_sync_replaces_previous_class() {
        let classes = MemoryClassList::with_classes(["dark", "antialiased"]);
        let preference = FixedPreference::new(true);

        let resolved = sync_indicator(&classes, Theme::Light, &preference).unwrap();

        assert_eq!(resolved, ResolvedTheme::Light);
        assert_eq!(classes.classes(), vec!["antialiased", "light"]);
    }

    #[test]
    fn test_sync_system_consults_preference() {
        let classes = MemoryClassList::new();
        let preference = FixedPreference::new(false);
        assert_eq!(
            sync_indicator(&classes, Theme::System, &preference).unwrap(),
            ResolvedTheme::Light
        );

        preference.set(true);
        assert_eq!(
            sync_indicator(&classes, Theme::System, &preference).unwrap(),
            ResolvedTheme::Dark
        );
        assert_eq!(classes.classes(), vec!["dark"]);
    }

    struct RejectingClasses {
        inner: MemoryClassList,
    }

    impl ClassList for RejectingClasses {
        fn add(&self, class: &str) -> Result<()> {
            Err(crate::error::ThemeError::Indicator(format!("cannot add {}", class)))
        }

        fn remove(&self, class: &str) -> Result<()> {
            self.inner.remove(class)
        }

        fn contains(&self, class: &str) -> bool {
            self.inner.contains(class)
        }
    }

    #[test]
    fn test_failed_add_keeps_previous_class() {
        let classes = RejectingClasses {
            inner: MemoryClassList::with_classes(["light"]),
        };
        let preference = FixedPreference::new(false);

        assert!(sync_indicator(&classes, Theme::Dark, &preference).is_err());
        assert_eq!(classes.inner.classes(), vec!["light"]);
    }

    #[test]
    fn test_closure_preference() {
        let classes = MemoryClassList::new();
        let preference = || true;
        sync_indicator(&classes, Theme::System, &preference).unwrap();
        assert!(classes.contains("dark"));
    }

    proptest! {
        #[test]
        fn prop_exactly_one_theme_class(
            themes in proptest::collection::vec(theme_strategy(), 1..16),
            prefers_dark in any::<bool>(),
        ) {
            let classes = MemoryClassList::new();
            let preference = FixedPreference::new(prefers_dark);
            for theme in &themes {
                sync_indicator(&classes, *theme, &preference).unwrap();
                prop_assert_eq!(theme_class_count(&classes), 1);
            }
            let last = *themes.last().unwrap();
            prop_assert!(classes.contains(last.resolve(prefers_dark).class_name()));
        }

        #[test]
        fn prop_sync_is_idempotent(theme in theme_strategy(), prefers_dark in any::<bool>()) {
            let classes = MemoryClassList::with_classes(["root"]);
            let preference = FixedPreference::new(prefers_dark);
            sync_indicator(&classes, theme, &preference).unwrap();
            let first = classes.classes();
            sync_indicator(&classes, theme, &preference).unwrap();
            prop_assert_eq!(first, classes.classes());
        }
    }
}
