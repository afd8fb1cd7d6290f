//! Explicit provider scope for handing a controller to consumers

use crate::{
    controller::ThemeController,
    error::{Result, ThemeError},
};

/// The set of controllers visible to a consumer.
///
/// Scopes nest: the innermost controller is the one consumers see.
#[derive(Debug, Clone, Default)]
pub struct ThemeContext {
    scopes: Vec<ThemeController>,
}

impl ThemeContext {
    /// A context with no provider in scope
    pub fn empty() -> Self {
        Self::default()
    }

    /// A context providing `controller`
    pub fn provide(controller: ThemeController) -> Self {
        Self {
            scopes: vec![controller],
        }
    }

    /// A child context where `controller` shadows any outer provider
    pub fn nested(&self, controller: ThemeController) -> Self {
        let mut scopes = self.scopes.clone();
        scopes.push(controller);
        Self { scopes }
    }

    pub fn is_provided(&self) -> bool {
        !self.scopes.is_empty()
    }

    /// Number of nested providers
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Get the innermost controller, failing when no provider is in scope
    pub fn use_theme(&self) -> Result<&ThemeController> {
        use_theme(self.scopes.last())
    }
}

/// Resolve an optional controller handle
pub fn use_theme(controller: Option<&ThemeController>) -> Result<&ThemeController> {
    controller.ok_or(ThemeError::NotInitialized)
}
