//! Provider configuration

use std::path::Path;

use ::config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, ThemeError},
    types::Theme,
};

/// Storage key used when none is configured
pub const DEFAULT_STORAGE_KEY: &str = "vite-ui-theme";

/// Environment prefix for configuration overrides
const ENV_PREFIX: &str = "THEME_PROVIDER";

/// Configuration supplied once when a controller is constructed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeProviderConfig {
    /// Theme used when nothing valid is persisted
    pub default_theme: Theme,
    /// Key the preference is persisted under
    pub storage_key: String,
}

impl Default for ThemeProviderConfig {
    fn default() -> Self {
        Self {
            default_theme: Theme::System,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl ThemeProviderConfig {
    pub fn with_default_theme(mut self, theme: Theme) -> Self {
        self.default_theme = theme;
        self
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Load configuration from an optional TOML file, then apply
    /// `THEME_PROVIDER_*` environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let builder = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX));

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| ThemeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage_key.is_empty() {
            return Err(ThemeError::Config(
                "Storage key cannot be empty".to_string(),
            ));
        }
        if self.storage_key.trim() != self.storage_key {
            return Err(ThemeError::Config(format!(
                "Storage key has surrounding whitespace: {:?}",
                self.storage_key
            )));
        }
        Ok(())
    }
}
