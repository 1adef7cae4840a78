//! Configuration file loader with multi-source merging

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::PathBuf;

use super::settings::Settings;

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables prefixed `CONDUCTOR_`
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./conductor.toml` or `./.conductor.toml`
    /// 4. Global: `<config dir>/conductor/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<Settings, Box<figment::Error>> {
        let mut figment = Figment::new().merge(Serialized::defaults(Settings::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(&path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Double underscore separates nesting so field names keep
        // their own underscores: CONDUCTOR_LLM__MAX_TOKENS.
        figment = figment.merge(Env::prefixed("CONDUCTOR_").split("__"));

        figment.extract().map_err(Box::new)
    }

    /// Load only default configuration
    pub fn load_defaults() -> Settings {
        Settings::default()
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("conductor").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        for filename in &["conductor.toml", ".conductor.toml"] {
            let path = PathBuf::from(filename);
            if path.exists() {
                return Some(path);
            }
        }
        None
    }
}
