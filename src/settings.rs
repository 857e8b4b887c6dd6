//! Settings for the `typed-config` command line tool
//!
//! Supports loading settings from:
//! - Default values
//! - Settings file (typed-config.toml)
//! - Environment variables (TYPED_CONFIG__*)
//!
//! ## Example settings file (typed-config.toml):
//! ```toml
//! [store]
//! path = "./app.json"
//! format = "json"
//! keep_empty_file = false
//!
//! [print]
//! mode = "real"
//! types = true
//! color = true
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::Mode;
use crate::parser::Format;
use crate::print::PrintOptions;

/// Main settings for the tool
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Where and how the configuration is persisted
    #[serde(default)]
    pub store: StoreSettings,

    /// Output defaults
    #[serde(default)]
    pub print: PrintSettings,
}

/// Store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Path to the configuration file
    #[serde(default = "default_store_path")]
    pub path: PathBuf,

    /// Serialization format
    #[serde(default)]
    pub format: Format,

    /// Keep the file when the last key is removed
    #[serde(default)]
    pub keep_empty_file: bool,
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintSettings {
    #[serde(default = "default_mode")]
    pub mode: Mode,

    #[serde(default)]
    pub types: bool,

    #[serde(default = "default_true")]
    pub color: bool,
}

// Default value functions
fn default_store_path() -> PathBuf {
    PathBuf::from("config.json")
}

fn default_mode() -> Mode {
    Mode::Real
}

fn default_true() -> bool {
    true
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            format: Format::default(),
            keep_empty_file: false,
        }
    }
}

impl Default for PrintSettings {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            types: false,
            color: true,
        }
    }
}

impl Settings {
    /// Load settings from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load settings, layering a specific file over the default locations
    pub fn load_from(settings_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let locations = [
            "typed-config.toml",
            ".typed-config.toml",
            "config/typed-config.toml",
        ];

        for location in locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(dirs) = directories::ProjectDirs::from("dev", "typed-config", "typed-config") {
            let xdg_settings = dirs.config_dir().join("typed-config.toml");
            if xdg_settings.exists() {
                builder = builder.add_source(File::from(xdg_settings).required(false));
            }
        }

        if let Some(path) = settings_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Environment variables (TYPED_CONFIG__STORE__PATH, ...)
        builder = builder.add_source(
            Environment::with_prefix("TYPED_CONFIG")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder.build()?;
        settings.try_deserialize()
    }

    /// Store path (relative paths resolve against the working directory)
    pub fn store_path(&self) -> PathBuf {
        if self.store.path.is_absolute() {
            self.store.path.clone()
        } else {
            std::env::current_dir()
                .unwrap_or_default()
                .join(&self.store.path)
        }
    }

    /// Print options seeded from these settings
    pub fn print_options(&self) -> PrintOptions {
        PrintOptions {
            mode: self.print.mode,
            types: self.print.types,
            parsable: false,
            color: self.print.color,
        }
    }
}
