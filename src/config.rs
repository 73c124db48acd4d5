//! User configuration
//!
//! Configuration is a single optional TOML file, by default at
//! `~/.config/rove-cli/config.toml` (per-platform via `directories`).
//! The `[DEFAULT]` table drives resolution: `plugin` names the plugin to
//! run when none is given on the command line, and `options` is a
//! whitespace-separated string of extra command-line tokens appended
//! before the final parse. Plugins may read their own tables.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use thiserror::Error;
use tracing::warn;

/// Section consulted for `plugin` and `options`.
pub const DEFAULT_SECTION: &str = "DEFAULT";

#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("user config not found: {}", .0.display())]
    NotFound(PathBuf),
}

/// Parsed user configuration.
#[derive(Debug, Clone)]
pub struct Config {
    path: PathBuf,
    table: toml::Table,
}

impl Config {
    /// Returns the per-user default config path, when one can be determined.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("dev", "rove", "rove-cli")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Loads configuration.
    ///
    /// With an explicit path, a missing file is fatal. The default path is
    /// optional and its absence means no configuration. A file that exists
    /// but cannot be read or parsed downgrades to no configuration with a
    /// logged warning.
    pub fn load(explicit: Option<&Path>) -> Result<Option<Self>, ConfigError> {
        let (path, required) = match explicit {
            Some(p) => (absolutize(p), true),
            None => match Self::default_path() {
                Some(p) => (p, false),
                None => return Ok(None),
            },
        };

        if !path.is_file() {
            if required {
                return Err(ConfigError::NotFound(path));
            }
            return Ok(None);
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                warn!("user config error: {}: {}", path.display(), err);
                return Ok(None);
            }
        };

        match Self::parse(&path, &content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                warn!("user config error: {}: {}", path.display(), err.message());
                Ok(None)
            }
        }
    }

    fn parse(path: &Path, content: &str) -> Result<Self, toml::de::Error> {
        let table = content.parse::<toml::Table>()?;
        Ok(Self {
            path: path.to_path_buf(),
            table,
        })
    }

    /// Path the configuration was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Plugin name from `[DEFAULT]`, if set.
    pub fn default_plugin(&self) -> Option<&str> {
        self.get(DEFAULT_SECTION, "plugin")
    }

    /// Extra command-line tokens from `[DEFAULT]`, if set. The value is a
    /// single string; callers split it on whitespace.
    pub fn default_options(&self) -> Option<&str> {
        self.get(DEFAULT_SECTION, "options")
    }

    /// String value from an arbitrary section.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section)?.get(key)?.as_str()
    }

    /// Raw table for a section, for plugins that keep their own settings.
    pub fn section(&self, name: &str) -> Option<&toml::Table> {
        self.table.get(name)?.as_table()
    }
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}
