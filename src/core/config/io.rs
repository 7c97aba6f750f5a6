use crate::core::config::data::{path_display, Config};
use directories::ProjectDirs;
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_DIR_ENV: &str = "PARLEY_CONFIG_DIR";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors that can occur when loading configuration from disk.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse the configuration file as valid TOML.
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// The file parsed but holds a value out of range.
    Invalid { path: PathBuf, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "Failed to read config at {}: {}", path_display(path), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "Failed to parse config at {}: {}", path_display(path), source)
            }
            ConfigError::Invalid { path, message } => {
                write!(f, "Invalid config at {}: {}", path_display(path), message)
            }
        }
    }
}

impl StdError for ConfigError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::Invalid { .. } => None,
        }
    }
}

impl Config {
    /// Load the user's config, or defaults when there is no config file.
    pub fn load() -> Result<Config, ConfigError> {
        match Self::get_config_path() {
            Some(path) => Self::load_from_path(&path),
            None => {
                debug!("no config directory available; using defaults");
                Ok(Config::default())
            }
        }
    }

    pub fn load_from_path(config_path: &Path) -> Result<Config, ConfigError> {
        if !config_path.exists() {
            debug!(path = %path_display(config_path), "config file not found; using defaults");
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
            path: config_path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source,
        })?;
        config
            .validate()
            .map_err(|message| ConfigError::Invalid {
                path: config_path.to_path_buf(),
                message,
            })?;
        debug!(path = %path_display(config_path), "loaded config");
        Ok(config)
    }

    pub fn get_config_path() -> Option<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|dir| !dir.is_empty()) {
            return Some(PathBuf::from(dir).join(CONFIG_FILE_NAME));
        }
        ProjectDirs::from("", "", "parley").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}
