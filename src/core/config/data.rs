use serde::Deserialize;
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_TOKENS: u32 = 2048;
pub const TEMPERATURE_RANGE: RangeInclusive<f32> = 0.0..=2.0;

/// Contents of `config.toml`. Every field is optional; command-line flags
/// take precedence over anything set here.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Model to use per provider when `--model` is not given
    /// Key: provider name (e.g., "claude")
    #[serde(default)]
    pub default_models: HashMap<String, String>,
    /// Token cap for replies when `--max-tokens` is not given
    pub max_tokens: Option<u32>,
    /// Sampling temperature when `--temperature` is not given
    pub temperature: Option<f32>,
    /// Endpoint overrides per provider, e.g. a local proxy
    #[serde(default)]
    pub base_urls: HashMap<String, String>,
}

impl Config {
    /// Reject values the command line would also refuse.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_tokens == Some(0) {
            return Err("max_tokens must be at least 1".to_string());
        }
        if let Some(temperature) = self.temperature {
            if !TEMPERATURE_RANGE.contains(&temperature) {
                return Err(format!(
                    "temperature must be between {} and {}, got {temperature}",
                    TEMPERATURE_RANGE.start(),
                    TEMPERATURE_RANGE.end()
                ));
            }
        }
        Ok(())
    }

    pub fn get_default_model(&self, provider: &str) -> Option<&String> {
        lookup_case_insensitive(&self.default_models, provider)
    }

    pub fn get_base_url(&self, provider: &str) -> Option<&String> {
        lookup_case_insensitive(&self.base_urls, provider)
    }

    pub fn resolve_max_tokens(&self, cli: Option<u32>) -> u32 {
        cli.or(self.max_tokens).unwrap_or(DEFAULT_MAX_TOKENS)
    }

    /// `None` lets the provider apply its own default.
    pub fn resolve_temperature(&self, cli: Option<f32>) -> Option<f32> {
        cli.or(self.temperature)
    }

    /// Model for `provider`: the CLI value, then the configured default.
    pub fn resolve_model(&self, provider: &str, cli: Option<String>) -> Option<String> {
        cli.filter(|model| !model.trim().is_empty())
            .or_else(|| self.get_default_model(provider).cloned())
    }
}

fn lookup_case_insensitive<'a>(
    map: &'a HashMap<String, String>,
    provider: &str,
) -> Option<&'a String> {
    let normalized = provider.to_lowercase();
    map.get(&normalized).or_else(|| {
        map.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(provider))
            .map(|(_, value)| value)
    })
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
