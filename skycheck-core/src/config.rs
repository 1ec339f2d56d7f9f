use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fmt, fs, path::PathBuf, time::Duration};

use crate::{
    fetcher::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT, WeatherFetcher},
    model::{Credential, normalize_country},
};

/// Environment variable consulted for the API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Where a resolved credential came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    CommandLine,
    Environment,
    ConfigFile,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CredentialSource::CommandLine => "command line",
            CredentialSource::Environment => API_KEY_ENV,
            CredentialSource::ConfigFile => "config file",
        })
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// default_country = "IN"
/// timeout_secs = 10
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub api_key: Option<String>,
    pub default_country: Option<String>,
    pub timeout_secs: Option<u64>,
    /// Override of the current-weather URL.
    pub endpoint: Option<String>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(path)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skycheck", "skycheck")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Pick the API key: explicit flag, then environment, then config file.
    /// Blank values count as unset.
    pub fn resolve_credential(
        &self,
        explicit: Option<&str>,
        env_value: Option<&str>,
    ) -> Result<(Credential, CredentialSource)> {
        let candidates = [
            (explicit, CredentialSource::CommandLine),
            (env_value, CredentialSource::Environment),
            (self.api_key.as_deref(), CredentialSource::ConfigFile),
        ];

        candidates
            .into_iter()
            .find_map(|(value, source)| {
                value
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(|v| (Credential::new(v), source))
            })
            .ok_or_else(|| {
                anyhow!(
                    "No API key configured.\n\
                     Hint: set {API_KEY_ENV}, pass --api-key, or run `skycheck configure`."
                )
            })
    }

    /// Country for postal codes: override, then config, then the default.
    pub fn country(&self, override_country: Option<&str>) -> String {
        normalize_country(override_country.or(self.default_country.as_deref()).unwrap_or(""))
    }

    pub fn timeout(&self, override_secs: Option<u64>) -> Duration {
        override_secs
            .or(self.timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    /// Build a fetcher for this configuration.
    pub fn fetcher(&self, override_country: Option<&str>) -> WeatherFetcher {
        WeatherFetcher::new()
            .with_endpoint(self.endpoint())
            .with_country(&self.country(override_country))
    }
}
