use super::format::NumberLocale;
use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_ER_API_URL: &str = "https://open.er-api.com";

fn default_er_api_url() -> String {
    DEFAULT_ER_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_retries() -> usize {
    2
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn default_decimal_separator() -> char {
    '.'
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ErApiProviderConfig {
    #[serde(default = "default_er_api_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_retries")]
    pub retries: usize,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for ErApiProviderConfig {
    fn default() -> Self {
        ErApiProviderConfig {
            base_url: default_er_api_url(),
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub er_api: Option<ErApiProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            er_api: Some(ErApiProviderConfig::default()),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default = "default_decimal_separator")]
    pub decimal_separator: char,
    /// Fetch live rates before running a command.
    #[serde(default)]
    pub refresh_on_start: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            providers: ProvidersConfig::default(),
            decimal_separator: default_decimal_separator(),
            refresh_on_start: false,
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, falling back to built-in
    /// defaults when no file has been created there yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(path = %config_path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "codito", "xconv")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.validate()?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let sep = self.decimal_separator;
        if sep.is_whitespace() || sep.is_ascii_digit() || sep == '-' {
            bail!("Invalid decimal separator: {sep:?}");
        }
        Ok(())
    }

    pub fn locale(&self) -> NumberLocale {
        NumberLocale::new(self.decimal_separator)
    }

    pub fn er_api(&self) -> ErApiProviderConfig {
        self.providers.er_api.clone().unwrap_or_default()
    }
}
