//! `config.toml` under the Focus home directory. Every key is optional.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides the configured base URL.
pub const BASE_URL_ENV: &str = "FOCUS_BASE_URL";

/// Commented template written by `focus config init`.
const CONFIG_TEMPLATE: &str = include_str!("../default_config.toml");

pub mod paths {
    //! `$FOCUS_HOME`, falling back to `~/.config/focus`.

    use std::path::PathBuf;

    use anyhow::{Context, Result};

    /// # Errors
    /// Returns an error if `FOCUS_HOME` is unset and no home directory exists.
    pub fn focus_home() -> Result<PathBuf> {
        if let Ok(home) = std::env::var("FOCUS_HOME") {
            return Ok(PathBuf::from(home));
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("focus"))
            .context("Could not determine home directory; set FOCUS_HOME")
    }

    /// # Errors
    /// See [`focus_home`].
    pub fn config_path() -> Result<PathBuf> {
        Ok(focus_home()?.join("config.toml"))
    }

    /// # Errors
    /// See [`focus_home`].
    pub fn logs_dir() -> Result<PathBuf> {
        Ok(focus_home()?.join("logs"))
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive used when `FOCUS_LOG` is unset.
    pub level: String,
    /// Write to `<home>/logs/focus.log` instead of stderr.
    pub file: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend origin the endpoints are joined onto.
    pub base_url: String,

    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";

    /// # Errors
    /// See [`Config::load_from`].
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path()?)
    }

    /// A missing file is not an error.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Resolves the base URL with precedence: explicit > env > config.
    ///
    /// # Errors
    /// Returns an error if the winning value is not a valid URL.
    pub fn effective_base_url(&self, explicit: Option<&str>) -> Result<String> {
        let env_value = std::env::var(BASE_URL_ENV).ok();
        resolve_base_url(explicit, env_value.as_deref(), &self.base_url)
    }

    /// Writes the commented template to `path`, never over an existing file.
    ///
    /// # Errors
    /// Returns an error if `path` exists or the write fails.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }
        write_atomically(path, CONFIG_TEMPLATE)
    }
}

/// Stages `content` next to `path` and renames it into place.
fn write_atomically(path: &Path, content: &str) -> Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let staged = path.with_extension("toml.tmp");
    fs::write(&staged, content)
        .with_context(|| format!("Failed to stage config at {}", staged.display()))?;
    fs::rename(&staged, path)
        .with_context(|| format!("Failed to move config into place at {}", path.display()))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            log: LogConfig::default(),
        }
    }
}

/// Picks the first non-blank candidate and validates it.
///
/// # Errors
/// Returns an error if the chosen value does not parse as a URL.
pub fn resolve_base_url(
    explicit: Option<&str>,
    env_value: Option<&str>,
    config_value: &str,
) -> Result<String> {
    let chosen = [explicit, env_value, Some(config_value)]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|candidate| !candidate.is_empty())
        .unwrap_or(Config::DEFAULT_BASE_URL);

    validate_url(chosen)?;
    Ok(chosen.to_string())
}

/// Validates that a URL is well-formed.
fn validate_url(url: &str) -> Result<()> {
    url::Url::parse(url).with_context(|| format!("Invalid base URL: {url}"))?;
    Ok(())
}
