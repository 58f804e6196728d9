//! Settings loader
//!
//! Loads [`ClientSettings`] from a settings file, then applies
//! `PINGINTEL_*` environment variable overrides.
//!
//! ## Loading Strategy
//! 1. An explicit path (`--config`) must exist and parse
//! 2. Otherwise the first file found by [`probe_config_paths`] is used
//! 3. With no file at all, defaults apply
//! 4. Environment variables override whatever the file said
//!
//! ## Environment Variables
//! - `PINGINTEL_ENVIRONMENT`: environment tag (`prod`, `staging`, ...)
//! - `PINGINTEL_API_URL`: explicit API base URL
//! - `PINGINTEL_HTTP_MAX_RETRIES`: retries after the first attempt
//! - `PINGINTEL_HTTP_BACKOFF_MS`: base backoff in milliseconds
//! - `PINGINTEL_HTTP_TIMEOUT_SECS`: per-request timeout
//! - `PINGINTEL_POLL_INTERVAL_MS`: job poll interval
//! - `PINGINTEL_POLL_TIMEOUT_SECS`: job poll deadline
//! - `PINGINTEL_CREDENTIALS_FILE`: INI credentials file
//!
//! ## File Locations
//! 1. `./pingintel.toml`
//! 2. `./pingintel.json`
//! 3. `~/.config/pingintel/config.toml`

use std::path::{Path, PathBuf};
use std::str::FromStr;

use pingintel_domain::constants::SETTINGS_ENV_PREFIX;
use pingintel_domain::{ClientSettings, PingError, Result};

use crate::credentials::{EnvSource, ProcessEnv};

/// Load settings from the probed file (if any) and the process environment.
///
/// # Errors
/// Returns `PingError::Config` if a file exists but cannot be parsed, or an
/// override variable holds an invalid value.
pub fn load() -> Result<ClientSettings> {
    load_with(None)
}

/// Like [`load`], with an explicit settings file.
///
/// # Errors
/// Returns `PingError::Config` if the explicit file is missing or invalid.
pub fn load_with(path: Option<PathBuf>) -> Result<ClientSettings> {
    let settings = match path {
        Some(path) => load_from_file(Some(path))?,
        None => match probe_config_paths() {
            Some(found) => load_from_file(Some(found))?,
            None => {
                tracing::debug!("No settings file found, using defaults");
                ClientSettings::default()
            }
        },
    };
    apply_env_overrides(settings, &ProcessEnv)
}

/// Defaults plus `PINGINTEL_*` overrides from the process environment.
///
/// # Errors
/// Returns `PingError::Config` if a variable holds an invalid number.
pub fn load_from_env() -> Result<ClientSettings> {
    apply_env_overrides(ClientSettings::default(), &ProcessEnv)
}

/// Load settings from a file
///
/// If `path` is `None`, probes the standard locations. JSON and TOML are
/// detected by file extension.
///
/// # Errors
/// Returns `PingError::Config` if:
/// - File not found (when path is specified)
/// - No settings file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientSettings> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(PingError::Config(format!(
                    "Settings file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            PingError::Config("No settings file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading settings from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| PingError::Config(format!("Failed to read settings file: {}", e)))?;

    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<ClientSettings> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| PingError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| PingError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(PingError::Config(format!("Unsupported settings format: {}", extension))),
    }
}

/// First existing settings file among the standard locations.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join("pingintel.toml"));
        candidates.push(cwd.join("pingintel.json"));
    }

    if let Some(config_dir) = dirs::home_dir().map(|home| home.join(".config").join("pingintel")) {
        candidates.push(config_dir.join("config.toml"));
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Overlay `PINGINTEL_*` variables on `settings`.
///
/// # Errors
/// Returns `PingError::Config` naming the variable whose value is invalid.
pub fn apply_env_overrides(
    mut settings: ClientSettings,
    env: &dyn EnvSource,
) -> Result<ClientSettings> {
    if let Some(value) = env_var(env, "ENVIRONMENT") {
        settings.environment = Some(value);
    }
    if let Some(value) = env_var(env, "API_URL") {
        settings.api_url = Some(value);
    }
    if let Some(value) = env_number(env, "HTTP_MAX_RETRIES")? {
        settings.http.max_retries = value;
    }
    if let Some(value) = env_number(env, "HTTP_BACKOFF_MS")? {
        settings.http.backoff_ms = value;
    }
    if let Some(value) = env_number(env, "HTTP_TIMEOUT_SECS")? {
        settings.http.timeout_secs = Some(value);
    }
    if let Some(value) = env_number(env, "POLL_INTERVAL_MS")? {
        settings.polling.interval_ms = Some(value);
    }
    if let Some(value) = env_number(env, "POLL_TIMEOUT_SECS")? {
        settings.polling.timeout_secs = Some(value);
    }
    if let Some(value) = env_var(env, "CREDENTIALS_FILE") {
        settings.credentials_file = Some(PathBuf::from(value));
    }
    Ok(settings)
}

/// Non-empty `PINGINTEL_{suffix}`
fn env_var(env: &dyn EnvSource, suffix: &str) -> Option<String> {
    env.var(&format!("{SETTINGS_ENV_PREFIX}{suffix}"))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_number<T>(env: &dyn EnvSource, suffix: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_var(env, suffix)
        .map(|raw| {
            raw.parse::<T>().map_err(|e| {
                PingError::Config(format!("Invalid {SETTINGS_ENV_PREFIX}{suffix}: {e}"))
            })
        })
        .transpose()
}
