//! Client settings shared by every product client and the CLI

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BACKOFF_MS, DEFAULT_MAX_RETRIES, TRANSIENT_RETRY_DELAY_MS};

/// Settings resolved from config files and `PINGINTEL_*` environment
/// variables. Every field is optional on input; missing values fall back to
/// the defaults below.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Environment tag (`prod`, `staging`, `dev2`, ...).
    pub environment: Option<String>,
    /// Explicit API base URL; takes precedence over the environment.
    pub api_url: Option<String>,
    pub http: HttpSettings,
    pub polling: PollingSettings,
    /// INI credentials file, `~/.pingintel.ini` when unset.
    pub credentials_file: Option<PathBuf>,
}

/// Transport settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub max_retries: u32,
    pub backoff_ms: u64,
    /// Per-request timeout. `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_ms: DEFAULT_BACKOFF_MS,
            timeout_secs: None,
        }
    }
}

/// Job polling settings. A missing interval means "use the product default".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingSettings {
    pub interval_ms: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub transient_retry_ms: u64,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self { interval_ms: None, timeout_secs: None, transient_retry_ms: TRANSIENT_RETRY_DELAY_MS }
    }
}
