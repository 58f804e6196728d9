//! Application constants
//!
//! Centralized location for all domain-level constants shared by the clients
//! and the CLI.

// Transport defaults
pub const DEFAULT_MAX_RETRIES: u32 = 10;
pub const DEFAULT_BACKOFF_MS: u64 = 200;
pub const MAX_BACKOFF_MS: u64 = 10_000;
pub const RETRY_STATUSES: [u16; 4] = [429, 502, 503, 504];
pub const USER_AGENT_PREFIX: &str = "pingintel-api";

// Polling defaults (milliseconds)
pub const SOV_POLL_INTERVAL_MS: u64 = 2_500;
pub const BULK_ENHANCE_POLL_INTERVAL_MS: u64 = 3_000;
pub const REOUTPUT_POLL_INTERVAL_MS: u64 = 2_500;
pub const SUBMISSION_POLL_INTERVAL_MS: u64 = 1_000;
pub const TRANSIENT_RETRY_DELAY_MS: u64 = 250;

// Credentials
pub const CREDENTIALS_FILE_NAME: &str = ".pingintel.ini";
pub const CENSORED_TOKEN_PREFIX_LEN: usize = 5;

// Local development host shim
pub const LOCAL_API_HOST: &str = "api-local.sovfixer.com";
pub const LOCAL_DEV_HOST: &str = "localhost:8000";
pub const LOCAL_API_URL: &str = "http://api-local.sovfixer.com";

// Settings
pub const SETTINGS_ENV_PREFIX: &str = "PINGINTEL_";
pub const DEFAULT_ENVIRONMENT: &str = "prod";
