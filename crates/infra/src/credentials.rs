//! Auth token resolution
//!
//! A token is looked up, in order, from:
//! 1. the explicit token given by the caller (`--auth-token`)
//! 2. `{PREFIX}_{SERVERSPACE}_AUTH_TOKEN`, then the legacy spelling
//!    `{PREFIX}_AUTH_TOKEN_{SERVERSPACE}`
//! 3. `{PREFIX}_AUTH_TOKEN`
//! 4. `~/.pingintel.ini`, section `[product]`, key
//!    `{PREFIX}_AUTH_TOKEN_{SERVERSPACE}` then `{PREFIX}_AUTH_TOKEN`
//!
//! Serverspace-scoped steps are skipped when no environment is known. Empty
//! values count as absent.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use ini::Ini;
use pingintel_domain::constants::{CENSORED_TOKEN_PREFIX_LEN, CREDENTIALS_FILE_NAME};
use pingintel_domain::{Environment, PingError, ProductSpec, Result, Serverspace};
use tracing::debug;

use crate::errors::InfraError;

/// Source of environment variables
pub trait EnvSource: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;
}

/// The process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// A resolved bearer token, scoped to one product.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    product: String,
    serverspace: Option<Serverspace>,
    token: String,
    source: String,
}

impl Credential {
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn serverspace(&self) -> Option<Serverspace> {
        self.serverspace
    }

    /// Where the token was found, e.g. `env SOVFIXER_AUTH_TOKEN`.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn censored(&self) -> String {
        censor(&self.token, CENSORED_TOKEN_PREFIX_LEN)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("product", &self.product)
            .field("serverspace", &self.serverspace)
            .field("token", &self.censored())
            .field("source", &self.source)
            .finish()
    }
}

/// Keep the first `keep` characters and mask the rest.
pub fn censor(secret: &str, keep: usize) -> String {
    let visible: String = secret.chars().take(keep).collect();
    let hidden = secret.chars().count().saturating_sub(keep);
    format!("{visible}{}", "*".repeat(hidden))
}

/// `~/.pingintel.ini`
pub fn default_credentials_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CREDENTIALS_FILE_NAME))
}

/// Resolves tokens from explicit input, environment variables and the INI file
pub struct CredentialResolver {
    env: Box<dyn EnvSource>,
    ini_path: Option<PathBuf>,
}

impl Default for CredentialResolver {
    fn default() -> Self {
        Self { env: Box::new(ProcessEnv), ini_path: default_credentials_path() }
    }
}

impl CredentialResolver {
    pub fn new(env: Box<dyn EnvSource>, ini_path: Option<PathBuf>) -> Self {
        Self { env, ini_path }
    }

    pub fn with_ini_path(mut self, path: Option<PathBuf>) -> Self {
        self.ini_path = path;
        self
    }

    /// Find the token for `spec`.
    ///
    /// # Errors
    /// [`PingError::CredentialNotFound`] listing every source attempted, or a
    /// config error when the INI file exists but cannot be parsed.
    pub fn resolve(
        &self,
        spec: &ProductSpec,
        environment: Option<Environment>,
        explicit: Option<&str>,
    ) -> Result<Credential> {
        let serverspace = environment.map(|env| env.serverspace());
        let found = |token: String, source: String| {
            let credential =
                Credential { product: spec.product.to_string(), serverspace, token, source };
            debug!(
                product = spec.product,
                source = %credential.source,
                token = %credential.censored(),
                "Using auth token"
            );
            Ok(credential)
        };
        let mut attempted = Vec::new();

        attempted.push("explicit auth token (--auth-token)".to_string());
        if let Some(token) = explicit.filter(|t| !t.trim().is_empty()) {
            return found(token.to_string(), "explicit auth token".to_string());
        }

        let mut env_keys = Vec::new();
        if let Some(space) = serverspace {
            env_keys.push(spec.serverspace_env_var(space));
            env_keys.push(spec.suffixed_token_key(space));
        }
        env_keys.push(spec.token_env_var());

        for key in env_keys {
            let source = format!("env {key}");
            if let Some(token) = self.env.var(&key).filter(|t| !t.trim().is_empty()) {
                return found(token, source);
            }
            attempted.push(source);
        }

        let mut ini_keys = Vec::new();
        if let Some(space) = serverspace {
            ini_keys.push(spec.suffixed_token_key(space));
        }
        ini_keys.push(spec.token_env_var());

        match &self.ini_path {
            Some(path) => {
                let ini = load_ini(path)?;
                for key in ini_keys {
                    let source = format!("{} [{}] {key}", path.display(), spec.product);
                    let token = ini.as_ref().and_then(|ini| ini_lookup(ini, spec.product, &key));
                    if let Some(token) = token {
                        return found(token, source);
                    }
                    attempted.push(source);
                }
            }
            None => attempted.push(format!("~/{CREDENTIALS_FILE_NAME} (no home directory)")),
        }

        Err(PingError::CredentialNotFound { product: spec.product.to_string(), attempted })
    }
}

fn load_ini(path: &Path) -> Result<Option<Ini>> {
    if !path.exists() {
        debug!(path = %path.display(), "Credentials file not found");
        return Ok(None);
    }
    Ini::load_from_file(path).map(Some).map_err(|err| PingError::from(InfraError::from(err)))
}

/// Option lookup ignores key case, as the file is hand-edited.
fn ini_lookup(ini: &Ini, section: &str, key: &str) -> Option<String> {
    ini.section(Some(section))?
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(key))
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pingintel_domain::{PINGDATA, SOVFIXER};
    use tempfile::NamedTempFile;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Box<dyn EnvSource> {
        Box::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<String, String>>(),
        )
    }

    fn ini_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn explicit_token_wins() {
        let resolver = CredentialResolver::new(env(&[("SOVFIXER_AUTH_TOKEN", "env")]), None);
        let credential =
            resolver.resolve(&SOVFIXER, Some(Environment::Staging), Some("explicit")).unwrap();
        assert_eq!(credential.token(), "explicit");
    }

    #[test]
    fn serverspace_variable_beats_product_variable() {
        let resolver = CredentialResolver::new(
            env(&[("SOVFIXER_STG_AUTH_TOKEN", "stg-token"), ("SOVFIXER_AUTH_TOKEN", "generic")]),
            None,
        );
        let credential = resolver.resolve(&SOVFIXER, Some(Environment::Staging), None).unwrap();
        assert_eq!(credential.token(), "stg-token");
        assert_eq!(credential.source(), "env SOVFIXER_STG_AUTH_TOKEN");
        assert_eq!(credential.serverspace(), Some(Serverspace::Stg));
    }

    #[test]
    fn legacy_suffixed_variable_is_accepted() {
        let resolver = CredentialResolver::new(env(&[("PING_DATA_AUTH_TOKEN_DEV", "dev")]), None);
        let credential = resolver.resolve(&PINGDATA, Some(Environment::Dev2), None).unwrap();
        assert_eq!(credential.token(), "dev");
    }

    #[test]
    fn empty_variable_counts_as_absent() {
        let resolver = CredentialResolver::new(
            env(&[("SOVFIXER_PRD_AUTH_TOKEN", ""), ("SOVFIXER_AUTH_TOKEN", "generic")]),
            None,
        );
        let credential = resolver.resolve(&SOVFIXER, Some(Environment::Prod), None).unwrap();
        assert_eq!(credential.token(), "generic");
    }

    #[test]
    fn ini_serverspace_key_before_generic_key() {
        let file = ini_file(
            "[sovfixer]\nsovfixer_auth_token = generic\nSOVFIXER_AUTH_TOKEN_PRD = prd-token\n",
        );
        let resolver = CredentialResolver::new(env(&[]), Some(file.path().to_path_buf()));

        let prod = resolver.resolve(&SOVFIXER, Some(Environment::Prod2), None).unwrap();
        assert_eq!(prod.token(), "prd-token");

        let dev = resolver.resolve(&SOVFIXER, Some(Environment::Dev), None).unwrap();
        assert_eq!(dev.token(), "generic");
    }

    #[test]
    fn environment_variable_beats_ini() {
        let file = ini_file("[sovfixer]\nSOVFIXER_AUTH_TOKEN = from-ini\n");
        let resolver = CredentialResolver::new(
            env(&[("SOVFIXER_AUTH_TOKEN", "from-env")]),
            Some(file.path().to_path_buf()),
        );
        let credential = resolver.resolve(&SOVFIXER, Some(Environment::Prod), None).unwrap();
        assert_eq!(credential.token(), "from-env");
    }

    #[test]
    fn missing_everywhere_lists_attempts() {
        let file = ini_file("[pingvision]\nPINGVISION_AUTH_TOKEN = other\n");
        let resolver = CredentialResolver::new(env(&[]), Some(file.path().to_path_buf()));

        let err = resolver.resolve(&SOVFIXER, Some(Environment::Staging), None).unwrap_err();
        match err {
            PingError::CredentialNotFound { product, attempted } => {
                assert_eq!(product, "sovfixer");
                assert_eq!(attempted.len(), 6);
                assert_eq!(attempted[1], "env SOVFIXER_STG_AUTH_TOKEN");
                assert_eq!(attempted[3], "env SOVFIXER_AUTH_TOKEN");
                assert!(attempted[4].ends_with("[sovfixer] SOVFIXER_AUTH_TOKEN_STG"));
            }
            other => panic!("expected CredentialNotFound, got {other:?}"),
        }
    }

    #[test]
    fn debug_output_censors_token() {
        let resolver = CredentialResolver::new(env(&[]), None);
        let credential =
            resolver.resolve(&SOVFIXER, None, Some("abcdefghijklmnop")).unwrap();
        let debug = format!("{credential:?}");
        assert!(debug.contains("abcde***********"));
        assert!(!debug.contains("abcdefghijklmnop"));
    }
}
