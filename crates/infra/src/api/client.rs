//! Authenticated client for one product API
//!
//! Resolves the base URL and auth token once, then exposes JSON helpers on
//! top of the retrying [`HttpClient`].

use std::str::FromStr;
use std::time::Duration;

use pingintel_core::PollPolicy;
use pingintel_domain::constants::{LOCAL_API_HOST, LOCAL_DEV_HOST, USER_AGENT_PREFIX};
use pingintel_domain::{
    ClientSettings, Environment, JobKind, PingError, PollingSettings, ProductSpec, QueryParams,
    Result,
};
use reqwest::blocking::Response;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING, AUTHORIZATION};
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

use crate::credentials::{Credential, CredentialResolver};
use crate::errors::InfraError;
use crate::http::{HttpClient, HttpRequest, MultipartBody, RequestBody};

/// Product API client
pub struct ApiClient {
    spec: ProductSpec,
    api_url: String,
    /// Only set when `api_url` was derived from it.
    environment: Option<Environment>,
    credential: Credential,
    polling: PollingSettings,
    http: HttpClient,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("product", &self.spec.product)
            .field("api_url", &self.api_url)
            .field("environment", &self.environment)
            .field("credential", &self.credential)
            .finish()
    }
}

impl ApiClient {
    pub fn builder(spec: ProductSpec) -> ApiClientBuilder {
        ApiClientBuilder::new(spec)
    }

    pub fn spec(&self) -> &ProductSpec {
        &self.spec
    }

    /// Base URL without trailing slash
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn environment(&self) -> Option<Environment> {
        self.environment
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Absolute URL for an API path such as `/api/v1/sov`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    /// Resolve a possibly relative URL returned by the API.
    ///
    /// When talking to `local2`, links pointing at the local API host are
    /// rewritten to the development server.
    pub fn resolve_url(&self, raw: &str) -> Result<String> {
        let base = Url::parse(&format!("{}/", self.api_url)).map_err(InfraError::from)?;
        let mut resolved = base.join(raw).map_err(InfraError::from)?.to_string();

        if self.environment.is_some_and(|env| env.is_local_dev())
            && resolved.contains(LOCAL_API_HOST)
        {
            resolved = resolved.replace(LOCAL_API_HOST, LOCAL_DEV_HOST);
            debug!(url = %resolved, "Rewrote local API host");
        }
        Ok(resolved)
    }

    /// Poll policy for `kind`, with configured overrides applied.
    pub fn poll_policy(&self, kind: JobKind) -> PollPolicy {
        let policy = match self.polling.interval_ms {
            Some(ms) => PollPolicy::every(Duration::from_millis(ms)),
            None => PollPolicy::for_kind(kind),
        };
        policy
            .with_timeout(self.polling.timeout_secs.map(Duration::from_secs))
            .with_transient_retry_delay(Duration::from_millis(self.polling.transient_retry_ms))
    }

    /// Send a prepared request through the retrying transport.
    pub fn send(&self, request: &HttpRequest) -> Result<Response> {
        self.http.send(request)
    }

    pub fn get_json<T: DeserializeOwned>(&self, path: &str, query: QueryParams) -> Result<T> {
        self.request_json(HttpRequest::get(self.url(path)).query(query))
    }

    pub fn post_json<T: DeserializeOwned>(&self, path: &str, body: serde_json::Value) -> Result<T> {
        self.request_json(HttpRequest::post(self.url(path)).json(body))
    }

    pub fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        fields: Vec<(String, String)>,
    ) -> Result<T> {
        self.request_json(HttpRequest::post(self.url(path)).body(RequestBody::Form(fields)))
    }

    pub fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        body: MultipartBody,
    ) -> Result<T> {
        self.request_json(HttpRequest::post(self.url(path)).body(RequestBody::Multipart(body)))
    }

    /// PATCH is sent exactly once.
    pub fn patch_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T> {
        self.request_json(HttpRequest::patch(self.url(path)).json(body))
    }

    /// Streaming GET of an artifact or document URL.
    pub fn download(&self, raw_url: &str) -> Result<Response> {
        let url = self.resolve_url(raw_url)?;
        self.send(&HttpRequest::get(url))
    }

    fn request_json<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T> {
        let response = self.send(&request)?;
        decode_json(response)
    }
}

/// Decode a JSON body, reporting the offending payload on failure.
pub(crate) fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let url = response.url().to_string();
    let text = response.text().map_err(InfraError::from)?;
    serde_json::from_str(&text).map_err(|err| {
        let preview: String = text.chars().take(200).collect();
        PingError::InvalidResponse(format!("{url}: {err}: {preview}"))
    })
}

/// Builder for [`ApiClient`]
pub struct ApiClientBuilder {
    spec: ProductSpec,
    environment: Option<Environment>,
    api_url: Option<String>,
    auth_token: Option<String>,
    settings: ClientSettings,
    resolver: Option<CredentialResolver>,
}

impl ApiClientBuilder {
    pub fn new(spec: ProductSpec) -> Self {
        Self {
            spec,
            environment: None,
            api_url: None,
            auth_token: None,
            settings: ClientSettings::default(),
            resolver: None,
        }
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Loaded settings; explicit builder values take precedence.
    pub fn settings(mut self, settings: ClientSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn resolver(mut self, resolver: CredentialResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Resolve URL and credential and build the transport.
    ///
    /// # Errors
    /// - `UnknownEnvironment` for an unrecognised environment tag
    /// - `CredentialNotFound` when no token is available
    /// - `Validation` for a malformed URL or token
    pub fn build(self) -> Result<ApiClient> {
        let environment = match (self.environment, self.settings.environment.as_deref()) {
            (Some(env), _) => Some(env),
            (None, Some(tag)) => Some(Environment::from_str(tag)?),
            (None, None) => None,
        };
        // An explicit environment outranks a configured URL
        let settings_url = self.environment.is_none().then(|| self.settings.api_url.clone());
        let explicit_url = self.api_url.or(settings_url.flatten());

        let (api_url, retained_env) = match explicit_url {
            Some(url) => {
                Url::parse(&url).map_err(InfraError::from)?;
                (url.trim_end_matches('/').to_string(), None)
            }
            None => {
                let env = environment.unwrap_or(Environment::Prod);
                (self.spec.api_url_for(env), Some(env))
            }
        };

        let resolver = match self.resolver {
            Some(resolver) => resolver,
            None => CredentialResolver::default()
                .with_ini_path(self.settings.credentials_file.clone().or_else(|| {
                    crate::credentials::default_credentials_path()
                })),
        };
        let credential = resolver.resolve(
            &self.spec,
            environment.or(retained_env),
            self.auth_token.as_deref(),
        )?;

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Token {}", credential.token()))
            .map_err(|_| PingError::Validation("Auth token contains invalid characters".into()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

        let user_agent = format!(
            "{USER_AGENT_PREFIX}/{}/{}",
            self.spec.client_name,
            env!("CARGO_PKG_VERSION")
        );
        let http = HttpClient::builder()
            .settings(&self.settings.http)
            .user_agent(user_agent)
            .default_headers(headers)
            .build()?;

        info!(
            product = self.spec.product,
            api_url = %api_url,
            token = %credential.censored(),
            "Created API client"
        );

        Ok(ApiClient {
            spec: self.spec,
            api_url,
            environment: retained_env,
            credential,
            polling: self.settings.polling,
            http,
        })
    }
}
