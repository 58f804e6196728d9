use std::time::Duration;

use pingintel_domain::constants::{
    DEFAULT_BACKOFF_MS, DEFAULT_MAX_RETRIES, MAX_BACKOFF_MS, RETRY_STATUSES,
};
use pingintel_domain::{HttpSettings, PingError, QueryParams, Result, UploadFile};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client as ReqwestClient, RequestBuilder, Response};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::Method;
use tracing::{debug, warn};

use crate::errors::InfraError;

/// Request body that can be rebuilt for every attempt.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
    Multipart(MultipartBody),
}

/// Multipart form kept in memory: text fields plus file parts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartBody {
    pub fields: Vec<(String, String)>,
    pub files: Vec<(String, UploadFile)>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn file(mut self, name: impl Into<String>, file: UploadFile) -> Self {
        self.files.push((name.into(), file));
        self
    }

    fn to_form(&self) -> Form {
        let form = self
            .fields
            .iter()
            .fold(Form::new(), |form, (name, value)| form.text(name.clone(), value.clone()));
        self.files.iter().fold(form, |form, (name, file)| {
            let part = Part::bytes(file.bytes.clone()).file_name(file.filename.clone());
            form.part(name.clone(), part)
        })
    }
}

/// A request description the client can replay on retry.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub query: QueryParams,
    pub body: RequestBody,
    /// Overrides the client-wide timeout for this call.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: QueryParams::new(),
            body: RequestBody::Empty,
            timeout: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(Method::PATCH, url)
    }

    pub fn query(mut self, params: QueryParams) -> Self {
        self.query = params;
        self
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    pub fn json(self, value: serde_json::Value) -> Self {
        self.body(RequestBody::Json(value))
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Blocking HTTP client with built-in retry support.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    max_retries: u32,
    base_backoff: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Execute the request, retrying throttling and gateway failures.
    ///
    /// HEAD, GET, OPTIONS and POST are retried on 429/502/503/504 and on
    /// connection or timeout failures. Any other non-2xx response, or the
    /// last one once the retry budget is spent, becomes
    /// [`PingError::Transport`].
    pub fn send(&self, request: &HttpRequest) -> Result<Response> {
        let retryable = is_retryable_method(&request.method);
        let method = &request.method;
        let url = &request.url;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let can_retry = retryable && attempt <= self.max_retries;
            debug!(attempt, %method, %url, "sending HTTP request");

            match self.build(request).send() {
                Ok(response) => {
                    let status = response.status();
                    debug!(attempt, %method, %url, %status, "received HTTP response");

                    if status.is_success() {
                        return Ok(response);
                    }

                    if can_retry && RETRY_STATUSES.contains(&status.as_u16()) {
                        let delay = self.retry_delay(attempt, response.headers());
                        warn!(attempt, %method, %url, %status, ?delay, "retrying HTTP request");
                        self.sleep(delay);
                        continue;
                    }

                    let body = response
                        .text()
                        .unwrap_or_else(|err| format!("<failed to read response body: {err}>"));
                    debug!(%method, %url, %status, body = %body, "HTTP request failed");
                    return Err(PingError::Transport { status: status.as_u16(), body });
                }
                Err(err) => {
                    if can_retry && should_retry_error(&err) {
                        let delay = self.backoff_delay(attempt);
                        warn!(
                            attempt,
                            %method,
                            %url,
                            error = %err,
                            ?delay,
                            "retrying HTTP request"
                        );
                        self.sleep(delay);
                        continue;
                    }

                    debug!(attempt, %method, %url, error = %err, "HTTP request failed");
                    let infra: InfraError = err.into();
                    return Err(PingError::from(infra));
                }
            }
        }
    }

    fn build(&self, request: &HttpRequest) -> RequestBuilder {
        let mut builder = self.client.request(request.method.clone(), &request.url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Form(fields) => builder.form(fields),
            RequestBody::Multipart(body) => builder.multipart(body.to_form()),
        }
    }

    fn retry_delay(&self, retry_number: u32, headers: &HeaderMap) -> Duration {
        headers
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map(|secs| Duration::from_secs(secs).min(Duration::from_millis(MAX_BACKOFF_MS)))
            .unwrap_or_else(|| self.backoff_delay(retry_number))
    }

    fn backoff_delay(&self, retry_number: u32) -> Duration {
        let shift = retry_number.saturating_sub(1).min(16);
        let multiplier = 1u32 << shift;
        self.base_backoff.saturating_mul(multiplier).min(Duration::from_millis(MAX_BACKOFF_MS))
    }

    fn sleep(&self, delay: Duration) {
        // A zero base disables every pause, Retry-After included.
        if !self.base_backoff.is_zero() && !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Option<Duration>,
    max_retries: u32,
    base_backoff: Duration,
    user_agent: Option<String>,
    default_headers: Option<HeaderMap>,
    system_proxy: bool,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: None,
            max_retries: DEFAULT_MAX_RETRIES,
            base_backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
            user_agent: None,
            default_headers: None,
            system_proxy: true,
        }
    }
}

impl HttpClientBuilder {
    /// Apply transport settings loaded from configuration.
    pub fn settings(self, settings: &HttpSettings) -> Self {
        self.max_retries(settings.max_retries)
            .base_backoff(Duration::from_millis(settings.backoff_ms))
            .timeout(settings.timeout_secs.map(Duration::from_secs))
    }

    /// Client-wide request timeout; `None` waits indefinitely.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure the number of retries after the initial attempt.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    /// Route through `HTTP(S)_PROXY` from the environment (on by default).
    pub fn system_proxy(mut self, enabled: bool) -> Self {
        self.system_proxy = enabled;
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout);
        if !self.system_proxy {
            builder = builder.no_proxy();
        }

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|err| {
            let infra: InfraError = err.into();
            PingError::from(infra)
        })?;

        Ok(HttpClient { client, max_retries: self.max_retries, base_backoff: self.base_backoff })
    }
}

fn is_retryable_method(method: &Method) -> bool {
    [Method::HEAD, Method::GET, Method::OPTIONS, Method::POST].contains(method)
}

fn should_retry_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_backoff_ms: u64) -> HttpClient {
        HttpClient::builder()
            .base_backoff(Duration::from_millis(base_backoff_ms))
            .build()
            .expect("http client")
    }

    #[test]
    fn backoff_doubles_and_is_capped() {
        let client = client(200);
        assert_eq!(client.backoff_delay(1), Duration::from_millis(200));
        assert_eq!(client.backoff_delay(2), Duration::from_millis(400));
        assert_eq!(client.backoff_delay(4), Duration::from_millis(1_600));
        assert_eq!(client.backoff_delay(10), Duration::from_secs(10));
    }

    #[test]
    fn retry_after_header_wins_over_backoff() {
        let client = client(200);
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, "3".parse().unwrap());
        assert_eq!(client.retry_delay(1, &headers), Duration::from_secs(3));

        headers.insert(RETRY_AFTER, "Wed, 21 Oct 2015 07:28:00 GMT".parse().unwrap());
        assert_eq!(client.retry_delay(1, &headers), Duration::from_millis(200));
    }

    #[test]
    fn patch_is_never_retried() {
        assert!(!is_retryable_method(&Method::PATCH));
        assert!(!is_retryable_method(&Method::DELETE));
        assert!(is_retryable_method(&Method::POST));
    }

    #[test]
    fn multipart_body_is_rebuildable() {
        let body = MultipartBody::new()
            .text("document_type", "SOV")
            .file("file", UploadFile::new("test_sov.xlsx", b"PK".to_vec()));
        // Building twice must not consume the in-memory parts.
        let _first = body.to_form();
        let _second = body.to_form();
        assert_eq!(body.files[0].1.filename, "test_sov.xlsx");
        assert_eq!(body.files[0].1.bytes, b"PK");
    }
}
