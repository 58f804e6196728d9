use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pingintel_domain::{ClientSettings, HttpSettings, ProductSpec};
use pingintel_infra::{ApiClient, CredentialResolver};
use wiremock::{Request, Respond, ResponseTemplate};

pub const TEST_TOKEN: &str = "test-token-0123456789";

/// Settings with no backoff pauses and a small retry budget.
pub fn fast_settings(max_retries: u32) -> ClientSettings {
    ClientSettings {
        http: HttpSettings { max_retries, backoff_ms: 0, timeout_secs: Some(10) },
        ..ClientSettings::default()
    }
}

/// Resolver that sees an empty environment and no credentials file.
pub fn isolated_resolver() -> CredentialResolver {
    CredentialResolver::new(Box::new(HashMap::<String, String>::new()), None)
}

/// Client for `spec` pointed at a mock server.
pub fn client_for(spec: ProductSpec, api_url: &str, max_retries: u32) -> ApiClient {
    ApiClient::builder(spec)
        .api_url(api_url)
        .auth_token(TEST_TOKEN)
        .settings(fast_settings(max_retries))
        .resolver(isolated_resolver())
        .build()
        .expect("client should build")
}

/// Plays the given responses in order, repeating the last one.
pub struct Sequence {
    responses: Vec<ResponseTemplate>,
    calls: Arc<AtomicUsize>,
}

impl Sequence {
    pub fn new(responses: Vec<ResponseTemplate>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (Self { responses, calls: Arc::clone(&calls) }, calls)
    }
}

impl Respond for Sequence {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let index = call.min(self.responses.len().saturating_sub(1));
        self.responses[index].clone()
    }
}
