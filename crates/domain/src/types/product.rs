//! Static description of each Ping Intelligence product API

use crate::constants::LOCAL_API_URL;
use crate::types::environment::{Environment, Serverspace};

/// How to reach and authenticate against one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductSpec {
    /// Product name; also the INI section holding its tokens.
    pub product: &'static str,
    pub subdomain: &'static str,
    pub base_domain: &'static str,
    /// Upper-case prefix of the token environment variables.
    pub env_prefix: &'static str,
    /// Older products use `{sub}-{env}.{domain}` hosts instead of
    /// `{sub}.{env}.{domain}`.
    pub include_legacy_dashes: bool,
    /// Client name reported in the User-Agent.
    pub client_name: &'static str,
}

pub const SOVFIXER: ProductSpec = ProductSpec {
    product: "sovfixer",
    subdomain: "api",
    base_domain: "sovfixer.com",
    env_prefix: "SOVFIXER",
    include_legacy_dashes: true,
    client_name: "SovFixerClient",
};

pub const PINGDATA: ProductSpec = ProductSpec {
    product: "pingdata",
    subdomain: "api",
    base_domain: "pingintel.com",
    env_prefix: "PING_DATA",
    include_legacy_dashes: true,
    client_name: "PingDataClient",
};

pub const PINGVISION: ProductSpec = ProductSpec {
    product: "pingvision",
    subdomain: "vision",
    base_domain: "pingintel.com",
    env_prefix: "PINGVISION",
    include_legacy_dashes: false,
    client_name: "PingVisionClient",
};

pub const PINGRADAR: ProductSpec = ProductSpec {
    product: "pingradar",
    subdomain: "radar",
    base_domain: "pingintel.com",
    env_prefix: "PINGRADAR",
    include_legacy_dashes: false,
    client_name: "PingRadarClient",
};

pub const PINGMAPS: ProductSpec = ProductSpec {
    product: "pingmaps",
    subdomain: "app",
    base_domain: "pingintel.com",
    env_prefix: "SOVFIXER",
    include_legacy_dashes: false,
    client_name: "PingMapsClient",
};

impl ProductSpec {
    /// Base URL of the API in the given environment.
    pub fn api_url_for(&self, environment: Environment) -> String {
        let Self { subdomain: sub, base_domain: domain, .. } = self;
        if !self.include_legacy_dashes {
            return format!("https://{sub}.{environment}.{domain}");
        }
        match environment {
            Environment::Prod => format!("https://{sub}.{domain}"),
            Environment::Prod2 => format!("https://{sub}2.{domain}"),
            Environment::ProdEu => format!("https://{sub}.eu.{domain}"),
            Environment::Local => LOCAL_API_URL.to_string(),
            other => format!("https://{sub}-{other}.{domain}"),
        }
    }

    /// `{PREFIX}_AUTH_TOKEN`
    pub fn token_env_var(&self) -> String {
        format!("{}_AUTH_TOKEN", self.env_prefix)
    }

    /// `{PREFIX}_{SERVERSPACE}_AUTH_TOKEN`
    pub fn serverspace_env_var(&self, serverspace: Serverspace) -> String {
        format!("{}_{}_AUTH_TOKEN", self.env_prefix, serverspace.env_suffix())
    }

    /// `{PREFIX}_AUTH_TOKEN_{SERVERSPACE}`, the spelling used as INI key and
    /// accepted as a legacy environment variable.
    pub fn suffixed_token_key(&self, serverspace: Serverspace) -> String {
        format!("{}_AUTH_TOKEN_{}", self.env_prefix, serverspace.env_suffix())
    }
}
