//! Deployment environments and the serverspaces they map to

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{PingError, Result};

/// Deployment environment selected by the caller.
///
/// The numbered variants (`prod2`, `staging2`, ...) are parallel stacks that
/// share credentials with their unnumbered sibling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Environment {
    Staging,
    Staging2,
    Prod,
    Prod2,
    ProdEu,
    ProdEu2,
    Dev,
    Dev2,
    Local,
    Local2,
}

impl Environment {
    pub const ALL: [Self; 10] = [
        Self::Staging,
        Self::Staging2,
        Self::Prod,
        Self::Prod2,
        Self::ProdEu,
        Self::ProdEu2,
        Self::Dev,
        Self::Dev2,
        Self::Local,
        Self::Local2,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Staging => "staging",
            Self::Staging2 => "staging2",
            Self::Prod => "prod",
            Self::Prod2 => "prod2",
            Self::ProdEu => "prodeu",
            Self::ProdEu2 => "prodeu2",
            Self::Dev => "dev",
            Self::Dev2 => "dev2",
            Self::Local => "local",
            Self::Local2 => "local2",
        }
    }

    pub const fn serverspace(&self) -> Serverspace {
        match self {
            Self::Staging | Self::Staging2 => Serverspace::Stg,
            Self::Prod | Self::Prod2 => Serverspace::Prd,
            Self::ProdEu | Self::ProdEu2 => Serverspace::PrdEu,
            Self::Dev | Self::Dev2 => Serverspace::Dev,
            Self::Local | Self::Local2 => Serverspace::Local,
        }
    }

    /// `local2` talks to a development server on `localhost:8000`.
    pub const fn is_local_dev(&self) -> bool {
        matches!(self, Self::Local2)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = PingError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|env| env.as_str() == s)
            .ok_or_else(|| PingError::UnknownEnvironment(s.to_string()))
    }
}

impl TryFrom<String> for Environment {
    type Error = PingError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Environment> for String {
    fn from(value: Environment) -> Self {
        value.as_str().to_string()
    }
}

/// Credential scope shared by a family of environments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Serverspace {
    Stg,
    Prd,
    PrdEu,
    Dev,
    Local,
}

impl Serverspace {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Stg => "stg",
            Self::Prd => "prd",
            Self::PrdEu => "prdeu",
            Self::Dev => "dev",
            Self::Local => "local",
        }
    }

    /// Upper-case form used in environment variable and INI key names.
    pub fn env_suffix(&self) -> String {
        self.as_str().to_ascii_uppercase()
    }
}

impl fmt::Display for Serverspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps an environment tag to its serverspace.
///
/// # Errors
/// Returns [`PingError::UnknownEnvironment`] for tags outside the known set.
pub fn serverspace_for(environment: &str) -> Result<Serverspace> {
    environment.parse::<Environment>().map(|env| env.serverspace())
}
