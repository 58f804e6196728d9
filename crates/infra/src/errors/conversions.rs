//! Conversions from external infrastructure errors into domain errors.

use pingintel_domain::PingError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub PingError);

impl From<InfraError> for PingError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<PingError> for InfraError {
    fn from(value: PingError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoPingError {
    fn into_ping(self) -> PingError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → PingError */
/* -------------------------------------------------------------------------- */

impl IntoPingError for HttpError {
    fn into_ping(self) -> PingError {
        if self.is_timeout() {
            return PingError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return PingError::Network(format!("HTTP connection failure: {self}"));
        }

        if self.is_decode() {
            return PingError::InvalidResponse(format!("undecodable HTTP body: {self}"));
        }

        if self.is_builder() {
            return PingError::Validation(format!("invalid HTTP request: {self}"));
        }

        if let Some(status) = self.status() {
            return PingError::Transport {
                status: status.as_u16(),
                body: status.canonical_reason().unwrap_or("unknown status").to_string(),
            };
        }

        PingError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_ping())
    }
}

/* -------------------------------------------------------------------------- */
/* ini::Error → PingError */
/* -------------------------------------------------------------------------- */

impl IntoPingError for ini::Error {
    fn into_ping(self) -> PingError {
        match self {
            ini::Error::Io(err) => PingError::Io(format!("credentials file: {err}")),
            ini::Error::Parse(err) => {
                PingError::Config(format!("malformed credentials file: {err}"))
            }
        }
    }
}

impl From<ini::Error> for InfraError {
    fn from(value: ini::Error) -> Self {
        InfraError(value.into_ping())
    }
}

/* -------------------------------------------------------------------------- */
/* url::ParseError → PingError */
/* -------------------------------------------------------------------------- */

impl IntoPingError for url::ParseError {
    fn into_ping(self) -> PingError {
        PingError::Validation(format!("invalid URL: {self}"))
    }
}

impl From<url::ParseError> for InfraError {
    fn from(value: url::ParseError) -> Self {
        InfraError(value.into_ping())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
