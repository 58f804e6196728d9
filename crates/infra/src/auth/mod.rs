//! Request signing helpers

pub mod signature;

pub use signature::{UrlSignature, DEFAULT_SIGNATURE_TTL_MINUTES};
