//! Expiring URL signatures
//!
//! A signature is the hex HMAC-SHA256 of `user_id ‖ expires_at` keyed with a
//! shared secret, where `expires_at` is a unix timestamp in seconds.

use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Default lifetime of a generated signature
pub const DEFAULT_SIGNATURE_TTL_MINUTES: i64 = 20;

/// Generates and checks expiring URL signatures
#[derive(Clone)]
pub struct UrlSignature {
    secret: Vec<u8>,
}

impl std::fmt::Debug for UrlSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlSignature").field("secret", &"<redacted>").finish()
    }
}

impl UrlSignature {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self { secret: secret.as_ref().to_vec() }
    }

    /// Signature valid for `expiration` from now, with its expiry timestamp.
    pub fn generate(&self, user_id: &str, expiration: Duration) -> (String, i64) {
        self.generate_at(user_id, expiration, Utc::now())
    }

    pub fn generate_at(
        &self,
        user_id: &str,
        expiration: Duration,
        now: DateTime<Utc>,
    ) -> (String, i64) {
        let expires_at = unix_seconds(now + expiration);
        (self.sign(user_id, expires_at), expires_at)
    }

    /// True when `signature` matches and `expires_at` has not passed.
    pub fn is_valid(&self, signature: &str, expires_at: i64, user_id: &str) -> bool {
        self.is_valid_at(signature, expires_at, user_id, Utc::now())
    }

    pub fn is_valid_at(
        &self,
        signature: &str,
        expires_at: i64,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> bool {
        let Ok(expected) = hex::decode(signature) else {
            return false;
        };
        let Some(mac) = self.mac(user_id, expires_at) else {
            return false;
        };
        // verify_slice compares in constant time
        if mac.verify_slice(&expected).is_err() {
            return false;
        }
        expires_at >= unix_seconds(now)
    }

    fn sign(&self, user_id: &str, expires_at: i64) -> String {
        self.mac(user_id, expires_at)
            .map(|mac| hex::encode(mac.finalize().into_bytes()))
            .unwrap_or_default()
    }

    fn mac(&self, user_id: &str, expires_at: i64) -> Option<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.secret).ok()?;
        mac.update(user_id.as_bytes());
        mac.update(expires_at.to_string().as_bytes());
        Some(mac)
    }
}

/// Unix seconds rounded to the nearest second.
fn unix_seconds(when: DateTime<Utc>) -> i64 {
    let seconds = when.timestamp();
    if when.timestamp_subsec_micros() >= 500_000 {
        seconds + 1
    } else {
        seconds
    }
}
