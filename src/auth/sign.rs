//! Tamper-evident, time-bounded tokens.
//!
//! A [`SignedToken`] is a payload plus its HMAC-SHA256 signature under the
//! application key. On the wire it is `base64url(payload).base64url(sig)`,
//! unpadded, so it fits in a single URL path segment.
//!
//! Time-bounded payloads carry their issue time after a `::` delimiter,
//! e.g. `"1::1700000000"`; [`Signer::verify`] enforces the window.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::TokenError;

type HmacSha256 = Hmac<Sha256>;

/// Delimiter between the identifier and the issue timestamp in a payload.
pub const DELIMITER: &str = "::";

/// A payload and the signature over it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignedToken {
    pub payload: String,
    pub signature: Vec<u8>,
}

impl fmt::Display for SignedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}",
            URL_SAFE_NO_PAD.encode(self.payload.as_bytes()),
            URL_SAFE_NO_PAD.encode(&self.signature),
        )
    }
}

impl FromStr for SignedToken {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (payload, signature) = s.split_once('.').ok_or(TokenError::Malformed)?;
        let payload = URL_SAFE_NO_PAD.decode(payload).map_err(|_| TokenError::Malformed)?;
        let signature = URL_SAFE_NO_PAD.decode(signature).map_err(|_| TokenError::Malformed)?;
        Ok(Self {
            payload: String::from_utf8(payload).map_err(|_| TokenError::Malformed)?,
            signature,
        })
    }
}

/// Signs and verifies tokens with a shared secret.
#[derive(Clone)]
pub struct Signer {
    key: Vec<u8>,
}

impl Signer {
    pub fn new(key: impl AsRef<[u8]>) -> Self {
        Self { key: key.as_ref().to_vec() }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.key).expect("HMAC accepts keys of any length")
    }

    pub fn sign(&self, payload: &str) -> SignedToken {
        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        SignedToken {
            payload: payload.to_owned(),
            signature: mac.finalize().into_bytes().to_vec(),
        }
    }

    /// Checks the signature only and returns the payload.
    pub fn unsign<'t>(&self, token: &'t SignedToken) -> Result<&'t str, TokenError> {
        let mut mac = self.mac();
        mac.update(token.payload.as_bytes());
        mac.verify_slice(&token.signature).map_err(|_| TokenError::InvalidSignature)?;
        Ok(&token.payload)
    }

    /// Checks the signature, then the `::`-delimited issue timestamp against
    /// `window`. A token exactly `window` old is still valid.
    pub fn verify<'t>(
        &self,
        token: &'t SignedToken,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Result<&'t str, TokenError> {
        let payload = self.unsign(token)?;
        let issued_ms = issued_at_millis(payload)?;
        let elapsed_ms = now.timestamp_millis().saturating_sub(issued_ms);
        if i128::from(elapsed_ms) > window.as_millis() as i128 {
            return Err(TokenError::Expired);
        }
        Ok(payload)
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer").finish_non_exhaustive()
    }
}

/// Builds a time-bounded payload: `"{identifier}::{unix seconds}"`.
pub fn timed_payload(identifier: impl fmt::Display, issued_at: DateTime<Utc>) -> String {
    format!("{identifier}{DELIMITER}{}", issued_at.timestamp())
}

/// The identifier half of a time-bounded payload.
pub fn identifier(payload: &str) -> Result<&str, TokenError> {
    payload.split_once(DELIMITER).map(|(id, _)| id).ok_or(TokenError::Malformed)
}

/// Issue time in milliseconds. Fractional seconds are accepted.
fn issued_at_millis(payload: &str) -> Result<i64, TokenError> {
    let (_, stamp) = payload.split_once(DELIMITER).ok_or(TokenError::Malformed)?;
    let secs: f64 = stamp.trim().parse().map_err(|_| TokenError::Malformed)?;
    if !secs.is_finite() {
        return Err(TokenError::Malformed);
    }
    Ok((secs * 1000.0).round() as i64)
}
