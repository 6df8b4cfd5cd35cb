//! crates/newswatcher_core/src/session.rs
//!
//! Stateless session tokens. A token is `base64url(claims).base64url(mac)`
//! where the mac is HMAC-SHA256 over the exact claims bytes with a
//! server-held secret. Nothing is persisted at issuance, so verification is
//! a pure recomputation and the service scales horizontally with no shared
//! session storage.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::domain::UserId;

type HmacSha256 = Hmac<Sha256>;

/// Why a request could not be authenticated or authorized.
///
/// Callers must treat `Malformed`, `Invalid` and `Expired` uniformly as
/// "unauthenticated"; the split exists for logging, not for clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The token could not be parsed at all.
    #[error("Session token is malformed")]
    Malformed,
    /// The token parsed but its signature does not verify.
    #[error("Session token signature is invalid")]
    Invalid,
    /// The token is genuine but its expiry instant has passed.
    #[error("Session token has expired")]
    Expired,
    /// The verified subject does not match the claimed identity.
    #[error("Token subject does not match the requested identity")]
    Forbidden,
}

/// The signed payload of a session token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: UserId,
    iat: i64,
    exp: i64,
}

/// Issues and verifies session tokens.
///
/// Holds the process-wide signing secret, loaded once at startup and
/// read-only thereafter. Rotating the secret invalidates every outstanding
/// token.
pub struct SessionManager {
    secret: Vec<u8>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    /// Produce a token for `subject`, valid for the configured ttl.
    ///
    /// Called only after password verification succeeds; issuance itself has
    /// no side effects.
    pub fn issue(&self, subject: UserId) -> String {
        self.issue_at(subject, Utc::now())
    }

    fn issue_at(&self, subject: UserId, now: DateTime<Utc>) -> String {
        let claims = Claims {
            sub: subject,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        // Claims are a fixed-shape struct; serialization cannot fail.
        let payload = serde_json::to_vec(&claims).expect("claims serialize");
        let mac = self.mac(&payload);
        format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&payload),
            URL_SAFE_NO_PAD.encode(mac)
        )
    }

    /// Check the token's integrity and expiry, returning its subject.
    pub fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        self.verify_at(token, Utc::now())
    }

    fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, AuthError> {
        let (payload_b64, mac_b64) = token.split_once('.').ok_or(AuthError::Malformed)?;
        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| AuthError::Malformed)?;
        let mac = URL_SAFE_NO_PAD
            .decode(mac_b64)
            .map_err(|_| AuthError::Malformed)?;

        // Constant-time comparison via Mac::verify_slice.
        let mut verifier =
            HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key length");
        verifier.update(&payload);
        verifier.verify_slice(&mac).map_err(|_| AuthError::Invalid)?;

        let claims: Claims =
            serde_json::from_slice(&payload).map_err(|_| AuthError::Malformed)?;
        if now.timestamp() >= claims.exp {
            return Err(AuthError::Expired);
        }
        Ok(claims.sub)
    }

    /// Invalidate the subject's outstanding tokens.
    ///
    /// Tokens are self-contained and no server-side session record exists,
    /// so there is nothing to revoke here: logout is a client-side token
    /// discard and the only enforced boundary is natural expiry.
    pub fn revoke(&self, _subject: UserId) {}

    fn mac(&self, payload: &[u8]) -> Vec<u8> {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key length");
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}
