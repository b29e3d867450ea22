//! Access gate: bearer credential verification and issuance.
//!
//! Every vault operation passes through [`AccessGate::authenticate`] before
//! touching the cipher or the store. All rejections collapse into
//! `Error::Unauthorized` with no detail about which check failed.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::config::EngineConfig;
use passvault_common::{Error, OwnerId, Result};

/// Authorization scheme, matched case-insensitively.
const BEARER_SCHEME: &str = "Bearer";

/// Longest header value accepted before any parsing happens.
pub const MAX_CREDENTIAL_LENGTH: usize = 8 * 1024;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(rename = "userId")]
    user_id: String,
    iat: u64,
    exp: u64,
}

/// Verifies and issues HS256 bearer tokens.
#[derive(Clone)]
pub struct AccessGate {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl AccessGate {
    /// Create a gate signing with `secret` and issuing tokens valid for `ttl`.
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.token_secret.as_bytes(), config.token_ttl)
    }

    /// Lifetime of issued tokens.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Authenticate a raw authorization header value.
    ///
    /// # Postconditions
    /// - On success, the returned owner is the `userId` claim of a token
    ///   signed with this gate's secret and not yet expired
    ///
    /// # Errors
    /// - `Error::Unauthorized` if the header is absent, oversized, not
    ///   `Bearer <token>`, or the token fails verification
    pub fn authenticate(&self, authorization: Option<&str>) -> Result<OwnerId> {
        let header = authorization.ok_or(Error::Unauthorized)?;
        if header.len() > MAX_CREDENTIAL_LENGTH {
            return Err(Error::Unauthorized);
        }
        let (scheme, token) = header.split_once(' ').ok_or(Error::Unauthorized)?;
        if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
            return Err(Error::Unauthorized);
        }
        let token = token.trim();
        if token.is_empty() {
            return Err(Error::Unauthorized);
        }

        self.verify(token)
    }

    /// Verify a bare token.
    pub fn verify(&self, token: &str) -> Result<OwnerId> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "Credential rejected");
            Error::Unauthorized
        })?;

        OwnerId::new(data.claims.user_id).map_err(|_| Error::Unauthorized)
    }

    /// Issue a token for `owner`, valid from now for the configured lifetime.
    ///
    /// # Errors
    /// - `Error::Configuration` if the lifetime pushes expiry past `u64::MAX`
    /// - `Error::Crypto` if signing fails
    pub fn issue(&self, owner: &OwnerId) -> Result<String> {
        let now = Utc::now().timestamp().max(0) as u64;
        let exp = now
            .checked_add(self.ttl.as_secs())
            .ok_or_else(|| Error::Configuration("Token lifetime too large".to_string()))?;
        let claims = Claims {
            user_id: owner.as_str().to_string(),
            iat: now,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| Error::Crypto(format!("Token signing failed: {}", e)))
    }
}

impl fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessGate")
            .field("secret", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}
