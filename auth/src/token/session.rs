use chrono::Duration;
use serde::Deserialize;
use serde::Serialize;

use super::codec::TokenCodec;
use super::errors::TokenError;

/// Identity claims embedded in a session token.
///
/// Possession of a validly-signed, unexpired session token is sufficient
/// proof of identity; no session table exists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    /// Subject (user identifier)
    pub sub: String,

    /// Display name, if the user registered one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Email address
    pub email: String,
}

impl SessionClaims {
    pub fn new(user_id: impl ToString, username: Option<String>, email: impl Into<String>) -> Self {
        Self {
            sub: user_id.to_string(),
            username,
            email: email.into(),
        }
    }
}

/// Issues and validates short-lived session identity tokens.
pub struct SessionTokenService {
    codec: TokenCodec,
}

impl SessionTokenService {
    /// Validity window for session tokens.
    pub const TTL_MINUTES: i64 = 15;

    /// Create a session token service with the session signing secret.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            codec: TokenCodec::new(secret),
        }
    }

    /// Issue a session token for the given identity claims.
    ///
    /// # Errors
    /// * `EncodingFailed` - Claims serialization or signing failed
    pub fn issue(&self, claims: &SessionClaims) -> Result<String, TokenError> {
        self.codec.issue(claims, Duration::minutes(Self::TTL_MINUTES))
    }

    /// Validate a session token and return its identity claims.
    ///
    /// # Errors
    /// * `Expired` - The session window has elapsed
    /// * `Invalid` - Signature mismatch or malformed token
    pub fn read(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.codec.verify(token)
    }
}
