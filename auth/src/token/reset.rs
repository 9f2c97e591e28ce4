use chrono::Duration;
use serde::Deserialize;
use serde::Serialize;

use super::codec::TokenCodec;
use super::errors::TokenError;

/// Capability claims embedded in a password-reset token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct ResetClaims {
    /// Subject (user identifier)
    sub: String,
}

/// Issues and validates single-purpose password-reset capability tokens.
///
/// Signed with a secret distinct from session tokens, so a session token
/// can never be replayed as a reset capability. Consuming a token only
/// proves the capability; the caller applies the password update. There is
/// no single-use enforcement beyond expiry.
pub struct ResetTokenService {
    codec: TokenCodec,
}

impl ResetTokenService {
    /// Validity window for reset tokens.
    pub const TTL_MINUTES: i64 = 30;

    /// Create a reset token service with the reset signing secret.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            codec: TokenCodec::new(secret),
        }
    }

    /// Issue a reset token for the given user.
    ///
    /// # Errors
    /// * `EncodingFailed` - Claims serialization or signing failed
    pub fn issue(&self, user_id: &str) -> Result<String, TokenError> {
        let claims = ResetClaims {
            sub: user_id.to_string(),
        };
        self.codec.issue(&claims, Duration::minutes(Self::TTL_MINUTES))
    }

    /// Validate a reset token and return the user it authorizes.
    ///
    /// # Errors
    /// * `Expired` - The reset window has elapsed
    /// * `Invalid` - Signature mismatch or malformed token
    pub fn consume(&self, token: &str) -> Result<String, TokenError> {
        self.codec.verify::<ResetClaims>(token).map(|c| c.sub)
    }
}
