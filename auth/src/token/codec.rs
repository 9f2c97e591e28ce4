use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::Deserialize;
use serde::Serialize;

use super::errors::TokenError;

/// Envelope signed into every token: expiry plus issuance time, with the
/// caller's claims flattened alongside.
#[derive(Serialize)]
struct SignedPayload<'a, T: Serialize> {
    exp: i64,
    iat: i64,
    #[serde(flatten)]
    claims: &'a T,
}

/// Signs and verifies claims payloads with a symmetric MAC.
///
/// Generic over the claims type so each token kind defines its own payload.
/// Uses HS256 (HMAC with SHA-256). Verification is a pure computation with
/// no I/O; expiry is checked with zero leeway.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl TokenCodec {
    /// Create a new codec from a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Sign claims into an opaque token expiring after `ttl`.
    ///
    /// # Arguments
    /// * `claims` - Claims payload to embed (must implement Serialize)
    /// * `ttl` - Validity window from now
    ///
    /// # Returns
    /// Signed token string
    ///
    /// # Errors
    /// * `EncodingFailed` - Claims serialization or signing failed
    pub fn issue<T: Serialize>(&self, claims: &T, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        let payload = SignedPayload {
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            claims,
        };

        encode(&Header::new(self.algorithm), &payload, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Verify a token signature and expiry, returning the embedded claims.
    ///
    /// # Arguments
    /// * `token` - Token string to verify
    ///
    /// # Returns
    /// Decoded claims
    ///
    /// # Errors
    /// * `Expired` - The token's validity window has elapsed
    /// * `Invalid` - Signature mismatch or malformed token
    pub fn verify<T: for<'de> Deserialize<'de>>(&self, token: &str) -> Result<T, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        let token_data =
            decode::<T>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestClaims {
        sub: String,
        role: String,
    }

    fn test_claims() -> TestClaims {
        TestClaims {
            sub: "user123".to_string(),
            role: "admin".to_string(),
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let codec = TokenCodec::new(b"my_secret_key_at_least_32_bytes_long!");

        let token = codec
            .issue(&test_claims(), Duration::minutes(5))
            .expect("Failed to issue token");
        assert!(!token.is_empty());

        let decoded: TestClaims = codec.verify(&token).expect("Failed to verify token");
        assert_eq!(decoded, test_claims());
    }

    #[test]
    fn test_verify_malformed_token() {
        let codec = TokenCodec::new(b"my_secret_key_at_least_32_bytes_long!");

        let result = codec.verify::<TestClaims>("invalid.token.here");
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_verify_with_wrong_secret() {
        let codec1 = TokenCodec::new(b"secret1_at_least_32_bytes_long_key!");
        let codec2 = TokenCodec::new(b"secret2_at_least_32_bytes_long_key!");

        let token = codec1
            .issue(&test_claims(), Duration::minutes(5))
            .expect("Failed to issue token");

        let result = codec2.verify::<TestClaims>(&token);
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_verify_expired_token() {
        let codec = TokenCodec::new(b"my_secret_key_at_least_32_bytes_long!");

        // Already past its window at issuance
        let token = codec
            .issue(&test_claims(), Duration::minutes(-1))
            .expect("Failed to issue token");

        let result = codec.verify::<TestClaims>(&token);
        assert!(matches!(result, Err(TokenError::Expired)));
    }

    #[test]
    fn test_verify_tampered_token() {
        let codec = TokenCodec::new(b"my_secret_key_at_least_32_bytes_long!");

        let token = codec
            .issue(&test_claims(), Duration::minutes(5))
            .expect("Failed to issue token");

        // Flip a character in the payload segment
        let mut tampered = token.into_bytes();
        let mid = tampered.len() / 2;
        tampered[mid] = if tampered[mid] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(tampered).unwrap();

        let result = codec.verify::<TestClaims>(&tampered);
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }
}
