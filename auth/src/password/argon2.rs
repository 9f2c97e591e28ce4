use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;

use super::errors::PasswordError;

/// Password hashing implementation.
///
/// Provides cryptographic password hashing (internally uses Argon2id).
/// Each call to [`hash`](Self::hash) generates a fresh random salt, so two
/// hashes of the same plaintext differ while both remain verifiable.
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Default time cost (iterations). Comparable work to bcrypt cost 10.
    pub const DEFAULT_COST: u32 = 2;

    const MEMORY_KIB: u32 = 19_456;
    const LANES: u32 = 1;

    /// Create a password hasher with the default work factor.
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Create a password hasher with an explicit time cost.
    ///
    /// # Arguments
    /// * `cost` - Argon2 time cost (iteration count), must be >= 1
    ///
    /// # Errors
    /// * `InvalidParameters` - Cost is outside the range Argon2 accepts
    pub fn with_cost(cost: u32) -> Result<Self, PasswordError> {
        let params = Params::new(Self::MEMORY_KIB, cost, Self::LANES, None)
            .map_err(|e| PasswordError::InvalidParameters(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a plaintext password securely.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// PHC string format hash (includes algorithm, parameters, salt, and hash)
    ///
    /// # Errors
    /// * `HashingFailed` - Password hashing operation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored hash.
    ///
    /// Recomputes the hash using the salt and parameters embedded in the
    /// stored digest; the comparison inside `argon2` is constant-time.
    /// A malformed digest is treated as a mismatch, never an error.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `hash` - Stored password hash in PHC string format
    ///
    /// # Returns
    /// True if password matches, false otherwise
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return false;
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new();
        let password = "my_secure_password";

        let hash = hasher.hash(password).expect("Failed to hash password");

        assert!(hasher.verify(password, &hash));
        assert!(!hasher.verify("wrong_password", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let hasher = PasswordHasher::new();
        let password = "my_secure_password";

        let first = hasher.hash(password).expect("Failed to hash password");
        let second = hasher.hash(password).expect("Failed to hash password");

        // Fresh salt per call, but both digests verify
        assert_ne!(first, second);
        assert!(hasher.verify(password, &first));
        assert!(hasher.verify(password, &second));
    }

    #[test]
    fn test_verify_malformed_hash_is_false() {
        let hasher = PasswordHasher::new();
        assert!(!hasher.verify("password", "not_a_phc_string"));
        assert!(!hasher.verify("password", ""));
    }

    #[test]
    fn test_with_cost() {
        let hasher = PasswordHasher::with_cost(3).expect("Failed to build hasher");
        let hash = hasher.hash("password").expect("Failed to hash password");

        assert!(hash.contains("t=3"));
        assert!(hasher.verify("password", &hash));

        // Digests remain verifiable across work factors
        let default_hasher = PasswordHasher::new();
        assert!(default_hasher.verify("password", &hash));
    }

    #[test]
    fn test_with_cost_rejects_zero() {
        assert!(matches!(
            PasswordHasher::with_cost(0),
            Err(PasswordError::InvalidParameters(_))
        ));
    }
}
