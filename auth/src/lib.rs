//! Credential and token primitives.
//!
//! Provides the security core shared by identity services:
//! - Password hashing (Argon2id, per-call random salt)
//! - Signed stateless tokens (HS256) for session identity and
//!   password-reset capability
//!
//! Session and reset tokens are signed with distinct secrets so a session
//! token can never be replayed as a reset capability, and vice versa.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let digest = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &digest));
//! assert!(!hasher.verify("not_my_password", &digest));
//! ```
//!
//! ## Session Tokens
//! ```
//! use auth::{SessionClaims, SessionTokenService};
//!
//! let sessions = SessionTokenService::new(b"session_secret_at_least_32_bytes!");
//! let claims = SessionClaims::new("user123", Some("alice".to_string()), "alice@example.com");
//! let token = sessions.issue(&claims).unwrap();
//! let decoded = sessions.read(&token).unwrap();
//! assert_eq!(decoded, claims);
//! ```
//!
//! ## Reset Tokens
//! ```
//! use auth::ResetTokenService;
//!
//! let resets = ResetTokenService::new(b"reset_secret_at_least_32_bytes!!!");
//! let token = resets.issue("user123").unwrap();
//! assert_eq!(resets.consume(&token).unwrap(), "user123");
//! ```

pub mod password;
pub mod token;

// Re-export commonly used items
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token::ResetTokenService;
pub use token::SessionClaims;
pub use token::SessionTokenService;
pub use token::TokenCodec;
pub use token::TokenError;
