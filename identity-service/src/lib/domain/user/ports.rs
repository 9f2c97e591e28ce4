use async_trait::async_trait;
use auth::SessionClaims;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::AuthError;

/// Port for the credential lifecycle operations.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new user.
    ///
    /// Checks for an existing registration by email before creating; the
    /// store's uniqueness constraint is the final authority on races.
    ///
    /// # Arguments
    /// * `command` - Validated command containing optional username, email, and password
    ///
    /// # Returns
    /// Created user entity
    ///
    /// # Errors
    /// * `DuplicateUser` - Email is already registered
    /// * `Hashing` - Password hashing failed
    /// * `StoreFailure` - Store operation failed
    async fn register(&self, command: RegisterUserCommand) -> Result<User, AuthError>;

    /// Verify credentials and issue a session token.
    ///
    /// # Arguments
    /// * `email` - Login email
    /// * `password` - Plaintext password to verify
    ///
    /// # Returns
    /// Signed session token, valid for 15 minutes
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or password mismatch
    ///   (deliberately the same error, no existence leak)
    /// * `StoreFailure` - Store operation failed
    async fn login(&self, email: &EmailAddress, password: &str) -> Result<String, AuthError>;

    /// Echo the identity claims of an already-verified session.
    ///
    /// The caller (the HTTP middleware) is responsible for prior session
    /// verification; this is a pure echo with no store access.
    fn current_identity(&self, claims: SessionClaims) -> SessionClaims;

    /// Issue a password-reset capability token for a registered email.
    ///
    /// The token is returned directly to the caller; delivering it to the
    /// user is an external concern.
    ///
    /// # Returns
    /// Signed reset token, valid for 30 minutes
    ///
    /// # Errors
    /// * `UserNotFound` - No user registered under this email
    /// * `StoreFailure` - Store operation failed
    async fn request_password_reset(&self, email: &EmailAddress) -> Result<String, AuthError>;

    /// Consume a reset token and overwrite the user's password hash.
    ///
    /// # Arguments
    /// * `token` - Reset capability token
    /// * `new_password` - Replacement plaintext password
    ///
    /// # Errors
    /// * `InvalidToken` / `TokenExpired` - Token fails verification
    /// * `UserNotFound` - The user the token names no longer resolves
    /// * `Hashing` - Password hashing failed
    /// * `StoreFailure` - Store operation failed
    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError>;
}

/// Persistence operations for the user aggregate (the credential store).
///
/// Each operation touches at most one user record and is atomic on its own;
/// no multi-step transactions are required.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist a new user.
    ///
    /// # Errors
    /// * `DuplicateUser` - Email uniqueness constraint violated
    /// * `StoreFailure` - Store operation failed
    async fn create(&self, user: User) -> Result<User, AuthError>;

    /// Retrieve a user by email address.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `StoreFailure` - Store operation failed
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, AuthError>;

    /// Overwrite the password hash of an existing user.
    ///
    /// # Errors
    /// * `UserNotFound` - User does not exist
    /// * `StoreFailure` - Store operation failed
    async fn update_password(&self, id: &UserId, password_hash: String) -> Result<(), AuthError>;
}
