use std::sync::Arc;

use async_trait::async_trait;
use auth::PasswordHasher;
use auth::ResetTokenService;
use auth::SessionClaims;
use auth::SessionTokenService;
use chrono::Utc;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::AuthError;
use crate::user::ports::AuthServicePort;
use crate::user::ports::UserRepository;

/// Credential lifecycle orchestrator.
///
/// Composes the password hasher, the two token services, and the credential
/// store into the five operations of [`AuthServicePort`]. Holds no mutable
/// state of its own; the repository is the only shared mutable resource.
pub struct AuthService<R>
where
    R: UserRepository,
{
    repository: Arc<R>,
    password_hasher: Arc<PasswordHasher>,
    session_tokens: Arc<SessionTokenService>,
    reset_tokens: Arc<ResetTokenService>,
}

impl<R> AuthService<R>
where
    R: UserRepository,
{
    /// Create a new service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `password_hasher` - Configured Argon2 hasher
    /// * `session_tokens` - Session token service (session secret)
    /// * `reset_tokens` - Reset token service (distinct reset secret)
    pub fn new(
        repository: Arc<R>,
        password_hasher: Arc<PasswordHasher>,
        session_tokens: Arc<SessionTokenService>,
        reset_tokens: Arc<ResetTokenService>,
    ) -> Self {
        Self {
            repository,
            password_hasher,
            session_tokens,
            reset_tokens,
        }
    }

    // Argon2 is deliberately CPU-expensive; run it on the blocking pool so
    // concurrent request handling is not stalled.
    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        let hasher = Arc::clone(&self.password_hasher);
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
            .map_err(AuthError::from)
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool, AuthError> {
        let hasher = Arc::clone(&self.password_hasher);
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))
    }
}

#[async_trait]
impl<R> AuthServicePort for AuthService<R>
where
    R: UserRepository,
{
    async fn register(&self, command: RegisterUserCommand) -> Result<User, AuthError> {
        if let Some(existing) = self.repository.find_by_email(&command.email).await? {
            return Err(AuthError::DuplicateUser(
                existing.email.as_str().to_string(),
            ));
        }

        let password_hash = self.hash_password(command.password).await?;

        let user = User {
            id: UserId::new(),
            username: command.username,
            email: command.email,
            password_hash,
            created_at: Utc::now(),
        };

        // The store's uniqueness constraint settles check-then-create races:
        // a concurrent insert surfaces here as DuplicateUser.
        let created = self.repository.create(user).await?;

        tracing::info!(user_id = %created.id, "User registered");
        Ok(created)
    }

    async fn login(&self, email: &EmailAddress, password: &str) -> Result<String, AuthError> {
        // Unknown email and wrong password produce the identical error
        let Some(user) = self.repository.find_by_email(email).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        let matches = self
            .verify_password(password.to_string(), user.password_hash.clone())
            .await?;
        if !matches {
            return Err(AuthError::InvalidCredentials);
        }

        let claims = SessionClaims::new(
            user.id,
            user.username.as_ref().map(|u| u.as_str().to_string()),
            user.email.as_str(),
        );
        let token = self.session_tokens.issue(&claims)?;

        tracing::debug!(user_id = %user.id, "Session token issued");
        Ok(token)
    }

    fn current_identity(&self, claims: SessionClaims) -> SessionClaims {
        claims
    }

    async fn request_password_reset(&self, email: &EmailAddress) -> Result<String, AuthError> {
        let user = self
            .repository
            .find_by_email(email)
            .await?
            .ok_or_else(|| AuthError::UserNotFound(email.as_str().to_string()))?;

        let token = self.reset_tokens.issue(&user.id.to_string())?;

        tracing::info!(user_id = %user.id, "Password reset token issued");
        Ok(token)
    }

    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        let subject = self.reset_tokens.consume(token)?;
        let user_id = UserId::from_string(&subject).map_err(|_| AuthError::InvalidToken)?;

        let password_hash = self.hash_password(new_password.to_string()).await?;
        self.repository
            .update_password(&user_id, password_hash)
            .await?;

        tracing::info!(user_id = %user_id, "Password reset applied");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use auth::TokenError;
    use mockall::mock;
    use mockall::predicate::*;

    use super::*;
    use crate::domain::user::models::Username;

    // Define mocks in the test module using mockall
    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: User) -> Result<User, AuthError>;
            async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, AuthError>;
            async fn update_password(&self, id: &UserId, password_hash: String) -> Result<(), AuthError>;
        }
    }

    const SESSION_SECRET: &[u8] = b"test-session-secret-at-least-32-bytes!";
    const RESET_SECRET: &[u8] = b"test-reset-secret-at-least-32-bytes!!";

    fn service(repository: MockTestUserRepository) -> AuthService<MockTestUserRepository> {
        AuthService::new(
            Arc::new(repository),
            Arc::new(PasswordHasher::new()),
            Arc::new(SessionTokenService::new(SESSION_SECRET)),
            Arc::new(ResetTokenService::new(RESET_SECRET)),
        )
    }

    fn email(s: &str) -> EmailAddress {
        EmailAddress::new(s.to_string()).unwrap()
    }

    fn stored_user(email_str: &str, password: &str) -> User {
        User {
            id: UserId::new(),
            username: Some(Username::new("testuser".to_string()).unwrap()),
            email: email(email_str),
            password_hash: PasswordHasher::new().hash(password).unwrap(),
            created_at: Utc::now(),
        }
    }

    fn register_command(email_str: &str, password: &str) -> RegisterUserCommand {
        RegisterUserCommand::new(
            Some(Username::new("testuser".to_string()).unwrap()),
            email(email_str),
            password.to_string(),
        )
    }

    #[tokio::test]
    async fn test_register_success() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));

        repository
            .expect_create()
            .withf(|user| {
                user.email.as_str() == "test@example.com"
                    && user.password_hash.starts_with("$argon2")
                    && user.password_hash != "password123"
            })
            .times(1)
            .returning(|user| Ok(user));

        let service = service(repository);
        let user = service
            .register(register_command("test@example.com", "password123"))
            .await
            .expect("Registration failed");

        assert_eq!(user.email.as_str(), "test@example.com");
        assert!(user.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(Some(stored_user("test@example.com", "first_password"))));

        // Existing registration short-circuits before any create
        repository.expect_create().times(0);

        let service = service(repository);
        let result = service
            .register(register_command("test@example.com", "other_password"))
            .await;

        assert!(matches!(result, Err(AuthError::DuplicateUser(_))));
    }

    #[tokio::test]
    async fn test_register_race_lost_to_concurrent_insert() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));

        // Store constraint fires after the check passed
        repository
            .expect_create()
            .times(1)
            .returning(|user| Err(AuthError::DuplicateUser(user.email.as_str().to_string())));

        let service = service(repository);
        let result = service
            .register(register_command("test@example.com", "password123"))
            .await;

        assert!(matches!(result, Err(AuthError::DuplicateUser(_))));
    }

    #[tokio::test]
    async fn test_login_success_issues_readable_session_token() {
        let mut repository = MockTestUserRepository::new();

        let user = stored_user("test@example.com", "password123");
        let user_id = user.id;
        repository
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = service(repository);
        let token = service
            .login(&email("test@example.com"), "password123")
            .await
            .expect("Login failed");

        let claims = SessionTokenService::new(SESSION_SECRET)
            .read(&token)
            .expect("Issued token failed verification");
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.username, Some("testuser".to_string()));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(Some(stored_user("test@example.com", "Correct_Password!"))));

        let service = service(repository);
        let result = service
            .login(&email("test@example.com"), "Wrong_Password!")
            .await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_unknown_email_same_error() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));

        let service = service(repository);
        let result = service
            .login(&email("nobody@example.com"), "password123")
            .await;

        // Indistinguishable from a password mismatch
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[test]
    fn test_current_identity_echoes_claims() {
        let service = service(MockTestUserRepository::new());

        let claims = SessionClaims::new(
            UserId::new(),
            Some("testuser".to_string()),
            "test@example.com",
        );
        assert_eq!(service.current_identity(claims.clone()), claims);
    }

    #[tokio::test]
    async fn test_request_password_reset_success() {
        let mut repository = MockTestUserRepository::new();

        let user = stored_user("test@example.com", "password123");
        let user_id = user.id;
        repository
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = service(repository);
        let token = service
            .request_password_reset(&email("test@example.com"))
            .await
            .expect("Reset request failed");

        let subject = ResetTokenService::new(RESET_SECRET)
            .consume(&token)
            .expect("Issued token failed verification");
        assert_eq!(subject, user_id.to_string());
    }

    #[tokio::test]
    async fn test_request_password_reset_unknown_email() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));

        let service = service(repository);
        let result = service
            .request_password_reset(&email("nobody@example.com"))
            .await;

        assert!(matches!(result, Err(AuthError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_reset_password_success() {
        let mut repository = MockTestUserRepository::new();

        let user_id = UserId::new();
        repository
            .expect_update_password()
            .withf(move |id, hash| *id == user_id && hash.starts_with("$argon2"))
            .times(1)
            .returning(|_, _| Ok(()));

        let token = ResetTokenService::new(RESET_SECRET)
            .issue(&user_id.to_string())
            .unwrap();

        let service = service(repository);
        let result = service.reset_password(&token, "new_password").await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_reset_password_garbage_token() {
        let mut repository = MockTestUserRepository::new();
        repository.expect_update_password().times(0);

        let service = service(repository);
        let result = service.reset_password("not-a-token", "new_password").await;

        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_reset_password_rejects_session_token() {
        let mut repository = MockTestUserRepository::new();
        repository.expect_update_password().times(0);

        // A session token must never work as a reset capability
        let claims = SessionClaims::new(UserId::new(), None, "test@example.com");
        let session_token = SessionTokenService::new(SESSION_SECRET)
            .issue(&claims)
            .unwrap();

        let service = service(repository);
        let result = service.reset_password(&session_token, "new_password").await;

        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_reset_password_user_no_longer_resolves() {
        let mut repository = MockTestUserRepository::new();

        let user_id = UserId::new();
        repository
            .expect_update_password()
            .times(1)
            .returning(move |id, _| Err(AuthError::UserNotFound(id.to_string())));

        let token = ResetTokenService::new(RESET_SECRET)
            .issue(&user_id.to_string())
            .unwrap();

        let service = service(repository);
        let result = service.reset_password(&token, "new_password").await;

        assert!(matches!(result, Err(AuthError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_reset_password_expired_token_maps_to_expired() {
        let mut repository = MockTestUserRepository::new();
        repository.expect_update_password().times(0);

        // Token signed with the right secret but already past its window
        let codec = auth::TokenCodec::new(RESET_SECRET);
        #[derive(serde::Serialize)]
        struct Claims {
            sub: String,
        }
        let token = codec
            .issue(
                &Claims {
                    sub: UserId::new().to_string(),
                },
                chrono::Duration::minutes(-1),
            )
            .unwrap();

        let service = service(repository);
        let result = service.reset_password(&token, "new_password").await;

        assert!(matches!(result, Err(AuthError::TokenExpired)));
        // The codec reported expiry, not a signature failure
        assert!(matches!(
            auth::ResetTokenService::new(RESET_SECRET).consume(&token),
            Err(TokenError::Expired)
        ));
    }
}
