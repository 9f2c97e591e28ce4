use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use auth::PasswordHasher;
use auth::ResetTokenService;
use auth::SessionTokenService;
use identity_service::domain::user::models::EmailAddress;
use identity_service::domain::user::models::User;
use identity_service::domain::user::models::UserId;
use identity_service::domain::user::ports::UserRepository;
use identity_service::domain::user::service::AuthService;
use identity_service::inbound::http::router::create_router;
use identity_service::user::errors::AuthError;

pub const SESSION_SECRET: &[u8] = b"test-session-secret-at-least-32-bytes!";
pub const RESET_SECRET: &[u8] = b"test-reset-secret-at-least-32-bytes!!";

/// In-memory credential store standing in for Postgres, with the same
/// email-uniqueness guarantee the database constraint provides.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, AuthError> {
        let mut users = self.users.lock().unwrap();

        if users.iter().any(|u| u.email == user.email) {
            return Err(AuthError::DuplicateUser(user.email.as_str().to_string()));
        }

        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, AuthError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| &u.email == email).cloned())
    }

    async fn update_password(&self, id: &UserId, password_hash: String) -> Result<(), AuthError> {
        let mut users = self.users.lock().unwrap();

        match users.iter_mut().find(|u| &u.id == id) {
            Some(user) => {
                user.password_hash = password_hash;
                Ok(())
            }
            None => Err(AuthError::UserNotFound(id.to_string())),
        }
    }
}

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let repository = Arc::new(InMemoryUserRepository::default());

        // Minimum work factor keeps the suite fast
        let password_hasher =
            Arc::new(PasswordHasher::with_cost(1).expect("Failed to build password hasher"));
        let session_tokens = Arc::new(SessionTokenService::new(SESSION_SECRET));
        let reset_tokens = Arc::new(ResetTokenService::new(RESET_SECRET));

        let auth_service = Arc::new(AuthService::new(
            repository,
            password_hasher,
            Arc::clone(&session_tokens),
            reset_tokens,
        ));

        let router = create_router(auth_service, session_tokens);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make PUT request
    pub fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.put(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }
}
