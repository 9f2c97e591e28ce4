use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::Username;
use crate::domain::user::ports::AuthServicePort;
use crate::inbound::http::router::AppState;
use crate::user::errors::AuthError;
use crate::user::ports::UserRepository;

pub async fn register<R: UserRepository>(
    State(state): State<AppState<R>>,
    Json(body): Json<RegisterRequestBody>,
) -> Result<ApiSuccess<RegisterResponseData>, ApiError> {
    let command = body.try_into_command().map_err(ApiError::from)?;

    state
        .auth_service
        .register(command)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::CREATED, user.into()))
}

/// HTTP request body for registering a user (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequestBody {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

impl RegisterRequestBody {
    fn try_into_command(self) -> Result<RegisterUserCommand, AuthError> {
        // Field presence is settled before any store access
        if self.email.is_empty() || self.password.is_empty() {
            return Err(AuthError::MissingFields);
        }

        let username = self
            .username
            .filter(|u| !u.is_empty())
            .map(Username::new)
            .transpose()?;
        let email = EmailAddress::new(self.email)?;

        Ok(RegisterUserCommand::new(username, email, self.password))
    }
}

/// Public view of a created user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterResponseData {
    pub id: String,
    pub email: String,
}

impl From<&User> for RegisterResponseData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.as_str().to_string(),
        }
    }
}
