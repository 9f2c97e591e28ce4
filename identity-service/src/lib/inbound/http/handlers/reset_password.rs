use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::ports::AuthServicePort;
use crate::inbound::http::router::AppState;
use crate::user::errors::AuthError;
use crate::user::ports::UserRepository;

/// Consume a reset token and overwrite the password of the user it names.
pub async fn reset_password<R: UserRepository>(
    State(state): State<AppState<R>>,
    Json(body): Json<ResetPasswordRequestBody>,
) -> Result<ApiSuccess<ResetPasswordResponseData>, ApiError> {
    if body.reset_token.is_empty() || body.new_password.is_empty() {
        return Err(ApiError::from(AuthError::MissingFields));
    }

    state
        .auth_service
        .reset_password(&body.reset_token, &body.new_password)
        .await
        .map_err(ApiError::from)?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        ResetPasswordResponseData {
            message: "Password reset successfully".to_string(),
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResetPasswordRequestBody {
    #[serde(default)]
    reset_token: String,
    #[serde(default)]
    new_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResetPasswordResponseData {
    pub message: String,
}
