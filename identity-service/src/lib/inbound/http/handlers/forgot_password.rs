use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::ports::AuthServicePort;
use crate::inbound::http::router::AppState;
use crate::user::errors::AuthError;
use crate::user::ports::UserRepository;

/// Issue a password-reset capability token for a registered email.
///
/// The token is returned in the response body; delivering it to the user
/// (mail or otherwise) is outside this service.
pub async fn forgot_password<R: UserRepository>(
    State(state): State<AppState<R>>,
    Json(body): Json<ForgotPasswordRequestBody>,
) -> Result<ApiSuccess<ForgotPasswordResponseData>, ApiError> {
    if body.email.is_empty() {
        return Err(ApiError::from(AuthError::MissingFields));
    }

    let email = EmailAddress::new(body.email).map_err(AuthError::from)?;

    let reset_token = state
        .auth_service
        .request_password_reset(&email)
        .await
        .map_err(ApiError::from)?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        ForgotPasswordResponseData {
            message: "Password reset token generated".to_string(),
            reset_token,
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ForgotPasswordRequestBody {
    #[serde(default)]
    email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForgotPasswordResponseData {
    pub message: String,
    pub reset_token: String,
}
