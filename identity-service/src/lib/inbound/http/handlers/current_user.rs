use auth::SessionClaims;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::ports::AuthServicePort;
use crate::inbound::http::router::AppState;
use crate::user::ports::UserRepository;

/// Echo the identity of the verified session. The middleware has already
/// validated the bearer token and stored its claims in the extensions.
pub async fn current_user<R: UserRepository>(
    State(state): State<AppState<R>>,
    Extension(claims): Extension<SessionClaims>,
) -> Result<ApiSuccess<CurrentUserResponseData>, ApiError> {
    let claims = state.auth_service.current_identity(claims);

    Ok(ApiSuccess::new(StatusCode::OK, claims.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUserResponseData {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub email: String,
}

impl From<SessionClaims> for CurrentUserResponseData {
    fn from(claims: SessionClaims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
            email: claims.email,
        }
    }
}
