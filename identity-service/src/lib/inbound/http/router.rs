use std::sync::Arc;
use std::time::Duration;

use auth::SessionTokenService;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::routing::put;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::current_user::current_user;
use super::handlers::forgot_password::forgot_password;
use super::handlers::login::login;
use super::handlers::register::register;
use super::handlers::reset_password::reset_password;
use super::middleware::authenticate as auth_middleware;
use crate::domain::user::service::AuthService;
use crate::user::ports::UserRepository;

pub struct AppState<R: UserRepository> {
    pub auth_service: Arc<AuthService<R>>,
    pub session_tokens: Arc<SessionTokenService>,
}

// Manual Clone so R itself never needs to be Clone
impl<R: UserRepository> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            auth_service: Arc::clone(&self.auth_service),
            session_tokens: Arc::clone(&self.session_tokens),
        }
    }
}

pub fn create_router<R: UserRepository>(
    auth_service: Arc<AuthService<R>>,
    session_tokens: Arc<SessionTokenService>,
) -> Router {
    let state = AppState {
        auth_service,
        session_tokens,
    };

    let public_routes = Router::new()
        .route("/api/users/register", post(register::<R>))
        .route("/api/users/login", post(login::<R>))
        .route("/api/users/forgotpassword", post(forgot_password::<R>))
        .route("/api/users/resetpassword", put(reset_password::<R>));

    let protected_routes = Router::new()
        .route("/api/users/current", get(current_user::<R>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<R>,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
