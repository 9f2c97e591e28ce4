use std::sync::Arc;

use auth::PasswordHasher;
use auth::ResetTokenService;
use auth::SessionTokenService;
use identity_service::config::Config;
use identity_service::domain::user::service::AuthService;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "identity-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    // Fails here if a secret is missing, empty, or shared between token kinds
    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        hash_cost = config.auth.hash_cost,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = 5,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let password_hasher = Arc::new(PasswordHasher::with_cost(config.auth.hash_cost)?);
    let session_tokens = Arc::new(SessionTokenService::new(
        config.auth.session_secret.as_bytes(),
    ));
    let reset_tokens = Arc::new(ResetTokenService::new(config.auth.reset_secret.as_bytes()));

    let repository = Arc::new(PostgresUserRepository::new(pg_pool));
    let auth_service = Arc::new(AuthService::new(
        repository,
        password_hasher,
        Arc::clone(&session_tokens),
        reset_tokens,
    ));

    let address = format!("0.0.0.0:{}", config.server.http_port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(
        address = %address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let application = create_router(auth_service, session_tokens);
    axum::serve(listener, application).await?;

    Ok(())
}
