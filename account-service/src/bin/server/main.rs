use std::sync::Arc;

use account_service::config::Config;
use account_service::domain::account::ports::AccountServicePort;
use account_service::domain::account::service::AccountService;
use account_service::inbound::http::router::create_router;
use account_service::outbound::notifier::mailer_from_config;
use account_service::outbound::notifier::run_verification_worker;
use account_service::outbound::notifier::ChannelNotifier;
use account_service::outbound::repositories::PostgresAccountStore;
use auth::Authenticator;
use chrono::Duration;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "account-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        public_url = %config.server.public_url,
        session_period_days = config.auth.session_period_days,
        verification_period_days = config.auth.verification_period_days,
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

    let authenticator = Arc::new(Authenticator::new(config.auth.jwt_secret.as_bytes()));
    let store = Arc::new(PostgresAccountStore::new(pg_pool));
    let (notifier, receiver) = ChannelNotifier::new();

    let account_service: Arc<dyn AccountServicePort> = Arc::new(AccountService::new(
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::new(notifier),
        Arc::clone(&authenticator),
        Duration::days(config.auth.verification_period_days),
        Duration::days(config.auth.session_period_days),
    ));

    let mailer = mailer_from_config(&config.email)?;
    tokio::spawn(run_verification_worker(
        receiver,
        Arc::clone(&account_service),
        mailer,
    ));
    tracing::info!("Verification worker started");

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(
        account_service,
        authenticator,
        config.server.public_url.clone(),
    );
    axum::serve(http_listener, http_application).await?;

    Ok(())
}
