use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ventanilla_api::app::build_app;
use ventanilla_api::config::ServerConfig;
use ventanilla_api::pqrsd::CaseService;
use ventanilla_api::state::AppState;
use ventanilla_core::tracking::TrackingNumberGenerator;
use ventanilla_db::{PgAccountStore, PgCaseStore};
use ventanilla_events::{EmailCaseNotifier, EmailConfig, EmailDelivery, NotificationDispatcher};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ventanilla_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let generator = TrackingNumberGenerator::new(config.tracking_prefix.clone())
        .expect("PQRSD_TRACKING_PREFIX is invalid");
    tracing::info!(
        prefix = generator.prefix(),
        max_attempts = config.tracking_max_attempts,
        "Tracking numbers configured"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = ventanilla_db::create_pool(&database_url, config.database_max_connections)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    ventanilla_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    ventanilla_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Notifications ---
    let mailer = match EmailConfig::from_env() {
        Some(email_config) => match EmailDelivery::new(&email_config) {
            Ok(mailer) => {
                tracing::info!(smtp_host = %email_config.smtp_host, "Email delivery configured");
                Some(mailer)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Email delivery misconfigured, notifications disabled");
                None
            }
        },
        None => {
            tracing::info!("SMTP_HOST not set, notifications disabled");
            None
        }
    };
    let notifier = EmailCaseNotifier::new(mailer, config.staff_inbox.clone());
    let dispatcher = NotificationDispatcher::new(Arc::new(notifier));

    // --- App state ---
    let cases = CaseService::new(
        Arc::new(PgCaseStore::new(pool.clone())),
        generator,
        config.tracking_max_attempts,
        dispatcher,
    );
    let state = AppState {
        config: Arc::new(config.clone()),
        cases: Arc::new(cases),
        accounts: Arc::new(PgAccountStore::new(pool.clone())),
    };

    let app = build_app(state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    // Peer addresses feed the ClientIp extractor.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server error");

    pool.close().await;
    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
