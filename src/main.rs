use learnhub::{
    build_router,
    config::AppConfig,
    services::{
        spawn_notification_sweeper, AuthService, CloudinaryUploader, EmailService, JwtService,
        MongoDb, RedisService, SessionService,
    },
    AppState,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), learnhub::error::ApiError> {
    dotenvy::dotenv().ok();

    // Fail fast on invalid configuration.
    let config = AppConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    tracing::info!(
        service = %config.service_name,
        environment = ?config.environment,
        "Starting service"
    );

    let db = MongoDb::connect(&config.mongodb.uri, &config.mongodb.database).await?;
    db.initialize_indexes().await?;
    tracing::info!("Database initialized");

    let redis = Arc::new(
        RedisService::new(&config.redis)
            .await
            .map_err(learnhub::error::ApiError::Internal)?,
    );

    let email = Arc::new(EmailService::new(&config.smtp)?);
    let uploads = Arc::new(CloudinaryUploader::new(&config.cloudinary));

    let jwt = JwtService::new(&config.jwt);
    let sessions = SessionService::new(jwt, redis.clone());
    let auth = AuthService::new(db.clone(), email.clone(), sessions.clone());

    spawn_notification_sweeper(db.clone());

    let state = AppState {
        config: config.clone(),
        db,
        sessions,
        auth,
        email,
        uploads,
        cache: redis,
    };

    let app = build_router(state)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Service shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_err() {
            tracing::error!("Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to install signal handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
