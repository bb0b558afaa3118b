//! furniture-server binary
//!
//! Loads `.env`, opens the database, starts the notification worker and the
//! reset-token sweeper, then serves the HTTP API.

use std::sync::Arc;
use std::time::Duration;

use furniture_server::db::reset_tokens;
use furniture_server::notify::{
    LogMailer, Mailer, NotificationWorker, Notifier, OUTBOX_CAPACITY, SmtpMailer,
};
use furniture_server::{AppState, Config, DbService, create_router, init_logger};
use shared::util::now_millis;

/// How often expired reset tokens are purged
const RESET_TOKEN_SWEEP: Duration = Duration::from_secs(3600);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;
    init_logger(&config.log_level, config.log_json, config.log_dir.as_deref())?;

    tracing::info!(
        environment = %config.environment,
        port = config.http_port,
        "Starting furniture-server"
    );

    let db = DbService::new(&config.database_url).await?;
    tokio::fs::create_dir_all(config.product_upload_dir()).await?;

    let mailer: Arc<dyn Mailer> = match &config.smtp {
        Some(smtp) => Arc::new(SmtpMailer::new(smtp, &config.mail_from)?),
        None => {
            tracing::warn!("SMTP_HOST not set, outgoing mail will only be logged (development)");
            Arc::new(LogMailer)
        }
    };

    let (notifier, outbox) = Notifier::channel(OUTBOX_CAPACITY);
    tokio::spawn(NotificationWorker::new(mailer).run(outbox));

    let http_port = config.http_port;
    let state = AppState::new(config, db, notifier);

    // Periodic reset-token cleanup
    let pool = state.pool.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(RESET_TOKEN_SWEEP);
        loop {
            interval.tick().await;
            match reset_tokens::delete_expired(&pool, now_millis()).await {
                Ok(0) => {}
                Ok(n) => tracing::info!(purged = n, "Expired reset tokens removed"),
                Err(e) => tracing::warn!(error = %e, "Reset token cleanup failed"),
            }
        }
    });

    let app = create_router(state);

    let addr = format!("0.0.0.0:{http_port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("furniture-server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("furniture-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
