use anyhow::Context;
use tracing_subscriber::EnvFilter;

use kingdoms_api::{blacklist, config, database, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("kingdoms_api=info,tower_http=info")),
        )
        .init();

    let config = config::config().clone();
    config.validate().context("invalid configuration")?;
    tracing::info!("Starting Kingdoms API in {:?} mode", config.environment);

    let pool = database::connect_lazy(&config.database).context("failed to configure database pool")?;
    if config.database.run_migrations {
        // A down database must not keep the server from starting.
        if let Err(e) = database::run_migrations(&pool).await {
            tracing::error!("Migrations not applied: {}", e);
        }
    }

    let blacklist = blacklist::from_config(&config).context("failed to configure token blacklist")?;

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let app = kingdoms_api::app(AppState::new(pool, blacklist, config));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Kingdoms API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server is down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
