use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mobilepack_db::DbConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mobilepack_migrate=debug,mobilepack_db=debug".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json");
    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // --- Configuration ---
    let config = DbConfig::from_env().context("Invalid database configuration")?;
    tracing::info!(
        max_connections = config.max_connections,
        acquire_timeout_secs = config.acquire_timeout_secs,
        "Loaded database configuration"
    );

    // --- Database ---
    let pool = mobilepack_db::create_pool(&config)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection pool created");

    mobilepack_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    tracing::info!("Database health check passed");

    mobilepack_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!(
        available = mobilepack_db::MIGRATOR.iter().count(),
        "Database migrations applied"
    );

    pool.close().await;
    Ok(())
}
