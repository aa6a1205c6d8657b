// Stamp Rally API server
// Decision: In-memory storage when DATABASE_URL is unset, PostgreSQL otherwise
// Decision: Migrations run on every start; demo data only when requested or in dev mode

use anyhow::{Context, Result};
use stamprally_control_plane::seed::seed_demo_data;
use stamprally_control_plane::storage::StorageBackend;
use stamprally_control_plane::{build_app, AppConfig};
use stamprally_core::telemetry::{init_telemetry, TelemetryConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; real deployments set the environment directly
    let _ = dotenvy::dotenv();

    // Configure via environment variables:
    // - RUST_LOG / LOG_LEVEL: Log filter (default: "stamprally_control_plane=debug,tower_http=debug")
    // - LOG_FORMAT: "json" for JSON lines
    let mut telemetry_config = TelemetryConfig::from_env();
    if telemetry_config.service_name == "stamprally" {
        telemetry_config.service_name = "stamprally-control-plane".to_string();
    }
    if telemetry_config.log_filter.is_none() {
        telemetry_config.log_filter =
            Some("stamprally_control_plane=debug,tower_http=debug".to_string());
    }
    telemetry_config.service_version = Some(env!("CARGO_PKG_VERSION").to_string());
    init_telemetry(telemetry_config);

    tracing::info!("stamprally-control-plane starting...");

    let config = AppConfig::from_env();

    let db = match &config.database_url {
        Some(url) => {
            let db = StorageBackend::postgres(url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Connected to database");
            db
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage (data is lost on exit)");
            StorageBackend::in_memory()
        }
    };

    db.migrate().await.context("Failed to run migrations")?;

    if config.seed_demo_data {
        seed_demo_data(&db)
            .await
            .context("Failed to seed demo data")?;
    }

    let app = build_app(db, &config);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("HTTP server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
