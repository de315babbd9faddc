//! aivis-engine - AI Visibility Engine
//!
//! Tracks how often a brand is mentioned or cited by generative-AI answer
//! engines, and turns the stored observations into composite visibility
//! scores, week-over-week trends, content gaps, and recommendations.

use aivis_engine::config::EngineConfig;
use aivis_engine::AppState;
use anyhow::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting aivis-engine (AI Visibility Engine)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Resolve configuration: env over TOML over defaults
    let toml_config = aivis_common::config::load_toml_config()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    let config = EngineConfig::resolve(toml_config.as_ref());

    // Resolve and create the data folder
    let data_folder = aivis_common::config::resolve_data_folder(toml_config.as_ref());
    aivis_common::config::ensure_data_folder(&data_folder)
        .map_err(|e| anyhow::anyhow!("Failed to initialize data folder: {}", e))?;

    // Open or create the database
    let db_path = aivis_common::config::database_path(&data_folder);
    info!("Database: {}", db_path.display());
    let db_pool = aivis_engine::db::init_database_pool(&db_path).await?;
    info!("Database connection established");

    // Assemble capabilities from configured credentials
    let state = AppState::from_config(db_pool, &config);
    let registered = state.engines.registered();
    if registered.is_empty() {
        tracing::warn!("No provider credentials configured; check batches will store no rows");
    } else {
        info!(
            "Registered providers: {}",
            registered
                .iter()
                .map(|p| p.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    // Build router and serve
    let app = aivis_engine::build_router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Listening on http://{}", config.bind_address);
    info!("Health check: http://{}/health", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
