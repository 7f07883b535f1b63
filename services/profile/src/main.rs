use std::sync::Arc;

use anyhow::{Context, Result};
use common::database::{DatabaseConfig, health_check, init_pool};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use profile::{
    middleware::{AuthConfig, Authenticator},
    repositories::PgProfileRepository,
    routes,
    settings::ProfileConfig,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting profile service");

    let config = ProfileConfig::from_env().context("Failed to load profile configuration")?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    let auth_config = AuthConfig::from_env().map_err(anyhow::Error::msg)?;
    let authenticator = Authenticator::from_config(&auth_config)?;

    let repository = Arc::new(PgProfileRepository::new(pool));
    let app_state = AppState::new(repository, &config, authenticator)?;

    info!(
        "Profile uploads go to {} (served as {})",
        config.upload_dir.display(),
        config.public_prefix
    );

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&config.bind_address).await?;
    info!("Profile service listening on {}", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
