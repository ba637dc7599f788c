use anyhow::{Context, Result};
use site_catalog::routes::build_router;
use site_catalog::store::PgContentStore;
use site_catalog::{Config, SiteService};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("site_catalog=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    info!("Starting site catalog API");

    // Load configuration from environment
    let config = Config::from_env()?;
    info!("Database: {}", config.redacted_database_url());
    info!("Site URL: {}", config.site_url);
    info!("Default locale: {}", config.default_locale);

    // Connect and make sure the schema exists
    let store = PgContentStore::connect(&config).await?;
    store.init_schema().await?;

    let address = config.bind_address();
    let service = SiteService::new(Arc::new(store), config);
    let app = build_router(service);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("✓ Listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
