//! VNShop storefront server

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vnshop::api::{router, AppState};
use vnshop::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let state = AppState::from_config(&config).await?;
    tracing::info!(data_source = state.catalog.name(), events = state.events.is_enabled(), "storefront state ready");

    let app = router(state);
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("VNShop storefront listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(&addr).await?, app).await?;
    Ok(())
}
