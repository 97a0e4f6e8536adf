use clap::Parser;
use shortie_gateway::auth::AuthKeys;
use shortie_gateway::cli::CLI;
use shortie_gateway::{logging, App, AppState};
use shortie_shortener::ShortenerService;
use shortie_storage::open_repository;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CLI::try_parse()?;
    logging::init(config.log_format);

    let storage = config.storage_config()?;
    info!(
        listen_addr = %config.listen_addr,
        base_url = %config.base_url,
        storage_backend = %storage,
        generator = %config.generator,
        "starting shortie gateway"
    );

    let repository = open_repository(&storage).await?;
    let shortener = ShortenerService::new(repository, config.generator(), config.base_url);

    let cookie_secret = config.cookie_secret.unwrap_or_else(|| {
        warn!("cookie secret not configured, owner cookies will not survive a restart");
        Uuid::new_v4().simple().to_string()
    });
    let state = AppState::new(Arc::new(shortener), AuthKeys::new(cookie_secret.as_bytes()));

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(listen_addr = %listener.local_addr()?, "gateway listening");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(%err, "failed to listen for shutdown signal");
    }
}
