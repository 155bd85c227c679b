pub mod api;
pub mod config;
pub mod models;
pub mod registration;
pub mod report;
pub mod request;
pub mod transform;
pub mod upload;

use tracing_subscriber::EnvFilter;

/// Run the server until Ctrl-C.
pub async fn run() -> Result<(), api::ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = config::ServerConfig::from_env();
    let mut server = api::start_server(config).await?;
    tracing::info!("Open http://{} in a browser", server.addr);

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {e}");
    }

    server.shutdown();
    server.wait().await
}
