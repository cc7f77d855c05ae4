use process_mapper_api::config::ApiConfig;
use process_mapper_api::middleware::init_tracing;
use process_mapper_api::routes::{self, AppState};
use std::error::Error as StdError;
use std::net::SocketAddr;
use tracing::{error, info};

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => info!("SIGINT received, shutting down gracefully"),
                    _ = sigterm.recv() => info!("SIGTERM received, shutting down gracefully"),
                }
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("Shutdown signal received");
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), Box<dyn StdError + Send + Sync + 'static>> {
    init_tracing();
    info!("Application starting...");

    let config = ApiConfig::from_env()?;
    let jwt = config.jwt_service()?;
    let port = config.port;

    let mut app_state = AppState::new(config, jwt);
    app_state.init_storage().await?;

    let app = routes::create_app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Server listening on {} (port {})", addr, port);
    info!("Health check available at http://{}/health", addr);
    info!("OpenAPI document at http://{}/api/v1/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
