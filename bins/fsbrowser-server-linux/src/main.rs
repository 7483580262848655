mod probe;

use fsbrowser_core::{fs::log_inventory, BrowserConfig, FileService, HostFs};
use fsbrowser_web::{app_state, create_router};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::probe::HostProbe;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,fsbrowser_core=debug,fsbrowser_web=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Configuration: FSBROWSER_CONFIG file, then FSBROWSER_ROOT / FSBROWSER_PORT
    let config = BrowserConfig::from_env()?;
    tracing::info!("{} starting...", config.name);

    std::fs::create_dir_all(&config.root)?;
    let fs = HostFs::new(&config.root).with_parent_dirs(config.create_parent_dirs);
    let count = log_inventory(&fs)?;
    tracing::info!("Serving {} ({} root entries)", config.root.display(), count);

    let service = FileService::from_config(fs, &config)?.with_probe(HostProbe);
    let app = create_router(app_state(service)).layer(TraceLayer::new_for_http());

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("HTTP server listening on {}", addr);
    tracing::info!("   Editor: http://localhost:{}/edit", config.http_port);
    tracing::info!("   Files:  http://localhost:{}/list?dir=/", config.http_port);

    let server = tokio::spawn(async move { axum::serve(listener, app).await });

    // Wait for shutdown signal
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        result = server => {
            match result {
                Ok(Ok(())) => tracing::warn!("HTTP server stopped"),
                Ok(Err(e)) => tracing::error!("HTTP server error: {}", e),
                Err(e) => tracing::error!("HTTP server task failed: {}", e),
            }
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
