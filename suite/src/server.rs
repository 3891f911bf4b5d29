//! HTTP server lifecycle.

use crate::routes::router;
use crate::state::AppState;
use libsuite::config::Config;
use std::io;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Binds the configured address and serves until Ctrl-C.
pub async fn run(config: &Config) -> io::Result<()> {
    let addr = format!("{}:{}", config.server.bind, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    if !std::path::Path::new(&config.server.static_dir).is_dir() {
        warn!(
            static_dir = %config.server.static_dir,
            "static directory not found, dashboard assets will 404"
        );
    }

    println!("k3s-suite listening at http://{}", local_addr);
    info!(
        addr = %local_addr,
        batch_size = config.pipeline.batch_size,
        timeout = config.network.timeout,
        "server started"
    );

    let app = router(AppState::new(config));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
