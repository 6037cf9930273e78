use std::sync::Arc;

use silkback::backup::BackupManager;
use silkback::{config, server};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = config::resolve()?;
    let manager = BackupManager::new(&config);

    // Manual folder manipulation (cloud sync included) is expected; align
    // meta.json with the folders on disk before serving requests.
    if manager.reconcile()? {
        tracing::info!("Backup metadata reconciled with the folders on disk");
    }

    tracing::info!("Source folder: {}", config.source_folder.display());
    tracing::info!("Backup folder: {}", config.backup_folder.display());

    let addr = format!("127.0.0.1:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server running at http://{}", addr);

    let state = Arc::new(server::ServerState { config, manager });

    tokio::select! {
        result = server::run(listener, state) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down");
            Ok(())
        }
    }
}
