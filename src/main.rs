mod core;

use std::process::ExitCode;
use std::sync::Arc;

use object_store::gcp::GoogleCloudStorageBuilder;
use tokio_util::sync::CancellationToken;

use crate::core::config::{self, Config};
use crate::core::error::StartupError;
use crate::core::observer::{self, DirectoryWatcher};
use crate::core::uploader::Uploader;

use tracing::{info, error};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, shutting down");
                signal_token.cancel();
            }
            Err(e) => error!(%e, "Failed to listen for interrupt"),
        }
    });

    match run(shutdown).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}

async fn run(shutdown: CancellationToken) -> Result<(), StartupError> {
    let configuration: Config = config::get_config()?;
    info!(?configuration, "Configuration loaded successfully");

    let store = GoogleCloudStorageBuilder::from_env()
        .with_bucket_name(&configuration.bucket)
        .build()?;
    let uploader = Uploader::new(Arc::new(store), configuration.url.clone());

    let mut watcher = DirectoryWatcher::new().map_err(StartupError::Watcher)?;

    // Pick up files that were dropped in while we were not running
    observer::scan_directory(&configuration.watch_path, &uploader).await?;

    watcher
        .watch(&configuration.watch_path)
        .map_err(StartupError::Watch)?;
    info!(path = %configuration.watch_path.display(), "Watching");

    tokio::spawn(watcher.run(uploader, shutdown)).await?;

    Ok(())
}
