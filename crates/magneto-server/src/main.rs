//! magneto-server: Magneto jobs backend
//!
//! Configuration comes from the environment (`PORT`, `HOST`, `WORKERS`, ...),
//! log filtering from `RUST_LOG` (default `info`).

use magneto_core::{App, NoDatabase, ProcessEnv, Server, Settings};
use mimalloc::MiMalloc;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> magneto_core::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::load()?;
    tracing::info!(
        host = %settings.host,
        port = settings.port,
        workers = settings.workers,
        "starting Magneto jobs backend"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(settings.workers.max(1))
        .enable_all()
        .build()?;

    runtime.block_on(run(settings))
}

async fn run(settings: Settings) -> magneto_core::Result<()> {
    let app = Arc::new(App::from_settings(
        &settings,
        Arc::new(NoDatabase),
        Arc::new(ProcessEnv),
    ));

    let server = Server::bind(settings.server_config())?;
    server.serve(app, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl+c");
        std::future::pending::<()>().await;
    }
}
