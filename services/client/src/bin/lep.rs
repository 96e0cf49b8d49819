//! services/client/src/bin/lep.rs

use clap::Parser;
use client_lib::{
    adapters::{ExifGpsReader, FileSessionStore, HttpFileTransfer, HttpInspectionApi},
    cli::{AppContext, Cli},
    config::Config,
    error::ClientError,
    session::{SessionManager, TokenCell},
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        error!(error = %err, "command failed");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // --- 2. Initialize Service Adapters ---
    // The token cell is shared: the HTTP adapter reads it on every request,
    // the session manager is its only writer.
    let token = TokenCell::default();
    let api = Arc::new(HttpInspectionApi::new(
        config.api_base_url.clone(),
        token.clone(),
    ));
    let transfer = Arc::new(HttpFileTransfer::new());
    let storage = Arc::new(FileSessionStore::new(config.session_file.clone()));

    // --- 3. Restore the Session & Start the Refresh Loop ---
    let session = Arc::new(SessionManager::new(api.clone(), storage, token));
    match session.resume() {
        Ok(true) => info!("resumed persisted session"),
        Ok(false) => {}
        Err(err) => info!(error = %err, "could not restore persisted session"),
    }
    let refresh_guard = session.spawn_refresh_loop();

    // --- 4. Dispatch the Command ---
    let ctx = AppContext {
        api,
        transfer,
        gps: Arc::new(ExifGpsReader),
        session,
    };
    let result = client_lib::cli::run(cli, ctx).await;

    refresh_guard.cancel();
    result
}
