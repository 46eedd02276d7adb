//! Folio development server
//!
//! Serves in-memory remote collections over the admin API's REST contract,
//! for running the dashboard or the reconciler without a real backend.
//!
//! Usage:
//!   folio-server --port 3000 --seed fixtures.json
//!
//! Nothing is persisted; every restart begins from the seed.

use std::{
    net::{IpAddr, SocketAddr},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::Parser;
use folio_server::{build_router, AppState, API_PREFIX};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "folio-server")]
#[command(about = "In-memory development server for Folio collections")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Address to bind
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: IpAddr,

    /// JSON file mapping collection names to arrays of records
    #[arg(short, long)]
    seed: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    let state = match &args.seed {
        Some(path) => {
            info!("Loading seed from {:?}", path);
            AppState::from_seed_file(path)?
        }
        None => AppState::with_presets(),
    };
    for name in state.names() {
        info!("Serving {name} at {API_PREFIX}/{name}");
    }

    let addr = SocketAddr::new(args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Folio server listening on http://{}", addr);

    axum::serve(listener, build_router(Arc::new(state)))
        .await
        .context("HTTP server failed")?;
    Ok(())
}
