//! wares-server - HTTP API for wares using Axum

pub mod router;

pub use router::{create_router, AppState};

use anyhow::Result;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use wares_core::JsonFileStore;

/// Run the API server against the dataset at `data_path`.
pub async fn run(data_path: PathBuf, port: u16) -> Result<()> {
    let store = Arc::new(JsonFileStore::new(data_path));
    let state = Arc::new(AppState::new(store));
    let router = create_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr).await?;

    info!("API server listening on http://{}", addr);
    println!("API server listening on http://{}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
