//! wares - catalog browser CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use wares_client::{HttpGateway, ListController};
use wares_core::{JsonFileStore, StatsCache};

#[derive(Parser)]
#[command(
    name = "wares",
    version,
    about = "Catalog browser - flat-file item API with cached stats",
    long_about = "Serves a paginated, searchable item catalog from a flat JSON file,\n\
                  with aggregate statistics cached against the file's version.\n\
                  \n\
                  Examples:\n\
                    wares serve                      # API on port 4001\n\
                    wares serve --port 8080          # Custom port\n\
                    wares stats                      # Print stats summary and exit\n\
                    wares browse lamp                # Page through matching items\n\
                  \n\
                  Environment Variables:\n\
                    WARES_DATA                       # Override dataset file path\n\
                    RUST_LOG                         # Log filter (e.g. wares_core=debug)"
)]
struct Cli {
    #[command(subcommand)]
    mode: Option<Mode>,

    /// Path to the dataset JSON file (default: data/items.json)
    #[arg(long, env = "WARES_DATA", default_value = "data/items.json")]
    data: PathBuf,
}

#[derive(Subcommand)]
enum Mode {
    /// Run the API server (default)
    Serve {
        /// Port for the API server
        #[arg(long, default_value = "4001")]
        port: u16,
    },
    /// Print stats to terminal and exit
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Page through items from a running server and print them
    Browse {
        /// Search query (case-insensitive substring on name)
        #[arg(default_value = "")]
        query: String,
        /// Base URL of the API server
        #[arg(long, default_value = "http://localhost:4001")]
        base_url: String,
        /// Page size per fetch
        #[arg(long, default_value = "10")]
        limit: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    match cli.mode.unwrap_or(Mode::Serve { port: 4001 }) {
        Mode::Serve { port } => {
            wares_server::run(cli.data, port).await?;
        }
        Mode::Stats { json } => {
            run_stats(cli.data, json).await?;
        }
        Mode::Browse {
            query,
            base_url,
            limit,
        } => {
            run_browse(query, base_url, limit).await?;
        }
    }

    Ok(())
}

async fn run_browse(query: String, base_url: String, limit: u32) -> Result<()> {
    let gateway = Arc::new(HttpGateway::new(base_url));
    let controller = ListController::new(gateway, limit);

    controller.reset_and_fetch(&query).await;

    // Drive the scroll trigger as if the reader kept scrolling to the end.
    let mut printed = 0;
    let snapshot = loop {
        let snapshot = controller.snapshot();
        if snapshot.items.len() < printed {
            // A later page failed and the list degraded to empty.
            anyhow::bail!("Fetch failed while paging");
        }

        for item in &snapshot.items[printed..] {
            println!("{:>8}  {:<30} {:>10.2}", item.id, item.name, item.price);
        }
        printed = snapshot.items.len();

        if !snapshot.has_more {
            break snapshot;
        }
        controller.maybe_fetch_next(printed.saturating_sub(1)).await;
    };

    if printed == 0 {
        println!("No items found");
    } else {
        println!("\n{} of {} items", printed, snapshot.total);
    }
    Ok(())
}

async fn run_stats(data: PathBuf, json: bool) -> Result<()> {
    let store = Arc::new(JsonFileStore::new(data));
    let cache = StatsCache::new(store);

    let snapshot = cache
        .get()
        .await
        .context("Failed to compute dataset statistics")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!("Items:         {}", snapshot.count);
        println!("Average price: {:.2}", snapshot.average_price);
    }

    Ok(())
}
