use std::sync::Arc;

use clap::Parser;
use te_search::server::{self, AppState};
use te_search::{Cli, CollectionManager};
use tracing::info;

#[tokio::main]
async fn main() {
    te_search::tracing::init();

    let cli = Cli::parse();

    let manager = Arc::new(CollectionManager::persistent(cli.data_dir.clone()));
    for name in cli.collection_names() {
        if let Err(e) = manager.ensure_exists(name).await {
            eprintln!("failed to create collection '{name}': {e}");
            std::process::exit(1);
        }
    }

    let state = AppState {
        manager,
        auth_token: Arc::new(cli.authtoken.clone()),
    };

    let listener = match tokio::net::TcpListener::bind(&cli.addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("failed to bind {}: {e}", cli.addr);
            std::process::exit(1);
        }
    };

    info!(addr = %cli.addr, "listening");

    if let Err(e) = axum::serve(listener, server::router(state)).await {
        eprintln!("server error: {e}");
        std::process::exit(1);
    }
}
