use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use kv_store::{Store, StoreService};
use tracing::info;

/// Runs the versioned KV store over a local Unix socket.
#[derive(Parser, Debug)]
#[command(name = "kvserverd")]
struct Args {
    /// RPC socket path. Defaults to a per-user path under /var/tmp.
    #[arg(long)]
    socket: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> fabric_base::Result<()> {
    fabric_base::init_logging();
    let args = Args::parse();

    let socket_path = args
        .socket
        .unwrap_or_else(|| fabric_rpc::default_socket_path("fabric-kv"));

    let store = Arc::new(Store::new());
    let service = Arc::new(StoreService(store));

    info!(path = %socket_path.display(), "kv store listening");
    fabric_rpc::serve(&socket_path, service).await?;
    Ok(())
}
