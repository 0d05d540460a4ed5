use std::sync::Arc;

use clap::Parser;
use kv_client::{Clerk, Lock};
use kv_store::{Store, StoreService};
use tracing::info;

/// Races two Lock clients against a single in-process KV store and prints
/// the order in which they acquire and release a shared lock.
#[derive(Parser, Debug)]
#[command(name = "lock-demo")]
struct Args {
    #[arg(long, default_value = "demo-lock")]
    key: String,
}

#[tokio::main]
async fn main() -> fabric_base::Result<()> {
    fabric_base::init_logging();
    let args = Args::parse();

    let dir = tempfile::tempdir().map_err(|e| fabric_base::err(format!("tempdir: {e}")))?;
    let socket_path = dir.path().join("kv.sock");

    let store = Arc::new(Store::new());
    let service = Arc::new(StoreService(store));
    let serve_socket = socket_path.clone();
    let server = tokio::spawn(async move { fabric_rpc::serve(&serve_socket, service).await });
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    let mut contenders = Vec::new();
    for id in 0..2 {
        let socket_path = socket_path.clone();
        let key = args.key.clone();
        contenders.push(tokio::spawn(async move {
            let clerk = Arc::new(Clerk::new(socket_path));
            let mut lock = Lock::new(clerk, key);
            lock.acquire().await;
            info!(contender = id, holder = lock.holder_id(), "acquired lock");
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            lock.release().await;
            info!(contender = id, holder = lock.holder_id(), "released lock");
        }));
    }

    for c in contenders {
        let _ = c.await;
    }
    server.abort();
    Ok(())
}
