use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use mr_coordinator::{Coordinator, CoordinatorService};
use tracing::info;

/// Runs a MapReduce coordinator over a local Unix socket until the job
/// reaches the Done phase.
#[derive(Parser, Debug)]
#[command(name = "coordinatord")]
struct Args {
    /// Input files, one map task per file.
    #[arg(required = true)]
    files: Vec<String>,

    /// Number of reduce partitions.
    #[arg(short = 'r', long, default_value_t = 10)]
    n_reduce: u32,

    /// Task lease timeout in seconds before a task is reclaimed.
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// RPC socket path. Defaults to a per-user path under /var/tmp.
    #[arg(long)]
    socket: Option<PathBuf>,

    /// Directory intermediate and final files are read/written in.
    #[arg(long, default_value = ".")]
    work_dir: PathBuf,
}

#[tokio::main]
async fn main() -> fabric_base::Result<()> {
    fabric_base::init_logging();
    let args = Args::parse();

    let socket_path = args
        .socket
        .unwrap_or_else(|| fabric_rpc::default_socket_path("fabric-coord"));

    let coordinator = Coordinator::new(
        args.files,
        args.n_reduce,
        Duration::from_secs(args.timeout_secs),
        args.work_dir,
    );
    coordinator.spawn_reclaimer();

    let service = std::sync::Arc::new(CoordinatorService(coordinator.clone()));
    let socket_path_for_server = socket_path.clone();
    let server = tokio::spawn(async move {
        fabric_rpc::serve(&socket_path_for_server, service).await
    });

    info!(path = %socket_path.display(), "coordinator listening");
    loop {
        if coordinator.done() {
            info!("job done, shutting down");
            break;
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    server.abort();
    let _ = std::fs::remove_file(&socket_path);
    Ok(())
}
