use std::path::PathBuf;

use clap::Parser;

/// Runs a MapReduce worker against a coordinator, using the built-in word
/// count map/reduce pair. Exits once the coordinator reports `Done`.
#[derive(Parser, Debug)]
#[command(name = "mr-worker")]
struct Args {
    /// RPC socket path. Defaults to the same per-user path `coordinatord` uses.
    #[arg(long)]
    socket: Option<PathBuf>,

    /// Directory input files are read from and intermediate/final files are written to.
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

    mr_worker::run(&socket_path, &args.work_dir, mr_worker::wordcount::map, mr_worker::wordcount::reduce).await
}
