use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use mr_coordinator::{Coordinator, CoordinatorService};
use tracing::info;

/// Runs a self-contained word count job: writes a couple of sample input
/// files into a scratch directory, starts an in-process coordinator and a
/// handful of in-process workers, and prints the sorted word counts once
/// the job reaches Done.
#[derive(Parser, Debug)]
#[command(name = "wordcount-demo")]
struct Args {
    #[arg(short = 'r', long, default_value_t = 2)]
    n_reduce: u32,

    #[arg(short = 'w', long, default_value_t = 3)]
    n_workers: u32,
}

#[tokio::main]
async fn main() -> fabric_base::Result<()> {
    fabric_base::init_logging();
    let args = Args::parse();

    let dir = tempfile::tempdir().map_err(|e| fabric_base::err(format!("tempdir: {e}")))?;
    let work_dir = dir.path().to_path_buf();
    let inputs = [
        ("a.txt", "the the fox"),
        ("b.txt", "the fox jumps"),
    ];
    let mut files = Vec::new();
    for (name, contents) in inputs {
        std::fs::write(work_dir.join(name), contents)
            .map_err(|e| fabric_base::err(format!("writing {name}: {e}")))?;
        files.push(name.to_string());
    }

    let socket_path = work_dir.join("coord.sock");
    let coordinator = Coordinator::new(files, args.n_reduce, Duration::from_secs(10), work_dir.clone());
    coordinator.spawn_reclaimer();

    let service = Arc::new(CoordinatorService(coordinator.clone()));
    let serve_socket = socket_path.clone();
    let server = tokio::spawn(async move { fabric_rpc::serve(&serve_socket, service).await });

    let mut workers = Vec::new();
    for id in 0..args.n_workers {
        let socket_path = socket_path.clone();
        let work_dir = work_dir.clone();
        workers.push(tokio::spawn(async move {
            info!(worker_id = id, "starting worker");
            mr_worker::run(&socket_path, &work_dir, mr_worker::wordcount::map, mr_worker::wordcount::reduce).await
        }));
    }

    while !coordinator.done() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    for w in workers {
        let _ = w.await;
    }
    server.abort();

    for reduce_id in 0..args.n_reduce {
        let path = work_dir.join(mr_proto::final_file_name(reduce_id));
        if let Ok(contents) = std::fs::read_to_string(&path) {
            print!("{contents}");
        }
    }
    Ok(())
}
