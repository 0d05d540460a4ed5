mod io;
pub mod wordcount;

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use mr_proto::{CompletedJobArgs, GiveJobArgs, GiveJobReply, JobKind, JobStatus, KeyValue, TaskKind};
use tracing::{info, warn};

/// `(filename, contents) -> emitted records`.
pub type MapFn = fn(&str, &str) -> Vec<KeyValue>;
/// `(key, all values for that key) -> reduced output`.
pub type ReduceFn = fn(&str, &[String]) -> String;

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Runs the worker loop against the coordinator at `socket_path` until a
/// `Done` job is handed out, per-task dispatching to `map_fn` or `reduce_fn`.
/// Any RPC failure ends the loop; the coordinator's timeout reclaims
/// whatever task was in flight.
pub async fn run(
    socket_path: &Path,
    work_dir: &Path,
    map_fn: MapFn,
    reduce_fn: ReduceFn,
) -> fabric_base::Result<()> {
    loop {
        let reply: GiveJobReply =
            fabric_rpc::call(socket_path, "Coordinator.GiveJob", &GiveJobArgs).await?;

        if reply.job.status == JobStatus::Waiting {
            tokio::time::sleep(WAIT_POLL_INTERVAL).await;
            continue;
        }

        match reply.job.kind {
            JobKind::Done => {
                info!("no more jobs, exiting");
                return Ok(());
            }
            JobKind::Map => {
                let map_id = reply.job.map_id.expect("map job missing map_id");
                let filename = reply.job.filename.clone().expect("map job missing filename");
                run_map_task(work_dir, map_id, &filename, reply.n_reduce, map_fn)?;
                fabric_rpc::call::<_, mr_proto::CompletedJobReply>(
                    socket_path,
                    "Coordinator.CompletedJob",
                    &CompletedJobArgs {
                        kind: TaskKind::Map,
                        job_id: map_id,
                        phase_generation: reply.phase_generation,
                    },
                )
                .await?;
            }
            JobKind::Reduce => {
                let reduce_id = reply.job.reduce_id.expect("reduce job missing reduce_id");
                run_reduce_task(work_dir, reduce_id, reduce_fn)?;
                fabric_rpc::call::<_, mr_proto::CompletedJobReply>(
                    socket_path,
                    "Coordinator.CompletedJob",
                    &CompletedJobArgs {
                        kind: TaskKind::Reduce,
                        job_id: reduce_id,
                        phase_generation: reply.phase_generation,
                    },
                )
                .await?;
            }
        }
    }
}

fn run_map_task(
    work_dir: &Path,
    map_id: u32,
    filename: &str,
    n_reduce: u32,
    map_fn: MapFn,
) -> fabric_base::Result<()> {
    let contents = std::fs::read_to_string(work_dir.join(filename))
        .map_err(|e| fabric_base::err(format!("reading map input {filename}: {e}")))?;
    let emitted = map_fn(filename, &contents);

    let mut buckets: Vec<Vec<KeyValue>> = vec![Vec::new(); n_reduce as usize];
    for kv in emitted {
        let bucket = mr_proto::ihash(&kv.key, n_reduce) as usize;
        buckets[bucket].push(kv);
    }

    for (reduce_id, bucket) in buckets.into_iter().enumerate() {
        let path = work_dir.join(mr_proto::intermediate_file_name(map_id, reduce_id as u32));
        io::write_kv_lines(&path, &bucket)
            .map_err(|e| fabric_base::err(format!("writing {}: {e}", path.display())))?;
    }
    info!(map_id, filename, "map task complete");
    Ok(())
}

fn run_reduce_task(work_dir: &Path, reduce_id: u32, reduce_fn: ReduceFn) -> fabric_base::Result<()> {
    let suffix = format!("-{reduce_id}");
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();

    let entries = std::fs::read_dir(work_dir)
        .map_err(|e| fabric_base::err(format!("reading work dir: {e}")))?;
    for entry in entries {
        let entry = entry.map_err(|e| fabric_base::err(format!("reading dir entry: {e}")))?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.starts_with("mr-inter-") || !name.ends_with(&suffix) {
            continue;
        }
        let records = io::read_kv_lines(&entry.path())
            .map_err(|e| fabric_base::err(format!("reading {name}: {e}")))?;
        for kv in records {
            grouped.entry(kv.key).or_default().push(kv.value);
        }
    }

    let out_path = work_dir.join(mr_proto::final_file_name(reduce_id));
    let mut out = std::io::BufWriter::new(
        std::fs::File::create(&out_path)
            .map_err(|e| fabric_base::err(format!("creating {}: {e}", out_path.display())))?,
    );
    use std::io::Write;
    for (key, values) in &grouped {
        let output = reduce_fn(key, values);
        writeln!(out, "{key} {output}")
            .map_err(|e| fabric_base::err(format!("writing {}: {e}", out_path.display())))?;
    }
    out.flush()
        .map_err(|e| fabric_base::err(format!("flushing {}: {e}", out_path.display())))?;

    if grouped.is_empty() {
        warn!(reduce_id, "reduce task had no intermediate records");
    }
    info!(reduce_id, "reduce task complete");
    Ok(())
}
