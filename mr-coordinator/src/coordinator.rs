use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use mr_proto::{
    CompletedJobArgs, GiveJobReply, JobInfo, JobKind, JobStatus, TaskKind,
};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::pool::{Pool, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Mapping,
    Reducing,
    Done,
}

struct Inner {
    phase: Phase,
    pool: Pool,
    /// Bumped every phase transition; see `mr_proto::GiveJobReply::phase_generation`.
    generation: u64,
}

/// Job pool, phase machine, and timeout reclamation for one MapReduce run.
/// Everything but the background reclaimer's ticker lives under `inner`'s
/// lock; the reclaimer itself never holds the lock across its sleep.
pub struct Coordinator {
    inner: Mutex<Inner>,
    n_reduce: u32,
    timeout: Duration,
    work_dir: PathBuf,
    n_map_inputs: u32,
    reclaimer: Mutex<Option<JoinHandle<()>>>,
    done_handled: AtomicBool,
}

impl Coordinator {
    pub fn new(files: Vec<String>, n_reduce: u32, timeout: Duration, work_dir: PathBuf) -> Arc<Self> {
        assert!(n_reduce > 0, "n_reduce must be positive");
        let n_map_inputs = files.len() as u32;
        let inner = Inner {
            phase: Phase::Mapping,
            pool: Pool::for_map_inputs(&files),
            generation: 0,
        };
        Arc::new(Coordinator {
            inner: Mutex::new(inner),
            n_reduce,
            timeout,
            work_dir,
            n_map_inputs,
            reclaimer: Mutex::new(None),
            done_handled: AtomicBool::new(false),
        })
    }

    /// Spawns the background timeout-reclamation loop. Must be called from
    /// within a tokio runtime. Idempotent calls would leak a task, so this
    /// is meant to be called exactly once per coordinator.
    pub fn spawn_reclaimer(self: &Arc<Self>) {
        let me = Arc::clone(self);
        let period = self.timeout / 2;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                me.reclaim_expired();
            }
        });
        *self.reclaimer.lock().unwrap() = Some(handle);
    }

    #[instrument(skip(self))]
    fn reclaim_expired(&self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.phase == Phase::Done {
            return;
        }
        let now = Instant::now();
        for task in inner.pool.tasks.iter_mut() {
            if task.status == TaskStatus::InProgress {
                if let Some(start) = task.lease_start {
                    if now.duration_since(start) > self.timeout {
                        warn!(task_id = task.id, "lease expired, reclaiming task");
                        task.status = TaskStatus::Idle;
                        task.lease_start = None;
                    }
                }
            }
        }
    }

    #[instrument(skip(self))]
    pub fn give_job(&self) -> GiveJobReply {
        let mut inner = self.inner.lock().unwrap();
        if inner.phase == Phase::Done {
            return GiveJobReply {
                n_reduce: self.n_reduce,
                job: JobInfo {
                    kind: JobKind::Done,
                    map_id: None,
                    reduce_id: None,
                    filename: None,
                    status: JobStatus::Active,
                },
                phase_generation: inner.generation,
            };
        }

        let kind = inner.pool.kind;
        let generation = inner.generation;
        match inner.pool.first_idle_mut() {
            Some(task) => {
                task.status = TaskStatus::InProgress;
                task.lease_start = Some(Instant::now());
                let id = task.id;
                let filename = task.input.clone();
                debug!(task_id = id, ?kind, "dispatched task");
                GiveJobReply {
                    n_reduce: self.n_reduce,
                    job: job_info_for(kind, id, filename, JobStatus::Active),
                    phase_generation: generation,
                }
            }
            None => GiveJobReply {
                n_reduce: self.n_reduce,
                job: job_info_for(kind, 0, None, JobStatus::Waiting),
                phase_generation: generation,
            },
        }
    }

    #[instrument(skip(self, args))]
    pub fn completed_job(&self, args: CompletedJobArgs) {
        let mut inner = self.inner.lock().unwrap();
        if args.phase_generation != inner.generation {
            debug!(
                reported = args.phase_generation,
                current = inner.generation,
                "ignoring completion from a stale phase generation"
            );
            return;
        }
        if inner.phase == Phase::Done {
            return;
        }
        if inner.pool.kind != args.kind {
            return;
        }

        let Some(task) = inner.pool.task_mut(args.job_id) else {
            return;
        };
        if task.status == TaskStatus::Done {
            debug!(task_id = args.job_id, "duplicate completion, ignoring");
            return;
        }
        task.status = TaskStatus::Done;
        task.lease_start = None;

        if !inner.pool.all_done() {
            return;
        }

        match inner.phase {
            Phase::Mapping => {
                info!("map phase complete, advancing to reduce");
                inner.pool = Pool::for_reduce_partitions(self.n_reduce);
                inner.phase = Phase::Reducing;
                inner.generation += 1;
            }
            Phase::Reducing => {
                info!("reduce phase complete, job done");
                inner.phase = Phase::Done;
                inner.generation += 1;
            }
            Phase::Done => unreachable!("all_done checked above while not Done"),
        }
    }

    /// True once the phase machine has reached `Done`. The first caller to
    /// observe this cancels the reclamation task and sweeps intermediate
    /// files; later callers just read the flag.
    pub fn done(&self) -> bool {
        let is_done = {
            let inner = self.inner.lock().unwrap();
            inner.phase == Phase::Done
        };
        if is_done && self.done_handled.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_ok() {
            if let Some(handle) = self.reclaimer.lock().unwrap().take() {
                handle.abort();
            }
            self.cleanup_intermediate_files();
        }
        is_done
    }

    fn cleanup_intermediate_files(&self) {
        for map_id in 0..self.n_map_inputs {
            for reduce_id in 0..self.n_reduce {
                let path = self.work_dir.join(mr_proto::intermediate_file_name(map_id, reduce_id));
                if let Err(e) = std::fs::remove_file(&path) {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        warn!(path = %path.display(), error = %e, "failed to remove intermediate file");
                    }
                }
            }
        }
    }
}

fn job_info_for(kind: TaskKind, id: u32, filename: Option<String>, status: JobStatus) -> JobInfo {
    match kind {
        TaskKind::Map => JobInfo {
            kind: JobKind::Map,
            map_id: Some(id),
            reduce_id: None,
            filename,
            status,
        },
        TaskKind::Reduce => JobInfo {
            kind: JobKind::Reduce,
            map_id: None,
            reduce_id: Some(id),
            filename,
            status,
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use mr_proto::{CompletedJobArgs, JobKind, TaskKind};
    use test_log::test;

    fn coordinator(files: &[&str], n_reduce: u32) -> Arc<Coordinator> {
        Coordinator::new(
            files.iter().map(|s| s.to_string()).collect(),
            n_reduce,
            Duration::from_secs(10),
            std::env::temp_dir(),
        )
    }

    #[test]
    fn dispatches_each_map_task_once_then_waits() {
        let c = coordinator(&["a.txt", "b.txt"], 2);
        let r1 = c.give_job();
        let r2 = c.give_job();
        assert_eq!(r1.job.kind, JobKind::Map);
        assert_eq!(r2.job.kind, JobKind::Map);
        assert_ne!(r1.job.map_id, r2.job.map_id);

        let r3 = c.give_job();
        assert_eq!(r3.job.status, JobStatus::Waiting);
        assert!(!c.done());
    }

    #[test]
    fn advances_through_phases_to_done() {
        let c = coordinator(&["a.txt"], 1);
        let give = c.give_job();
        assert_eq!(give.job.kind, JobKind::Map);
        c.completed_job(CompletedJobArgs {
            kind: TaskKind::Map,
            job_id: give.job.map_id.unwrap(),
            phase_generation: give.phase_generation,
        });

        let give = c.give_job();
        assert_eq!(give.job.kind, JobKind::Reduce);
        c.completed_job(CompletedJobArgs {
            kind: TaskKind::Reduce,
            job_id: give.job.reduce_id.unwrap(),
            phase_generation: give.phase_generation,
        });

        assert!(c.done());
        let give = c.give_job();
        assert_eq!(give.job.kind, JobKind::Done);
    }

    #[test]
    fn reclaims_expired_lease() {
        let c = coordinator(&["a.txt"], 1);
        let _ = c.give_job();
        {
            let mut inner = c.inner.lock().unwrap();
            inner.pool.tasks[0].lease_start = Some(Instant::now() - Duration::from_secs(20));
        }
        c.reclaim_expired();
        let give = c.give_job();
        assert_eq!(give.job.status, JobStatus::Active);
        assert_eq!(give.job.map_id, Some(0));
    }

    #[test]
    fn duplicate_completion_after_reclamation_is_absorbed() {
        let c = coordinator(&["a.txt"], 1);
        let first = c.give_job();
        c.completed_job(CompletedJobArgs {
            kind: TaskKind::Map,
            job_id: first.job.map_id.unwrap(),
            phase_generation: first.phase_generation,
        });
        // A second, stale completion for the same (now-reduce-phase) id
        // must not disturb the pool.
        c.completed_job(CompletedJobArgs {
            kind: TaskKind::Map,
            job_id: first.job.map_id.unwrap(),
            phase_generation: first.phase_generation,
        });
        let give = c.give_job();
        assert_eq!(give.job.kind, JobKind::Reduce);
    }

    #[test]
    fn stale_phase_generation_is_ignored() {
        let c = coordinator(&["a.txt"], 1);
        let give = c.give_job();
        c.completed_job(CompletedJobArgs {
            kind: TaskKind::Map,
            job_id: give.job.map_id.unwrap(),
            phase_generation: give.phase_generation + 5,
        });
        // Still mapping: the bogus completion from a future generation was dropped.
        let give2 = c.give_job();
        assert_eq!(give2.job.status, JobStatus::Waiting);
    }
}
