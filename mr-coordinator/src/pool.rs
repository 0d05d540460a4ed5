use std::time::Instant;

use mr_proto::TaskKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TaskStatus {
    Idle,
    InProgress,
    Done,
}

/// A task's `id` is stable within its kind: for Map it is the index into
/// the input file list, for Reduce it is a partition number in `[0, R)`.
/// `lease_start` is only meaningful while `status == InProgress`.
#[derive(Debug, Clone)]
pub(crate) struct Task {
    pub id: u32,
    pub input: Option<String>,
    pub status: TaskStatus,
    pub lease_start: Option<Instant>,
}

impl Task {
    fn idle(id: u32, input: Option<String>) -> Self {
        Task {
            id,
            input,
            status: TaskStatus::Idle,
            lease_start: None,
        }
    }
}

/// The job pool currently being worked: either `N` map tasks (one per
/// input file) or `R` reduce tasks (one per partition). A pool is
/// replaced wholesale, never mutated task-by-task, when the coordinator
/// advances phase.
pub(crate) struct Pool {
    pub kind: TaskKind,
    pub tasks: Vec<Task>,
}

impl Pool {
    pub fn for_map_inputs(files: &[String]) -> Self {
        Pool {
            kind: TaskKind::Map,
            tasks: files
                .iter()
                .enumerate()
                .map(|(i, f)| Task::idle(i as u32, Some(f.clone())))
                .collect(),
        }
    }

    pub fn for_reduce_partitions(n_reduce: u32) -> Self {
        Pool {
            kind: TaskKind::Reduce,
            tasks: (0..n_reduce).map(|i| Task::idle(i, None)).collect(),
        }
    }

    pub fn all_done(&self) -> bool {
        self.tasks.iter().all(|t| t.status == TaskStatus::Done)
    }

    pub fn first_idle_mut(&mut self) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.status == TaskStatus::Idle)
    }

    pub fn task_mut(&mut self, id: u32) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }
}
