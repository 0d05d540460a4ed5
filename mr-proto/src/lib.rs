// Wire types shared by `mr-coordinator` and `mr-worker`, plus the
// partitioning hash: these three things together form the contract a
// worker and a coordinator must agree on byte-for-byte, so they live in
// their own small crate rather than inside either side.

mod hash;

pub use hash::ihash;

use serde::{Deserialize, Serialize};

/// The two kinds of task a job pool ever holds. `Done` is not a pool
/// member kind -- it only ever appears as a `JobKind` on the wire, to tell
/// a worker there is nothing left to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskKind {
    Map,
    Reduce,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobKind {
    Map,
    Reduce,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Active,
    Waiting,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiveJobArgs;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobInfo {
    pub kind: JobKind,
    pub map_id: Option<u32>,
    pub reduce_id: Option<u32>,
    pub filename: Option<String>,
    pub status: JobStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiveJobReply {
    pub n_reduce: u32,
    pub job: JobInfo,
    /// The phase generation this job was dispatched under. Echoed back in
    /// `CompletedJobArgs` so a stale completion from a worker that slept
    /// through a phase transition can't be mistaken for a completion of
    /// the task that now occupies the same `(kind, id)` slot.
    pub phase_generation: u64,
}

/// `phase_generation` lets the coordinator reject a completion report that
/// was issued under a phase the pool has since moved past -- see the
/// phase-generation note in the coordinator's design notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedJobArgs {
    pub kind: TaskKind,
    pub job_id: u32,
    pub phase_generation: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedJobReply;

/// Intermediate file written by map task `map_id`, read by reduce task
/// `reduce_id`.
pub fn intermediate_file_name(map_id: u32, reduce_id: u32) -> String {
    format!("mr-inter-{map_id}-{reduce_id}")
}

/// Final output file written by reduce task `reduce_id`.
pub fn final_file_name(reduce_id: u32) -> String {
    format!("mr-out-{reduce_id}")
}

/// One emitted record, carried between map and reduce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}
