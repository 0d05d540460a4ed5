mod rpc;
mod store;

pub use rpc::{GetArgs, GetReply, KvStatus, PutArgs, PutReply, StoreService};
pub use store::{GetOutcome, PutOutcome, Store};
