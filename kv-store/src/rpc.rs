use std::sync::Arc;

use async_trait::async_trait;
use fabric_rpc::Handler;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::store::{GetOutcome, PutOutcome, Store};

/// Status carried on the wire for both Get and Put. `ErrMaybe` is never
/// produced here -- it is synthesized by `kv-client` when a transport
/// failure leaves a Put's outcome ambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KvStatus {
    Ok,
    ErrNoKey,
    ErrVersion,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetArgs {
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetReply {
    pub value: String,
    pub version: u64,
    pub status: KvStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutArgs {
    pub key: String,
    pub value: String,
    pub version: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutReply {
    pub status: KvStatus,
}

pub struct StoreService(pub Arc<Store>);

#[async_trait]
impl Handler for StoreService {
    #[instrument(skip(self, payload))]
    async fn dispatch(&self, method: &str, payload: &[u8]) -> Result<Vec<u8>, String> {
        match method {
            "KvStore.Get" => {
                let args: GetArgs = rmp_serde::from_slice(payload).map_err(|e| e.to_string())?;
                let reply = match self.0.get(&args.key) {
                    GetOutcome::Ok { value, version } => GetReply {
                        value,
                        version,
                        status: KvStatus::Ok,
                    },
                    GetOutcome::NoKey => GetReply {
                        value: String::new(),
                        version: 0,
                        status: KvStatus::ErrNoKey,
                    },
                };
                rmp_serde::to_vec(&reply).map_err(|e| e.to_string())
            }
            "KvStore.Put" => {
                let args: PutArgs = rmp_serde::from_slice(payload).map_err(|e| e.to_string())?;
                let status = match self.0.put(&args.key, args.value, args.version) {
                    PutOutcome::Ok { .. } => KvStatus::Ok,
                    PutOutcome::NoKey => KvStatus::ErrNoKey,
                    PutOutcome::VersionMismatch => KvStatus::ErrVersion,
                };
                rmp_serde::to_vec(&PutReply { status }).map_err(|e| e.to_string())
            }
            other => Err(format!("unknown method: {other}")),
        }
    }
}
