use std::sync::Arc;

use async_trait::async_trait;
use fabric_rpc::Handler;
use mr_proto::CompletedJobArgs;
use tracing::instrument;

use crate::coordinator::Coordinator;

/// Dispatches the two coordinator RPC methods onto `Coordinator`'s
/// synchronous handlers. Decoding and encoding happen here so the
/// coordinator core stays free of wire-format concerns.
pub struct CoordinatorService(pub Arc<Coordinator>);

#[async_trait]
impl Handler for CoordinatorService {
    #[instrument(skip(self, payload))]
    async fn dispatch(&self, method: &str, payload: &[u8]) -> Result<Vec<u8>, String> {
        match method {
            "Coordinator.GiveJob" => {
                let reply = self.0.give_job();
                rmp_serde::to_vec(&reply).map_err(|e| e.to_string())
            }
            "Coordinator.CompletedJob" => {
                let args: CompletedJobArgs =
                    rmp_serde::from_slice(payload).map_err(|e| e.to_string())?;
                self.0.completed_job(args);
                rmp_serde::to_vec(&mr_proto::CompletedJobReply).map_err(|e| e.to_string())
            }
            other => Err(format!("unknown method: {other}")),
        }
    }
}
