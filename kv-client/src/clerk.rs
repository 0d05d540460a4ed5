use std::path::PathBuf;

use kv_store::{GetArgs, GetReply, KvStatus, PutArgs, PutReply};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GetStatus {
    Ok { value: String, version: u64 },
    ErrNoKey,
}

/// Status of a `Put` as observed by a caller. `ErrMaybe` is synthesized
/// here, at the transport boundary, whenever the RPC itself fails -- the
/// store may have committed the write before the reply was lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutStatus {
    Ok,
    ErrNoKey,
    ErrVersion,
    ErrMaybe,
}

/// A thin RPC client for the KV store, analogous to the original lab's
/// `Clerk`. Dials fresh per call, same as `fabric_rpc::call`.
pub struct Clerk {
    socket_path: PathBuf,
}

impl Clerk {
    pub fn new(socket_path: PathBuf) -> Self {
        Clerk { socket_path }
    }

    pub async fn get(&self, key: &str) -> fabric_base::Result<GetStatus> {
        let reply: GetReply = fabric_rpc::call(
            &self.socket_path,
            "KvStore.Get",
            &GetArgs {
                key: key.to_string(),
            },
        )
        .await?;
        Ok(match reply.status {
            KvStatus::Ok => GetStatus::Ok {
                value: reply.value,
                version: reply.version,
            },
            KvStatus::ErrNoKey => GetStatus::ErrNoKey,
            KvStatus::ErrVersion => {
                return Err(fabric_base::err("KvStore.Get returned ErrVersion"))
            }
        })
    }

    pub async fn put(&self, key: &str, value: String, version: u64) -> PutStatus {
        match fabric_rpc::call::<_, PutReply>(
            &self.socket_path,
            "KvStore.Put",
            &PutArgs {
                key: key.to_string(),
                value,
                version,
            },
        )
        .await
        {
            Ok(reply) => match reply.status {
                KvStatus::Ok => PutStatus::Ok,
                KvStatus::ErrNoKey => PutStatus::ErrNoKey,
                KvStatus::ErrVersion => PutStatus::ErrVersion,
            },
            Err(e) => {
                tracing::debug!(error = %e, "put outcome ambiguous");
                PutStatus::ErrMaybe
            }
        }
    }
}
