// A local RPC transport: one request, one response, one connection,
// exactly like the original lab's use of Go's `net/rpc` dialed fresh for
// each call. Request and reply bodies are opaque MessagePack blobs to this
// crate -- `mr-proto` and `kv-store`/`kv-client` own the actual schemas.

mod client;
mod framing;
mod server;
mod socket;

pub use client::call;
pub use server::{serve, Handler};
pub use socket::default_socket_path;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("could not connect to rpc socket: {0}")]
    Connect(#[source] std::io::Error),
    #[error("rpc io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode rpc message: {0}")]
    Encode(String),
    #[error("failed to decode rpc message: {0}")]
    Decode(String),
    #[error("remote handler error: {0}")]
    Remote(String),
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Envelope {
    pub method: String,
    pub payload: Vec<u8>,
}

impl Envelope {
    fn new<Req: Serialize>(method: &str, req: &Req) -> Result<Self, RpcError> {
        let payload = rmp_serde::to_vec(req).map_err(|e| RpcError::Encode(e.to_string()))?;
        Ok(Envelope {
            method: method.to_owned(),
            payload,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) enum WireResult {
    Ok(Vec<u8>),
    Err(String),
}
