use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};
use tokio::net::UnixStream;
use tracing::debug;

use crate::framing::{read_frame, write_frame};
use crate::{Envelope, RpcError, WireResult};

/// Calls `method` on the service listening at `socket_path`, dialing a fresh
/// connection for this call alone. Returns `RpcError::Remote` if the
/// handler ran but reported an application-level failure (this is distinct
/// from a transport failure: the caller knows the request was received).
pub async fn call<Req, Resp>(
    socket_path: &Path,
    method: &str,
    req: &Req,
) -> Result<Resp, RpcError>
where
    Req: Serialize,
    Resp: DeserializeOwned,
{
    debug!(method, path = %socket_path.display(), "dialing rpc");
    let mut stream = UnixStream::connect(socket_path)
        .await
        .map_err(RpcError::Connect)?;

    let envelope = Envelope::new(method, req)?;
    write_frame(&mut stream, &envelope).await?;

    let wire: WireResult = read_frame(&mut stream).await?;
    match wire {
        WireResult::Ok(body) => {
            rmp_serde::from_slice(&body).map_err(|e| RpcError::Decode(e.to_string()))
        }
        WireResult::Err(msg) => Err(RpcError::Remote(msg)),
    }
}
