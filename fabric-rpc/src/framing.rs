// Every call is a single request/response pair over its own connection --
// there is no multiplexing and no keep-alive, mirroring the one-dial-per-call
// style of the original lab's `net/rpc` usage. Frames are a 4-byte
// little-endian length prefix followed by a MessagePack-encoded body.

use serde::{de::DeserializeOwned, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::RpcError;

const MAX_FRAME_LEN: u32 = 64 * 1024 * 1024;

pub(crate) async fn write_frame<W: AsyncWrite + Unpin, T: Serialize>(
    w: &mut W,
    value: &T,
) -> Result<(), RpcError> {
    let body = rmp_serde::to_vec(value).map_err(|e| RpcError::Encode(e.to_string()))?;
    let len: u32 = body
        .len()
        .try_into()
        .map_err(|_| RpcError::Encode("frame too large".into()))?;
    w.write_all(&len.to_le_bytes()).await?;
    w.write_all(&body).await?;
    w.flush().await?;
    Ok(())
}

pub(crate) async fn read_frame<R: AsyncRead + Unpin, T: DeserializeOwned>(
    r: &mut R,
) -> Result<T, RpcError> {
    let mut len_buf = [0u8; 4];
    r.read_exact(&mut len_buf).await?;
    let len = u32::from_le_bytes(len_buf);
    if len > MAX_FRAME_LEN {
        return Err(RpcError::Decode("frame exceeds maximum length".into()));
    }
    let mut body = vec![0u8; len as usize];
    r.read_exact(&mut body).await?;
    rmp_serde::from_slice(&body).map_err(|e| RpcError::Decode(e.to_string()))
}
