use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::net::{UnixListener, UnixStream};
use tracing::{error, info, instrument, warn};

use crate::framing::{read_frame, write_frame};
use crate::{Envelope, RpcError, WireResult};

/// Implemented by a service's RPC front-end. `dispatch` is handed the raw
/// method name and MessagePack-encoded request body; it owns decoding the
/// request, running the handler, and encoding the reply.
///
/// Handlers are expected to be synchronous with respect to any internal
/// state mutation -- no handler here blocks on further RPCs or file I/O
/// while holding a service's lock.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn dispatch(&self, method: &str, payload: &[u8]) -> Result<Vec<u8>, String>;
}

/// Accepts connections on `socket_path` forever, handling exactly one
/// request per connection. Removes a stale socket file left behind by a
/// previous run before binding, the same as the original coordinator's
/// `os.Remove(sockname)` before `net.Listen`.
pub async fn serve<H: Handler + 'static>(
    socket_path: &Path,
    handler: Arc<H>,
) -> Result<(), RpcError> {
    let _ = std::fs::remove_file(socket_path);
    let listener = UnixListener::bind(socket_path)?;
    info!(path = %socket_path.display(), "rpc listener bound");

    loop {
        let (stream, _addr) = listener.accept().await?;
        let handler = Arc::clone(&handler);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, handler.as_ref()).await {
                warn!(error = %e, "rpc connection ended with error");
            }
        });
    }
}

#[instrument(skip(stream, handler))]
async fn handle_connection<H: Handler + ?Sized>(
    mut stream: UnixStream,
    handler: &H,
) -> Result<(), RpcError> {
    let envelope: Envelope = read_frame(&mut stream).await?;
    let result = match handler.dispatch(&envelope.method, &envelope.payload).await {
        Ok(body) => WireResult::Ok(body),
        Err(msg) => {
            error!(method = %envelope.method, error = %msg, "rpc handler returned error");
            WireResult::Err(msg)
        }
    };
    write_frame(&mut stream, &result).await
}
