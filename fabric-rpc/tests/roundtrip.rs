use std::sync::Arc;

use async_trait::async_trait;
use fabric_rpc::{call, serve, Handler};

struct Echo;

#[async_trait]
impl Handler for Echo {
    async fn dispatch(&self, method: &str, payload: &[u8]) -> Result<Vec<u8>, String> {
        match method {
            "Echo.Upper" => {
                let s: String = rmp_serde::from_slice(payload).map_err(|e| e.to_string())?;
                rmp_serde::to_vec(&s.to_uppercase()).map_err(|e| e.to_string())
            }
            "Echo.Fail" => Err("deliberate failure".to_owned()),
            other => Err(format!("unknown method {other}")),
        }
    }
}

#[tokio::test]
async fn round_trips_a_call() {
    let dir = tempfile::tempdir().unwrap();
    let socket_path = dir.path().join("rpc.sock");

    let handler = Arc::new(Echo);
    let server_path = socket_path.clone();
    tokio::spawn(async move {
        serve(&server_path, handler).await.unwrap();
    });
    // Give the listener a moment to bind before dialing.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let reply: String = call(&socket_path, "Echo.Upper", &"hello".to_owned())
        .await
        .unwrap();
    assert_eq!(reply, "HELLO");
}

#[tokio::test]
async fn surfaces_remote_errors() {
    let dir = tempfile::tempdir().unwrap();
    let socket_path = dir.path().join("rpc.sock");

    let handler = Arc::new(Echo);
    let server_path = socket_path.clone();
    tokio::spawn(async move {
        serve(&server_path, handler).await.unwrap();
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let err = call::<_, String>(&socket_path, "Echo.Fail", &())
        .await
        .unwrap_err();
    assert!(matches!(err, fabric_rpc::RpcError::Remote(_)));
}
