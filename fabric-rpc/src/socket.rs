use std::path::PathBuf;

/// Per-user socket path, e.g. `/var/tmp/fabric-coord-1000.sock`, so that
/// multiple users on a shared host don't collide on the same rendezvous path.
pub fn default_socket_path(prefix: &str) -> PathBuf {
    let uid = unsafe { libc::getuid() };
    PathBuf::from(format!("/var/tmp/{prefix}-{uid}.sock"))
}
