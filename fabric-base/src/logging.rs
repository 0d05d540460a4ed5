// Every binary entry point in this workspace calls `init` exactly once,
// before constructing any server or client. Log verbosity is controlled
// the usual way, via `RUST_LOG` (e.g. `RUST_LOG=fabric=debug`).

use tracing_subscriber::EnvFilter;

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
