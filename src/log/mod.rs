use serde::Serialize;
use tracing::{debug, warn, Level};
use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. `RUST_LOG` wins over `--debug`.
pub fn init(debug: bool) {
    let default = if debug { "icp_forge=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Pretty-print an outbound body at debug level. Nothing is written to disk.
pub fn dump_json<T: Serialize>(label: &str, value: &T) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }
    match serde_json::to_string_pretty(value) {
        Ok(s) => debug!("===== {label} JSON =====\n{s}"),
        Err(e) => warn!("could not render {label} for debug output: {e}"),
    }
}

pub fn dump_raw(label: &str, body: &str) {
    debug!("===== {label} BODY =====\n{body}");
}
