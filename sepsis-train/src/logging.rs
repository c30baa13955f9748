//! Logging setup for the pipeline.
//!
//! Installs a global tracing subscriber writing to stderr, so that stdout only carries the
//! confirmation line. The filter defaults to `info` and can be overridden with `RUST_LOG`.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize tracing to write to stderr.
///
/// Subsequent calls, or calls after another subscriber was installed, are no-ops.
pub fn init() {
    let installed = fmt()
        .with_env_filter(build_env_filter())
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!("Logging initialized");
    }
}

fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init();
        init();
        tracing::info!("still logging");
    }
}
