//! Logging bootstrap for binaries/examples embedding this crate (§10.3).
//!
//! The library itself only ever emits `tracing` events; it never installs a
//! subscriber. This is the opt-in helper a host binary can call once at
//! startup, adapted from the teacher's own `logging::init_logging`.

use tracing_subscriber::{fmt, EnvFilter};

/// Installs a `fmt` subscriber filtered by `level` (e.g. `"info"`,
/// `"lineage=debug"`). A second call is a no-op: a process only gets one
/// global subscriber, and a host that already installed its own should not
/// have this overwrite it.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(true).try_init();
}
