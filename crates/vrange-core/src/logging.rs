#![forbid(unsafe_code)]

//! Logging hooks.
//!
//! With the `tracing` feature the tracing macros are re-exported here so the
//! widget layer can log through `vrange_core` without naming `tracing`
//! directly. Without it this module is empty and callers gate their spans on
//! the same feature.
//!
//! `tracing-json` adds [`init_json_subscriber`] for production hosts that
//! want newline-delimited JSON filtered by `RUST_LOG`.

#[cfg(feature = "tracing")]
pub use tracing::{debug, debug_span, info, trace, trace_span, warn};

/// Install a global JSON subscriber honoring `RUST_LOG`.
///
/// Returns `false` if a global subscriber was already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json_subscriber() -> bool {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(true)
        .try_init()
        .is_ok()
}
