#![forbid(unsafe_code)]

//! Core: validated extents, configuration, and errors for vrange.
//!
//! # Role in vrange
//! `vrange-core` is the bottom layer. It owns the scalar types that the range
//! math relies on, the configuration surface a host hands to a virtualized
//! list, and the configuration fault taxonomy.
//!
//! # Primary responsibilities
//! - **ItemExtent**: a positive, finite height. Fixed item heights and the
//!   estimate used for unmeasured items are both `ItemExtent`s, so a zero or
//!   negative height cannot reach the range math.
//! - **VirtualizerConfig**: item height mode, overscan, container height,
//!   height index strategy, follow mode. Env-overridable with diagnostics.
//! - **ConfigError**: construction-time faults.
//! - **logging**: tracing re-exports and subscriber setup (feature gated).
//!
//! # How it fits in the system
//! `vrange-widgets` consumes `VirtualizerConfig` to build its viewport state
//! and height model. Everything past construction is infallible.

pub mod config;
pub mod error;
pub mod extent;
pub mod logging;

pub use config::{HeightIndex, ItemHeightSpec, VirtualizerConfig, VirtualizerConfigParse};
pub use error::ConfigError;
pub use extent::{ItemExtent, sanitize_offset};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, info, trace, trace_span, warn};
