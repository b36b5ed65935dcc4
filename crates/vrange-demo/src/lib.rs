#![forbid(unsafe_code)]

//! Demo driver for vrange.
//!
//! Builds a list of items with simulated heights and scrolls through it,
//! running the render/measure loop a real host would run, and reports each
//! resulting window.

pub mod cli;
pub mod session;
