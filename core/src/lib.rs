//! # rigkit core
//!
//! Math and instrumentation shared by the rigkit crates.

pub mod math;
pub mod profiling;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
