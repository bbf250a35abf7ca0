//! Shared utilities for the cost advisor crates

pub mod logging;
pub mod money;

pub use logging::init_tracing;
pub use money::format_usd;
