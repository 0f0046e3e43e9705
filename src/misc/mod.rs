//! Numerical utilities
mod func;
mod stats;

pub use func::*;
pub use stats::*;
