//! Gradient based optimization for MAP estimation and variational fits
mod adam;
mod bfgs;
mod line_search;

pub use adam::Adam;
pub use bfgs::{bfgs, BfgsParams, BfgsResult};
pub use line_search::{wolfe_search, WolfeParams};

/// Error raised by the optimizers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum OptimizeError {
    /// The objective or its gradient became non-finite
    #[error("the objective became numerically unstable")]
    NumericalDivergence,
    /// The line search ran out of iterations
    #[error("the line search did not converge")]
    LineSearchFailed,
    /// The step length collapsed to zero
    #[error("the step length underflowed")]
    RoundingError,
}
