//! Posterior summaries and convergence checks
//!
//! The statistics follow ArviZ: rank-normalized split R-hat, bulk and tail
//! effective sample sizes, the Monte Carlo standard error of the mean, and
//! highest density intervals.
mod convergence;
mod hdi;
mod report;
mod summary;

pub use convergence::{
    ess_bulk, ess_mean, ess_tail, mcse_mean, rank_normalize, rhat, split_chains,
};
pub use hdi::hdi;
pub use report::{ConvergenceReport, MIN_ESS_PER_CHAIN, RHAT_THRESHOLD};
pub use summary::{summarize, Summary, SummaryConfig, SummaryRow};
