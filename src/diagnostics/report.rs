use std::fmt;

use super::summary::{summarize, SummaryConfig};
use crate::trace::InferenceData;

/// R-hat above this flags chains that disagree
pub const RHAT_THRESHOLD: f64 = 1.01;
/// Bulk or tail ESS below this many per chain is flagged
pub const MIN_ESS_PER_CHAIN: f64 = 100.0;

/// Whether a fit can be trusted, in one place
///
/// Built from an [`InferenceData`] after the fact; nothing in it aborts
/// inference.
#[derive(Clone, Debug, PartialEq)]
pub struct ConvergenceReport {
    n_chains: usize,
    n_draws: usize,
    n_divergent: usize,
    max_rhat: Option<(String, f64)>,
    min_ess: Option<(String, f64)>,
    warnings: Vec<String>,
}

impl ConvergenceReport {
    pub fn n_divergent(&self) -> usize {
        self.n_divergent
    }

    /// Worst R-hat and the element it belongs to
    pub fn max_rhat(&self) -> Option<(&str, f64)> {
        self.max_rhat.as_ref().map(|(l, r)| (l.as_str(), *r))
    }

    /// Smallest bulk or tail ESS and the element it belongs to
    pub fn min_ess(&self) -> Option<(&str, f64)> {
        self.min_ess.as_ref().map(|(l, e)| (l.as_str(), *e))
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// `true` if nothing was flagged
    pub fn is_ok(&self) -> bool {
        self.warnings.is_empty()
    }
}

impl From<&InferenceData> for ConvergenceReport {
    fn from(idata: &InferenceData) -> Self {
        let mut warnings = Vec::new();
        let Ok(posterior) = idata.posterior() else {
            return ConvergenceReport {
                n_chains: 0,
                n_draws: 0,
                n_divergent: 0,
                max_rhat: None,
                min_ess: None,
                warnings: vec![String::from("there is no posterior group")],
            };
        };
        let n_chains = posterior.n_chains();
        let n_draws = posterior.n_draws();

        let n_divergent = idata
            .sample_stats()
            .and_then(|s| s.get("diverging"))
            .map_or(0, |v| v.values().iter().filter(|&&d| d > 0.0).count());
        if n_divergent > 0 {
            warnings.push(format!(
                "there were {n_divergent} divergences after tuning"
            ));
        }

        if idata.attrs().get("converged").map(String::as_str) == Some("false") {
            warnings.push(String::from(
                "the variational fit stopped at n_iter before converging",
            ));
        }

        let summary = summarize(posterior, &SummaryConfig::default());
        let max_rhat = summary
            .max_rhat()
            .map(|row| (row.label.clone(), row.r_hat));
        if let Some((label, r)) = &max_rhat {
            if *r > RHAT_THRESHOLD {
                warnings.push(format!(
                    "R-hat of {label} is {r:.3}, above {RHAT_THRESHOLD}; the chains have not mixed"
                ));
            }
        }
        let min_ess = summary
            .min_ess()
            .map(|(row, ess)| (row.label.clone(), ess));
        if let Some((label, ess)) = &min_ess {
            let floor = MIN_ESS_PER_CHAIN * n_chains as f64;
            if *ess < floor {
                warnings.push(format!(
                    "effective sample size of {label} is {ess:.0}, below {floor:.0}"
                ));
            }
        }

        ConvergenceReport {
            n_chains,
            n_draws,
            n_divergent,
            max_rhat,
            min_ess,
            warnings,
        }
    }
}

impl fmt::Display for ConvergenceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} chains x {} draws, {} divergent",
            self.n_chains, self.n_draws, self.n_divergent
        )?;
        if let Some((label, r)) = &self.max_rhat {
            writeln!(f, "max r_hat: {r:.3} ({label})")?;
        }
        if let Some((label, ess)) = &self.min_ess {
            writeln!(f, "min ess: {ess:.0} ({label})")?;
        }
        if self.warnings.is_empty() {
            write!(f, "no problems found")
        } else {
            self.warnings
                .iter()
                .try_for_each(|w| writeln!(f, "warning: {w}"))
        }
    }
}
