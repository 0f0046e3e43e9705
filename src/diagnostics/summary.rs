use serde::{Deserialize, Serialize};
use std::fmt;

use super::convergence::{ess_bulk, ess_tail, mcse_mean, rhat};
use super::hdi::hdi;
use crate::misc::{mean, std_dev};
use crate::trace::Group;

/// Summary settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// Probability mass of the reported highest density interval
    pub hdi_prob: f64,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        SummaryConfig { hdi_prob: 0.94 }
    }
}

impl SummaryConfig {
    pub fn with_hdi_prob(self, hdi_prob: f64) -> Self {
        Self { hdi_prob }
    }
}

/// Statistics of one scalar element, e.g. `beta[1]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub label: String,
    pub mean: f64,
    pub sd: f64,
    pub hdi_lower: f64,
    pub hdi_upper: f64,
    pub mcse_mean: f64,
    pub ess_bulk: f64,
    pub ess_tail: f64,
    pub r_hat: f64,
}

impl SummaryRow {
    fn from_chains(label: String, chains: &[Vec<f64>], hdi_prob: f64) -> Self {
        let pooled: Vec<f64> = chains.iter().flatten().copied().collect();
        let (hdi_lower, hdi_upper) = hdi(&pooled, hdi_prob);
        SummaryRow {
            label,
            mean: mean(&pooled),
            sd: std_dev(&pooled),
            hdi_lower,
            hdi_upper,
            mcse_mean: mcse_mean(chains),
            ess_bulk: ess_bulk(chains),
            ess_tail: ess_tail(chains),
            r_hat: rhat(chains),
        }
    }
}

/// A table with one row per scalar element of every variable with draws
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    hdi_prob: f64,
    rows: Vec<SummaryRow>,
}

impl Summary {
    pub fn hdi_prob(&self) -> f64 {
        self.hdi_prob
    }

    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    /// Row labelled `label`, e.g. `"sigma"` or `"beta[x1]"`
    pub fn get(&self, label: &str) -> Option<&SummaryRow> {
        self.rows.iter().find(|r| r.label == label)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Largest R-hat, ignoring rows where it is undefined
    pub fn max_rhat(&self) -> Option<&SummaryRow> {
        self.rows
            .iter()
            .filter(|r| r.r_hat.is_finite())
            .max_by(|a, b| a.r_hat.total_cmp(&b.r_hat))
    }

    /// Smallest of bulk and tail ESS, ignoring rows where both are
    /// undefined
    pub fn min_ess(&self) -> Option<(&SummaryRow, f64)> {
        self.rows
            .iter()
            .filter_map(|r| {
                let ess = r.ess_bulk.min(r.ess_tail);
                ess.is_finite().then_some((r, ess))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

/// Summarize every variable of `group` that has chain and draw axes
///
/// # Example
///
/// ```
/// use genmodel::diagnostics::{summarize, SummaryConfig};
/// use genmodel::trace::{Group, Variable};
/// use ndarray::Array3;
///
/// let values = Array3::from_shape_fn((2, 100, 1), |(c, d, _)| (c * 100 + d) as f64 % 7.0);
/// let mut group = Group::new();
/// group
///     .insert(Variable::draws("mu", vec!["mu_dim_0".into()], values.into_dyn()).unwrap())
///     .unwrap();
///
/// let summary = summarize(&group, &SummaryConfig::default());
/// assert_eq!(summary.rows()[0].label, "mu[0]");
/// println!("{summary}");
/// ```
pub fn summarize(group: &Group, config: &SummaryConfig) -> Summary {
    let rows = group
        .variables()
        .iter()
        .filter(|v| v.has_draws())
        .flat_map(|var| {
            var.element_labels(group.coords())
                .into_iter()
                .enumerate()
                .map(|(e, label)| {
                    SummaryRow::from_chains(label, &var.element_chains(e), config.hdi_prob)
                })
                .collect::<Vec<_>>()
        })
        .collect();
    Summary {
        hdi_prob: config.hdi_prob,
        rows,
    }
}

fn fmt_stat(x: f64, precision: usize) -> String {
    if x.is_nan() {
        String::from("nan")
    } else {
        format!("{x:.precision$}")
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lo = format!("hdi_{}%", fmt_pct((1.0 - self.hdi_prob) / 2.0));
        let hi = format!("hdi_{}%", fmt_pct((1.0 + self.hdi_prob) / 2.0));
        let width = self
            .rows
            .iter()
            .map(|r| r.label.len())
            .max()
            .unwrap_or(0)
            .max(4);

        writeln!(
            f,
            "{:width$} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>6}",
            "", "mean", "sd", lo, hi, "mcse_mean", "ess_bulk", "ess_tail", "r_hat"
        )?;
        for r in &self.rows {
            writeln!(
                f,
                "{:width$} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>6}",
                r.label,
                fmt_stat(r.mean, 3),
                fmt_stat(r.sd, 3),
                fmt_stat(r.hdi_lower, 3),
                fmt_stat(r.hdi_upper, 3),
                fmt_stat(r.mcse_mean, 3),
                fmt_stat(r.ess_bulk, 0),
                fmt_stat(r.ess_tail, 0),
                fmt_stat(r.r_hat, 2),
            )?;
        }
        Ok(())
    }
}

/// Percent without trailing zeros: 0.03 -> "3", 0.025 -> "2.5"
fn fmt_pct(p: f64) -> String {
    let s = format!("{:.1}", p * 100.0);
    s.trim_end_matches('0').trim_end_matches('.').to_owned()
}
