//! Gaussian random walk Metropolis with scale tuning
use rand::Rng;
use rand_distr::StandardNormal;

use crate::model::LogDensity;

/// Tune the proposal scale every this many warm-up iterations
pub(crate) const TUNE_INTERVAL: usize = 100;

/// Random walk over all coordinates at once with a per-coordinate
/// proposal scale
#[derive(Clone, Debug)]
pub(crate) struct RandomWalk {
    scale: f64,
    proposal_sd: Vec<f64>,
    accepted: usize,
    proposed: usize,
}

impl RandomWalk {
    pub(crate) fn new(dim: usize) -> Self {
        RandomWalk {
            // 2.38 / sqrt(d) is optimal for Gaussian targets
            scale: 2.38 / (dim.max(1) as f64).sqrt(),
            proposal_sd: vec![1.0; dim],
            accepted: 0,
            proposed: 0,
        }
    }

    pub(crate) fn scale(&self) -> f64 {
        self.scale
    }

    /// Propose from `q` and accept or reject. Returns the new point, its
    /// log density, and the acceptance probability.
    pub(crate) fn step<R: Rng>(
        &mut self,
        density: &LogDensity<'_>,
        q: &[f64],
        lp: f64,
        rng: &mut R,
    ) -> (Vec<f64>, f64, f64) {
        let proposal: Vec<f64> = q
            .iter()
            .zip(&self.proposal_sd)
            .map(|(&x, &sd)| {
                let z: f64 = rng.sample(StandardNormal);
                (self.scale * sd).mul_add(z, x)
            })
            .collect();
        let lp_new = density.logp(&proposal);
        let accept = if lp_new.is_finite() {
            (lp_new - lp).exp().min(1.0)
        } else {
            0.0
        };
        self.proposed += 1;
        if rng.gen::<f64>() < accept {
            self.accepted += 1;
            (proposal, lp_new, accept)
        } else {
            (q.to_vec(), lp, accept)
        }
    }

    /// Rescale from the acceptance rate since the last call, following
    /// PyMC's schedule
    pub(crate) fn tune(&mut self) {
        if self.proposed == 0 {
            return;
        }
        let rate = self.accepted as f64 / self.proposed as f64;
        let factor = match rate {
            r if r < 0.001 => 0.1,
            r if r < 0.05 => 0.5,
            r if r < 0.2 => 0.9,
            r if r > 0.95 => 10.0,
            r if r > 0.75 => 2.0,
            r if r > 0.5 => 1.1,
            _ => 1.0,
        };
        self.scale *= factor;
        log::debug!("metropolis acceptance {rate:.3}, scale now {:.4}", self.scale);
        self.accepted = 0;
        self.proposed = 0;
    }

    /// Per-coordinate proposal standard deviations, e.g. from warm-up draws
    pub(crate) fn set_proposal_sd(&mut self, sd: Vec<f64>) {
        self.proposal_sd = sd;
    }
}
