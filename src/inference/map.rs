//! Maximum a posteriori point estimates
use nalgebra::DVector;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use serde::{Deserialize, Serialize};

use super::init::initial_point;
use super::{free_density, SamplingError};
use crate::model::Model;
use crate::optim::{bfgs, BfgsParams};
use crate::shape::Value;

/// MAP settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    pub bfgs: BfgsParams,
    /// Half-width of the uniform jitter around the moment point the search
    /// starts from. Zero starts exactly at the moment point.
    pub init_jitter: f64,
    /// Seeds the jitter
    pub seed: u64,
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfig {
            // finite difference gradients are not accurate enough for 1e-6
            bfgs: BfgsParams::default().with_gtol(1E-5),
            init_jitter: 0.0,
            seed: 0,
        }
    }
}

impl MapConfig {
    pub fn with_bfgs(self, bfgs: BfgsParams) -> Self {
        Self { bfgs, ..self }
    }

    pub fn with_init_jitter(self, init_jitter: f64) -> Self {
        Self {
            init_jitter,
            ..self
        }
    }

    pub fn with_seed(self, seed: u64) -> Self {
        Self { seed, ..self }
    }
}

/// The mode of the unconstrained joint density, reported on the
/// constrained scale
///
/// Priors with a non-identity transform include the log-Jacobian in the
/// optimized density, so their mode is the mode in unconstrained space.
#[derive(Clone, Debug, PartialEq)]
pub struct MapEstimate {
    values: Vec<(String, Value)>,
    unconstrained: Vec<f64>,
    logp: f64,
    n_iter: usize,
    converged: bool,
}

impl MapEstimate {
    /// Value of the prior or deterministic `name`
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Every prior and deterministic in registration order
    pub fn values(&self) -> &[(String, Value)] {
        &self.values
    }

    pub fn unconstrained(&self) -> &[f64] {
        &self.unconstrained
    }

    /// Joint log density at the estimate
    pub fn logp(&self) -> f64 {
        self.logp
    }

    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    pub fn converged(&self) -> bool {
        self.converged
    }
}

/// Maximize the joint log density with BFGS
///
/// # Example
///
/// ```
/// use genmodel::prelude::*;
///
/// let mut model = Model::new();
/// let mu = model.add_prior("mu", DistSpec::normal(0.0, 100.0), &[]).unwrap();
/// model
///     .add_likelihood("y", DistSpec::normal(mu, 1.0), vec![1.0, 2.0, 3.0], &[])
///     .unwrap();
///
/// let map = find_map(&model, &MapConfig::default()).unwrap();
/// let mu = map.get("mu").unwrap().sum();
/// assert!((mu - 2.0).abs() < 1E-3);
/// ```
pub fn find_map(model: &Model, config: &MapConfig) -> Result<MapEstimate, SamplingError> {
    let density = free_density(model)?;
    let mut rng = Xoshiro256Plus::seed_from_u64(config.seed);
    let x0 = initial_point(&density, config.init_jitter, &mut rng)?;
    log::info!("searching for the MAP over {} parameters", density.dim());

    let result = bfgs(DVector::from_vec(x0), &config.bfgs, |x| {
        let (lp, grad) = density.logp_and_grad(x.as_slice());
        (-lp, -DVector::from_vec(grad))
    })?;
    if !result.converged {
        log::warn!(
            "MAP search stopped after {} iterations without reaching the gradient tolerance",
            result.n_iter
        );
    }

    let unconstrained = result.x.as_slice().to_vec();
    let values = density
        .point(&unconstrained)?
        .into_iter()
        .filter_map(|(var, value)| model.node(var).map(|n| (n.name().to_owned(), value)))
        .collect();
    Ok(MapEstimate {
        values,
        unconstrained,
        logp: -result.fx,
        n_iter: result.n_iter,
        converged: result.converged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DistSpec;

    #[test]
    fn linear_regression_mode() {
        let xs = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        let ys = vec![1.1, 2.9, 5.2, 7.0, 8.8];
        let mut model = Model::new();
        let x = model.add_data("x", xs, &[]).unwrap();
        let a = model.add_prior("a", DistSpec::normal(0.0, 100.0), &[]).unwrap();
        let b = model.add_prior("b", DistSpec::normal(0.0, 100.0), &[]).unwrap();
        model
            .add_likelihood("y", DistSpec::normal(a + b * x, 0.5), ys, &[])
            .unwrap();

        let map = find_map(&model, &MapConfig::default()).unwrap();
        assert!(map.converged());
        // least squares solution
        assert::close(map.get("a").unwrap().sum(), 1.1, 1E-2);
        assert::close(map.get("b").unwrap().sum(), 1.95, 1E-2);
    }

    #[test]
    fn positive_parameters_come_back_constrained() {
        let mut model = Model::new();
        let sigma = model.add_prior("sigma", DistSpec::half_normal(5.0), &[]).unwrap();
        model
            .add_likelihood("y", DistSpec::normal(0.0, sigma), vec![-2.0, 1.5, 2.5, -1.0], &[])
            .unwrap();
        let map = find_map(&model, &MapConfig::default()).unwrap();
        let sigma = map.get("sigma").unwrap().sum();
        assert!(sigma > 0.0);
        assert::close(map.unconstrained()[0], sigma.ln(), 1E-12);
        assert!(map.get("nope").is_none());
    }
}
