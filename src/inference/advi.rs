//! Automatic differentiation variational inference
use nalgebra::{DMatrix, DVector};
use ndarray::Array1;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rand_xoshiro::Xoshiro256Plus;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::init::initial_point;
use super::{
    free_density, observed_group, posterior_group, InferenceEngine, SamplingError,
};
use crate::consts::HALF_LN_2PI_E;
use crate::model::{LogDensity, Model};
use crate::optim::{Adam, OptimizeError};
use crate::trace::{
    Group, InferenceData, Variable, OBSERVED_DATA, POSTERIOR, SAMPLE_STATS,
};

/// Family of the Gaussian approximation in unconstrained space
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviMethod {
    /// Independent Gaussians, one per coordinate
    MeanField,
    /// A Gaussian with a dense covariance `L Lᵀ`
    FullRank,
}

impl fmt::Display for AdviMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdviMethod::MeanField => write!(f, "mean-field"),
            AdviMethod::FullRank => write!(f, "full-rank"),
        }
    }
}

/// ADVI settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdviConfig {
    pub method: AdviMethod,
    /// Maximum number of optimization steps
    pub n_iter: usize,
    /// Adam step size
    pub learning_rate: f64,
    /// Monte Carlo draws per gradient estimate
    pub mc_samples: usize,
    /// Draws taken from the fitted approximation
    pub draws: usize,
    /// Stop once the relative change of the window-averaged parameters
    /// falls below this
    pub tolerance: f64,
    /// Length of the averaging window used by the convergence check
    pub check_every: usize,
}

impl Default for AdviConfig {
    fn default() -> Self {
        AdviConfig {
            method: AdviMethod::MeanField,
            n_iter: 10_000,
            learning_rate: 0.05,
            mc_samples: 1,
            draws: 1000,
            tolerance: 1E-2,
            check_every: 100,
        }
    }
}

impl AdviConfig {
    pub fn with_method(self, method: AdviMethod) -> Self {
        Self { method, ..self }
    }

    pub fn with_n_iter(self, n_iter: usize) -> Self {
        Self { n_iter, ..self }
    }

    pub fn with_learning_rate(self, learning_rate: f64) -> Self {
        Self {
            learning_rate,
            ..self
        }
    }

    pub fn with_mc_samples(self, mc_samples: usize) -> Self {
        Self { mc_samples, ..self }
    }

    pub fn with_draws(self, draws: usize) -> Self {
        Self { draws, ..self }
    }

    pub fn with_tolerance(self, tolerance: f64) -> Self {
        Self { tolerance, ..self }
    }

    pub fn with_check_every(self, check_every: usize) -> Self {
        Self {
            check_every,
            ..self
        }
    }
}

/// A fitted Gaussian approximation `N(mean, L Lᵀ)` to the unconstrained
/// posterior
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Approximation {
    method: AdviMethod,
    mean: DVector<f64>,
    scale_tril: DMatrix<f64>,
    elbo: Vec<f64>,
    n_iter: usize,
    converged: bool,
}

impl Approximation {
    pub fn method(&self) -> AdviMethod {
        self.method
    }

    /// Mean in unconstrained space
    pub fn mean(&self) -> &[f64] {
        self.mean.as_slice()
    }

    /// Marginal standard deviations in unconstrained space
    pub fn std(&self) -> Vec<f64> {
        self.scale_tril
            .row_iter()
            .map(|row| row.norm())
            .collect()
    }

    /// Covariance in unconstrained space
    pub fn cov(&self) -> DMatrix<f64> {
        &self.scale_tril * self.scale_tril.transpose()
    }

    /// Monte Carlo ELBO estimate at every iteration
    pub fn elbo_history(&self) -> &[f64] {
        &self.elbo
    }

    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    /// `true` if the fit stopped on the tolerance rather than `n_iter`
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// One draw in unconstrained space
    pub fn draw<R: Rng>(&self, rng: &mut R) -> Vec<f64> {
        let eps = DVector::from_fn(self.mean.len(), |_, _| rng.sample(StandardNormal));
        (&self.mean + &self.scale_tril * eps).as_slice().to_vec()
    }

    /// `n` independent draws in unconstrained space
    pub fn sample<R: Rng>(&self, n: usize, rng: &mut R) -> Vec<Vec<f64>> {
        (0..n).map(|_| self.draw(rng)).collect()
    }
}

/// Flat variational parameters: the mean followed by the scale. Mean-field
/// stores the log standard deviations; full-rank stores the lower triangle
/// of `L` row by row with its diagonal on the log scale.
struct Params {
    method: AdviMethod,
    dim: usize,
}

impl Params {
    fn len(&self) -> usize {
        match self.method {
            AdviMethod::MeanField => 2 * self.dim,
            AdviMethod::FullRank => self.dim + self.dim * (self.dim + 1) / 2,
        }
    }

    fn init(&self, mean: &[f64]) -> Vec<f64> {
        let mut x = mean.to_vec();
        x.resize(self.len(), 0.0);
        x
    }

    fn unpack(&self, x: &[f64]) -> (DVector<f64>, DMatrix<f64>) {
        let d = self.dim;
        let mean = DVector::from_column_slice(&x[..d]);
        let scale = &x[d..];
        let tril = match self.method {
            AdviMethod::MeanField => {
                DMatrix::from_diagonal(&DVector::from_iterator(d, scale.iter().map(|w| w.exp())))
            }
            AdviMethod::FullRank => {
                let mut l = DMatrix::zeros(d, d);
                let mut k = 0;
                for i in 0..d {
                    for j in 0..=i {
                        l[(i, j)] = if i == j { scale[k].exp() } else { scale[k] };
                        k += 1;
                    }
                }
                l
            }
        };
        (mean, tril)
    }

    /// Entropy of the Gaussian
    fn entropy(&self, x: &[f64]) -> f64 {
        let d = self.dim;
        let log_det = match self.method {
            AdviMethod::MeanField => x[d..].iter().sum::<f64>(),
            AdviMethod::FullRank => (0..d).map(|i| x[d + i * (i + 1) / 2 + i]).sum(),
        };
        log_det + d as f64 * HALF_LN_2PI_E
    }

    /// Reparameterized ELBO gradient for one draw `theta = mean + L eps`
    /// whose log density gradient is `g`, added into `out`
    fn accumulate(&self, x: &[f64], eps: &[f64], g: &[f64], out: &mut [f64]) {
        let d = self.dim;
        for i in 0..d {
            out[i] += g[i];
        }
        match self.method {
            AdviMethod::MeanField => {
                for i in 0..d {
                    out[d + i] += g[i] * eps[i] * x[d + i].exp();
                }
            }
            AdviMethod::FullRank => {
                let mut k = d;
                for i in 0..d {
                    for j in 0..=i {
                        out[k] += if i == j {
                            g[i] * eps[i] * x[k].exp()
                        } else {
                            g[i] * eps[j]
                        };
                        k += 1;
                    }
                }
            }
        }
    }

    /// Gradient of the entropy
    fn add_entropy_grad(&self, out: &mut [f64]) {
        let d = self.dim;
        match self.method {
            AdviMethod::MeanField => out[d..].iter_mut().for_each(|o| *o += 1.0),
            AdviMethod::FullRank => (0..d).for_each(|i| out[d + i * (i + 1) / 2 + i] += 1.0),
        }
    }
}

/// Largest change between two parameter vectors, relative to the older one
fn relative_change(old: &[f64], new: &[f64]) -> f64 {
    old.iter()
        .zip(new)
        .map(|(a, b)| (b - a).abs() / (a.abs() + 1.0))
        .fold(0.0, f64::max)
}

/// Variational inference by stochastic gradient ascent on the ELBO
///
/// # Example
///
/// ```
/// use genmodel::prelude::*;
///
/// let mut model = Model::new();
/// let mu = model.add_prior("mu", DistSpec::normal(0.0, 10.0), &[]).unwrap();
/// model
///     .add_likelihood("y", DistSpec::normal(mu, 1.0), vec![0.8, 1.1, 1.3], &[])
///     .unwrap();
///
/// let engine = VariationalEngine::new(AdviConfig::default().with_n_iter(2000));
/// let approx = engine.fit(&model, 7).unwrap();
/// assert!((approx.mean()[0] - 1.07).abs() < 0.3);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VariationalEngine {
    config: AdviConfig,
}

impl VariationalEngine {
    pub fn new(config: AdviConfig) -> Self {
        VariationalEngine { config }
    }

    pub fn config(&self) -> &AdviConfig {
        &self.config
    }

    /// Fit the approximation only
    pub fn fit(&self, model: &Model, seed: u64) -> Result<Approximation, SamplingError> {
        let density = free_density(model)?;
        let mut rng = Xoshiro256Plus::seed_from_u64(seed);
        self.fit_density(&density, &mut rng)
    }

    fn fit_density<R: Rng>(
        &self,
        density: &LogDensity<'_>,
        rng: &mut R,
    ) -> Result<Approximation, SamplingError> {
        let cfg = &self.config;
        let dim = density.dim();
        let params = Params {
            method: cfg.method,
            dim,
        };
        let start = initial_point(density, 0.0, rng)?;
        let mut x = params.init(&start);
        let mut adam = Adam::new(x.len(), cfg.learning_rate);
        let n_mc = cfg.mc_samples.max(1);
        let window = cfg.check_every.max(1);
        log::info!(
            "fitting {} ADVI over {} parameters",
            cfg.method,
            dim
        );

        let mut elbo = Vec::with_capacity(cfg.n_iter);
        let mut window_sum = vec![0.0; x.len()];
        let mut last_average: Option<Vec<f64>> = None;
        let mut converged = false;
        let mut n_iter = 0;

        for it in 0..cfg.n_iter {
            let (mean, tril) = params.unpack(&x);
            let mut grad = vec![0.0; x.len()];
            let mut lp_sum = 0.0;
            for _ in 0..n_mc {
                let eps = DVector::from_fn(dim, |_, _| rng.sample(StandardNormal));
                let theta = &mean + &tril * &eps;
                let (lp, g) = density.logp_and_grad(theta.as_slice());
                let g: Vec<f64> = g
                    .into_iter()
                    .map(|gi| if gi.is_finite() { gi } else { 0.0 })
                    .collect();
                lp_sum += lp;
                params.accumulate(&x, eps.as_slice(), &g, &mut grad);
            }
            grad.iter_mut().for_each(|g| *g /= n_mc as f64);
            params.add_entropy_grad(&mut grad);
            elbo.push(lp_sum / n_mc as f64 + params.entropy(&x));

            // Adam descends, the ELBO is maximized
            grad.iter_mut().for_each(|g| *g = -*g);
            adam.step(&mut x, &grad);
            if x.iter().any(|v| !v.is_finite()) {
                return Err(OptimizeError::NumericalDivergence.into());
            }
            n_iter = it + 1;

            window_sum.iter_mut().zip(&x).for_each(|(s, v)| *s += v);
            if n_iter % window == 0 {
                let average: Vec<f64> = window_sum.iter().map(|s| s / window as f64).collect();
                window_sum.iter_mut().for_each(|s| *s = 0.0);
                if let Some(prev) = &last_average {
                    let change = relative_change(prev, &average);
                    log::debug!(
                        "iteration {n_iter}: elbo {:.3}, relative change {change:.2e}",
                        elbo[it]
                    );
                    if change < cfg.tolerance {
                        converged = true;
                        last_average = Some(average);
                        break;
                    }
                }
                last_average = Some(average);
            }
        }

        if converged {
            log::info!("ADVI converged after {n_iter} iterations");
        } else {
            log::warn!(
                "ADVI did not converge in {n_iter} iterations, consider raising n_iter"
            );
        }

        // window averages smooth out the stochastic updates
        let fitted = last_average.unwrap_or(x);
        let (mean, scale_tril) = params.unpack(&fitted);
        Ok(Approximation {
            method: cfg.method,
            mean,
            scale_tril,
            elbo,
            n_iter,
            converged,
        })
    }
}

impl InferenceEngine for VariationalEngine {
    /// Fit, then return `draws` draws from the approximation as a single
    /// chain. The ELBO history is stored as `elbo` in `sample_stats`.
    fn sample(&self, model: &Model, seed: u64) -> Result<InferenceData, SamplingError> {
        let density = free_density(model)?;
        let mut rng = Xoshiro256Plus::seed_from_u64(seed);
        let approx = self.fit_density(&density, &mut rng)?;
        let draws = approx.sample(self.config.draws, &mut rng);

        let mut idata = InferenceData::new();
        idata.add_group(POSTERIOR, posterior_group(&density, &[draws])?)?;

        let mut stats = Group::new();
        stats.insert(Variable::new(
            "elbo",
            vec![String::from("iteration")],
            Array1::from(approx.elbo.clone()).into_dyn(),
        )?)?;
        idata.add_group(SAMPLE_STATS, stats)?;

        let observed = observed_group(model)?;
        if !observed.is_empty() {
            idata.add_group(OBSERVED_DATA, observed)?;
        }
        idata.set_attr("inference_engine", "advi");
        idata.set_attr("advi_method", approx.method.to_string());
        idata.set_attr("seed", seed.to_string());
        idata.set_attr("n_iter", approx.n_iter.to_string());
        idata.set_attr("converged", approx.converged.to_string());
        Ok(idata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DistSpec;

    fn conjugate_model() -> Model {
        // posterior of mu is N(3.84, 0.447^2)
        let mut model = Model::new();
        let mu = model.add_prior("mu", DistSpec::normal(0.0, 100.0), &[]).unwrap();
        model
            .add_likelihood(
                "y",
                DistSpec::normal(mu, 1.0),
                vec![3.1, 4.2, 3.9, 4.5, 3.5],
                &[],
            )
            .unwrap();
        model
    }

    #[test]
    fn mean_field_matches_conjugate_posterior() {
        let engine = VariationalEngine::new(
            AdviConfig::default()
                .with_n_iter(5000)
                .with_mc_samples(4)
                .with_tolerance(1E-3),
        );
        let approx = engine.fit(&conjugate_model(), 1).unwrap();
        assert::close(approx.mean()[0], 3.84, 0.1);
        assert::close(approx.std()[0], 0.447, 0.1);
        assert!(!approx.elbo_history().is_empty());
    }

    #[test]
    fn full_rank_recovers_correlation() {
        // y ~ N(a + b, 1) with weak priors makes a and b strongly
        // anti-correlated
        let mut model = Model::new();
        let a = model.add_prior("a", DistSpec::normal(0.0, 1.0), &[]).unwrap();
        let b = model.add_prior("b", DistSpec::normal(0.0, 1.0), &[]).unwrap();
        model
            .add_likelihood("y", DistSpec::normal(a + b, 0.1), vec![1.0], &[])
            .unwrap();
        let engine = VariationalEngine::new(
            AdviConfig::default()
                .with_method(AdviMethod::FullRank)
                .with_n_iter(6000)
                .with_mc_samples(4)
                .with_learning_rate(0.02)
                .with_tolerance(1E-4),
        );
        let approx = engine.fit(&model, 3).unwrap();
        let cov = approx.cov();
        let corr = cov[(0, 1)] / (cov[(0, 0)] * cov[(1, 1)]).sqrt();
        assert!(corr < -0.8, "correlation {corr}");
    }

    #[test]
    fn sample_returns_one_chain() {
        let engine = VariationalEngine::new(
            AdviConfig::default().with_n_iter(500).with_draws(200),
        );
        let idata = engine.sample(&conjugate_model(), 5).unwrap();
        let post = idata.posterior().unwrap();
        assert_eq!(post.n_chains(), 1);
        assert_eq!(post.n_draws(), 200);
        let elbo = idata.sample_stats().unwrap().get("elbo").unwrap();
        assert!(!elbo.has_draws());
        assert_eq!(idata.attrs().get("inference_engine").map(String::as_str), Some("advi"));
    }

    #[test]
    fn same_seed_same_fit() {
        let engine = VariationalEngine::new(AdviConfig::default().with_n_iter(300));
        let a = engine.fit(&conjugate_model(), 11).unwrap();
        let b = engine.fit(&conjugate_model(), 11).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn entropy_of_unit_gaussian() {
        let params = Params {
            method: AdviMethod::FullRank,
            dim: 2,
        };
        let x = params.init(&[0.0, 0.0]);
        assert_eq!(x.len(), 5);
        assert::close(params.entropy(&x), 2.0 * HALF_LN_2PI_E, 1E-12);
        let (_, l) = params.unpack(&x);
        assert_eq!(l, DMatrix::identity(2, 2));
    }
}
