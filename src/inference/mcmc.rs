use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::adapt::{find_reasonable_step_size, RunningVariance, WindowedAdaptation};
use super::init::initial_point;
use super::metropolis::{RandomWalk, TUNE_INTERVAL};
use super::nuts::{self, Leapfrog, State};
use super::{
    chain_rngs, free_density, observed_group, posterior_group, stats_group, DrawStats,
    InferenceEngine, SamplingError,
};
use crate::diagnostics::ConvergenceReport;
use crate::model::{LogDensity, Model};
use crate::trace::{InferenceData, OBSERVED_DATA, POSTERIOR, SAMPLE_STATS};

/// How an MCMC chain moves
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepMethod {
    /// No-U-Turn sampler with step size and diagonal mass matrix
    /// adaptation
    Nuts,
    /// Gaussian random walk with a tuned proposal scale
    Metropolis,
}

impl fmt::Display for StepMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepMethod::Nuts => write!(f, "NUTS"),
            StepMethod::Metropolis => write!(f, "Metropolis"),
        }
    }
}

/// MCMC settings
///
/// # Example
///
/// ```
/// use genmodel::inference::{SamplerConfig, StepMethod};
///
/// let config = SamplerConfig::default()
///     .with_draws(500)
///     .with_chains(2)
///     .with_step(StepMethod::Metropolis);
/// assert_eq!(config.tune, 1000);
/// assert_eq!(config.chains, 2);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Draws kept per chain
    pub draws: usize,
    /// Warm-up iterations per chain, discarded
    pub tune: usize,
    pub chains: usize,
    /// Mean acceptance probability the step size is tuned towards
    pub target_accept: f64,
    /// A NUTS trajectory has at most `2^max_tree_depth` steps
    pub max_tree_depth: usize,
    pub step: StepMethod,
    /// Half-width of the uniform jitter added to the starting point
    pub init_jitter: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        SamplerConfig {
            draws: 1000,
            tune: 1000,
            chains: 4,
            target_accept: 0.8,
            max_tree_depth: 10,
            step: StepMethod::Nuts,
            init_jitter: 1.0,
        }
    }
}

impl SamplerConfig {
    pub fn with_draws(self, draws: usize) -> Self {
        Self { draws, ..self }
    }

    pub fn with_tune(self, tune: usize) -> Self {
        Self { tune, ..self }
    }

    pub fn with_chains(self, chains: usize) -> Self {
        Self { chains, ..self }
    }

    pub fn with_target_accept(self, target_accept: f64) -> Self {
        Self {
            target_accept,
            ..self
        }
    }

    pub fn with_max_tree_depth(self, max_tree_depth: usize) -> Self {
        Self {
            max_tree_depth,
            ..self
        }
    }

    pub fn with_step(self, step: StepMethod) -> Self {
        Self { step, ..self }
    }

    pub fn with_init_jitter(self, init_jitter: f64) -> Self {
        Self {
            init_jitter,
            ..self
        }
    }
}

/// Markov chain Monte Carlo
///
/// Chains run one after another, each on its own jump of a single seeded
/// xoshiro stream.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MCMCEngine {
    config: SamplerConfig,
}

type ChainOutput = (Vec<Vec<f64>>, Vec<DrawStats>);

impl MCMCEngine {
    pub fn new(config: SamplerConfig) -> Self {
        MCMCEngine { config }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    fn run_nuts<R: Rng>(
        &self,
        density: &LogDensity<'_>,
        rng: &mut R,
    ) -> Result<ChainOutput, SamplingError> {
        let cfg = &self.config;
        let dim = density.dim();
        let q0 = initial_point(density, cfg.init_jitter, rng)?;
        let mut state = State::new(density, q0);

        let step0 = find_reasonable_step_size(density, &state.q, &vec![1.0; dim], 1.0);
        let mut adapt = WindowedAdaptation::new(dim, cfg.tune, cfg.target_accept, step0);

        for i in 0..cfg.tune {
            let integrator = Leapfrog {
                density,
                step_size: adapt.step_size(),
                inv_mass: adapt.inv_mass(),
            };
            let t = nuts::transition(&integrator, &state, cfg.max_tree_depth, rng);
            state = t.state;
            if adapt.update(i, &state.q, t.accept) {
                let eps =
                    find_reasonable_step_size(density, &state.q, adapt.inv_mass(), adapt.step_size());
                adapt.restart_step(eps);
            }
        }

        let step_size = if cfg.tune > 0 {
            adapt.final_step_size()
        } else {
            step0
        };
        let inv_mass = adapt.inv_mass().to_vec();
        log::debug!("tuned step size {step_size:.4}");
        let integrator = Leapfrog {
            density,
            step_size,
            inv_mass: &inv_mass,
        };

        let mut draws = Vec::with_capacity(cfg.draws);
        let mut stats = Vec::with_capacity(cfg.draws);
        for _ in 0..cfg.draws {
            let t = nuts::transition(&integrator, &state, cfg.max_tree_depth, rng);
            state = t.state;
            draws.push(state.q.clone());
            stats.push(DrawStats {
                lp: state.lp,
                accept: t.accept,
                step_size,
                diverging: t.divergent,
                tree_depth: t.depth,
                n_steps: t.n_steps,
                energy: t.energy,
            });
        }
        Ok((draws, stats))
    }

    fn run_metropolis<R: Rng>(
        &self,
        density: &LogDensity<'_>,
        rng: &mut R,
    ) -> Result<ChainOutput, SamplingError> {
        let cfg = &self.config;
        let mut q = initial_point(density, cfg.init_jitter, rng)?;
        let mut lp = density.logp(&q);
        let mut walk = RandomWalk::new(density.dim());
        let mut variance = RunningVariance::new(density.dim());

        for i in 0..cfg.tune {
            let (q1, lp1, _) = walk.step(density, &q, lp, rng);
            q = q1;
            lp = lp1;
            variance.add(&q);
            if (i + 1) % TUNE_INTERVAL == 0 {
                walk.tune();
            }
            // match the proposal to the spread seen in the first half
            if i + 1 == cfg.tune / 2 && variance.count() > 10 {
                walk.set_proposal_sd(variance.regularized().iter().map(|v| v.sqrt()).collect());
            }
        }

        let mut draws = Vec::with_capacity(cfg.draws);
        let mut stats = Vec::with_capacity(cfg.draws);
        for _ in 0..cfg.draws {
            let (q1, lp1, accept) = walk.step(density, &q, lp, rng);
            q = q1;
            lp = lp1;
            draws.push(q.clone());
            stats.push(DrawStats {
                lp,
                accept,
                step_size: walk.scale(),
                ..DrawStats::default()
            });
        }
        Ok((draws, stats))
    }
}

impl InferenceEngine for MCMCEngine {
    fn sample(&self, model: &Model, seed: u64) -> Result<InferenceData, SamplingError> {
        let cfg = &self.config;
        let density = free_density(model)?;
        log::info!(
            "sampling {} chains of {} draws ({} tune) with {} over {} parameters",
            cfg.chains,
            cfg.draws,
            cfg.tune,
            cfg.step,
            density.dim()
        );

        let mut all_draws = Vec::with_capacity(cfg.chains);
        let mut all_stats = Vec::with_capacity(cfg.chains);
        for (chain, mut rng) in chain_rngs(seed, cfg.chains).into_iter().enumerate() {
            let (draws, stats) = match cfg.step {
                StepMethod::Nuts => self.run_nuts(&density, &mut rng)?,
                StepMethod::Metropolis => self.run_metropolis(&density, &mut rng)?,
            };
            log::debug!("chain {chain} done");
            all_draws.push(draws);
            all_stats.push(stats);
        }

        let n_divergent: usize = all_stats
            .iter()
            .flatten()
            .filter(|s| s.diverging)
            .count();
        if n_divergent > 0 {
            log::warn!(
                "{n_divergent} divergences after tuning, consider raising target_accept or \
                 reparameterizing"
            );
        }

        let mut idata = InferenceData::new();
        idata.add_group(POSTERIOR, posterior_group(&density, &all_draws)?)?;
        idata.add_group(
            SAMPLE_STATS,
            stats_group(&all_stats, cfg.step == StepMethod::Nuts)?,
        )?;
        let observed = observed_group(model)?;
        if !observed.is_empty() {
            idata.add_group(OBSERVED_DATA, observed)?;
        }
        idata.set_attr("inference_engine", "mcmc");
        idata.set_attr("step_method", cfg.step.to_string());
        idata.set_attr("seed", seed.to_string());
        idata.set_attr("tune", cfg.tune.to_string());

        let report = ConvergenceReport::from(&idata);
        for warning in report.warnings() {
            log::warn!("{warning}");
        }
        log::info!("sampling finished");
        Ok(idata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DistSpec;

    fn normal_model() -> Model {
        let mut model = Model::new();
        let mu = model.add_prior("mu", DistSpec::normal(0.0, 10.0), &[]).unwrap();
        let sigma = model.add_prior("sigma", DistSpec::half_normal(5.0), &[]).unwrap();
        let ys = vec![4.1, 5.3, 4.8, 5.9, 5.2, 4.4, 5.0, 5.6, 4.7, 5.1];
        model
            .add_likelihood("y", DistSpec::normal(mu, sigma), ys, &[])
            .unwrap();
        model
    }

    #[test]
    fn nuts_trace_layout() {
        let model = normal_model();
        let engine = MCMCEngine::new(
            SamplerConfig::default()
                .with_draws(50)
                .with_tune(50)
                .with_chains(2),
        );
        let idata = engine.sample(&model, 3).unwrap();
        let post = idata.posterior().unwrap();
        assert_eq!(post.n_chains(), 2);
        assert_eq!(post.n_draws(), 50);
        assert!(post.get("sigma").unwrap().element_draws(0).iter().all(|&s| s > 0.0));
        let stats = idata.sample_stats().unwrap();
        assert!(stats.get("diverging").is_some());
        assert!(stats.get("tree_depth").is_some());
        assert!(idata.group(OBSERVED_DATA).is_some());
    }

    #[test]
    fn same_seed_same_draws() {
        let model = normal_model();
        let engine = MCMCEngine::new(SamplerConfig::default().with_draws(20).with_tune(20).with_chains(1));
        let a = engine.sample(&model, 42).unwrap();
        let b = engine.sample(&model, 42).unwrap();
        assert_eq!(a.posterior().unwrap(), b.posterior().unwrap());
    }

    #[test]
    fn metropolis_recovers_the_mean() {
        let model = normal_model();
        let engine = MCMCEngine::new(
            SamplerConfig::default()
                .with_step(StepMethod::Metropolis)
                .with_draws(3000)
                .with_tune(2000)
                .with_chains(1),
        );
        let idata = engine.sample(&model, 8).unwrap();
        let mu = idata.posterior().unwrap().get("mu").unwrap().element_draws(0);
        assert::close(crate::misc::mean(&mu), 5.01, 0.2);
        assert!(idata.sample_stats().unwrap().get("tree_depth").is_none());
    }

    #[test]
    fn config_serializes() {
        let config = SamplerConfig::default().with_step(StepMethod::Metropolis);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"metropolis\""));
        let back: SamplerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
