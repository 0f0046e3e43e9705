//! Posterior inference
//!
//! Every engine works on the unconstrained joint log density of a model
//! ([`LogDensity`]) and hands back an [`InferenceData`] whose `posterior`
//! group holds the constrained values of every prior and deterministic
//! node. Engines are interchangeable behind [`InferenceEngine`].
//!
//! Problems with the fit itself (divergences, poor mixing, a variational
//! fit that did not settle) are recorded and logged, never raised. Only a
//! model that cannot be evaluated at its starting point is an error.
mod adapt;
mod advi;
mod init;
mod map;
mod mcmc;
mod metropolis;
mod nuts;

pub use advi::{AdviConfig, AdviMethod, Approximation, VariationalEngine};
pub use map::{find_map, MapConfig, MapEstimate};
pub use mcmc::{MCMCEngine, SamplerConfig, StepMethod};

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

use crate::model::{LogDensity, Model, ModelError, Role};
use crate::optim::OptimizeError;
use crate::trace::{Group, GroupBuilder, InferenceData, TraceError, Variable};

/// Error raised while fitting a model
#[derive(Debug, thiserror::Error)]
pub enum SamplingError {
    /// No starting point with a finite log density and gradient was found.
    /// `vars` names the nodes whose log density was not finite at the
    /// last attempt.
    #[error("the log density is not finite at the initial point (check {vars:?})")]
    InitialPoint { vars: Vec<String> },
    /// The model has no prior nodes to infer
    #[error("the model has no free parameters")]
    NoFreeParameters,
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("optimizer failed: {0}")]
    Optimizer(#[from] OptimizeError),
    #[error(transparent)]
    Trace(#[from] TraceError),
}

/// Something that turns a model into posterior draws
pub trait InferenceEngine {
    /// Fit `model` and return at least a `posterior` group. Runs with the
    /// same seed give identical results.
    fn sample(&self, model: &Model, seed: u64) -> Result<InferenceData, SamplingError>;
}

/// Independent random streams for `n` chains, one jump apart
pub(crate) fn chain_rngs(seed: u64, n: usize) -> Vec<Xoshiro256Plus> {
    let mut rng = Xoshiro256Plus::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let chain_rng = rng.clone();
            rng.jump();
            chain_rng
        })
        .collect()
}

/// Check that the model has something to infer and build its density
pub(crate) fn free_density(model: &Model) -> Result<LogDensity<'_>, SamplingError> {
    let density = LogDensity::new(model)?;
    if density.dim() == 0 {
        return Err(SamplingError::NoFreeParameters);
    }
    Ok(density)
}

/// Map unconstrained draws, `chains[c][d]`, to a group holding the
/// constrained priors and deterministics
pub(crate) fn posterior_group(
    density: &LogDensity<'_>,
    chains: &[Vec<Vec<f64>>],
) -> Result<Group, SamplingError> {
    let model = density.model();
    let n_draws = chains.iter().map(Vec::len).max().unwrap_or(0);
    let mut builder = GroupBuilder::new(chains.len(), n_draws);

    for node in model.nodes() {
        if matches!(node.role(), Role::Prior | Role::Deterministic) {
            builder.add_variable(node.name(), node.axis_names(), node.shape());
        }
    }
    add_coords(model, &mut builder);

    for (c, chain) in chains.iter().enumerate() {
        for (d, theta) in chain.iter().enumerate() {
            let point = density.point(theta)?;
            for (index, (_, value)) in point.iter().enumerate() {
                let flat: Vec<f64> = value.iter().copied().collect();
                builder.record(index, c, d, &flat);
            }
        }
    }
    Ok(builder.build()?)
}

pub(crate) fn add_coords(model: &Model, builder: &mut GroupBuilder) {
    for (name, labels) in model.coords() {
        builder.set_coord(name, labels.to_vec());
    }
}

/// The observations of every likelihood, without chain or draw axes
pub(crate) fn observed_group(model: &Model) -> Result<Group, TraceError> {
    let mut group = Group::new();
    for node in model.nodes() {
        if node.role() != Role::Likelihood {
            continue;
        }
        if let Some(obs) = model.observed_value(node) {
            group.insert(Variable::new(node.name(), node.axis_names(), obs.clone())?)?;
        }
    }
    for (name, labels) in model.coords() {
        group.set_coord(name, labels.to_vec());
    }
    Ok(group)
}

/// Per-draw statistics recorded by the samplers
#[derive(Clone, Debug, Default)]
pub(crate) struct DrawStats {
    pub lp: f64,
    pub accept: f64,
    pub step_size: f64,
    pub diverging: bool,
    pub tree_depth: usize,
    pub n_steps: usize,
    pub energy: f64,
}

pub(crate) fn stats_group(stats: &[Vec<DrawStats>], with_tree: bool) -> Result<Group, TraceError> {
    let n_draws = stats.iter().map(Vec::len).max().unwrap_or(0);
    let mut builder = GroupBuilder::new(stats.len(), n_draws);
    let lp = builder.add_variable("lp", vec![], &[]);
    let accept = builder.add_variable("acceptance_rate", vec![], &[]);
    let step = builder.add_variable("step_size", vec![], &[]);
    let diverging = builder.add_variable("diverging", vec![], &[]);
    let tree = if with_tree {
        Some((
            builder.add_variable("tree_depth", vec![], &[]),
            builder.add_variable("n_steps", vec![], &[]),
            builder.add_variable("energy", vec![], &[]),
        ))
    } else {
        None
    };
    for (c, chain) in stats.iter().enumerate() {
        for (d, s) in chain.iter().enumerate() {
            builder.record(lp, c, d, &[s.lp]);
            builder.record(accept, c, d, &[s.accept]);
            builder.record(step, c, d, &[s.step_size]);
            builder.record(diverging, c, d, &[f64::from(u8::from(s.diverging))]);
            if let Some((depth, steps, energy)) = tree {
                builder.record(depth, c, d, &[s.tree_depth as f64]);
                builder.record(steps, c, d, &[s.n_steps as f64]);
                builder.record(energy, c, d, &[s.energy]);
            }
        }
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DistSpec;
    use rand::Rng;

    #[test]
    fn chain_streams_differ() {
        let mut rngs = chain_rngs(7, 3);
        let xs: Vec<f64> = rngs.iter_mut().map(|r| r.gen()).collect();
        assert_ne!(xs[0], xs[1]);
        assert_ne!(xs[1], xs[2]);

        let mut again = chain_rngs(7, 3);
        assert_eq!(again[2].gen::<f64>(), xs[2]);
    }

    #[test]
    fn model_without_priors_has_nothing_to_infer() {
        let mut model = Model::new();
        model
            .add_likelihood("y", DistSpec::normal(0.0, 1.0), vec![0.1], &[])
            .unwrap();
        assert!(matches!(
            free_density(&model),
            Err(SamplingError::NoFreeParameters)
        ));
    }

    #[test]
    fn posterior_group_holds_constrained_values() {
        let mut model = Model::new();
        model.add_coord("g", ["a", "b"]).unwrap();
        let s = model.add_prior("s", DistSpec::half_normal(1.0), &[]).unwrap();
        model.add_prior("z", DistSpec::normal(0.0, s), &["g"]).unwrap();
        let density = LogDensity::new(&model).unwrap();

        let chains = vec![vec![vec![0.0, 1.0, 2.0], vec![1.0, 0.0, 0.0]]];
        let group = posterior_group(&density, &chains).unwrap();
        assert_eq!(group.n_chains(), 1);
        assert_eq!(group.n_draws(), 2);
        assert::close(group.get("s").unwrap().element_draws(0)[1], 1.0_f64.exp(), 1E-12);
        assert_eq!(group.get("z").unwrap().element_draws(1), vec![2.0, 0.0]);
        assert_eq!(group.coord("g").map(|c| c.len()), Some(2));
    }

    #[test]
    fn observed_group_follows_data_nodes() {
        let mut model = Model::new();
        let x = model.add_data("x", vec![1.0, 2.0], &[]).unwrap();
        model.add_likelihood("y", DistSpec::normal(0.0, 1.0), x, &[]).unwrap();
        let group = observed_group(&model).unwrap();
        assert_eq!(group.get("y").unwrap().values().len(), 2);
    }
}
