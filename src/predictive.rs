//! Prior and posterior predictive simulation
//!
//! Both walk the model in registration order, so every node sees the values
//! of the nodes it was built from. Priors come either from their own
//! distribution (prior predictive) or from a posterior draw (posterior
//! predictive); deterministics are recomputed and likelihoods are drawn.
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;
use std::borrow::Cow;

use crate::inference::observed_group;
use crate::model::{draw_node, flat_params, Model, ModelError, Node, Role};
use crate::shape::Value;
use crate::trace::{
    Group, GroupBuilder, InferenceData, TraceError, OBSERVED_DATA, PRIOR, PRIOR_PREDICTIVE,
};
use crate::Result;

/// Where prior nodes get their values from
enum PriorValues<'a> {
    Draw,
    Posterior {
        group: &'a Group,
        chain: usize,
        draw: usize,
    },
}

/// One ancestral pass over the model. Returns a value per node.
fn forward<'m, R: Rng>(
    model: &'m Model,
    priors: &PriorValues<'_>,
    rng: &mut R,
) -> Result<Vec<Cow<'m, Value>>> {
    let mut values: Vec<Cow<'m, Value>> = Vec::with_capacity(model.nodes().len());
    for node in model.nodes() {
        let value = match node.role() {
            Role::Data => node.value().map(Cow::Borrowed),
            Role::Prior => match priors {
                PriorValues::Draw => Some(Cow::Owned(draw(node, &values, rng)?)),
                PriorValues::Posterior { group, chain, draw } => {
                    Some(Cow::Owned(posterior_value(node, group, *chain, *draw)?))
                }
            },
            Role::Deterministic => match node.expr() {
                Some(expr) => Some(Cow::Owned(expr.eval(&values)?.into_owned())),
                None => None,
            },
            Role::Likelihood => Some(Cow::Owned(draw(node, &values, rng)?)),
        };
        let value = value.ok_or_else(|| ModelError::UnknownName {
            name: node.name().to_owned(),
        })?;
        values.push(value);
    }
    Ok(values)
}

fn draw<R: Rng>(node: &Node, values: &[Cow<'_, Value>], rng: &mut R) -> Result<Value> {
    let dist = node.dist().ok_or_else(|| ModelError::UnknownName {
        name: node.name().to_owned(),
    })?;
    let params = flat_params(dist, node.shape(), values)?;
    Ok(draw_node(
        node.name(),
        dist.family(),
        &params,
        node.shape(),
        rng,
    )?)
}

fn posterior_value(node: &Node, group: &Group, chain: usize, draw: usize) -> Result<Value> {
    let var = group.try_get(node.name())?;
    let value = var
        .draw(chain, draw)
        .ok_or_else(|| TraceError::MissingVariable {
            name: node.name().to_owned(),
        })?;
    if value.shape() != node.shape() {
        return Err(ModelError::ShapeMismatch {
            name: node.name().to_owned(),
            expected: node.shape().to_vec(),
            got: value.shape().to_vec(),
        }
        .into());
    }
    Ok(value)
}

/// Add one variable per node with `role`, returning their builder indices
fn add_variables(model: &Model, builder: &mut GroupBuilder, roles: &[Role]) -> Vec<(usize, usize)> {
    model
        .nodes()
        .iter()
        .enumerate()
        .filter(|(_, node)| roles.contains(&node.role()))
        .map(|(i, node)| {
            (
                i,
                builder.add_variable(node.name(), node.axis_names(), node.shape()),
            )
        })
        .collect()
}

fn record(
    builder: &mut GroupBuilder,
    vars: &[(usize, usize)],
    values: &[Cow<'_, Value>],
    chain: usize,
    draw: usize,
) {
    for &(node, index) in vars {
        let flat: Vec<f64> = values[node].iter().copied().collect();
        builder.record(index, chain, draw, &flat);
    }
}

fn with_coords(model: &Model, mut builder: GroupBuilder) -> GroupBuilder {
    for (name, labels) in model.coords() {
        builder.set_coord(name, labels.to_vec());
    }
    builder
}

/// Simulate the likelihood nodes once for every draw of `posterior`.
///
/// Data nodes named in `new_data` are swapped on a copy of the model
/// first, so the same call serves both posterior predictive checks (no new
/// data) and out-of-sample predictions. Coordinates whose length changes
/// with the new data are relabeled `0..n`. Deterministics are recomputed
/// from each draw; the posterior itself is only read.
///
/// # Example
///
/// ```
/// use genmodel::prelude::*;
/// use genmodel::trace::POSTERIOR_PREDICTIVE;
///
/// let mut model = Model::new();
/// let x = model.add_data("x", vec![0.0, 1.0, 2.0], &[]).unwrap();
/// let b = model.add_prior("b", DistSpec::normal(0.0, 1.0), &[]).unwrap();
/// model
///     .add_likelihood("y", DistSpec::normal(b * x, 0.1), vec![0.1, 0.9, 2.1], &[])
///     .unwrap();
///
/// let engine = MCMCEngine::new(
///     SamplerConfig::default().with_draws(50).with_tune(50).with_chains(1),
/// );
/// let mut idata = engine.sample(&model, 1).unwrap();
///
/// let future = ndarray::arr1(&[3.0, 4.0]).into_dyn();
/// let preds =
///     predictive_resample(&model, idata.posterior().unwrap(), &[("x", future)], 2).unwrap();
/// assert_eq!(preds.get("y").unwrap().event_shape(), &[2]);
/// idata.add_group(POSTERIOR_PREDICTIVE, preds).unwrap();
/// ```
pub fn predictive_resample(
    model: &Model,
    posterior: &Group,
    new_data: &[(&str, Value)],
    seed: u64,
) -> Result<Group> {
    let mut model = model.clone();
    if !new_data.is_empty() {
        model.set_data_many(new_data, &[])?;
    }
    log::info!(
        "simulating {} likelihood nodes for {} chains x {} draws",
        model.likelihoods().count(),
        posterior.n_chains(),
        posterior.n_draws()
    );

    let mut rng = Xoshiro256Plus::seed_from_u64(seed);
    let mut builder = GroupBuilder::new(posterior.n_chains(), posterior.n_draws());
    let vars = add_variables(&model, &mut builder, &[Role::Likelihood]);

    for chain in 0..posterior.n_chains() {
        for draw in 0..posterior.n_draws() {
            let priors = PriorValues::Posterior {
                group: posterior,
                chain,
                draw,
            };
            let values = forward(&model, &priors, &mut rng)?;
            record(&mut builder, &vars, &values, chain, draw);
        }
    }
    Ok(with_coords(&model, builder).build()?)
}

/// Draw from the prior and the prior predictive by ancestral sampling.
///
/// Returns an [`InferenceData`] with a single chain in the `prior` group
/// (priors and deterministics) and the `prior_predictive` group
/// (likelihoods), plus the `observed_data` group.
pub fn sample_prior_predictive(model: &Model, draws: usize, seed: u64) -> Result<InferenceData> {
    log::info!("drawing {draws} prior predictive samples");
    let mut rng = Xoshiro256Plus::seed_from_u64(seed);

    let mut prior = GroupBuilder::new(1, draws);
    let prior_vars = add_variables(model, &mut prior, &[Role::Prior, Role::Deterministic]);
    let mut predictive = GroupBuilder::new(1, draws);
    let predictive_vars = add_variables(model, &mut predictive, &[Role::Likelihood]);

    for draw in 0..draws {
        let values = forward(model, &PriorValues::Draw, &mut rng)?;
        record(&mut prior, &prior_vars, &values, 0, draw);
        record(&mut predictive, &predictive_vars, &values, 0, draw);
    }

    let mut idata = InferenceData::new();
    idata.add_group(PRIOR, with_coords(model, prior).build()?)?;
    idata.add_group(PRIOR_PREDICTIVE, with_coords(model, predictive).build()?)?;
    let observed = observed_group(model)?;
    if !observed.is_empty() {
        idata.add_group(OBSERVED_DATA, observed)?;
    }
    idata.set_attr("seed", seed.to_string());
    Ok(idata)
}
