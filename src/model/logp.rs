//! The joint log density of a model over unconstrained coordinates
use finitediff::FiniteDiff;
use rand::Rng;
use std::borrow::Cow;

use super::{DistSpec, Model, ModelError, NodeId, NodeKind, Role, VarRef};
use crate::dist::{Distribution, Family};
use crate::shape::{broadcast_flat, from_shape_vec, size_of, Value};
use crate::transform::Transform;

/// Where a prior node occupies the flat parameter vector
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Slot {
    var: VarRef,
    offset: usize,
    size: usize,
}

impl Slot {
    #[inline]
    pub fn var(&self) -> VarRef {
        self.var
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.size
    }
}

#[derive(Clone, Copy)]
enum PriorSource<'a> {
    Unconstrained(&'a [f64]),
    Moment,
}

struct Walk<'m> {
    values: Vec<Cow<'m, Value>>,
    terms: Vec<f64>,
    theta: Vec<f64>,
}

/// Joint log density of the priors and likelihoods of a model, as a
/// function of the unconstrained parameter vector.
///
/// The priors are laid out in registration order, each flattened in
/// row-major order. See [`LogDensity::slots`].
///
/// # Example
///
/// ```
/// use genmodel::model::{DistSpec, LogDensity, Model};
///
/// let mut model = Model::new();
/// let mu = model.add_prior("mu", DistSpec::normal(0.0, 1.0), &[]).unwrap();
/// model
///     .add_likelihood("y", DistSpec::normal(mu, 1.0), vec![0.2, -0.1], &[])
///     .unwrap();
///
/// let density = LogDensity::new(&model).unwrap();
/// assert_eq!(density.dim(), 1);
/// assert!(density.logp(&[0.0]) > density.logp(&[3.0]));
/// ```
#[derive(Clone, Debug)]
pub struct LogDensity<'m> {
    model: &'m Model,
    slots: Vec<Slot>,
    dim: usize,
}

impl<'m> LogDensity<'m> {
    /// Fails if a likelihood's observations no longer match its shape,
    /// which happens after [`Model::set_data`] resizes its coordinates.
    pub fn new(model: &'m Model) -> Result<Self, ModelError> {
        for var in model.likelihoods() {
            let node = &model.nodes()[var.id().0];
            match model.observed_value(node) {
                Some(obs) if obs.shape() == node.shape() => (),
                Some(obs) => {
                    return Err(ModelError::ShapeMismatch {
                        name: node.name().to_owned(),
                        expected: node.shape().to_vec(),
                        got: obs.shape().to_vec(),
                    })
                }
                None => return Err(ModelError::UnknownNode { var }),
            }
        }

        let mut offset = 0;
        let slots = model
            .priors()
            .map(|var| {
                let size = size_of(model.shape_of(var));
                let slot = Slot { var, offset, size };
                offset += size;
                slot
            })
            .collect();

        Ok(LogDensity {
            model,
            slots,
            dim: offset,
        })
    }

    #[inline]
    pub fn model(&self) -> &'m Model {
        self.model
    }

    /// Length of the unconstrained parameter vector
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Log density at `theta`. Invalid points (parameters outside their
    /// domain, index errors, NaN) have log density `-∞`.
    pub fn logp(&self, theta: &[f64]) -> f64 {
        match self.walk(PriorSource::Unconstrained(theta)) {
            Ok(walk) => {
                let total: f64 = walk.terms.iter().sum();
                if total.is_nan() {
                    f64::NEG_INFINITY
                } else {
                    total
                }
            }
            Err(_) => f64::NEG_INFINITY,
        }
    }

    /// Gradient of [`LogDensity::logp`] by central differences
    pub fn grad(&self, theta: &[f64]) -> Vec<f64> {
        theta
            .to_vec()
            .central_diff(&|t: &Vec<f64>| self.logp(t))
    }

    pub fn logp_and_grad(&self, theta: &[f64]) -> (f64, Vec<f64>) {
        (self.logp(theta), self.grad(theta))
    }

    /// The log density contributed by each prior and likelihood at `theta`
    pub fn node_terms(&self, theta: &[f64]) -> Result<Vec<(VarRef, f64)>, ModelError> {
        let walk = self.walk(PriorSource::Unconstrained(theta))?;
        let terms = self
            .model
            .nodes()
            .iter()
            .enumerate()
            .filter(|(_, node)| matches!(node.role(), Role::Prior | Role::Likelihood))
            .map(|(i, node)| (VarRef::new(node.role(), NodeId(i)), walk.terms[i]))
            .collect();
        Ok(terms)
    }

    /// Constrained values of every prior and deterministic node at `theta`
    pub fn point(&self, theta: &[f64]) -> Result<Vec<(VarRef, Value)>, ModelError> {
        let walk = self.walk(PriorSource::Unconstrained(theta))?;
        Ok(self.collect_free(walk))
    }

    fn collect_free(&self, walk: Walk<'m>) -> Vec<(VarRef, Value)> {
        let model = self.model;
        walk.values
            .into_iter()
            .zip(model.nodes())
            .enumerate()
            .filter(|(_, (_, node))| matches!(node.role(), Role::Prior | Role::Deterministic))
            .map(|(i, (value, node))| {
                (VarRef::new(node.role(), NodeId(i)), value.into_owned())
            })
            .collect()
    }

    /// Unconstrained coordinates of the point where every prior sits at its
    /// moment (mean, median or location) given its parents
    pub fn moment_point(&self) -> Result<Vec<f64>, ModelError> {
        self.walk(PriorSource::Moment).map(|walk| walk.theta)
    }

    fn walk(&self, source: PriorSource<'_>) -> Result<Walk<'m>, ModelError> {
        if let PriorSource::Unconstrained(theta) = source {
            if theta.len() != self.dim {
                return Err(ModelError::ShapeMismatch {
                    name: String::from("theta"),
                    expected: vec![self.dim],
                    got: vec![theta.len()],
                });
            }
        }

        let model = self.model;
        let n = model.nodes().len();
        let mut values: Vec<Cow<'m, Value>> = Vec::with_capacity(n);
        let mut terms = vec![0.0; n];
        let mut theta_out = Vec::with_capacity(self.dim);
        let mut offset = 0;

        for (i, node) in model.nodes().iter().enumerate() {
            match &node.kind {
                NodeKind::Data { value } => values.push(Cow::Borrowed(value)),
                NodeKind::Prior { dist } => {
                    let family = dist.family();
                    let shape = node.shape();
                    let params = flat_params(dist, shape, &values)?;
                    let size = size_of(shape);
                    let mut xs = Vec::with_capacity(size);
                    let mut ln_jac = 0.0;
                    for (j, elem) in params.iter().enumerate() {
                        let transform = Transform::for_domain(family.domain(), elem);
                        let (x, y) = match source {
                            PriorSource::Unconstrained(theta) => {
                                let y = theta[offset + j];
                                (transform.backward(y), y)
                            }
                            PriorSource::Moment => {
                                let x = element_moment(family, elem);
                                (x, transform.forward(x))
                            }
                        };
                        ln_jac += transform.ln_jacobian(y);
                        theta_out.push(y);
                        xs.push(x);
                    }
                    terms[i] = ln_density(family, &params, &xs, shape) + ln_jac;
                    offset += size;
                    values.push(Cow::Owned(from_shape_vec(shape, xs)?));
                }
                NodeKind::Deterministic { expr } => {
                    values.push(Cow::Owned(expr.eval(&values)?.into_owned()));
                }
                NodeKind::Likelihood { dist, .. } => {
                    let obs = model
                        .observed_value(node)
                        .ok_or_else(|| ModelError::UnknownName {
                            name: node.name().to_owned(),
                        })?;
                    let params = flat_params(dist, node.shape(), &values)?;
                    let xs: Vec<f64> = obs.iter().copied().collect();
                    if xs.len() != params.len() {
                        return Err(ModelError::ShapeMismatch {
                            name: node.name().to_owned(),
                            expected: node.shape().to_vec(),
                            got: obs.shape().to_vec(),
                        });
                    }
                    terms[i] = ln_density(dist.family(), &params, &xs, node.shape());
                    values.push(Cow::Borrowed(obs));
                }
            }
        }

        Ok(Walk {
            values,
            terms,
            theta: theta_out,
        })
    }
}

fn element_moment(family: Family, params: &[f64]) -> f64 {
    if family.is_vector() {
        return 0.0;
    }
    Distribution::build(family, params).map_or(f64::NAN, |dist| dist.moment())
}

/// Evaluate the parameters of `dist`, broadcast to `shape`, and regroup
/// them by element: `out[j][k]` is parameter `k` of element `j`.
pub(crate) fn flat_params(
    dist: &DistSpec,
    shape: &[usize],
    values: &[Cow<'_, Value>],
) -> Result<Vec<Vec<f64>>, ModelError> {
    let size = size_of(shape);
    let mut out = vec![Vec::with_capacity(dist.params().len()); size];
    for param in dist.params() {
        let value = param.eval(values)?;
        let flat = broadcast_flat(&value, shape)?;
        for (elem, x) in out.iter_mut().zip(flat) {
            elem.push(x);
        }
    }
    Ok(out)
}

/// Log density of the flattened node `xs` of the given shape. Vector
/// families score each lane of the last axis as one sequence using the
/// parameters of its first element.
pub(crate) fn ln_density(
    family: Family,
    params: &[Vec<f64>],
    xs: &[f64],
    shape: &[usize],
) -> f64 {
    if family.is_vector() {
        let lane = shape.last().copied().unwrap_or(1).max(1);
        return xs
            .chunks(lane)
            .zip(params.chunks(lane))
            .map(|(seq, p)| {
                p.first()
                    .and_then(|p| Distribution::build(family, p).ok())
                    .map_or(f64::NEG_INFINITY, |dist| dist.ln_f_seq(seq))
            })
            .sum();
    }
    xs.iter()
        .zip(params)
        .map(|(&x, p)| {
            Distribution::build(family, p).map_or(f64::NEG_INFINITY, |dist| dist.ln_f(x))
        })
        .sum()
}

/// Draw a whole node of `shape` given its per-element parameters
pub(crate) fn draw_node<R: Rng>(
    name: &str,
    family: Family,
    params: &[Vec<f64>],
    shape: &[usize],
    rng: &mut R,
) -> Result<Value, ModelError> {
    let invalid = |source| ModelError::InvalidParams {
        name: name.to_owned(),
        source,
    };
    let mut xs = Vec::with_capacity(params.len());
    if family.is_vector() {
        let lane = shape.last().copied().unwrap_or(1).max(1);
        for p in params.chunks(lane) {
            if let Some(first) = p.first() {
                let dist = Distribution::build(family, first).map_err(invalid)?;
                xs.extend(dist.draw_seq(p.len(), rng));
            }
        }
    } else {
        for p in params {
            let dist = Distribution::build(family, p).map_err(invalid)?;
            xs.push(dist.draw(rng));
        }
    }
    Ok(from_shape_vec(shape, xs)?)
}
