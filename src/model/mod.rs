//! Declarative generative models
//!
//! A [`Model`] is an ordered registry of named nodes. Each registration
//! returns a [`VarRef`] handle tagged with the node's role, and parameter
//! expressions can only be built from handles that already exist, so the
//! dependency graph is acyclic by construction. Shapes are resolved when a
//! node is registered, so a likelihood that does not match its data fails
//! right away instead of at sampling time.
mod expr;
mod logp;
mod spec;

pub use expr::{BinaryOp, Expr, ExprExt, UnaryOp};
pub use logp::{LogDensity, Slot};
pub use spec::DistSpec;

pub(crate) use logp::{draw_node, flat_params};

use itertools::Itertools;
use ndarray::Array1;
use std::fmt;

use crate::dist::{Family, ParamError};
use crate::shape::{broadcast_all, broadcasts_to, size_of, IntoValue, ShapeError, Value};

/// Error building or modifying a model
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ModelError {
    /// A node or coordinate with this name already exists
    #[error("a node or coordinate named '{name}' already exists")]
    NameCollision { name: String },
    /// No node with this name
    #[error("no node named '{name}'")]
    UnknownName { name: String },
    /// No coordinate with this name
    #[error("no coordinate named '{name}'")]
    UnknownDim { name: String },
    /// The handle does not point at a registered node of its role
    #[error("{var:?} does not refer to a registered node")]
    UnknownNode { var: VarRef },
    /// Only data nodes can be swapped
    #[error("'{name}' is not a data node")]
    NotData { name: String },
    /// Discrete families can only be observed
    #[error("'{name}' cannot have a discrete {family} prior")]
    DiscretePrior { name: String, family: Family },
    /// A node's shape disagrees with its dims or its data
    #[error("shape mismatch for '{name}': expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        name: String,
        expected: Vec<usize>,
        got: Vec<usize>,
    },
    /// The parameters of a vector family must be scalars and the node needs
    /// at least one axis
    #[error("{family} node '{name}' needs scalar parameters and at least one axis")]
    VectorShape { name: String, family: Family },
    /// Wrong number of parameters for a family
    #[error("{family} takes {expected} parameters, got {got}")]
    ArityMismatch {
        family: Family,
        expected: usize,
        got: usize,
    },
    /// An index expression points outside of its source
    #[error("index {index} is out of bounds for length {len}")]
    IndexOutOfBounds { index: f64, len: usize },
    /// Parameter values outside of the family's domain
    #[error("invalid parameters for '{name}': {source}")]
    InvalidParams {
        name: String,
        #[source]
        source: ParamError,
    },
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// Position of a node in its model
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

/// What a node is for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Swappable constant, e.g. covariates
    Data,
    /// Unobserved random variable, inferred by the engines
    Prior,
    /// Pure function of other nodes, recorded alongside the priors
    Deterministic,
    /// Observed random variable
    Likelihood,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Data => "data",
            Role::Prior => "prior",
            Role::Deterministic => "deterministic",
            Role::Likelihood => "likelihood",
        };
        write!(f, "{s}")
    }
}

/// Handle to a registered node, tagged with its role
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VarRef {
    Data(NodeId),
    Prior(NodeId),
    Deterministic(NodeId),
    Likelihood(NodeId),
}

impl VarRef {
    fn new(role: Role, id: NodeId) -> Self {
        match role {
            Role::Data => VarRef::Data(id),
            Role::Prior => VarRef::Prior(id),
            Role::Deterministic => VarRef::Deterministic(id),
            Role::Likelihood => VarRef::Likelihood(id),
        }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        match self {
            VarRef::Data(id)
            | VarRef::Prior(id)
            | VarRef::Deterministic(id)
            | VarRef::Likelihood(id) => *id,
        }
    }

    #[inline]
    pub fn role(&self) -> Role {
        match self {
            VarRef::Data(_) => Role::Data,
            VarRef::Prior(_) => Role::Prior,
            VarRef::Deterministic(_) => Role::Deterministic,
            VarRef::Likelihood(_) => Role::Likelihood,
        }
    }
}

/// The data a likelihood is bound to
#[derive(Clone, Debug, PartialEq)]
pub enum Observed {
    /// Fixed observations
    Values(Value),
    /// Observations held in a data node, so they can be swapped with
    /// [`Model::set_data`]
    Data(VarRef),
}

/// Conversion into [`Observed`]
pub trait IntoObserved {
    fn into_observed(self) -> Observed;
}

impl IntoObserved for Observed {
    fn into_observed(self) -> Observed {
        self
    }
}

impl IntoObserved for VarRef {
    fn into_observed(self) -> Observed {
        Observed::Data(self)
    }
}

impl IntoObserved for Value {
    fn into_observed(self) -> Observed {
        Observed::Values(self)
    }
}

impl IntoObserved for &Value {
    fn into_observed(self) -> Observed {
        Observed::Values(self.clone())
    }
}

impl IntoObserved for Array1<f64> {
    fn into_observed(self) -> Observed {
        Observed::Values(self.into_value())
    }
}

impl IntoObserved for Vec<f64> {
    fn into_observed(self) -> Observed {
        Observed::Values(self.into_value())
    }
}

impl IntoObserved for &Vec<f64> {
    fn into_observed(self) -> Observed {
        Observed::Values(self.into_value())
    }
}

impl IntoObserved for &[f64] {
    fn into_observed(self) -> Observed {
        Observed::Values(self.into_value())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum NodeKind {
    Data { value: Value },
    Prior { dist: DistSpec },
    Deterministic { expr: Expr },
    Likelihood { dist: DistSpec, observed: Observed },
}

/// A registered node
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    name: String,
    dims: Vec<String>,
    shape: Vec<usize>,
    pub(crate) kind: NodeKind,
}

impl Node {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The coordinate names the node was declared with. May be empty even
    /// when the node is not a scalar.
    #[inline]
    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of elements
    #[inline]
    pub fn size(&self) -> usize {
        size_of(&self.shape)
    }

    pub fn role(&self) -> Role {
        match self.kind {
            NodeKind::Data { .. } => Role::Data,
            NodeKind::Prior { .. } => Role::Prior,
            NodeKind::Deterministic { .. } => Role::Deterministic,
            NodeKind::Likelihood { .. } => Role::Likelihood,
        }
    }

    /// The distribution of a prior or likelihood
    pub fn dist(&self) -> Option<&DistSpec> {
        match &self.kind {
            NodeKind::Prior { dist } | NodeKind::Likelihood { dist, .. } => Some(dist),
            _ => None,
        }
    }

    /// The value of a data node
    pub fn value(&self) -> Option<&Value> {
        match &self.kind {
            NodeKind::Data { value } => Some(value),
            _ => None,
        }
    }

    pub fn expr(&self) -> Option<&Expr> {
        match &self.kind {
            NodeKind::Deterministic { expr } => Some(expr),
            _ => None,
        }
    }

    pub fn observed(&self) -> Option<&Observed> {
        match &self.kind {
            NodeKind::Likelihood { observed, .. } => Some(observed),
            _ => None,
        }
    }

    /// One dimension name per axis. Axes without a declared coordinate are
    /// named `{name}_dim_{axis}`.
    pub fn axis_names(&self) -> Vec<String> {
        (0..self.shape.len())
            .map(|axis| {
                self.dims
                    .get(axis)
                    .cloned()
                    .unwrap_or_else(|| format!("{}_dim_{axis}", self.name))
            })
            .collect()
    }
}

/// A named dimension and its labels
#[derive(Clone, Debug, PartialEq, Eq)]
struct Coord {
    name: String,
    labels: Vec<String>,
}

/// Registry of named coordinates and nodes
///
/// # Example
///
/// A two-level hierarchical model with per-group intercepts:
///
/// ```
/// use genmodel::model::{DistSpec, ExprExt, Model};
///
/// let group = vec![0_usize, 0, 1, 1, 2, 2];
/// let y = vec![1.1, 0.9, 2.1, 1.8, 3.2, 2.9];
///
/// let mut model = Model::new();
/// model.add_coord("group", ["a", "b", "c"]).unwrap();
/// model.add_coord_len("obs", y.len()).unwrap();
///
/// let idx = model.add_data("group_idx", group, &["obs"]).unwrap();
/// let mu = model.add_prior("mu", DistSpec::normal(0.0, 5.0), &[]).unwrap();
/// let tau = model.add_prior("tau", DistSpec::half_normal(1.0), &[]).unwrap();
/// let alpha = model
///     .add_prior("alpha", DistSpec::normal(mu, tau), &["group"])
///     .unwrap();
/// let sigma = model.add_prior("sigma", DistSpec::half_normal(1.0), &[]).unwrap();
/// model
///     .add_likelihood("y", DistSpec::normal(alpha.take(idx), sigma), y, &["obs"])
///     .unwrap();
///
/// assert_eq!(model.shape_of(alpha), &[3]);
/// assert_eq!(model.n_free(), 6);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Model {
    coords: Vec<Coord>,
    nodes: Vec<Node>,
}

impl Model {
    pub fn new() -> Self {
        Model::default()
    }

    /// Register a named dimension with the given labels
    pub fn add_coord<I, S>(&mut self, name: &str, labels: I) -> Result<(), ModelError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.name_taken(name) {
            return Err(ModelError::NameCollision {
                name: name.to_owned(),
            });
        }
        self.coords.push(Coord {
            name: name.to_owned(),
            labels: labels.into_iter().map(Into::into).collect(),
        });
        Ok(())
    }

    /// Register a named dimension of length `n`, labeled `0..n`
    pub fn add_coord_len(&mut self, name: &str, n: usize) -> Result<(), ModelError> {
        self.add_coord(name, (0..n).map(|i| i.to_string()))
    }

    /// Register a swappable constant
    pub fn add_data<V: IntoValue>(
        &mut self,
        name: &str,
        value: V,
        dims: &[&str],
    ) -> Result<VarRef, ModelError> {
        let kind = NodeKind::Data {
            value: value.into_value(),
        };
        self.register(name, dims, kind)
    }

    /// Register an unobserved random variable.
    ///
    /// Without dims the node takes the broadcast shape of its parameters.
    /// With dims, the parameters must broadcast to the shape of the dims.
    pub fn add_prior(
        &mut self,
        name: &str,
        dist: DistSpec,
        dims: &[&str],
    ) -> Result<VarRef, ModelError> {
        if dist.family().is_discrete() {
            return Err(ModelError::DiscretePrior {
                name: name.to_owned(),
                family: dist.family(),
            });
        }
        self.register(name, dims, NodeKind::Prior { dist })
    }

    /// Register a pure function of existing nodes
    pub fn add_deterministic<E: Into<Expr>>(
        &mut self,
        name: &str,
        expr: E,
        dims: &[&str],
    ) -> Result<VarRef, ModelError> {
        let kind = NodeKind::Deterministic { expr: expr.into() };
        self.register(name, dims, kind)
    }

    /// Register an observed random variable.
    ///
    /// The observed values must have exactly the shape of the dims (or,
    /// without dims, the parameters must broadcast to the shape of the
    /// observations).
    pub fn add_likelihood<O: IntoObserved>(
        &mut self,
        name: &str,
        dist: DistSpec,
        observed: O,
        dims: &[&str],
    ) -> Result<VarRef, ModelError> {
        let kind = NodeKind::Likelihood {
            dist,
            observed: observed.into_observed(),
        };
        self.register(name, dims, kind)
    }

    fn register(
        &mut self,
        name: &str,
        dims: &[&str],
        kind: NodeKind,
    ) -> Result<VarRef, ModelError> {
        if self.name_taken(name) {
            return Err(ModelError::NameCollision {
                name: name.to_owned(),
            });
        }
        let dims: Vec<String> = dims.iter().map(|&d| d.to_owned()).collect();
        let shape = infer_shape(&self.coords, &self.nodes, name, &dims, &kind, true)?;
        let node = Node {
            name: name.to_owned(),
            dims,
            shape,
            kind,
        };
        let var = VarRef::new(node.role(), NodeId(self.nodes.len()));
        log::debug!("registered {} '{}' with shape {:?}", var.role(), name, node.shape);
        self.nodes.push(node);
        Ok(var)
    }

    /// Swap the value of a data node.
    ///
    /// `coords` replaces the labels of the given coordinates. Coordinates of
    /// the data node whose length changes without new labels are relabeled
    /// `0..n`. Every node's shape is then resolved again; on failure the
    /// model is left untouched. Likelihoods whose observations no longer
    /// match are allowed here (they are only needed to fit the model, not
    /// to predict from it) and fail when a log density is built.
    ///
    /// To resize a coordinate shared by several data nodes, swap them
    /// together with [`Model::set_data_many`].
    pub fn set_data<V: IntoValue>(
        &mut self,
        name: &str,
        value: V,
        coords: &[(&str, Vec<String>)],
    ) -> Result<(), ModelError> {
        self.set_data_many(&[(name, value.into_value())], coords)
    }

    /// Swap the values of several data nodes at once.
    ///
    /// Every value and coordinate label is written first and shapes are
    /// resolved once afterwards, so covariates and observations sharing a
    /// coordinate can change length together. Otherwise behaves like
    /// [`Model::set_data`].
    ///
    /// ```
    /// use genmodel::model::{DistSpec, Model};
    ///
    /// let mut model = Model::new();
    /// model.add_coord_len("obs", 3).unwrap();
    /// let x = model.add_data("x", vec![0.0, 1.0, 2.0], &["obs"]).unwrap();
    /// let y = model.add_data("y", vec![0.1, 1.1, 1.9], &["obs"]).unwrap();
    /// let b = model.add_prior("b", DistSpec::normal(0.0, 1.0), &[]).unwrap();
    /// model
    ///     .add_likelihood("lik", DistSpec::normal(b * x, 1.0), y, &["obs"])
    ///     .unwrap();
    ///
    /// let x_new = ndarray::arr1(&[3.0, 4.0]).into_dyn();
    /// let y_new = ndarray::arr1(&[3.1, 3.9]).into_dyn();
    /// model.set_data_many(&[("x", x_new), ("y", y_new)], &[]).unwrap();
    /// assert_eq!(model.coord("obs").map(|c| c.len()), Some(2));
    /// ```
    pub fn set_data_many(
        &mut self,
        values: &[(&str, Value)],
        coords: &[(&str, Vec<String>)],
    ) -> Result<(), ModelError> {
        let mut indices = Vec::with_capacity(values.len());
        for (name, _) in values {
            let index = self.index_of(name).ok_or_else(|| ModelError::UnknownName {
                name: (*name).to_owned(),
            })?;
            if self.nodes[index].role() != Role::Data {
                return Err(ModelError::NotData {
                    name: (*name).to_owned(),
                });
            }
            indices.push(index);
        }

        let mut next = self.clone();
        for (coord, labels) in coords {
            let entry = next
                .coords
                .iter_mut()
                .find(|c| c.name == *coord)
                .ok_or_else(|| ModelError::UnknownDim {
                    name: (*coord).to_owned(),
                })?;
            entry.labels = labels.clone();
        }

        for (&index, (name, value)) in indices.iter().zip(values) {
            let dims = next.nodes[index].dims.clone();
            if !dims.is_empty() && dims.len() != value.ndim() {
                return Err(ModelError::ShapeMismatch {
                    name: (*name).to_owned(),
                    expected: next.dims_shape(&dims)?,
                    got: value.shape().to_vec(),
                });
            }
            for (dim, &len) in dims.iter().zip(value.shape()) {
                let supplied = coords.iter().any(|(c, _)| c == dim);
                if let Some(entry) = next.coords.iter_mut().find(|c| &c.name == dim) {
                    if !supplied && entry.labels.len() != len {
                        entry.labels = (0..len).map(|i| i.to_string()).collect();
                    }
                }
            }
            next.nodes[index].kind = NodeKind::Data {
                value: value.clone(),
            };
        }

        for i in 0..next.nodes.len() {
            let (done, rest) = next.nodes.split_at_mut(i);
            let node = &mut rest[0];
            node.shape =
                infer_shape(&next.coords, done, &node.name, &node.dims, &node.kind, false)?;
        }

        log::debug!(
            "swapped data nodes {}",
            values.iter().map(|(name, _)| format!("'{name}'")).join(", ")
        );
        *self = next;
        Ok(())
    }

    fn name_taken(&self, name: &str) -> bool {
        self.index_of(name).is_some() || self.coord(name).is_some()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|node| node.name == name)
    }

    fn dims_shape(&self, dims: &[String]) -> Result<Vec<usize>, ModelError> {
        dims_shape(&self.coords, dims)
    }

    /// The labels of a coordinate
    pub fn coord(&self, name: &str) -> Option<&[String]> {
        self.coords
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.labels.as_slice())
    }

    /// All coordinates in registration order
    pub fn coords(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.coords
            .iter()
            .map(|c| (c.name.as_str(), c.labels.as_slice()))
    }

    /// All nodes in registration order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// The node behind a handle
    pub fn node(&self, var: VarRef) -> Option<&Node> {
        self.nodes
            .get(var.id().0)
            .filter(|node| node.role() == var.role())
    }

    /// Handle of the node called `name`
    pub fn var(&self, name: &str) -> Option<VarRef> {
        self.index_of(name)
            .map(|i| VarRef::new(self.nodes[i].role(), NodeId(i)))
    }

    /// Shape of a node
    ///
    /// # Panics
    ///
    /// Panics if `var` was not created by this model.
    pub fn shape_of(&self, var: VarRef) -> &[usize] {
        &self.nodes[var.id().0].shape
    }

    fn vars_with_role(&self, role: Role) -> impl Iterator<Item = VarRef> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, node)| node.role() == role)
            .map(move |(i, _)| VarRef::new(role, NodeId(i)))
    }

    pub fn priors(&self) -> impl Iterator<Item = VarRef> + '_ {
        self.vars_with_role(Role::Prior)
    }

    pub fn deterministics(&self) -> impl Iterator<Item = VarRef> + '_ {
        self.vars_with_role(Role::Deterministic)
    }

    pub fn likelihoods(&self) -> impl Iterator<Item = VarRef> + '_ {
        self.vars_with_role(Role::Likelihood)
    }

    pub fn data(&self) -> impl Iterator<Item = VarRef> + '_ {
        self.vars_with_role(Role::Data)
    }

    /// Total number of free (prior) elements
    pub fn n_free(&self) -> usize {
        self.priors().map(|var| size_of(self.shape_of(var))).sum()
    }

    /// Current observations of a likelihood node
    pub(crate) fn observed_value<'a>(&'a self, node: &'a Node) -> Option<&'a Value> {
        match node.observed()? {
            Observed::Values(value) => Some(value),
            Observed::Data(var) => self.node(*var)?.value(),
        }
    }
}

fn dims_shape(coords: &[Coord], dims: &[String]) -> Result<Vec<usize>, ModelError> {
    dims.iter()
        .map(|dim| {
            coords
                .iter()
                .find(|c| &c.name == dim)
                .map(|c| c.labels.len())
                .ok_or_else(|| ModelError::UnknownDim { name: dim.clone() })
        })
        .collect()
}

fn params_shape(dist: &DistSpec, nodes: &[Node]) -> Result<Vec<usize>, ModelError> {
    let shapes = dist
        .params()
        .iter()
        .map(|p| p.infer_shape(nodes))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(broadcast_all(shapes.iter().map(Vec::as_slice))?)
}

fn check_vector_family(
    name: &str,
    dist: &DistSpec,
    nodes: &[Node],
    shape: &[usize],
) -> Result<(), ModelError> {
    if !dist.family().is_vector() {
        return Ok(());
    }
    let scalar_params = dist
        .params()
        .iter()
        .map(|p| p.infer_shape(nodes))
        .collect::<Result<Vec<_>, _>>()?
        .iter()
        .all(|s| size_of(s) == 1);
    if scalar_params && !shape.is_empty() {
        Ok(())
    } else {
        Err(ModelError::VectorShape {
            name: name.to_owned(),
            family: dist.family(),
        })
    }
}

fn mismatch(name: &str, expected: &[usize], got: &[usize]) -> ModelError {
    ModelError::ShapeMismatch {
        name: name.to_owned(),
        expected: expected.to_vec(),
        got: got.to_vec(),
    }
}

/// Resolve the shape of a node against the coordinates and the nodes
/// registered before it. `strict` rejects likelihoods whose observations
/// disagree with the resolved shape.
fn infer_shape(
    coords: &[Coord],
    nodes: &[Node],
    name: &str,
    dims: &[String],
    kind: &NodeKind,
    strict: bool,
) -> Result<Vec<usize>, ModelError> {
    let declared = if dims.is_empty() {
        None
    } else {
        Some(dims_shape(coords, dims)?)
    };

    match kind {
        NodeKind::Data { value } => match declared {
            Some(expected) if expected != value.shape() => {
                Err(mismatch(name, &expected, value.shape()))
            }
            _ => Ok(value.shape().to_vec()),
        },
        NodeKind::Deterministic { expr } => {
            let shape = expr.infer_shape(nodes)?;
            match declared {
                Some(expected) if expected != shape => Err(mismatch(name, &expected, &shape)),
                _ => Ok(shape),
            }
        }
        NodeKind::Prior { dist } => {
            let pshape = params_shape(dist, nodes)?;
            let shape = match declared {
                Some(target) if dist.family().is_vector() || broadcasts_to(&pshape, &target) => {
                    target
                }
                Some(target) => return Err(mismatch(name, &target, &pshape)),
                None => pshape,
            };
            check_vector_family(name, dist, nodes, &shape)?;
            Ok(shape)
        }
        NodeKind::Likelihood { dist, observed } => {
            let pshape = params_shape(dist, nodes)?;
            let oshape = match observed {
                Observed::Values(value) => value.shape().to_vec(),
                Observed::Data(var) => match nodes.get(var.id().0) {
                    Some(node) if node.role() == Role::Data => node.shape.clone(),
                    _ => return Err(ModelError::UnknownNode { var: *var }),
                },
            };
            let fits = |target: &[usize]| dist.family().is_vector() || broadcasts_to(&pshape, target);
            let shape = match declared {
                Some(target) => {
                    if !fits(&target) {
                        return Err(mismatch(name, &target, &pshape));
                    }
                    if strict && oshape != target {
                        return Err(mismatch(name, &target, &oshape));
                    }
                    target
                }
                None if fits(&oshape) => oshape,
                None if strict => return Err(mismatch(name, &oshape, &pshape)),
                None => pshape,
            };
            check_vector_family(name, dist, nodes, &shape)?;
            Ok(shape)
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            let what = match &node.kind {
                NodeKind::Data { .. } => String::from("data"),
                NodeKind::Prior { dist } => format!("~ {}", dist.family()),
                NodeKind::Deterministic { .. } => String::from("deterministic"),
                NodeKind::Likelihood { dist, .. } => format!("~ {} (observed)", dist.family()),
            };
            if node.dims.is_empty() {
                writeln!(f, "{} {} {:?}", node.name, what, node.shape)?;
            } else {
                writeln!(f, "{} {} ({})", node.name, what, node.dims.join(", "))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_model(n: usize) -> (Model, VarRef) {
        let xs: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x + 1.0).collect();
        let mut model = Model::new();
        model.add_coord_len("obs", n).unwrap();
        let x = model.add_data("x", xs, &["obs"]).unwrap();
        let a = model.add_prior("a", DistSpec::normal(0.0, 1.0), &[]).unwrap();
        let b = model.add_prior("b", DistSpec::normal(0.0, 1.0), &[]).unwrap();
        let s = model.add_prior("s", DistSpec::half_normal(1.0), &[]).unwrap();
        let mu = model.add_deterministic("mu", a + b * x, &["obs"]).unwrap();
        model
            .add_likelihood("y", DistSpec::normal(mu, s), ys, &["obs"])
            .unwrap();
        (model, x)
    }

    #[test]
    fn handles_carry_roles() {
        let (model, x) = linear_model(5);
        assert_eq!(x.role(), Role::Data);
        assert_eq!(model.var("a").map(|v| v.role()), Some(Role::Prior));
        assert_eq!(model.var("mu").map(|v| v.role()), Some(Role::Deterministic));
        assert_eq!(model.var("y").map(|v| v.role()), Some(Role::Likelihood));
        assert_eq!(model.priors().count(), 3);
        assert_eq!(model.n_free(), 3);
    }

    #[test]
    fn duplicate_names_collide() {
        let (mut model, _) = linear_model(5);
        let err = model
            .add_prior("a", DistSpec::normal(0.0, 1.0), &[])
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::NameCollision {
                name: String::from("a")
            }
        );
        assert!(model.add_coord_len("obs", 3).is_err());
    }

    #[test]
    fn likelihood_rejects_wrong_length() {
        let mut model = Model::new();
        model.add_coord_len("obs", 100).unwrap();
        let mu = model.add_prior("mu", DistSpec::normal(0.0, 1.0), &[]).unwrap();
        let err = model
            .add_likelihood("y", DistSpec::normal(mu, 1.0), vec![0.0; 90], &["obs"])
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::ShapeMismatch {
                name: String::from("y"),
                expected: vec![100],
                got: vec![90],
            }
        );
        assert!(model.var("y").is_none());
    }

    #[test]
    fn parameters_must_broadcast_to_dims() {
        let mut model = Model::new();
        model.add_coord_len("group", 3).unwrap();
        let mu = model
            .add_data("mu", vec![0.0, 1.0], &[])
            .unwrap();
        let err = model
            .add_prior("alpha", DistSpec::normal(mu, 1.0), &["group"])
            .unwrap_err();
        assert!(matches!(err, ModelError::ShapeMismatch { .. }));
    }

    #[test]
    fn discrete_priors_are_rejected() {
        let mut model = Model::new();
        let err = model
            .add_prior("k", DistSpec::poisson(3.0), &[])
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::DiscretePrior {
                name: String::from("k"),
                family: Family::Poisson
            }
        );
    }

    #[test]
    fn unknown_dims_are_rejected() {
        let mut model = Model::new();
        let err = model
            .add_prior("a", DistSpec::normal(0.0, 1.0), &["nope"])
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::UnknownDim {
                name: String::from("nope")
            }
        );
    }

    #[test]
    fn handles_from_a_longer_model_are_unknown() {
        let (other, _) = linear_model(3);
        let foreign = other.var("y").unwrap();
        let mut model = Model::new();
        let err = model
            .add_deterministic("d", Expr::from(foreign) * 2.0, &[])
            .unwrap_err();
        assert_eq!(err, ModelError::UnknownNode { var: foreign });
    }

    #[test]
    fn ar1_needs_scalar_params_and_an_axis() {
        let mut model = Model::new();
        model.add_coord_len("time", 10).unwrap();
        let ok = model.add_prior("walk", DistSpec::ar1(0.5, 1.0), &["time"]);
        assert!(ok.is_ok());
        let err = model
            .add_prior("point", DistSpec::ar1(0.5, 1.0), &[])
            .unwrap_err();
        assert!(matches!(err, ModelError::VectorShape { .. }));
    }

    #[test]
    fn take_checks_static_indices() {
        let mut model = Model::new();
        model.add_coord_len("group", 2).unwrap();
        let idx = model.add_data("idx", vec![0_usize, 1, 2], &[]).unwrap();
        let alpha = model
            .add_prior("alpha", DistSpec::normal(0.0, 1.0), &["group"])
            .unwrap();
        let err = model
            .add_deterministic("theta", alpha.take(idx), &[])
            .unwrap_err();
        assert_eq!(err, ModelError::IndexOutOfBounds { index: 2.0, len: 2 });
    }

    #[test]
    fn set_data_resizes_dependent_nodes() {
        let (mut model, _) = linear_model(10);
        model.set_data("x", vec![0.5; 4], &[]).unwrap();
        assert_eq!(model.coord("obs").map(|c| c.len()), Some(4));
        let mu = model.var("mu").unwrap();
        let y = model.var("y").unwrap();
        assert_eq!(model.shape_of(mu), &[4]);
        assert_eq!(model.shape_of(y), &[4]);
    }

    #[test]
    fn set_data_with_labels() {
        let (mut model, _) = linear_model(3);
        let labels: Vec<String> = ["t1", "t2"].iter().map(|s| s.to_string()).collect();
        model.set_data("x", vec![1.0, 2.0], &[("obs", labels.clone())]).unwrap();
        assert_eq!(model.coord("obs"), Some(labels.as_slice()));
    }

    #[test]
    fn failed_set_data_leaves_model_untouched() {
        let (mut model, _) = linear_model(3);
        let before = model.clone();
        // a 2-d value for a 1-d coordinate
        let bad = ndarray::Array2::<f64>::zeros((2, 2));
        assert!(model.set_data("x", bad, &[]).is_err());
        assert_eq!(model, before);
        assert!(matches!(
            model.set_data("a", vec![1.0], &[]),
            Err(ModelError::NotData { .. })
        ));
        assert!(matches!(
            model.set_data("nope", vec![1.0], &[]),
            Err(ModelError::UnknownName { .. })
        ));
    }

    #[test]
    fn axis_names_fill_in_missing_dims() {
        let mut model = Model::new();
        let v = model.add_data("v", vec![1.0, 2.0], &[]).unwrap();
        let node = model.node(v).unwrap();
        assert_eq!(node.axis_names(), vec![String::from("v_dim_0")]);
    }

    #[test]
    fn display_lists_nodes() {
        let (model, _) = linear_model(3);
        let s = model.to_string();
        assert!(s.contains("a ~ Normal []"));
        assert!(s.contains("y ~ Normal (observed) (obs)"));
    }
}
