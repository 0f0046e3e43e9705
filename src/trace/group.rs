use itertools::Itertools;
use ndarray::{ArrayD, Axis, IxDyn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{TraceError, CHAIN, DRAW};
use crate::shape::{from_shape_vec, size_of};

/// A named array with one dimension name per axis
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "VariableRepr", into = "VariableRepr")]
pub struct Variable {
    name: String,
    dims: Vec<String>,
    values: ArrayD<f64>,
}

impl Variable {
    /// A variable with arbitrary axes, e.g. observed data
    pub fn new(name: &str, dims: Vec<String>, values: ArrayD<f64>) -> Result<Self, TraceError> {
        if dims.len() != values.ndim() {
            return Err(TraceError::Dims {
                name: name.to_owned(),
                dims: dims.len(),
                ndim: values.ndim(),
            });
        }
        Ok(Variable {
            name: name.to_owned(),
            dims,
            values,
        })
    }

    /// A variable of draws shaped `(chain, draw, ...)`. `dims` names the
    /// axes after the first two.
    pub fn draws(name: &str, dims: Vec<String>, values: ArrayD<f64>) -> Result<Self, TraceError> {
        if values.ndim() < 2 {
            return Err(TraceError::Draws {
                name: name.to_owned(),
                shape: values.shape().to_vec(),
                expected: vec![],
            });
        }
        let dims = [CHAIN.to_owned(), DRAW.to_owned()]
            .into_iter()
            .chain(dims)
            .collect();
        Variable::new(name, dims, values)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    #[inline]
    pub fn values(&self) -> &ArrayD<f64> {
        &self.values
    }

    /// `true` if the leading axes are `(chain, draw)`
    pub fn has_draws(&self) -> bool {
        self.dims.len() >= 2 && self.dims[0] == CHAIN && self.dims[1] == DRAW
    }

    /// Shape of a single draw
    pub fn event_shape(&self) -> &[usize] {
        if self.has_draws() {
            &self.values.shape()[2..]
        } else {
            self.values.shape()
        }
    }

    /// Number of scalar elements in a single draw
    pub fn n_elements(&self) -> usize {
        size_of(self.event_shape())
    }

    /// Draws of one scalar element, one `Vec` per chain. `element` indexes
    /// the row-major flattening of a single draw.
    pub fn element_chains(&self, element: usize) -> Vec<Vec<f64>> {
        if !self.has_draws() || element >= self.n_elements() {
            return vec![];
        }
        self.values
            .axis_iter(Axis(0))
            .map(|chain| {
                chain
                    .axis_iter(Axis(0))
                    .filter_map(|draw| draw.iter().nth(element).copied())
                    .collect()
            })
            .collect()
    }

    /// Every draw of every chain of one element, chains concatenated
    pub fn element_draws(&self, element: usize) -> Vec<f64> {
        self.element_chains(element).concat()
    }

    /// Labels for each scalar element, `beta[0]` or `alpha[north]` using
    /// the coordinate labels when the group has them. Scalars are labeled
    /// with the bare name.
    pub fn element_labels(&self, coords: &BTreeMap<String, Vec<String>>) -> Vec<String> {
        let shape = self.event_shape();
        if shape.is_empty() {
            return vec![self.name.clone()];
        }
        let offset = self.dims.len() - shape.len();
        let axis_labels: Vec<Vec<String>> = shape
            .iter()
            .enumerate()
            .map(|(axis, &len)| match coords.get(&self.dims[offset + axis]) {
                Some(labels) if labels.len() == len => labels.clone(),
                _ => (0..len).map(|i| i.to_string()).collect(),
            })
            .collect();
        axis_labels
            .iter()
            .multi_cartesian_product()
            .map(|ix| format!("{}[{}]", self.name, ix.iter().join(", ")))
            .collect()
    }

    /// The draw at `(chain, draw)`
    pub fn draw(&self, chain: usize, draw: usize) -> Option<ArrayD<f64>> {
        if !self.has_draws() {
            return None;
        }
        let shape = self.values.shape();
        if chain >= shape[0] || draw >= shape[1] {
            return None;
        }
        Some(
            self.values
                .index_axis(Axis(0), chain)
                .index_axis(Axis(0), draw)
                .to_owned(),
        )
    }
}

#[derive(Serialize, Deserialize)]
struct VariableRepr {
    name: String,
    dims: Vec<String>,
    shape: Vec<usize>,
    /// Row-major
    values: Vec<Element>,
}

/// JSON has no non-finite numbers, so those are written as strings
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum Element {
    Number(f64),
    Special(String),
}

impl From<f64> for Element {
    fn from(x: f64) -> Self {
        if x.is_finite() {
            Element::Number(x)
        } else if x.is_nan() {
            Element::Special(String::from("nan"))
        } else if x > 0.0 {
            Element::Special(String::from("inf"))
        } else {
            Element::Special(String::from("-inf"))
        }
    }
}

impl TryFrom<Element> for f64 {
    type Error = TraceError;

    fn try_from(element: Element) -> Result<Self, Self::Error> {
        match element {
            Element::Number(x) => Ok(x),
            Element::Special(s) => match s.as_str() {
                "nan" => Ok(f64::NAN),
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                _ => Err(TraceError::Element { value: s }),
            },
        }
    }
}

impl From<Variable> for VariableRepr {
    fn from(var: Variable) -> Self {
        VariableRepr {
            shape: var.values.shape().to_vec(),
            values: var.values.iter().map(|&x| Element::from(x)).collect(),
            name: var.name,
            dims: var.dims,
        }
    }
}

impl TryFrom<VariableRepr> for Variable {
    type Error = TraceError;

    fn try_from(repr: VariableRepr) -> Result<Self, Self::Error> {
        let values = repr
            .values
            .into_iter()
            .map(f64::try_from)
            .collect::<Result<Vec<f64>, _>>()?;
        let values = from_shape_vec(&repr.shape, values)?;
        Variable::new(&repr.name, repr.dims, values)
    }
}

/// An ordered collection of variables with shared coordinates
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    variables: Vec<Variable>,
    #[serde(default)]
    coords: BTreeMap<String, Vec<String>>,
}

impl Group {
    pub fn new() -> Self {
        Group::default()
    }

    /// Add a variable. Variables with draws must agree on the number of
    /// chains and draws.
    pub fn insert(&mut self, var: Variable) -> Result<(), TraceError> {
        if self.get(var.name()).is_some() {
            return Err(TraceError::DuplicateVariable {
                name: var.name().to_owned(),
            });
        }
        if var.has_draws() {
            if let Some(expected) = self.draw_shape() {
                if var.values.shape()[..2] != expected {
                    return Err(TraceError::Draws {
                        name: var.name().to_owned(),
                        shape: var.values.shape().to_vec(),
                        expected: expected.to_vec(),
                    });
                }
            }
        }
        self.variables.push(var);
        Ok(())
    }

    fn draw_shape(&self) -> Option<[usize; 2]> {
        self.variables
            .iter()
            .find(|v| v.has_draws())
            .map(|v| [v.values.shape()[0], v.values.shape()[1]])
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn try_get(&self, name: &str) -> Result<&Variable, TraceError> {
        self.get(name).ok_or_else(|| TraceError::MissingVariable {
            name: name.to_owned(),
        })
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|v| v.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn n_chains(&self) -> usize {
        self.draw_shape().map_or(0, |[chains, _]| chains)
    }

    pub fn n_draws(&self) -> usize {
        self.draw_shape().map_or(0, |[_, draws]| draws)
    }

    pub fn coords(&self) -> &BTreeMap<String, Vec<String>> {
        &self.coords
    }

    pub fn coord(&self, name: &str) -> Option<&[String]> {
        self.coords.get(name).map(Vec::as_slice)
    }

    pub fn set_coord(&mut self, name: &str, labels: Vec<String>) {
        self.coords.insert(name.to_owned(), labels);
    }

    /// Concatenate groups along the chain axis
    pub fn concat_chains(groups: &[Group]) -> Result<Group, TraceError> {
        let Some(first) = groups.first() else {
            return Ok(Group::new());
        };
        let mut out = Group {
            variables: Vec::with_capacity(first.variables.len()),
            coords: first.coords.clone(),
        };
        for var in &first.variables {
            let parts = groups
                .iter()
                .map(|g| g.try_get(&var.name).map(|v| v.values.view()))
                .collect::<Result<Vec<_>, _>>()?;
            let values = ndarray::concatenate(Axis(0), &parts).map_err(|_| TraceError::Draws {
                name: var.name.clone(),
                shape: var.values.shape().to_vec(),
                expected: vec![],
            })?;
            out.insert(Variable::new(&var.name, var.dims.clone(), values)?)?;
        }
        Ok(out)
    }
}

/// Collects draws one at a time into `(chain, draw, ...)` arrays
#[derive(Clone, Debug)]
pub struct GroupBuilder {
    n_chains: usize,
    n_draws: usize,
    names: Vec<String>,
    dims: Vec<Vec<String>>,
    shapes: Vec<Vec<usize>>,
    data: Vec<Vec<f64>>,
    coords: BTreeMap<String, Vec<String>>,
}

impl GroupBuilder {
    pub fn new(n_chains: usize, n_draws: usize) -> Self {
        GroupBuilder {
            n_chains,
            n_draws,
            names: vec![],
            dims: vec![],
            shapes: vec![],
            data: vec![],
            coords: BTreeMap::new(),
        }
    }

    /// Declare a variable; returns its index for [`GroupBuilder::record`]
    pub fn add_variable(&mut self, name: &str, dims: Vec<String>, shape: &[usize]) -> usize {
        let len = self.n_chains * self.n_draws * size_of(shape);
        self.names.push(name.to_owned());
        self.dims.push(dims);
        self.shapes.push(shape.to_vec());
        self.data.push(vec![f64::NAN; len]);
        self.names.len() - 1
    }

    pub fn set_coord(&mut self, name: &str, labels: Vec<String>) {
        self.coords.insert(name.to_owned(), labels);
    }

    /// Store one draw of variable `index`, flattened in row-major order.
    ///
    /// `values` must hold exactly one draw and `chain`/`draw` must lie
    /// inside the declared layout. Debug builds panic otherwise; release
    /// builds skip the draw, which then stays `NaN`.
    pub fn record(&mut self, index: usize, chain: usize, draw: usize, values: &[f64]) {
        debug_assert!(
            chain < self.n_chains && draw < self.n_draws,
            "draw ({chain}, {draw}) is outside of {} chains x {} draws",
            self.n_chains,
            self.n_draws
        );
        if chain >= self.n_chains || draw >= self.n_draws {
            return;
        }
        if let (Some(shape), Some(data)) = (self.shapes.get(index), self.data.get_mut(index)) {
            let size = size_of(shape);
            debug_assert_eq!(
                values.len(),
                size,
                "variable '{}' takes {size} values per draw",
                self.names[index]
            );
            if values.len() != size {
                return;
            }
            let start = (chain * self.n_draws + draw) * size;
            data[start..start + size].copy_from_slice(values);
        }
    }

    pub fn build(self) -> Result<Group, TraceError> {
        let mut group = Group {
            variables: Vec::with_capacity(self.names.len()),
            coords: self.coords,
        };
        for (((name, dims), shape), data) in self
            .names
            .iter()
            .zip(self.dims)
            .zip(&self.shapes)
            .zip(self.data)
        {
            let full: Vec<usize> = [self.n_chains, self.n_draws]
                .into_iter()
                .chain(shape.iter().copied())
                .collect();
            let values = ArrayD::from_shape_vec(IxDyn(&full), data)
                .map_err(|_| TraceError::Draws {
                    name: name.clone(),
                    shape: full.clone(),
                    expected: vec![self.n_chains, self.n_draws],
                })?;
            group.insert(Variable::draws(name, dims, values)?)?;
        }
        Ok(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array;

    fn labels(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn builder_places_draws() {
        let mut builder = GroupBuilder::new(2, 3);
        let mu = builder.add_variable("mu", vec![], &[]);
        let beta = builder.add_variable("beta", labels(&["coef"]), &[2]);
        for chain in 0..2 {
            for draw in 0..3 {
                let x = (chain * 10 + draw) as f64;
                builder.record(mu, chain, draw, &[x]);
                builder.record(beta, chain, draw, &[x, -x]);
            }
        }
        let group = builder.build().unwrap();
        assert_eq!(group.n_chains(), 2);
        assert_eq!(group.n_draws(), 3);

        let beta = group.get("beta").unwrap();
        assert_eq!(beta.values().shape(), &[2, 3, 2]);
        assert_eq!(beta.element_chains(1), vec![vec![0.0, -1.0, -2.0], vec![-10.0, -11.0, -12.0]]);
        assert_eq!(group.get("mu").unwrap().element_draws(0), vec![0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "takes 2 values per draw")]
    fn builder_rejects_short_draws() {
        let mut builder = GroupBuilder::new(1, 1);
        let beta = builder.add_variable("beta", labels(&["coef"]), &[2]);
        builder.record(beta, 0, 0, &[1.0]);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "outside of 1 chains x 2 draws")]
    fn builder_rejects_draws_outside_the_layout() {
        let mut builder = GroupBuilder::new(1, 2);
        let mu = builder.add_variable("mu", vec![], &[]);
        builder.record(mu, 0, 2, &[1.0]);
    }

    #[test]
    fn dims_must_cover_axes() {
        let err = Variable::new("x", vec![], Array::zeros(vec![3]).into_dyn()).unwrap_err();
        assert!(matches!(err, TraceError::Dims { dims: 0, ndim: 1, .. }));
    }

    #[test]
    fn mismatched_draws_are_rejected() {
        let mut group = Group::new();
        group
            .insert(Variable::draws("a", vec![], Array::zeros(vec![2, 5]).into_dyn()).unwrap())
            .unwrap();
        let err = group
            .insert(Variable::draws("b", vec![], Array::zeros(vec![2, 4]).into_dyn()).unwrap())
            .unwrap_err();
        assert!(matches!(err, TraceError::Draws { .. }));
    }

    #[test]
    fn element_labels_use_coords() {
        let var = Variable::draws(
            "alpha",
            labels(&["group", "alpha_dim_1"]),
            Array::zeros(vec![1, 1, 2, 2]).into_dyn(),
        )
        .unwrap();
        let mut coords = BTreeMap::new();
        coords.insert(String::from("group"), labels(&["a", "b"]));
        assert_eq!(
            var.element_labels(&coords),
            labels(&["alpha[a, 0]", "alpha[a, 1]", "alpha[b, 0]", "alpha[b, 1]"])
        );
    }

    #[test]
    fn scalar_label_is_the_name() {
        let var = Variable::draws("sigma", vec![], Array::zeros(vec![1, 4]).into_dyn()).unwrap();
        assert_eq!(var.element_labels(&BTreeMap::new()), labels(&["sigma"]));
    }

    #[test]
    fn concat_chains_stacks_groups() {
        let make = |x: f64| {
            let mut b = GroupBuilder::new(1, 2);
            let i = b.add_variable("mu", vec![], &[]);
            b.record(i, 0, 0, &[x]);
            b.record(i, 0, 1, &[x]);
            b.build().unwrap()
        };
        let group = Group::concat_chains(&[make(1.0), make(2.0)]).unwrap();
        assert_eq!(group.n_chains(), 2);
        assert_eq!(group.get("mu").unwrap().element_chains(0)[1], vec![2.0, 2.0]);
    }
}
