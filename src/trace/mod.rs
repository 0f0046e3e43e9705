//! Containers for draws produced by inference and predictive sampling
//!
//! A [`Group`] maps variable names to arrays whose leading axes are
//! `(chain, draw)`. [`InferenceData`] bundles named groups (`posterior`,
//! `sample_stats`, `posterior_predictive`, ...) and persists them as a
//! self-describing JSON document.
mod csv_export;
mod group;

pub use group::{Group, GroupBuilder, Variable};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::shape::ShapeError;

pub const POSTERIOR: &str = "posterior";
pub const SAMPLE_STATS: &str = "sample_stats";
pub const OBSERVED_DATA: &str = "observed_data";
pub const CONSTANT_DATA: &str = "constant_data";
pub const PRIOR: &str = "prior";
pub const PRIOR_PREDICTIVE: &str = "prior_predictive";
pub const POSTERIOR_PREDICTIVE: &str = "posterior_predictive";
pub const PREDICTIONS: &str = "predictions";

/// Name of the chain axis
pub const CHAIN: &str = "chain";
/// Name of the draw axis
pub const DRAW: &str = "draw";

/// Error reading, writing or assembling traces
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    /// Groups are never overwritten
    #[error("group '{name}' already exists")]
    GroupExists { name: String },
    #[error("no group named '{name}'")]
    MissingGroup { name: String },
    #[error("no variable named '{name}'")]
    MissingVariable { name: String },
    #[error("variable '{name}' is already in the group")]
    DuplicateVariable { name: String },
    /// The dimension names do not cover every axis
    #[error("variable '{name}' has {ndim} axes but {dims} dimension names")]
    Dims {
        name: String,
        dims: usize,
        ndim: usize,
    },
    /// The variable is not shaped `(chain, draw, ...)` like the rest of the
    /// group
    #[error("variable '{name}' has shape {shape:?}, expected leading axes {expected:?}")]
    Draws {
        name: String,
        shape: Vec<usize>,
        expected: Vec<usize>,
    },
    /// A stored element is neither a number nor `nan`, `inf` or `-inf`
    #[error("'{value}' is not a number")]
    Element { value: String },
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Named groups of draws plus free-form attributes
///
/// # Example
///
/// ```
/// use genmodel::trace::{Group, InferenceData, Variable, POSTERIOR};
/// use ndarray::ArrayD;
///
/// let mu = Variable::draws("mu", vec![], ArrayD::zeros(vec![2, 10])).unwrap();
/// let mut group = Group::new();
/// group.insert(mu).unwrap();
///
/// let mut idata = InferenceData::new();
/// idata.add_group(POSTERIOR, group.clone()).unwrap();
/// assert_eq!(idata.posterior().unwrap().n_chains(), 2);
///
/// // groups are never overwritten
/// assert!(idata.add_group(POSTERIOR, group).is_err());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InferenceData {
    groups: BTreeMap<String, Group>,
    #[serde(default)]
    attrs: BTreeMap<String, String>,
}

impl InferenceData {
    pub fn new() -> Self {
        InferenceData::default()
    }

    /// Add a group under a new name
    pub fn add_group(&mut self, name: &str, group: Group) -> Result<(), TraceError> {
        if self.groups.contains_key(name) {
            return Err(TraceError::GroupExists {
                name: name.to_owned(),
            });
        }
        self.groups.insert(name.to_owned(), group);
        Ok(())
    }

    /// Add every group of `other`. Fails without adding anything if any of
    /// the names are taken.
    pub fn extend(&mut self, other: InferenceData) -> Result<(), TraceError> {
        if let Some(name) = other.groups.keys().find(|k| self.groups.contains_key(*k)) {
            return Err(TraceError::GroupExists { name: name.clone() });
        }
        self.groups.extend(other.groups);
        self.attrs.extend(other.attrs);
        Ok(())
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    pub fn try_group(&self, name: &str) -> Result<&Group, TraceError> {
        self.group(name).ok_or_else(|| TraceError::MissingGroup {
            name: name.to_owned(),
        })
    }

    pub fn posterior(&self) -> Result<&Group, TraceError> {
        self.try_group(POSTERIOR)
    }

    pub fn sample_stats(&self) -> Option<&Group> {
        self.group(SAMPLE_STATS)
    }

    /// Group names in sorted order
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn attrs(&self) -> &BTreeMap<String, String> {
        &self.attrs
    }

    pub fn set_attr<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.attrs.insert(key.into(), value.into());
    }

    /// Write as JSON. Values read back by [`InferenceData::load`] are
    /// identical, including non-finite values.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), TraceError> {
        let file = File::create(path.as_ref())?;
        serde_json::to_writer(BufWriter::new(file), self)?;
        log::debug!("saved inference data to {}", path.as_ref().display());
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TraceError> {
        let file = File::open(path.as_ref())?;
        let idata = serde_json::from_reader(BufReader::new(file))?;
        Ok(idata)
    }

    /// Write one group as CSV: `chain`, `draw`, then one column per scalar
    /// element (`beta[0]`, `sigma`, ...)
    pub fn write_csv<P: AsRef<Path>>(&self, group: &str, path: P) -> Result<(), TraceError> {
        let group = self.try_group(group)?;
        let file = File::create(path.as_ref())?;
        csv_export::write_group(group, BufWriter::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::ArrayD;

    fn posterior() -> Group {
        let mut values = ArrayD::zeros(vec![2, 3, 2]);
        values[[1, 2, 0]] = f64::NAN;
        values[[0, 1, 1]] = 0.1 + 0.2;
        values[[1, 0, 1]] = f64::NEG_INFINITY;
        let mut group = Group::new();
        group
            .insert(Variable::draws("beta", vec![String::from("coef")], values).unwrap())
            .unwrap();
        group.set_coord("coef", vec![String::from("x0"), String::from("x1")]);
        group
    }

    #[test]
    fn missing_posterior_is_an_error() {
        let idata = InferenceData::new();
        assert!(matches!(
            idata.posterior(),
            Err(TraceError::MissingGroup { .. })
        ));
    }

    #[test]
    fn extend_refuses_collisions() {
        let mut a = InferenceData::new();
        a.add_group(POSTERIOR, posterior()).unwrap();
        let mut b = InferenceData::new();
        b.add_group(POSTERIOR, posterior()).unwrap();
        b.add_group(PRIOR, posterior()).unwrap();
        assert!(a.extend(b).is_err());
        assert_eq!(a.group_names().collect::<Vec<_>>(), vec![POSTERIOR]);
    }

    #[test]
    fn json_round_trip_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.json");

        let mut idata = InferenceData::new();
        idata.add_group(POSTERIOR, posterior()).unwrap();
        idata.set_attr("engine", "nuts");
        idata.save(&path).unwrap();

        let back = InferenceData::load(&path).unwrap();
        let (a, b) = (
            idata.posterior().unwrap().get("beta").unwrap().values(),
            back.posterior().unwrap().get("beta").unwrap().values(),
        );
        assert_eq!(a.shape(), b.shape());
        for (x, y) in a.iter().zip(b.iter()) {
            assert!(x.to_bits() == y.to_bits() || (x.is_nan() && y.is_nan()));
        }
        assert_eq!(back.attrs().get("engine").map(String::as_str), Some("nuts"));
        assert_eq!(
            back.posterior().unwrap().coord("coef"),
            Some(&[String::from("x0"), String::from("x1")][..])
        );
    }

    #[test]
    fn unknown_special_values_are_rejected() {
        let json = r#"{"groups":{"posterior":{"variables":[{"name":"mu","dims":["chain","draw"],"shape":[1,2],"values":[0.5,"oops"]}],"coords":{}}}}"#;
        assert!(serde_json::from_str::<InferenceData>(json).is_err());
    }

    #[test]
    fn csv_has_one_column_per_element() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.csv");

        let mut idata = InferenceData::new();
        idata.add_group(POSTERIOR, posterior()).unwrap();
        idata.write_csv(POSTERIOR, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("chain,draw,beta[x0],beta[x1]"));
        assert_eq!(lines.count(), 6);
    }
}
