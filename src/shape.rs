//! Array values and numpy style broadcasting
//!
//! Every node in a model holds an n-dimensional `f64` array. Shapes combine
//! under the usual broadcasting rules: dimensions are aligned from the right
//! and each pair must either match or contain a 1.
use ndarray::{arr0, Array1, Array2, ArrayD, IxDyn, Zip};

/// The value of a model node
pub type Value = ArrayD<f64>;

/// Error combining array shapes
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    /// The shapes cannot be broadcast together
    #[error("shapes {left:?} and {right:?} cannot be broadcast together")]
    Broadcast { left: Vec<usize>, right: Vec<usize> },
    /// An operation needs an array of a particular rank
    #[error("{op} expects a {expected} array, got shape {shape:?}")]
    Rank {
        op: &'static str,
        expected: &'static str,
        shape: Vec<usize>,
    },
    /// The contracted dimensions of a dot product differ
    #[error("cannot take the dot product of shapes {left:?} and {right:?}")]
    Dot { left: Vec<usize>, right: Vec<usize> },
    /// The number of elements does not fill the requested shape
    #[error("{len} values cannot fill shape {shape:?}")]
    Fill { len: usize, shape: Vec<usize> },
}

/// The broadcast of two shapes
///
/// # Example
///
/// ```
/// use genmodel::shape::broadcast_shape;
///
/// assert_eq!(broadcast_shape(&[3, 1], &[4]).unwrap(), vec![3, 4]);
/// assert_eq!(broadcast_shape(&[], &[5]).unwrap(), vec![5]);
/// assert!(broadcast_shape(&[3], &[4]).is_err());
/// ```
pub fn broadcast_shape(
    left: &[usize],
    right: &[usize],
) -> Result<Vec<usize>, ShapeError> {
    let ndim = left.len().max(right.len());
    let mut out = vec![0; ndim];
    for i in 0..ndim {
        let l = dim_from_right(left, i);
        let r = dim_from_right(right, i);
        out[ndim - 1 - i] = match (l, r) {
            (a, b) if a == b => a,
            (1, b) => b,
            (a, 1) => a,
            _ => {
                return Err(ShapeError::Broadcast {
                    left: left.to_vec(),
                    right: right.to_vec(),
                })
            }
        };
    }
    Ok(out)
}

#[inline]
fn dim_from_right(shape: &[usize], i: usize) -> usize {
    if i < shape.len() {
        shape[shape.len() - 1 - i]
    } else {
        1
    }
}

/// Broadcast all the shapes in `shapes` together. No shapes broadcast to a
/// scalar.
pub fn broadcast_all<'a, I>(shapes: I) -> Result<Vec<usize>, ShapeError>
where
    I: IntoIterator<Item = &'a [usize]>,
{
    shapes
        .into_iter()
        .try_fold(Vec::new(), |acc, s| broadcast_shape(&acc, s))
}

/// `true` if an array of shape `from` broadcasts to exactly `to`
pub fn broadcasts_to(from: &[usize], to: &[usize]) -> bool {
    broadcast_shape(from, to).map_or(false, |s| s == to)
}

/// Number of elements in an array of the given shape
#[inline]
pub fn size_of(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// A 0-d array
#[inline]
pub fn scalar(x: f64) -> Value {
    arr0(x).into_dyn()
}

/// Build a value from a shape and its elements in row-major order
pub fn from_shape_vec(shape: &[usize], values: Vec<f64>) -> Result<Value, ShapeError> {
    let len = values.len();
    ArrayD::from_shape_vec(IxDyn(shape), values).map_err(|_| ShapeError::Fill {
        len,
        shape: shape.to_vec(),
    })
}

/// Broadcast `value` to `shape` and return its elements in row-major order
pub fn broadcast_flat(value: &Value, shape: &[usize]) -> Result<Vec<f64>, ShapeError> {
    value
        .broadcast(shape)
        .map(|view| view.iter().copied().collect())
        .ok_or_else(|| ShapeError::Broadcast {
            left: value.shape().to_vec(),
            right: shape.to_vec(),
        })
}

/// Apply `f` elementwise over the broadcast of `left` and `right`
pub fn zip_with<F>(left: &Value, right: &Value, f: F) -> Result<Value, ShapeError>
where
    F: Fn(f64, f64) -> f64,
{
    let shape = broadcast_shape(left.shape(), right.shape())?;
    let err = || ShapeError::Broadcast {
        left: left.shape().to_vec(),
        right: right.shape().to_vec(),
    };
    let l = left.broadcast(shape.as_slice()).ok_or_else(err)?;
    let r = right.broadcast(shape.as_slice()).ok_or_else(err)?;
    Ok(Zip::from(&l).and(&r).map_collect(|&a, &b| f(a, b)))
}

/// Conversion into a node value
///
/// # Example
///
/// ```
/// use genmodel::shape::IntoValue;
///
/// assert!(2.0_f64.into_value().shape().is_empty());
/// assert_eq!(vec![1.0_f64, 2.0, 3.0].into_value().shape(), &[3]);
/// assert_eq!(vec![0_usize, 1, 1].into_value()[[2]], 1.0);
/// ```
pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        scalar(self)
    }
}

impl IntoValue for Vec<f64> {
    fn into_value(self) -> Value {
        Array1::from(self).into_dyn()
    }
}

impl IntoValue for &[f64] {
    fn into_value(self) -> Value {
        Array1::from(self.to_vec()).into_dyn()
    }
}

impl IntoValue for &Vec<f64> {
    fn into_value(self) -> Value {
        self.as_slice().into_value()
    }
}

impl<const N: usize> IntoValue for [f64; N] {
    fn into_value(self) -> Value {
        Array1::from(self.to_vec()).into_dyn()
    }
}

/// Integer indices, e.g. group membership
impl IntoValue for Vec<usize> {
    fn into_value(self) -> Value {
        self.iter().map(|&i| i as f64).collect::<Array1<f64>>().into_dyn()
    }
}

impl IntoValue for &[usize] {
    fn into_value(self) -> Value {
        self.to_vec().into_value()
    }
}

impl IntoValue for Array1<f64> {
    fn into_value(self) -> Value {
        self.into_dyn()
    }
}

impl IntoValue for Array2<f64> {
    fn into_value(self) -> Value {
        self.into_dyn()
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for &Value {
    fn into_value(self) -> Value {
        self.clone()
    }
}
