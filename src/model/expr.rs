//! Parameter expressions over model nodes
use ndarray::{Axis, Ix1, Ix2};
use std::borrow::Cow;
use std::ops;

use super::{ModelError, Node, NodeKind, VarRef};
use crate::misc::sigmoid;
use crate::shape::{self, broadcast_shape, scalar, IntoValue, ShapeError, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Exp,
    Log,
    Sqrt,
    Sigmoid,
    Abs,
    Square,
}

impl UnaryOp {
    #[inline]
    fn apply(self, x: f64) -> f64 {
        match self {
            UnaryOp::Neg => -x,
            UnaryOp::Exp => x.exp(),
            UnaryOp::Log => x.ln(),
            UnaryOp::Sqrt => x.sqrt(),
            UnaryOp::Sigmoid => sigmoid(x),
            UnaryOp::Abs => x.abs(),
            UnaryOp::Square => x * x,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    #[inline]
    fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            BinaryOp::Pow => a.powf(b),
        }
    }
}

/// A value computed from constants and other nodes.
///
/// Expressions are usually built with arithmetic on [`VarRef`] handles and
/// the methods of [`ExprExt`]:
///
/// ```
/// use genmodel::model::{ExprExt, Model, DistSpec};
///
/// let mut model = Model::new();
/// let a = model.add_prior("a", DistSpec::normal(0.0, 1.0), &[]).unwrap();
/// let b = model.add_prior("b", DistSpec::half_normal(1.0), &[]).unwrap();
/// let expr = (a * 2.0 + b.ln()).exp();
/// let det = model.add_deterministic("c", expr, &[]).unwrap();
/// assert_eq!(model.shape_of(det), &[] as &[usize]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Const(Value),
    Node(VarRef),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// Gather elements of a 1-d `source` at integer `index` positions. The
    /// result has the shape of `index`.
    Take { source: Box<Expr>, index: Box<Expr> },
    /// Matrix/vector product
    Dot(Box<Expr>, Box<Expr>),
    /// Sum of all elements
    Sum(Box<Expr>),
    /// Cumulative sum along the last axis
    CumSum(Box<Expr>),
}

impl Expr {
    pub fn constant<V: IntoValue>(value: V) -> Self {
        Expr::Const(value.into_value())
    }

    pub fn unary(op: UnaryOp, arg: Expr) -> Self {
        Expr::Unary(op, Box::new(arg))
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary(op, Box::new(left), Box::new(right))
    }

    /// Handles of every node the expression reads
    pub fn dependencies(&self) -> Vec<VarRef> {
        let mut deps = Vec::new();
        self.collect_dependencies(&mut deps);
        deps
    }

    fn collect_dependencies(&self, deps: &mut Vec<VarRef>) {
        match self {
            Expr::Const(_) => (),
            Expr::Node(var) => {
                if !deps.contains(var) {
                    deps.push(*var)
                }
            }
            Expr::Unary(_, arg) | Expr::Sum(arg) | Expr::CumSum(arg) => {
                arg.collect_dependencies(deps)
            }
            Expr::Binary(_, a, b) | Expr::Dot(a, b) => {
                a.collect_dependencies(deps);
                b.collect_dependencies(deps);
            }
            Expr::Take { source, index } => {
                source.collect_dependencies(deps);
                index.collect_dependencies(deps);
            }
        }
    }

    /// Resolve the shape of the expression given the nodes registered so
    /// far. Referencing a node outside of `nodes` is an error, which is
    /// what keeps the model graph acyclic.
    pub(crate) fn infer_shape(&self, nodes: &[Node]) -> Result<Vec<usize>, ModelError> {
        match self {
            Expr::Const(value) => Ok(value.shape().to_vec()),
            Expr::Node(var) => lookup(nodes, *var).map(|node| node.shape.clone()),
            Expr::Unary(_, arg) => arg.infer_shape(nodes),
            Expr::Binary(_, a, b) => {
                let sa = a.infer_shape(nodes)?;
                let sb = b.infer_shape(nodes)?;
                Ok(broadcast_shape(&sa, &sb)?)
            }
            Expr::Take { source, index } => {
                let ss = source.infer_shape(nodes)?;
                let si = index.infer_shape(nodes)?;
                if ss.len() != 1 {
                    return Err(ShapeError::Rank {
                        op: "take",
                        expected: "1-d source",
                        shape: ss,
                    }
                    .into());
                }
                if let Some(idx) = index.static_value(nodes) {
                    check_indices(idx.iter().copied(), ss[0])?;
                }
                Ok(si)
            }
            Expr::Dot(a, b) => {
                let sa = a.infer_shape(nodes)?;
                let sb = b.infer_shape(nodes)?;
                Ok(dot_shape(&sa, &sb)?)
            }
            Expr::Sum(arg) => {
                arg.infer_shape(nodes)?;
                Ok(vec![])
            }
            Expr::CumSum(arg) => arg.infer_shape(nodes),
        }
    }

    /// The value of the expression if it does not depend on any random
    /// node
    fn static_value<'a>(&'a self, nodes: &'a [Node]) -> Option<Cow<'a, Value>> {
        match self {
            Expr::Const(value) => Some(Cow::Borrowed(value)),
            Expr::Node(var) => match nodes.get(var.id().0).map(|n| &n.kind) {
                Some(NodeKind::Data { value }) => Some(Cow::Borrowed(value)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Evaluate the expression. `values[i]` holds the value of node `i`.
    /// Constants and bare node references are borrowed, not copied.
    pub(crate) fn eval<'a>(
        &'a self,
        values: &'a [Cow<'_, Value>],
    ) -> Result<Cow<'a, Value>, ModelError> {
        let value = match self {
            Expr::Const(value) => return Ok(Cow::Borrowed(value)),
            Expr::Node(var) => {
                return values
                    .get(var.id().0)
                    .map(|v| Cow::Borrowed(v.as_ref()))
                    .ok_or(ModelError::UnknownNode { var: *var })
            }
            Expr::Unary(op, arg) => {
                let op = *op;
                match arg.eval(values)? {
                    Cow::Borrowed(v) => v.mapv(|x| op.apply(x)),
                    Cow::Owned(v) => v.mapv_into(|x| op.apply(x)),
                }
            }
            Expr::Binary(op, a, b) => {
                let op = *op;
                let va = a.eval(values)?;
                let vb = b.eval(values)?;
                if va.shape() == vb.shape() {
                    let mut out = va.into_owned();
                    out.zip_mut_with(&*vb, |x, &y| *x = op.apply(*x, y));
                    out
                } else {
                    shape::zip_with(&va, &vb, |x, y| op.apply(x, y))?
                }
            }
            Expr::Take { source, index } => {
                let src = source.eval(values)?;
                let idx = index.eval(values)?;
                let src = src
                    .view()
                    .into_dimensionality::<Ix1>()
                    .map_err(|_| ShapeError::Rank {
                        op: "take",
                        expected: "1-d source",
                        shape: src.shape().to_vec(),
                    })?;
                let n = src.len();
                check_indices(idx.iter().copied(), n)?;
                idx.mapv(|i| src[i as usize])
            }
            Expr::Dot(a, b) => dot(&*a.eval(values)?, &*b.eval(values)?)?,
            Expr::Sum(arg) => scalar(arg.eval(values)?.sum()),
            Expr::CumSum(arg) => {
                let mut out = arg.eval(values)?.into_owned();
                if out.ndim() > 0 {
                    let last = Axis(out.ndim() - 1);
                    out.accumulate_axis_inplace(last, |&prev, curr| *curr += prev);
                }
                out
            }
        };
        Ok(Cow::Owned(value))
    }
}

fn lookup(nodes: &[Node], var: VarRef) -> Result<&Node, ModelError> {
    match nodes.get(var.id().0) {
        Some(node) if node.role() == var.role() => Ok(node),
        _ => Err(ModelError::UnknownNode { var }),
    }
}

fn check_indices<I>(indices: I, len: usize) -> Result<(), ModelError>
where
    I: Iterator<Item = f64>,
{
    for index in indices {
        if !(index >= 0.0 && index.fract() == 0.0 && (index as usize) < len) {
            return Err(ModelError::IndexOutOfBounds { index, len });
        }
    }
    Ok(())
}

fn dot_shape(a: &[usize], b: &[usize]) -> Result<Vec<usize>, ShapeError> {
    let err = || ShapeError::Dot {
        left: a.to_vec(),
        right: b.to_vec(),
    };
    match (a, b) {
        ([k1], [k2]) if k1 == k2 => Ok(vec![]),
        ([n, k1], [k2]) if k1 == k2 => Ok(vec![*n]),
        ([k1], [k2, m]) if k1 == k2 => Ok(vec![*m]),
        ([n, k1], [k2, m]) if k1 == k2 => Ok(vec![*n, *m]),
        _ => Err(err()),
    }
}

fn dot(a: &Value, b: &Value) -> Result<Value, ModelError> {
    dot_shape(a.shape(), b.shape())?;
    let err = || ShapeError::Dot {
        left: a.shape().to_vec(),
        right: b.shape().to_vec(),
    };
    let out = match (a.ndim(), b.ndim()) {
        (1, 1) => {
            let a = a.view().into_dimensionality::<Ix1>().map_err(|_| err())?;
            let b = b.view().into_dimensionality::<Ix1>().map_err(|_| err())?;
            scalar(a.dot(&b))
        }
        (2, 1) => {
            let a = a.view().into_dimensionality::<Ix2>().map_err(|_| err())?;
            let b = b.view().into_dimensionality::<Ix1>().map_err(|_| err())?;
            a.dot(&b).into_dyn()
        }
        (1, 2) => {
            let a = a.view().into_dimensionality::<Ix1>().map_err(|_| err())?;
            let b = b.view().into_dimensionality::<Ix2>().map_err(|_| err())?;
            a.dot(&b).into_dyn()
        }
        _ => {
            let a = a.view().into_dimensionality::<Ix2>().map_err(|_| err())?;
            let b = b.view().into_dimensionality::<Ix2>().map_err(|_| err())?;
            a.dot(&b).into_dyn()
        }
    };
    Ok(out)
}

impl From<f64> for Expr {
    fn from(x: f64) -> Self {
        Expr::Const(scalar(x))
    }
}

impl From<VarRef> for Expr {
    fn from(var: VarRef) -> Self {
        Expr::Node(var)
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::Const(value)
    }
}

impl From<Vec<f64>> for Expr {
    fn from(xs: Vec<f64>) -> Self {
        Expr::Const(xs.into_value())
    }
}

macro_rules! impl_binary_op {
    ($trait: ident, $method: ident, $op: expr) => {
        impl<R: Into<Expr>> ops::$trait<R> for Expr {
            type Output = Expr;
            fn $method(self, rhs: R) -> Expr {
                Expr::binary($op, self, rhs.into())
            }
        }

        impl<R: Into<Expr>> ops::$trait<R> for VarRef {
            type Output = Expr;
            fn $method(self, rhs: R) -> Expr {
                Expr::binary($op, Expr::Node(self), rhs.into())
            }
        }

        impl ops::$trait<Expr> for f64 {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                Expr::binary($op, Expr::from(self), rhs)
            }
        }

        impl ops::$trait<VarRef> for f64 {
            type Output = Expr;
            fn $method(self, rhs: VarRef) -> Expr {
                Expr::binary($op, Expr::from(self), Expr::Node(rhs))
            }
        }
    };
}

impl_binary_op!(Add, add, BinaryOp::Add);
impl_binary_op!(Sub, sub, BinaryOp::Sub);
impl_binary_op!(Mul, mul, BinaryOp::Mul);
impl_binary_op!(Div, div, BinaryOp::Div);

impl ops::Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::unary(UnaryOp::Neg, self)
    }
}

impl ops::Neg for VarRef {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::unary(UnaryOp::Neg, Expr::Node(self))
    }
}

/// Expression building methods for handles and expressions
pub trait ExprExt: Into<Expr> + Sized {
    fn exp(self) -> Expr {
        Expr::unary(UnaryOp::Exp, self.into())
    }

    /// Natural logarithm
    fn ln(self) -> Expr {
        Expr::unary(UnaryOp::Log, self.into())
    }

    fn sqrt(self) -> Expr {
        Expr::unary(UnaryOp::Sqrt, self.into())
    }

    /// Logistic function, the inverse logit
    fn sigmoid(self) -> Expr {
        Expr::unary(UnaryOp::Sigmoid, self.into())
    }

    fn abs(self) -> Expr {
        Expr::unary(UnaryOp::Abs, self.into())
    }

    fn square(self) -> Expr {
        Expr::unary(UnaryOp::Square, self.into())
    }

    fn pow<E: Into<Expr>>(self, exponent: E) -> Expr {
        Expr::binary(BinaryOp::Pow, self.into(), exponent.into())
    }

    /// Gather elements at integer positions, e.g. one effect per
    /// observation from a per-group vector
    fn take<I: Into<Expr>>(self, index: I) -> Expr {
        Expr::Take {
            source: Box::new(self.into()),
            index: Box::new(index.into()),
        }
    }

    fn dot<E: Into<Expr>>(self, other: E) -> Expr {
        Expr::Dot(Box::new(self.into()), Box::new(other.into()))
    }

    fn sum(self) -> Expr {
        Expr::Sum(Box::new(self.into()))
    }

    /// Cumulative sum over the last axis, e.g. a random walk from its
    /// innovations
    fn cumsum(self) -> Expr {
        Expr::CumSum(Box::new(self.into()))
    }
}

impl ExprExt for Expr {}
impl ExprExt for VarRef {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeId;
    use ndarray::array;

    fn eval_const(expr: Expr) -> Value {
        expr.eval(&[]).unwrap().into_owned()
    }

    fn eval_scalar(expr: Expr) -> f64 {
        let value = eval_const(expr);
        assert_eq!(value.ndim(), 0);
        value.iter().copied().next().unwrap()
    }

    #[test]
    fn node_references_are_borrowed() {
        let values = vec![Cow::Owned(array![1.0, 2.0].into_dyn())];
        let x = VarRef::Data(NodeId(0));
        assert!(matches!(Expr::from(x).eval(&values), Ok(Cow::Borrowed(_))));
        assert!(matches!(
            Expr::constant(vec![3.0]).eval(&values),
            Ok(Cow::Borrowed(_))
        ));
        let double_expr = x * 2.0;
        let doubled = double_expr.eval(&values).unwrap();
        assert_eq!(doubled.into_owned(), array![2.0, 4.0].into_dyn());
        // the source node is not modified in place
        assert_eq!(*values[0], array![1.0, 2.0].into_dyn());
    }

    #[test]
    fn arithmetic_broadcasts() {
        let x = Expr::constant(vec![1.0, 2.0, 3.0]);
        let y = eval_const(x * 2.0 + 1.0);
        assert_eq!(y, array![3.0, 5.0, 7.0].into_dyn());
    }

    #[test]
    fn scalar_on_the_left() {
        let y = eval_const(10.0 - Expr::constant(vec![1.0, 2.0]));
        assert_eq!(y, array![9.0, 8.0].into_dyn());
    }

    #[test]
    fn unary_functions() {
        assert::close(eval_scalar(Expr::from(0.0).sigmoid()), 0.5, 1E-12);
        assert::close(eval_scalar(Expr::from(4.0).sqrt().ln().exp()), 2.0, 1E-12);
        assert_eq!(eval_scalar(-Expr::from(3.0).square()), -9.0);
    }

    #[test]
    fn take_gathers_by_index() {
        let src = Expr::constant(vec![10.0, 20.0, 30.0]);
        let y = eval_const(src.take(vec![2.0, 0.0, 2.0, 1.0]));
        assert_eq!(y, array![30.0, 10.0, 30.0, 20.0].into_dyn());
    }

    #[test]
    fn take_rejects_out_of_bounds_index() {
        let src = Expr::constant(vec![10.0, 20.0]);
        let err = src.take(vec![2.0]).eval(&[]).unwrap_err();
        assert_eq!(err, ModelError::IndexOutOfBounds { index: 2.0, len: 2 });
    }

    #[test]
    fn dot_matrix_vector() {
        let m = Expr::Const(array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]].into_dyn());
        let y = eval_const(m.dot(vec![1.0, -1.0]));
        assert_eq!(y, array![-1.0, -1.0, -1.0].into_dyn());
    }

    #[test]
    fn dot_shape_rules() {
        assert_eq!(dot_shape(&[3], &[3]).unwrap(), Vec::<usize>::new());
        assert_eq!(dot_shape(&[4, 3], &[3]).unwrap(), vec![4]);
        assert_eq!(dot_shape(&[4, 3], &[3, 2]).unwrap(), vec![4, 2]);
        assert!(dot_shape(&[4, 3], &[4]).is_err());
    }

    #[test]
    fn sum_and_cumsum() {
        let x = Expr::constant(vec![1.0, 2.0, 3.0]);
        assert_eq!(eval_scalar(x.clone().sum()), 6.0);
        assert_eq!(eval_const(x.cumsum()), array![1.0, 3.0, 6.0].into_dyn());
    }

    #[test]
    fn cumsum_runs_along_last_axis() {
        let x = Expr::Const(array![[1.0, 1.0], [2.0, 2.0]].into_dyn());
        assert_eq!(
            eval_const(x.cumsum()),
            array![[1.0, 2.0], [2.0, 4.0]].into_dyn()
        );
    }

    #[test]
    fn dependencies_are_unique_and_ordered() {
        let a = VarRef::Prior(NodeId(0));
        let b = VarRef::Data(NodeId(1));
        let expr = a * b + a.exp();
        assert_eq!(expr.dependencies(), vec![a, b]);
    }

    #[test]
    fn unknown_node_fails_evaluation() {
        let a = VarRef::Prior(NodeId(3));
        assert_eq!(
            Expr::from(a).eval(&[]).unwrap_err(),
            ModelError::UnknownNode { var: a }
        );
    }
}
