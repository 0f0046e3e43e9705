//! Broyden–Fletcher–Goldfarb–Shanno minimization
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use super::line_search::{wolfe_search, WolfeParams};
use super::OptimizeError;

/// Parameters for the BFGS optimizer
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BfgsParams {
    /// Maximum number of iterations to run
    pub max_iter: usize,
    /// Parameters given to the Wolfe line search
    pub wolfe_params: WolfeParams,
    /// Stop once the gradient norm falls below this
    pub gtol: f64,
}

impl Default for BfgsParams {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            wolfe_params: WolfeParams::default(),
            gtol: 1E-6,
        }
    }
}

impl BfgsParams {
    pub fn with_gtol(self, gtol: f64) -> Self {
        Self { gtol, ..self }
    }

    pub fn with_max_iter(self, max_iter: usize) -> Self {
        Self { max_iter, ..self }
    }

    pub fn with_wolfe_params(self, wolfe_params: WolfeParams) -> Self {
        Self {
            wolfe_params,
            ..self
        }
    }
}

/// Outcome of a BFGS run
#[derive(Clone, Debug, PartialEq)]
pub struct BfgsResult {
    /// Best point found
    pub x: DVector<f64>,
    /// Objective at `x`
    pub fx: f64,
    /// Number of iterations used
    pub n_iter: usize,
    /// `false` if the iteration limit was reached before the gradient
    /// tolerance
    pub converged: bool,
}

/// Minimize `f`, which returns the objective and its gradient
///
/// # Example
///
/// ```
/// use genmodel::optim::{bfgs, BfgsParams};
/// use nalgebra::DVector;
///
/// let res = bfgs(DVector::zeros(2), &BfgsParams::default(), |v| {
///     let f = (v[0] - 1.0).powi(2) + 3.0 * (v[1] + 2.0).powi(2);
///     let g = DVector::from_column_slice(&[2.0 * (v[0] - 1.0), 6.0 * (v[1] + 2.0)]);
///     (f, g)
/// })
/// .unwrap();
/// assert!(res.converged);
/// assert!((res.x[1] + 2.0).abs() < 1E-5);
/// ```
pub fn bfgs<F>(x0: DVector<f64>, params: &BfgsParams, f: F) -> Result<BfgsResult, OptimizeError>
where
    F: Fn(&DVector<f64>) -> (f64, DVector<f64>),
{
    let n = x0.nrows();
    let identity = DMatrix::<f64>::identity(n, n);
    let mut h_inv = identity.clone();

    let mut x = x0;
    let (mut fx, mut g) = f(&x);
    if !fx.is_finite() || g.iter().any(|v| !v.is_finite()) {
        return Err(OptimizeError::NumericalDivergence);
    }

    for iter in 0..params.max_iter {
        if g.norm() < params.gtol {
            return Ok(BfgsResult {
                x,
                fx,
                n_iter: iter,
                converged: true,
            });
        }

        let mut dir = -(&h_inv * &g);
        if dir.dot(&g) >= 0.0 {
            // the curvature estimate went bad, restart from steepest descent
            h_inv = identity.clone();
            dir = -g.clone();
        }

        let alpha = wolfe_search(&params.wolfe_params, |a| {
            let (fa, ga) = f(&(&x + &dir * a));
            (fa, ga.dot(&dir))
        })?;

        let step = &dir * alpha;
        x += &step;
        let (fx_next, g_next) = f(&x);
        if !fx_next.is_finite() || g_next.iter().any(|v| !v.is_finite()) {
            return Err(OptimizeError::NumericalDivergence);
        }
        log::debug!("bfgs {iter}: f = {fx_next}, |g| = {}, alpha = {alpha}", g_next.norm());

        let y = &g_next - &g;
        let sy = step.dot(&y);
        if sy > 0.0 {
            let rho = 1.0 / sy;
            let left = &identity - &step * y.transpose() * rho;
            let right = &identity - &y * step.transpose() * rho;
            h_inv = &left * &h_inv * &right + &step * step.transpose() * rho;
        }

        fx = fx_next;
        g = g_next;
    }

    log::debug!("bfgs reached {} iterations without converging", params.max_iter);
    Ok(BfgsResult {
        x,
        fx,
        n_iter: params.max_iter,
        converged: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bfgs_x_cubed() {
        let res = bfgs(DVector::zeros(1), &BfgsParams::default(), |v| {
            let x = v[0];
            let y = -(x - 1.0).powi(3) - (x - 1.0).powi(2);
            let dy_dx = -3.0 * x.powi(2) + 4.0 * x - 1.0;
            (y, DVector::from_column_slice(&[dy_dx]))
        })
        .unwrap();
        assert!(res.converged);
        assert::close(res.x[0], 1.0 / 3.0, 1E-5);
    }

    #[test]
    fn bfgs_rosenbrock() {
        let f = |x: &DVector<f64>| {
            let y = (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0].powi(2)).powi(2);
            let gx = -400.0 * (x[1] - x[0].powi(2)) * x[0] - 2.0 * (1.0 - x[0]);
            let gy = 200.0 * (x[1] - x[0].powi(2));
            (y, DVector::from_column_slice(&[gx, gy]))
        };
        let res = bfgs(DVector::zeros(2), &BfgsParams::default(), f).unwrap();
        let expected = DVector::from_column_slice(&[1.0, 1.0]);
        assert!(res.converged);
        assert!(res.x.relative_eq(&expected, 1E-4, 1E-4));
    }

    #[test]
    fn iteration_limit_is_reported() {
        let f = |x: &DVector<f64>| {
            let y = (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0].powi(2)).powi(2);
            let gx = -400.0 * (x[1] - x[0].powi(2)) * x[0] - 2.0 * (1.0 - x[0]);
            let gy = 200.0 * (x[1] - x[0].powi(2));
            (y, DVector::from_column_slice(&[gx, gy]))
        };
        let params = BfgsParams::default().with_max_iter(2);
        let res = bfgs(DVector::zeros(2), &params, f).unwrap();
        assert!(!res.converged);
        assert_eq!(res.n_iter, 2);
    }

    #[test]
    fn non_finite_start_is_an_error() {
        let res = bfgs(DVector::zeros(1), &BfgsParams::default(), |_| {
            (f64::NAN, DVector::zeros(1))
        });
        assert_eq!(res.unwrap_err(), OptimizeError::NumericalDivergence);
    }
}
