//! Line search satisfying the strong Wolfe conditions
use serde::{Deserialize, Serialize};

use super::OptimizeError;

/// Wolfe line search parameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WolfeParams {
    /// Sufficient decrease coefficient
    pub c1: f64,
    /// Curvature coefficient
    pub c2: f64,
    /// Largest step length tried
    pub amax: f64,
    /// Maximum number of bracketing and zoom iterations
    pub max_iter: usize,
}

impl Default for WolfeParams {
    fn default() -> Self {
        Self {
            c1: 1E-4,
            c2: 0.9,
            amax: 50.0,
            max_iter: 20,
        }
    }
}

/// Minimizer of the quadratic through (a, fa) and (b, fb) with slope `fpa`
/// at `a`
#[inline]
fn quad_min(a: f64, fa: f64, fpa: f64, b: f64, fb: f64) -> Option<f64> {
    let db = b - a;
    if db == 0.0 {
        return None;
    }
    let curv = (fb - fa - fpa * db) / (db * db);
    if curv <= 0.0 {
        None
    } else {
        Some(a - fpa / (2.0 * curv))
    }
}

/// Minimizer of the cubic through (a, fa), (b, fb) and (c, fc) with slope
/// `fpa` at `a`
#[inline]
fn cubic_min(a: f64, fa: f64, fpa: f64, b: f64, fb: f64, c: f64, fc: f64) -> Option<f64> {
    let db = b - a;
    let dc = c - a;
    let denom = (db * dc).powi(2) * (db - dc);
    if denom == 0.0 {
        return None;
    }
    let fu = fb - fa - fpa * db;
    let fv = fc - fa - fpa * dc;
    let c3 = (dc * dc * fu - db * db * fv) / denom;
    let c2 = (-dc * dc * dc * fu + db * db * db * fv) / denom;
    if c3 == 0.0 {
        return None;
    }
    let radical = c2.mul_add(c2, -3.0 * c3 * fpa);
    if radical < 0.0 {
        return None;
    }
    Some(a + (-c2 + radical.sqrt()) / (3.0 * c3)).filter(|x| x.is_finite())
}

/// One end of the bracket: step length, value and slope
#[derive(Clone, Copy, Debug)]
struct Probe {
    alpha: f64,
    phi: f64,
    dphi: f64,
}

/// Narrow the bracket `[lo, hi]` down to a step satisfying the strong
/// Wolfe conditions (Nocedal & Wright, algorithm 3.6)
fn zoom<F>(
    mut lo: Probe,
    mut hi: Probe,
    origin: Probe,
    params: &WolfeParams,
    f: &F,
) -> Result<f64, OptimizeError>
where
    F: Fn(f64) -> (f64, f64),
{
    const CUBIC_MARGIN: f64 = 0.2;
    const QUAD_MARGIN: f64 = 0.1;

    let mut rec = origin;

    for i in 0..params.max_iter {
        let width = hi.alpha - lo.alpha;
        let (a, b) = if width < 0.0 {
            (hi.alpha, lo.alpha)
        } else {
            (lo.alpha, hi.alpha)
        };
        let inside = |x: f64, margin: f64| x > a + margin && x < b - margin;

        let cubic = if i > 0 {
            cubic_min(lo.alpha, lo.phi, lo.dphi, hi.alpha, hi.phi, rec.alpha, rec.phi)
                .filter(|&x| inside(x, CUBIC_MARGIN * width.abs()))
        } else {
            None
        };
        let alpha = cubic
            .or_else(|| {
                quad_min(lo.alpha, lo.phi, lo.dphi, hi.alpha, hi.phi)
                    .filter(|&x| inside(x, QUAD_MARGIN * width.abs()))
            })
            .unwrap_or(0.5_f64.mul_add(width, lo.alpha));

        let (phi, dphi) = f(alpha);
        log::debug!("zoom {i}: alpha = {alpha}, phi = {phi}, dphi = {dphi}");
        let probe = Probe { alpha, phi, dphi };

        if phi > params.c1.mul_add(alpha * origin.dphi, origin.phi) || phi >= lo.phi {
            rec = hi;
            hi = probe;
        } else {
            if dphi.abs() <= -params.c2 * origin.dphi {
                return Ok(alpha);
            }
            if dphi * width >= 0.0 {
                rec = hi;
                hi = lo;
            } else {
                rec = lo;
            }
            lo = probe;
        }
    }
    Err(OptimizeError::LineSearchFailed)
}

/// Find a step length `alpha > 0` along which `f` decreases sufficiently
/// and flattens out (Nocedal & Wright, algorithm 3.5). `f(alpha)` returns
/// the value and the directional derivative at `alpha`.
///
/// # Example
///
/// ```
/// use genmodel::optim::{wolfe_search, WolfeParams};
///
/// // minimum at 0.5
/// let alpha = wolfe_search(&WolfeParams::default(), |x| {
///     ((x - 1.0).powi(2) + (x - 1.0), 2.0 * (x - 1.0) + 1.0)
/// })
/// .unwrap();
/// assert!((alpha - 0.5).abs() < 1E-10);
/// ```
pub fn wolfe_search<F>(params: &WolfeParams, f: F) -> Result<f64, OptimizeError>
where
    F: Fn(f64) -> (f64, f64),
{
    let (phi_0, dphi_0) = f(0.0);
    if !phi_0.is_finite() || !dphi_0.is_finite() {
        return Err(OptimizeError::NumericalDivergence);
    }
    let origin = Probe {
        alpha: 0.0,
        phi: phi_0,
        dphi: dphi_0,
    };

    let mut prev = origin;
    let mut alpha = 1.0_f64.min(params.amax);

    for i in 0..params.max_iter {
        if alpha == 0.0 {
            return Err(OptimizeError::RoundingError);
        }
        let (phi, dphi) = f(alpha);
        let curr = Probe { alpha, phi, dphi };
        log::debug!("wolfe_search {i}: alpha = {alpha}, phi = {phi}, dphi = {dphi}");

        if !phi.is_finite()
            || phi > params.c1.mul_add(alpha * dphi_0, phi_0)
            || (i > 0 && phi >= prev.phi)
        {
            return zoom(prev, curr, origin, params, &f);
        }
        if dphi.abs() <= -params.c2 * dphi_0 {
            return Ok(alpha);
        }
        if dphi >= 0.0 {
            return zoom(curr, prev, origin, params, &f);
        }

        prev = curr;
        alpha = (2.0 * alpha).min(params.amax);
    }
    Err(OptimizeError::LineSearchFailed)
}
