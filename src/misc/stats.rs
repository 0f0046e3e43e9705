//! Sample statistics over slices of draws
use special::Error as _;
use std::cmp::Ordering;
use std::f64::consts::SQRT_2;

/// Arithmetic mean. `NaN` for an empty slice.
pub fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Variance with `ddof` delta degrees of freedom
pub fn variance(xs: &[f64], ddof: usize) -> f64 {
    let n = xs.len();
    if n <= ddof {
        return f64::NAN;
    }
    let m = mean(xs);
    xs.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / (n - ddof) as f64
}

/// Sample standard deviation (`ddof = 1`)
pub fn std_dev(xs: &[f64]) -> f64 {
    variance(xs, 1).sqrt()
}

/// Sorts a copy of `xs`, placing NaNs last
pub fn sorted(xs: &[f64]) -> Vec<f64> {
    let mut ys = xs.to_vec();
    ys.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Greater));
    ys
}

/// Quantile of already sorted data with linear interpolation between
/// order statistics.
///
/// # Example
///
/// ```rust
/// # use genmodel::misc::quantile_sorted;
/// let xs = [1.0, 2.0, 3.0, 4.0];
/// assert_eq!(quantile_sorted(&xs, 0.5), 2.5);
/// assert_eq!(quantile_sorted(&xs, 1.0), 4.0);
/// ```
pub fn quantile_sorted(xs: &[f64], q: f64) -> f64 {
    if xs.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (xs.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    frac.mul_add(xs[hi] - xs[lo], xs[lo])
}

/// Quantile of unsorted data
pub fn quantile(xs: &[f64], q: f64) -> f64 {
    quantile_sorted(&sorted(xs), q)
}

/// Quantile function of the standard normal
#[inline]
pub fn normal_quantile(p: f64) -> f64 {
    SQRT_2 * 2.0_f64.mul_add(p, -1.0).inv_error()
}

/// Average ranks (1-based) of `xs`, ties receive the mean of their ranks
pub fn ranks(xs: &[f64]) -> Vec<f64> {
    let mut ixs: Vec<usize> = (0..xs.len()).collect();
    ixs.sort_by(|&a, &b| xs[a].partial_cmp(&xs[b]).unwrap_or(Ordering::Greater));

    let mut out = vec![0.0; xs.len()];
    let mut start = 0;
    while start < ixs.len() {
        let mut stop = start + 1;
        while stop < ixs.len() && xs[ixs[stop]] == xs[ixs[start]] {
            stop += 1;
        }
        // ranks start..stop (0-based) share their average, 1-based
        let avg = (start + stop + 1) as f64 / 2.0;
        ixs[start..stop].iter().for_each(|&ix| out[ix] = avg);
        start = stop;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1E-12;

    #[test]
    fn mean_and_variance() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        assert::close(mean(&xs), 2.5, TOL);
        assert::close(variance(&xs, 0), 1.25, TOL);
        assert::close(variance(&xs, 1), 5.0 / 3.0, TOL);
    }

    #[test]
    fn variance_without_enough_points_is_nan() {
        assert!(variance(&[1.0], 1).is_nan());
    }

    #[test]
    fn quantile_interpolates() {
        let xs = [3.0, 1.0, 2.0];
        assert::close(quantile(&xs, 0.25), 1.5, TOL);
        assert::close(quantile(&xs, 0.0), 1.0, TOL);
    }

    #[test]
    fn normal_quantile_known_values() {
        assert::close(normal_quantile(0.5), 0.0, 1E-10);
        assert::close(normal_quantile(0.975), 1.959_963_984_540_054, 1E-8);
        assert::close(normal_quantile(0.025), -1.959_963_984_540_054, 1E-8);
    }

    #[test]
    fn ranks_average_ties() {
        let r = ranks(&[10.0, 20.0, 10.0, 5.0]);
        assert_eq!(r, vec![2.5, 4.0, 2.5, 1.0]);
    }
}
