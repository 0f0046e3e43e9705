use crate::misc::sorted;

/// Highest density interval: the narrowest interval holding a fraction
/// `prob` of the draws. Assumes a unimodal posterior.
///
/// # Example
///
/// ```
/// use genmodel::diagnostics::hdi;
///
/// let xs: Vec<f64> = (0..=100).map(f64::from).collect();
/// assert_eq!(hdi(&xs, 0.5), (0.0, 50.0));
/// ```
pub fn hdi(xs: &[f64], prob: f64) -> (f64, f64) {
    let finite: Vec<f64> = xs.iter().copied().filter(|x| x.is_finite()).collect();
    if finite.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let xs = sorted(&finite);
    let n = xs.len();
    let width = ((prob.clamp(0.0, 1.0) * n as f64).floor() as usize).min(n - 1);

    let lo = (0..n - width)
        .min_by(|&a, &b| {
            let wa = xs[a + width] - xs[a];
            let wb = xs[b + width] - xs[b];
            wa.total_cmp(&wb)
        })
        .unwrap_or(0);
    (xs[lo], xs[lo + width])
}
