use special::Gamma;
use std::fmt::Debug;

/// Convert a slice to a printable string, eliding the middle of long slices
///
/// # Example
///
/// ```rust
/// # use genmodel::misc::vec_to_string;
/// let xs: Vec<u8> = vec![0, 1, 2, 3, 4, 5];
///
/// assert_eq!(vec_to_string(&xs, 6).as_str(), "[0, 1, 2, 3, 4, 5]");
/// assert_eq!(vec_to_string(&xs, 5).as_str(), "[0, 1, 2, 3, ... , 5]");
/// ```
pub fn vec_to_string<T: Debug>(xs: &[T], max_entries: usize) -> String {
    let mut out = String::from("[");
    let n = xs.len();
    xs.iter().enumerate().for_each(|(i, x)| {
        let to_push = if i < max_entries - 1 && i + 1 < n {
            format!("{:?}, ", x)
        } else if i == (max_entries - 1) && n > max_entries {
            String::from("... , ")
        } else if i + 1 == n {
            format!("{:?}", x)
        } else {
            String::new()
        };
        out.push_str(to_push.as_str());
    });
    out.push(']');
    out
}

/// Natural logarithm of the gamma function
#[inline]
pub fn ln_gammafn(x: f64) -> f64 {
    x.ln_gamma().0
}

/// Natural logarithm of binomial coefficent, ln nCk
///
/// # Example
///
/// ```rust
/// use genmodel::misc::ln_binom;
///
/// assert!((ln_binom(4.0, 2.0) - 6.0_f64.ln()).abs() < 1E-12);
/// ```
pub fn ln_binom(n: f64, k: f64) -> f64 {
    ln_gammafn(n + 1.0) - ln_gammafn(k + 1.0) - ln_gammafn(n - k + 1.0)
}

/// `ln(exp(a) + exp(b))` without overflow
#[inline]
pub fn log_add_exp(a: f64, b: f64) -> f64 {
    let max = a.max(b);
    if max == f64::NEG_INFINITY {
        f64::NEG_INFINITY
    } else {
        max + ((a - max).exp() + (b - max).exp()).ln()
    }
}

/// The logistic function, 1 / (1 + e^-x)
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// ln(1 + e^x)
#[inline]
pub fn log1pexp(x: f64) -> f64 {
    if x > 35.0 {
        x
    } else if x < -10.0 {
        x.exp()
    } else {
        x.exp().ln_1p()
    }
}

/// ln σ(x), accurate in both tails
#[inline]
pub fn ln_sigmoid(x: f64) -> f64 {
    -log1pexp(-x)
}

/// Inverse of the logistic function
#[inline]
pub fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}

/// `n` evenly spaced points over `[start, stop]`
///
/// # Example
///
/// ```rust
/// # use genmodel::misc::linspace;
/// assert_eq!(linspace(0.0, 1.0, 3), vec![0.0, 0.5, 1.0]);
/// assert_eq!(linspace(2.0, 5.0, 1), vec![2.0]);
/// ```
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => vec![],
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n).map(|i| step.mul_add(i as f64, start)).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1E-12;

    #[test]
    fn log_add_exp_handles_neg_infinity() {
        assert_eq!(log_add_exp(f64::NEG_INFINITY, f64::NEG_INFINITY), f64::NEG_INFINITY);
        assert::close(log_add_exp(f64::NEG_INFINITY, 0.3), 0.3, TOL);
    }

    #[test]
    fn sigmoid_and_logit_invert() {
        for &x in &[-30.0, -2.0, 0.0, 0.7, 12.0] {
            assert::close(logit(sigmoid(x)), x, 1E-8);
        }
    }

    #[test]
    fn ln_sigmoid_is_stable_in_tails() {
        assert!(ln_sigmoid(-800.0).is_finite());
        assert::close(ln_sigmoid(800.0), 0.0, TOL);
        assert::close(ln_sigmoid(0.0), -std::f64::consts::LN_2, TOL);
    }

    #[test]
    fn vec_to_string_short() {
        assert_eq!(vec_to_string(&[1, 2], 6), "[1, 2]");
        assert_eq!(vec_to_string::<u8>(&[], 6), "[]");
    }
}
