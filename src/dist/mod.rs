//! Probability distribution families usable as model nodes
//!
//! Every family lives in its own module and follows the same shape: a
//! validating `new`, a `new_unchecked` for hot paths, getters, and
//! implementations of [`HasDensity`](crate::traits::HasDensity),
//! [`Sampleable`](crate::traits::Sampleable) and friends over `f64` points.
//! [`Family`] names a family without parameters and [`Distribution`]
//! dispatches over fully parameterized members.
mod ar1;
mod bernoulli;
mod beta;
mod binomial;
mod cauchy;
mod distribution;
mod exponential;
mod family;
mod gamma;
mod gaussian;
mod half_cauchy;
mod half_normal;
mod inv_gamma;
mod laplace;
mod lognormal;
mod neg_binom;
mod poisson;
mod students_t;
mod uniform;

pub use ar1::Ar1;
pub use bernoulli::Bernoulli;
pub use beta::Beta;
pub use binomial::Binomial;
pub use cauchy::Cauchy;
pub use distribution::Distribution;
pub use exponential::Exponential;
pub use family::{Domain, Family};
pub use gamma::Gamma;
pub use gaussian::Gaussian;
pub use half_cauchy::HalfCauchy;
pub use half_normal::HalfNormal;
pub use inv_gamma::InvGamma;
pub use laplace::Laplace;
pub use lognormal::LogNormal;
pub use neg_binom::NegBinomial;
pub use poisson::Poisson;
pub use students_t::StudentsT;
pub use uniform::Uniform;

/// Invalid distribution parameter
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ParamError {
    /// The parameter is infinite or NaN
    #[error("non-finite {name}: {value}")]
    NotFinite { name: &'static str, value: f64 },
    /// The parameter must be strictly positive
    #[error("{name} ({value}) must be greater than zero")]
    NotPositive { name: &'static str, value: f64 },
    /// The parameter must be zero or greater
    #[error("{name} ({value}) must not be negative")]
    Negative { name: &'static str, value: f64 },
    /// The parameter must be a probability
    #[error("{name} ({value}) must be in [0, 1]")]
    NotProbability { name: &'static str, value: f64 },
    /// The parameter must be a non-negative integer
    #[error("{name} ({value}) must be a non-negative integer")]
    NotCount { name: &'static str, value: f64 },
    /// The bounds of an interval are out of order
    #[error("lower bound ({lower}) must be less than upper bound ({upper})")]
    InvertedBounds { lower: f64, upper: f64 },
    /// Wrong number of parameters for a family
    #[error("{family} takes {expected} parameters, got {got}")]
    Arity {
        family: Family,
        expected: usize,
        got: usize,
    },
}

#[inline]
pub(crate) fn finite(name: &'static str, value: f64) -> Result<f64, ParamError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParamError::NotFinite { name, value })
    }
}

#[inline]
pub(crate) fn positive(name: &'static str, value: f64) -> Result<f64, ParamError> {
    if value <= 0.0 {
        Err(ParamError::NotPositive { name, value })
    } else {
        finite(name, value)
    }
}

#[inline]
pub(crate) fn non_negative(
    name: &'static str,
    value: f64,
) -> Result<f64, ParamError> {
    if value < 0.0 {
        Err(ParamError::Negative { name, value })
    } else {
        finite(name, value)
    }
}

#[inline]
pub(crate) fn probability(
    name: &'static str,
    value: f64,
) -> Result<f64, ParamError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ParamError::NotProbability { name, value })
    }
}

#[inline]
pub(crate) fn count(name: &'static str, value: f64) -> Result<f64, ParamError> {
    if value >= 0.0 && value.is_finite() && value.fract() == 0.0 {
        Ok(value)
    } else {
        Err(ParamError::NotCount { name, value })
    }
}

/// `true` if `x` is a non-negative integer stored as a float
#[inline]
pub(crate) fn is_count(x: f64) -> bool {
    x >= 0.0 && x.is_finite() && x.fract() == 0.0
}

/// x ln(y) with the convention 0 ln(0) = 0
#[inline]
pub(crate) fn xlny(x: f64, y: f64) -> f64 {
    if x == 0.0 {
        0.0
    } else {
        x * y.ln()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_rejects_zero_negative_and_nan() {
        assert!(positive("sigma", 0.0).is_err());
        assert!(positive("sigma", -1.0).is_err());
        assert!(positive("sigma", f64::NAN).is_err());
        assert!(positive("sigma", f64::INFINITY).is_err());
        assert_eq!(positive("sigma", 2.0), Ok(2.0));
    }

    #[test]
    fn count_requires_whole_numbers() {
        assert!(count("n", 3.0).is_ok());
        assert!(count("n", 0.0).is_ok());
        assert!(count("n", 2.5).is_err());
        assert!(count("n", -1.0).is_err());
    }

    #[test]
    fn xlny_zero_convention() {
        assert_eq!(xlny(0.0, 0.0), 0.0);
        assert!((xlny(2.0, 3.0) - 2.0 * 3.0_f64.ln()).abs() < 1E-12);
    }

    #[test]
    fn param_error_messages() {
        let err = ParamError::NotPositive {
            name: "sigma",
            value: -1.0,
        };
        assert_eq!(err.to_string(), "sigma (-1) must be greater than zero");
    }
}
