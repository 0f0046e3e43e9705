use serde::{Deserialize, Serialize};
use std::fmt;

/// A distribution family, without parameters.
///
/// Families are named after their PyMC counterparts and take parameters in
/// the same order, see [`Family::param_names`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    Normal,
    HalfNormal,
    StudentT,
    Cauchy,
    HalfCauchy,
    Laplace,
    Exponential,
    Gamma,
    InverseGamma,
    LogNormal,
    Beta,
    Uniform,
    Bernoulli,
    Binomial,
    Poisson,
    NegativeBinomial,
    /// First order autoregressive process over the last axis
    Ar1,
}

/// The support of a family, which decides how it is mapped onto the real
/// line for inference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Domain {
    /// (-∞, ∞)
    Real,
    /// (0, ∞)
    Positive,
    /// (0, 1)
    UnitInterval,
    /// (lower, upper), where the bounds are the parameters at the given
    /// positions
    Bounded { lower: usize, upper: usize },
    /// Non-negative integers
    Count,
    /// {0, 1}
    Binary,
}

impl Family {
    /// The family name as written in model summaries
    pub fn name(&self) -> &'static str {
        match self {
            Family::Normal => "Normal",
            Family::HalfNormal => "HalfNormal",
            Family::StudentT => "StudentT",
            Family::Cauchy => "Cauchy",
            Family::HalfCauchy => "HalfCauchy",
            Family::Laplace => "Laplace",
            Family::Exponential => "Exponential",
            Family::Gamma => "Gamma",
            Family::InverseGamma => "InverseGamma",
            Family::LogNormal => "LogNormal",
            Family::Beta => "Beta",
            Family::Uniform => "Uniform",
            Family::Bernoulli => "Bernoulli",
            Family::Binomial => "Binomial",
            Family::Poisson => "Poisson",
            Family::NegativeBinomial => "NegativeBinomial",
            Family::Ar1 => "AR1",
        }
    }

    /// Parameter names, in the order they are passed
    pub fn param_names(&self) -> &'static [&'static str] {
        match self {
            Family::Normal => &["mu", "sigma"],
            Family::HalfNormal => &["sigma"],
            Family::StudentT => &["nu", "mu", "sigma"],
            Family::Cauchy => &["alpha", "beta"],
            Family::HalfCauchy => &["beta"],
            Family::Laplace => &["mu", "b"],
            Family::Exponential => &["lam"],
            Family::Gamma => &["alpha", "beta"],
            Family::InverseGamma => &["alpha", "beta"],
            Family::LogNormal => &["mu", "sigma"],
            Family::Beta => &["alpha", "beta"],
            Family::Uniform => &["lower", "upper"],
            Family::Bernoulli => &["p"],
            Family::Binomial => &["n", "p"],
            Family::Poisson => &["mu"],
            Family::NegativeBinomial => &["mu", "alpha"],
            Family::Ar1 => &["rho", "sigma"],
        }
    }

    /// Number of parameters
    #[inline]
    pub fn arity(&self) -> usize {
        self.param_names().len()
    }

    pub fn domain(&self) -> Domain {
        match self {
            Family::Normal
            | Family::StudentT
            | Family::Cauchy
            | Family::Laplace
            | Family::Ar1 => Domain::Real,
            Family::HalfNormal
            | Family::HalfCauchy
            | Family::Exponential
            | Family::Gamma
            | Family::InverseGamma
            | Family::LogNormal => Domain::Positive,
            Family::Beta => Domain::UnitInterval,
            Family::Uniform => Domain::Bounded { lower: 0, upper: 1 },
            Family::Binomial | Family::Poisson | Family::NegativeBinomial => {
                Domain::Count
            }
            Family::Bernoulli => Domain::Binary,
        }
    }

    /// Discrete families can only be observed
    #[inline]
    pub fn is_discrete(&self) -> bool {
        matches!(self.domain(), Domain::Count | Domain::Binary)
    }

    /// Vector families define a joint density over the last axis of a
    /// node instead of one density per element
    #[inline]
    pub fn is_vector(&self) -> bool {
        matches!(self, Family::Ar1)
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
