use rand::Rng;

use super::{Family, ParamError};
use crate::traits::{HasDensity, Mean, Moment, Sampleable};

/// A fully parameterized member of any [`Family`]
#[derive(Clone, Debug, PartialEq)]
pub enum Distribution {
    Normal(super::Gaussian),
    HalfNormal(super::HalfNormal),
    StudentT(super::StudentsT),
    Cauchy(super::Cauchy),
    HalfCauchy(super::HalfCauchy),
    Laplace(super::Laplace),
    Exponential(super::Exponential),
    Gamma(super::Gamma),
    InverseGamma(super::InvGamma),
    LogNormal(super::LogNormal),
    Beta(super::Beta),
    Uniform(super::Uniform),
    Bernoulli(super::Bernoulli),
    Binomial(super::Binomial),
    Poisson(super::Poisson),
    NegativeBinomial(super::NegBinomial),
    Ar1(super::Ar1),
}

/// Forward a call to the scalar families. AR(1) is handled by the caller.
macro_rules! scalar_dispatch {
    ($self:expr, $inner:ident => $body:expr, ar1 => $ar:expr) => {
        match $self {
            Distribution::Normal($inner) => $body,
            Distribution::HalfNormal($inner) => $body,
            Distribution::StudentT($inner) => $body,
            Distribution::Cauchy($inner) => $body,
            Distribution::HalfCauchy($inner) => $body,
            Distribution::Laplace($inner) => $body,
            Distribution::Exponential($inner) => $body,
            Distribution::Gamma($inner) => $body,
            Distribution::InverseGamma($inner) => $body,
            Distribution::LogNormal($inner) => $body,
            Distribution::Beta($inner) => $body,
            Distribution::Uniform($inner) => $body,
            Distribution::Bernoulli($inner) => $body,
            Distribution::Binomial($inner) => $body,
            Distribution::Poisson($inner) => $body,
            Distribution::NegativeBinomial($inner) => $body,
            Distribution::Ar1($inner) => $ar,
        }
    };
}

impl Distribution {
    /// Build a member of `family` from its parameters, given in the order
    /// of [`Family::param_names`].
    ///
    /// # Example
    ///
    /// ```
    /// use genmodel::dist::{Distribution, Family};
    ///
    /// let dist = Distribution::build(Family::Gamma, &[2.0, 3.0]).unwrap();
    /// assert_eq!(dist.family(), Family::Gamma);
    /// assert!(Distribution::build(Family::Gamma, &[2.0]).is_err());
    /// assert!(Distribution::build(Family::Gamma, &[2.0, -1.0]).is_err());
    /// ```
    pub fn build(family: Family, params: &[f64]) -> Result<Self, ParamError> {
        if params.len() != family.arity() {
            return Err(ParamError::Arity {
                family,
                expected: family.arity(),
                got: params.len(),
            });
        }
        let p = params;
        let dist = match family {
            Family::Normal => Self::Normal(super::Gaussian::new(p[0], p[1])?),
            Family::HalfNormal => Self::HalfNormal(super::HalfNormal::new(p[0])?),
            Family::StudentT => {
                Self::StudentT(super::StudentsT::new(p[0], p[1], p[2])?)
            }
            Family::Cauchy => Self::Cauchy(super::Cauchy::new(p[0], p[1])?),
            Family::HalfCauchy => Self::HalfCauchy(super::HalfCauchy::new(p[0])?),
            Family::Laplace => Self::Laplace(super::Laplace::new(p[0], p[1])?),
            Family::Exponential => {
                Self::Exponential(super::Exponential::new(p[0])?)
            }
            Family::Gamma => Self::Gamma(super::Gamma::new(p[0], p[1])?),
            Family::InverseGamma => {
                Self::InverseGamma(super::InvGamma::new(p[0], p[1])?)
            }
            Family::LogNormal => {
                Self::LogNormal(super::LogNormal::new(p[0], p[1])?)
            }
            Family::Beta => Self::Beta(super::Beta::new(p[0], p[1])?),
            Family::Uniform => Self::Uniform(super::Uniform::new(p[0], p[1])?),
            Family::Bernoulli => Self::Bernoulli(super::Bernoulli::new(p[0])?),
            Family::Binomial => {
                Self::Binomial(super::Binomial::new(p[0], p[1])?)
            }
            Family::Poisson => Self::Poisson(super::Poisson::new(p[0])?),
            Family::NegativeBinomial => {
                Self::NegativeBinomial(super::NegBinomial::new(p[0], p[1])?)
            }
            Family::Ar1 => Self::Ar1(super::Ar1::new(p[0], p[1])?),
        };
        Ok(dist)
    }

    pub fn family(&self) -> Family {
        match self {
            Self::Normal(_) => Family::Normal,
            Self::HalfNormal(_) => Family::HalfNormal,
            Self::StudentT(_) => Family::StudentT,
            Self::Cauchy(_) => Family::Cauchy,
            Self::HalfCauchy(_) => Family::HalfCauchy,
            Self::Laplace(_) => Family::Laplace,
            Self::Exponential(_) => Family::Exponential,
            Self::Gamma(_) => Family::Gamma,
            Self::InverseGamma(_) => Family::InverseGamma,
            Self::LogNormal(_) => Family::LogNormal,
            Self::Beta(_) => Family::Beta,
            Self::Uniform(_) => Family::Uniform,
            Self::Bernoulli(_) => Family::Bernoulli,
            Self::Binomial(_) => Family::Binomial,
            Self::Poisson(_) => Family::Poisson,
            Self::NegativeBinomial(_) => Family::NegativeBinomial,
            Self::Ar1(_) => Family::Ar1,
        }
    }

    /// Log density of a single point. For AR(1) this is the density of a
    /// one element sequence.
    pub fn ln_f(&self, x: f64) -> f64 {
        scalar_dispatch!(self, inner => inner.ln_f(x), ar1 => inner.ln_f_seq(&[x]))
    }

    /// Log density of a block of points. Scalar families treat the points
    /// as independent, AR(1) treats them as one sequence.
    pub fn ln_f_seq(&self, xs: &[f64]) -> f64 {
        match self {
            Self::Ar1(ar) => ar.ln_f_seq(xs),
            _ => xs.iter().map(|&x| self.ln_f(x)).sum(),
        }
    }

    pub fn draw<R: Rng>(&self, rng: &mut R) -> f64 {
        scalar_dispatch!(
            self,
            inner => inner.draw(rng),
            ar1 => inner.draw_seq(1, rng).first().copied().unwrap_or(f64::NAN)
        )
    }

    /// Draw `n` points: independent for scalar families, one sequence for
    /// AR(1).
    pub fn draw_seq<R: Rng>(&self, n: usize, rng: &mut R) -> Vec<f64> {
        match self {
            Self::Ar1(ar) => ar.draw_seq(n, rng),
            _ => (0..n).map(|_| self.draw(rng)).collect(),
        }
    }

    /// Mean, if the family has one
    pub fn mean(&self) -> Option<f64> {
        match self {
            Self::Normal(inner) => inner.mean(),
            Self::HalfNormal(inner) => inner.mean(),
            Self::StudentT(inner) => inner.mean(),
            Self::Laplace(inner) => inner.mean(),
            Self::Exponential(inner) => inner.mean(),
            Self::Gamma(inner) => inner.mean(),
            Self::InverseGamma(inner) => inner.mean(),
            Self::LogNormal(inner) => inner.mean(),
            Self::Beta(inner) => inner.mean(),
            Self::Uniform(inner) => inner.mean(),
            Self::Bernoulli(inner) => inner.mean(),
            Self::Binomial(inner) => inner.mean(),
            Self::Poisson(inner) => inner.mean(),
            Self::NegativeBinomial(inner) => inner.mean(),
            Self::Ar1(_) => Some(0.0),
            Self::Cauchy(_) | Self::HalfCauchy(_) => None,
        }
    }

    pub fn moment(&self) -> f64 {
        scalar_dispatch!(self, inner => inner.moment(), ar1 => inner.moment())
    }
}

impl From<&Distribution> for String {
    fn from(dist: &Distribution) -> String {
        scalar_dispatch!(dist, inner => String::from(inner), ar1 => String::from(inner))
    }
}

impl_display!(Distribution);

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    #[test]
    fn build_checks_arity() {
        let err = Distribution::build(Family::Normal, &[0.0]).unwrap_err();
        assert_eq!(
            err,
            ParamError::Arity {
                family: Family::Normal,
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn build_checks_params() {
        assert!(Distribution::build(Family::Normal, &[0.0, -1.0]).is_err());
        assert!(Distribution::build(Family::Beta, &[0.0, 1.0]).is_err());
        assert!(Distribution::build(Family::Binomial, &[3.5, 0.5]).is_err());
        assert!(Distribution::build(Family::Uniform, &[1.0, 0.0]).is_err());
    }

    #[test]
    fn dispatches_to_members() {
        let dist = Distribution::build(Family::Normal, &[3.0, 2.0]).unwrap();
        assert::close(dist.ln_f(6.0), -2.737_085_713_764_618, 1E-10);
        assert_eq!(dist.moment(), 3.0);
        assert_eq!(dist.to_string(), "N(μ: 3, σ: 2)");
    }

    #[test]
    fn ln_f_seq_sums_independent_points() {
        let dist = Distribution::build(Family::Exponential, &[2.0]).unwrap();
        let xs = [0.5, 1.0, 1.5];
        let expected: f64 = xs.iter().map(|&x| dist.ln_f(x)).sum();
        assert::close(dist.ln_f_seq(&xs), expected, 1E-12);
    }

    #[test]
    fn ar1_draws_sequences() {
        let mut rng = Xoshiro256Plus::seed_from_u64(3);
        let dist = Distribution::build(Family::Ar1, &[0.5, 1.0]).unwrap();
        let xs = dist.draw_seq(25, &mut rng);
        assert_eq!(xs.len(), 25);
        assert!(dist.ln_f_seq(&xs).is_finite());
    }

    #[test]
    fn every_family_builds_from_its_moment_params() {
        let cases: [(Family, &[f64]); 17] = [
            (Family::Normal, &[0.0, 1.0]),
            (Family::HalfNormal, &[1.0]),
            (Family::StudentT, &[3.0, 0.0, 1.0]),
            (Family::Cauchy, &[0.0, 1.0]),
            (Family::HalfCauchy, &[1.0]),
            (Family::Laplace, &[0.0, 1.0]),
            (Family::Exponential, &[1.0]),
            (Family::Gamma, &[2.0, 1.0]),
            (Family::InverseGamma, &[3.0, 1.0]),
            (Family::LogNormal, &[0.0, 1.0]),
            (Family::Beta, &[2.0, 2.0]),
            (Family::Uniform, &[0.0, 1.0]),
            (Family::Bernoulli, &[0.5]),
            (Family::Binomial, &[10.0, 0.5]),
            (Family::Poisson, &[3.0]),
            (Family::NegativeBinomial, &[3.0, 2.0]),
            (Family::Ar1, &[0.5, 1.0]),
        ];
        for (family, params) in cases {
            let dist = Distribution::build(family, params).unwrap();
            assert_eq!(dist.family(), family);
            assert!(dist.ln_f(dist.moment()).is_finite(), "{family}");
        }
    }
}
