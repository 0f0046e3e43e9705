use super::{Expr, ModelError};
use crate::dist::Family;

/// A distribution family with expression-valued parameters
///
/// # Example
///
/// ```
/// use genmodel::dist::Family;
/// use genmodel::model::{DistSpec, Expr};
///
/// let spec = DistSpec::student_t(4.0, 0.0, 2.5);
/// assert_eq!(spec.family(), Family::StudentT);
/// assert_eq!(spec.params().len(), 3);
///
/// // the generic constructor checks the number of parameters
/// assert!(DistSpec::new(Family::Normal, vec![Expr::from(0.0)]).is_err());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct DistSpec {
    family: Family,
    params: Vec<Expr>,
}

impl DistSpec {
    pub fn new(family: Family, params: Vec<Expr>) -> Result<Self, ModelError> {
        if params.len() == family.arity() {
            Ok(DistSpec { family, params })
        } else {
            Err(ModelError::ArityMismatch {
                family,
                expected: family.arity(),
                got: params.len(),
            })
        }
    }

    #[inline]
    pub fn family(&self) -> Family {
        self.family
    }

    #[inline]
    pub fn params(&self) -> &[Expr] {
        &self.params
    }

    fn of(family: Family, params: Vec<Expr>) -> Self {
        DistSpec { family, params }
    }

    pub fn normal(mu: impl Into<Expr>, sigma: impl Into<Expr>) -> Self {
        Self::of(Family::Normal, vec![mu.into(), sigma.into()])
    }

    pub fn half_normal(sigma: impl Into<Expr>) -> Self {
        Self::of(Family::HalfNormal, vec![sigma.into()])
    }

    pub fn student_t(
        nu: impl Into<Expr>,
        mu: impl Into<Expr>,
        sigma: impl Into<Expr>,
    ) -> Self {
        Self::of(Family::StudentT, vec![nu.into(), mu.into(), sigma.into()])
    }

    pub fn cauchy(alpha: impl Into<Expr>, beta: impl Into<Expr>) -> Self {
        Self::of(Family::Cauchy, vec![alpha.into(), beta.into()])
    }

    pub fn half_cauchy(beta: impl Into<Expr>) -> Self {
        Self::of(Family::HalfCauchy, vec![beta.into()])
    }

    pub fn laplace(mu: impl Into<Expr>, b: impl Into<Expr>) -> Self {
        Self::of(Family::Laplace, vec![mu.into(), b.into()])
    }

    pub fn exponential(lam: impl Into<Expr>) -> Self {
        Self::of(Family::Exponential, vec![lam.into()])
    }

    /// Gamma with shape `alpha` and rate `beta`
    pub fn gamma(alpha: impl Into<Expr>, beta: impl Into<Expr>) -> Self {
        Self::of(Family::Gamma, vec![alpha.into(), beta.into()])
    }

    /// Inverse gamma with shape `alpha` and scale `beta`
    pub fn inverse_gamma(alpha: impl Into<Expr>, beta: impl Into<Expr>) -> Self {
        Self::of(Family::InverseGamma, vec![alpha.into(), beta.into()])
    }

    pub fn lognormal(mu: impl Into<Expr>, sigma: impl Into<Expr>) -> Self {
        Self::of(Family::LogNormal, vec![mu.into(), sigma.into()])
    }

    pub fn beta(alpha: impl Into<Expr>, beta: impl Into<Expr>) -> Self {
        Self::of(Family::Beta, vec![alpha.into(), beta.into()])
    }

    pub fn uniform(lower: impl Into<Expr>, upper: impl Into<Expr>) -> Self {
        Self::of(Family::Uniform, vec![lower.into(), upper.into()])
    }

    pub fn bernoulli(p: impl Into<Expr>) -> Self {
        Self::of(Family::Bernoulli, vec![p.into()])
    }

    pub fn binomial(n: impl Into<Expr>, p: impl Into<Expr>) -> Self {
        Self::of(Family::Binomial, vec![n.into(), p.into()])
    }

    pub fn poisson(mu: impl Into<Expr>) -> Self {
        Self::of(Family::Poisson, vec![mu.into()])
    }

    /// Negative binomial with mean `mu` and dispersion `alpha`
    pub fn negative_binomial(mu: impl Into<Expr>, alpha: impl Into<Expr>) -> Self {
        Self::of(Family::NegativeBinomial, vec![mu.into(), alpha.into()])
    }

    /// Zero-mean AR(1) over the last axis of the node
    pub fn ar1(rho: impl Into<Expr>, sigma: impl Into<Expr>) -> Self {
        Self::of(Family::Ar1, vec![rho.into(), sigma.into()])
    }
}
