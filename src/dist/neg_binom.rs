//! Negative binomial distribution over non-negative integers
use rand::Rng;
use rand_distr::{Gamma as RGamma, Poisson as RPoisson};

use super::{is_count, positive, ParamError};
use crate::misc::ln_gammafn;
use crate::traits::{HasDensity, Mean, Moment, Sampleable, Support, Variance};

/// [Negative binomial](https://en.wikipedia.org/wiki/Negative_binomial_distribution)
/// in the mean/dispersion parameterization: mean `mu`, variance
/// `mu + mu² / alpha`. Large `alpha` approaches Poisson(mu).
#[derive(Debug, Clone, PartialEq)]
pub struct NegBinomial {
    mu: f64,
    alpha: f64,
}

impl NegBinomial {
    pub fn new(mu: f64, alpha: f64) -> Result<Self, ParamError> {
        positive("mu", mu)?;
        positive("alpha", alpha)?;
        Ok(NegBinomial { mu, alpha })
    }

    #[inline]
    #[must_use]
    pub fn new_unchecked(mu: f64, alpha: f64) -> Self {
        NegBinomial { mu, alpha }
    }

    #[inline]
    pub fn mu(&self) -> f64 {
        self.mu
    }

    #[inline]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl From<&NegBinomial> for String {
    fn from(nb: &NegBinomial) -> String {
        format!("NegBinomial(μ: {}, α: {})", nb.mu, nb.alpha)
    }
}

impl_display!(NegBinomial);

impl HasDensity for NegBinomial {
    fn ln_f(&self, k: f64) -> f64 {
        if !is_count(k) {
            return f64::NEG_INFINITY;
        }
        let (mu, a) = (self.mu, self.alpha);
        let ln_mu_a = (mu + a).ln();
        ln_gammafn(k + a) - ln_gammafn(a) - ln_gammafn(k + 1.0)
            + a * (a.ln() - ln_mu_a)
            + k * (mu.ln() - ln_mu_a)
    }
}

impl Sampleable for NegBinomial {
    fn draw<R: Rng>(&self, rng: &mut R) -> f64 {
        // gamma-Poisson mixture
        let rate = match RGamma::new(self.alpha, self.mu / self.alpha) {
            Ok(g) => rng.sample(g),
            Err(_) => return f64::NAN,
        };
        if rate <= 0.0 {
            return 0.0;
        }
        match RPoisson::new(rate) {
            Ok(p) => rng.sample(p),
            Err(_) => f64::NAN,
        }
    }
}

impl Support for NegBinomial {
    fn supports(&self, k: f64) -> bool {
        is_count(k)
    }
}

impl Mean for NegBinomial {
    fn mean(&self) -> Option<f64> {
        Some(self.mu)
    }
}

impl Variance for NegBinomial {
    fn variance(&self) -> Option<f64> {
        Some(self.mu + self.mu * self.mu / self.alpha)
    }
}

impl Moment for NegBinomial {
    fn moment(&self) -> f64 {
        self.mu.floor()
    }
}
