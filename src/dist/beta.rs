//! Beta distribution over x in (0, 1)
use rand::Rng;
use rand_distr::Beta as RBeta;

use super::{positive, ParamError};
use crate::misc::ln_gammafn;
use crate::traits::{HasDensity, Mean, Moment, Sampleable, Support, Variance};

/// [Beta distribution](https://en.wikipedia.org/wiki/Beta_distribution),
/// Beta(α, β) over x in (0, 1).
///
/// # Examples
///
/// ```
/// use genmodel::dist::Beta;
/// use genmodel::traits::*;
///
/// let beta = Beta::new(2.0, 2.0).unwrap();
/// assert_eq!(beta.mean(), Some(0.5));
/// assert!(beta.ln_f(0.5) > beta.ln_f(0.1));
/// ```
#[derive(Debug, Clone)]
pub struct Beta {
    alpha: f64,
    beta: f64,
    /// Cached ln B(α, β)
    ln_beta_ab: f64,
}

impl PartialEq for Beta {
    fn eq(&self, other: &Beta) -> bool {
        self.alpha == other.alpha && self.beta == other.beta
    }
}

impl Beta {
    pub fn new(alpha: f64, beta: f64) -> Result<Self, ParamError> {
        positive("alpha", alpha)?;
        positive("beta", beta)?;
        Ok(Self::new_unchecked(alpha, beta))
    }

    #[inline]
    #[must_use]
    pub fn new_unchecked(alpha: f64, beta: f64) -> Self {
        Beta {
            alpha,
            beta,
            ln_beta_ab: ln_gammafn(alpha) + ln_gammafn(beta)
                - ln_gammafn(alpha + beta),
        }
    }

    /// Uniform on (0, 1)
    #[inline]
    #[must_use]
    pub fn uniform() -> Self {
        Beta {
            alpha: 1.0,
            beta: 1.0,
            ln_beta_ab: 0.0,
        }
    }

    #[inline]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    #[inline]
    pub fn beta(&self) -> f64 {
        self.beta
    }
}

impl From<&Beta> for String {
    fn from(beta: &Beta) -> String {
        format!("Beta(α: {}, β: {})", beta.alpha, beta.beta)
    }
}

impl_display!(Beta);

impl HasDensity for Beta {
    fn ln_f(&self, x: f64) -> f64 {
        if !(0.0..=1.0).contains(&x) {
            return f64::NEG_INFINITY;
        }
        (self.alpha - 1.0).mul_add(x.ln(), (self.beta - 1.0) * (-x).ln_1p())
            - self.ln_beta_ab
    }
}

impl Sampleable for Beta {
    fn draw<R: Rng>(&self, rng: &mut R) -> f64 {
        match RBeta::new(self.alpha, self.beta) {
            Ok(b) => rng.sample(b),
            Err(_) => f64::NAN,
        }
    }
}

impl Support for Beta {
    fn supports(&self, x: f64) -> bool {
        0.0 < x && x < 1.0
    }
}

impl Mean for Beta {
    fn mean(&self) -> Option<f64> {
        Some(self.alpha / (self.alpha + self.beta))
    }
}

impl Variance for Beta {
    fn variance(&self) -> Option<f64> {
        let apb = self.alpha + self.beta;
        Some(self.alpha * self.beta / (apb * apb * (apb + 1.0)))
    }
}

impl Moment for Beta {
    fn moment(&self) -> f64 {
        self.alpha / (self.alpha + self.beta)
    }
}
