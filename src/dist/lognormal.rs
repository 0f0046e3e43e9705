//! Log-normal distribution over x in (0, ∞)
use rand::Rng;
use rand_distr::StandardNormal;

use super::{finite, positive, ParamError};
use crate::consts::HALF_LN_2PI;
use crate::traits::{HasDensity, Mean, Moment, Sampleable, Support, Variance};

/// [Log-normal](https://en.wikipedia.org/wiki/Log-normal_distribution):
/// `ln x ~ N(mu, sigma)`.
#[derive(Debug, Clone, PartialEq)]
pub struct LogNormal {
    mu: f64,
    sigma: f64,
}

impl LogNormal {
    pub fn new(mu: f64, sigma: f64) -> Result<Self, ParamError> {
        finite("mu", mu)?;
        positive("sigma", sigma)?;
        Ok(LogNormal { mu, sigma })
    }

    #[inline]
    #[must_use]
    pub fn new_unchecked(mu: f64, sigma: f64) -> Self {
        LogNormal { mu, sigma }
    }

    #[inline]
    pub fn mu(&self) -> f64 {
        self.mu
    }

    #[inline]
    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}

impl From<&LogNormal> for String {
    fn from(ln: &LogNormal) -> String {
        format!("LogNormal(μ: {}, σ: {})", ln.mu, ln.sigma)
    }
}

impl_display!(LogNormal);

impl HasDensity for LogNormal {
    fn ln_f(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return f64::NEG_INFINITY;
        }
        let lnx = x.ln();
        let k = (lnx - self.mu) / self.sigma;
        -0.5 * k * k - self.sigma.ln() - lnx - HALF_LN_2PI
    }
}

impl Sampleable for LogNormal {
    fn draw<R: Rng>(&self, rng: &mut R) -> f64 {
        let z: f64 = rng.sample(StandardNormal);
        self.sigma.mul_add(z, self.mu).exp()
    }
}

impl Support for LogNormal {
    fn supports(&self, x: f64) -> bool {
        x > 0.0 && x.is_finite()
    }
}

impl Mean for LogNormal {
    fn mean(&self) -> Option<f64> {
        Some((self.mu + self.sigma * self.sigma / 2.0).exp())
    }
}

impl Variance for LogNormal {
    fn variance(&self) -> Option<f64> {
        let s2 = self.sigma * self.sigma;
        Some(s2.exp_m1() * 2.0_f64.mul_add(self.mu, s2).exp())
    }
}

impl Moment for LogNormal {
    fn moment(&self) -> f64 {
        self.mean().unwrap_or_else(|| self.mu.exp())
    }
}
