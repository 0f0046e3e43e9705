//! Gaussian/Normal distribution over x in (-∞, ∞)
use rand::Rng;
use rand_distr::StandardNormal;

use super::{finite, positive, ParamError};
use crate::consts::HALF_LN_2PI;
use crate::traits::{HasDensity, Mean, Moment, Sampleable, Support, Variance};

/// Gaussian / [Normal distribution](https://en.wikipedia.org/wiki/Normal_distribution),
/// N(μ, σ) over real values.
///
/// # Example
///
/// ```
/// use genmodel::dist::Gaussian;
/// use genmodel::traits::*;
///
/// let gauss = Gaussian::new(1.0, 2.0).unwrap();
/// assert_eq!(gauss.mean(), Some(1.0));
/// assert!(gauss.ln_f(1.0) > gauss.ln_f(3.0));
/// ```
#[derive(Debug, Clone)]
pub struct Gaussian {
    /// Mean
    mu: f64,
    /// Standard deviation
    sigma: f64,
    /// Cached ln(sigma)
    ln_sigma: f64,
}

impl PartialEq for Gaussian {
    fn eq(&self, other: &Gaussian) -> bool {
        self.mu == other.mu && self.sigma == other.sigma
    }
}

impl Gaussian {
    /// Create a new Gaussian distribution
    ///
    /// # Arguments
    /// - mu: mean
    /// - sigma: standard deviation
    pub fn new(mu: f64, sigma: f64) -> Result<Self, ParamError> {
        finite("mu", mu)?;
        positive("sigma", sigma)?;
        Ok(Self::new_unchecked(mu, sigma))
    }

    /// Creates a new Gaussian without checking whether the parameters are
    /// valid.
    #[inline]
    #[must_use]
    pub fn new_unchecked(mu: f64, sigma: f64) -> Self {
        Gaussian {
            mu,
            sigma,
            ln_sigma: sigma.ln(),
        }
    }

    /// Standard normal, N(0, 1)
    #[inline]
    #[must_use]
    pub fn standard() -> Self {
        Gaussian {
            mu: 0.0,
            sigma: 1.0,
            ln_sigma: 0.0,
        }
    }

    /// Get mu parameter
    #[inline]
    pub fn mu(&self) -> f64 {
        self.mu
    }

    /// Get sigma parameter
    #[inline]
    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}

impl Default for Gaussian {
    fn default() -> Self {
        Gaussian::standard()
    }
}

impl From<&Gaussian> for String {
    fn from(gauss: &Gaussian) -> String {
        format!("N(μ: {}, σ: {})", gauss.mu, gauss.sigma)
    }
}

impl_display!(Gaussian);

impl HasDensity for Gaussian {
    fn ln_f(&self, x: f64) -> f64 {
        let k = (x - self.mu) / self.sigma;
        (0.5 * k).mul_add(-k, -self.ln_sigma) - HALF_LN_2PI
    }
}

impl Sampleable for Gaussian {
    fn draw<R: Rng>(&self, rng: &mut R) -> f64 {
        let z: f64 = rng.sample(StandardNormal);
        self.sigma.mul_add(z, self.mu)
    }
}

impl Support for Gaussian {
    fn supports(&self, x: f64) -> bool {
        x.is_finite()
    }
}

impl Mean for Gaussian {
    fn mean(&self) -> Option<f64> {
        Some(self.mu)
    }
}

impl Variance for Gaussian {
    fn variance(&self) -> Option<f64> {
        Some(self.sigma * self.sigma)
    }
}

impl Moment for Gaussian {
    fn moment(&self) -> f64 {
        self.mu
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::misc::{mean, variance};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    const TOL: f64 = 1E-12;

    #[test]
    fn new() {
        let gauss = Gaussian::new(1.2, 3.0).unwrap();
        assert::close(gauss.mu, 1.2, TOL);
        assert::close(gauss.sigma, 3.0, TOL);
    }

    #[test]
    fn new_rejects_bad_sigma() {
        assert!(Gaussian::new(0.0, 0.0).is_err());
        assert!(Gaussian::new(0.0, -1.0).is_err());
        assert!(Gaussian::new(f64::NAN, 1.0).is_err());
        assert!(Gaussian::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn standard_ln_pdf_at_zero() {
        let gauss = Gaussian::standard();
        assert::close(gauss.ln_f(0.0), -0.918_938_533_204_672_7, TOL);
    }

    #[test]
    fn nonstandard_ln_pdf_on_mean() {
        let gauss = Gaussian::new(-1.2, 0.33).unwrap();
        assert::close(gauss.ln_f(-1.2), 0.189_724_091_316_938_46, TOL);
    }

    #[test]
    fn nonstandard_ln_pdf_off_mean() {
        let gauss = Gaussian::new(3.0, 2.0).unwrap();
        // -0.5 * 1.5^2 - ln 2 - 0.5 ln 2π
        assert::close(gauss.ln_f(6.0), -2.737_085_713_764_618, 1E-10);
    }

    #[test]
    fn should_not_contain_nan_or_infinity() {
        let gauss = Gaussian::standard();
        assert!(gauss.supports(10E8));
        assert!(!gauss.supports(f64::NAN));
        assert!(!gauss.supports(f64::INFINITY));
    }

    #[test]
    fn sample_moments() {
        let mut rng = Xoshiro256Plus::seed_from_u64(7);
        let gauss = Gaussian::new(2.0, 0.5).unwrap();
        let xs = gauss.sample(20_000, &mut rng);
        assert::close(mean(&xs), 2.0, 0.02);
        assert::close(variance(&xs, 1), 0.25, 0.02);
    }

    #[test]
    fn display() {
        let gauss = Gaussian::new(1.0, 2.0).unwrap();
        assert_eq!(gauss.to_string(), "N(μ: 1, σ: 2)");
    }
}
